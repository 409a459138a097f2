//! Scratch directory handle for transient artifacts.
//!
//! Rendered math images and converted notebooks are written here. The handle
//! is created once by whoever owns the process (the CLI, a web server) and
//! passed by reference to every entry point that produces artifacts. Pipeline
//! code only ever writes uniquely keyed files into it and never deletes files
//! it did not create.

use crate::error::LuminarError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

/// A cheaply cloneable handle to the scratch directory.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    inner: Arc<Inner>,
}

#[derive(Debug)]
enum Inner {
    /// Created by us; removed when the last handle is dropped.
    Owned(TempDir),
    /// Managed by the caller; never removed here.
    External(PathBuf),
}

impl ScratchDir {
    /// Create a fresh temporary scratch directory owned by this handle.
    pub fn new() -> Result<Self, LuminarError> {
        let dir = tempfile::Builder::new()
            .prefix("luminar-")
            .tempdir()
            .map_err(|e| LuminarError::Internal(format!("scratch dir: {e}")))?;
        debug!("Created scratch dir {}", dir.path().display());
        Ok(Self {
            inner: Arc::new(Inner::Owned(dir)),
        })
    }

    /// Use an existing directory managed by the caller, creating it if needed.
    pub fn at(path: impl Into<PathBuf>) -> Result<Self, LuminarError> {
        let path = path.into();
        std::fs::create_dir_all(&path)
            .map_err(|e| LuminarError::Internal(format!("scratch dir {}: {e}", path.display())))?;
        Ok(Self {
            inner: Arc::new(Inner::External(path)),
        })
    }

    pub fn path(&self) -> &Path {
        match self.inner.as_ref() {
            Inner::Owned(dir) => dir.path(),
            Inner::External(path) => path,
        }
    }

    /// Path of the artifact keyed by `content`: `<prefix>_<hash>.<ext>`.
    ///
    /// Identical content maps to the same file, so a later write overwrites
    /// an earlier one.
    pub fn keyed_path(&self, prefix: &str, content: &str, ext: &str) -> PathBuf {
        self.path()
            .join(format!("{prefix}_{:016x}.{ext}", content_hash(content)))
    }

    /// Create a fresh, uniquely named subdirectory for one run.
    ///
    /// The returned [`TempDir`] belongs to the caller and is removed on drop.
    pub fn run_dir(&self, prefix: &str) -> Result<TempDir, LuminarError> {
        tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(self.path())
            .map_err(|e| LuminarError::Internal(format!("scratch run dir: {e}")))
    }
}

/// Stable 64-bit hash of a string (SipHash with fixed keys).
pub fn content_hash(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_path_is_deterministic() {
        let scratch = ScratchDir::new().unwrap();
        let a = scratch.keyed_path("math", "x^2", "png");
        let b = scratch.keyed_path("math", "x^2", "png");
        let c = scratch.keyed_path("math", "x^3", "png");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with(scratch.path()));
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("math_") && name.ends_with(".png"), "{name}");
    }

    #[test]
    fn owned_dir_is_removed_with_last_handle() {
        let scratch = ScratchDir::new().unwrap();
        let path = scratch.path().to_path_buf();
        let clone = scratch.clone();
        drop(scratch);
        assert!(path.exists());
        drop(clone);
        assert!(!path.exists());
    }

    #[test]
    fn external_dir_survives_drop() {
        let parent = tempfile::tempdir().unwrap();
        let path = parent.path().join("shared");
        let scratch = ScratchDir::at(&path).unwrap();
        std::fs::write(path.join("someone_else.txt"), b"keep").unwrap();
        drop(scratch);
        assert!(path.join("someone_else.txt").exists());
    }

    #[test]
    fn run_dirs_are_unique() {
        let scratch = ScratchDir::new().unwrap();
        let a = scratch.run_dir("nb-").unwrap();
        let b = scratch.run_dir("nb-").unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(scratch.path()));
    }
}
