//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! ## Why download to a temp file?
//!
//! Notebook conversion runs an external program that needs a real file, and
//! pdfium error reporting names paths. Downloading to a `TempDir` gives both a
//! path while ensuring cleanup happens automatically when `ResolvedInput` is
//! dropped. PDF inputs are checked for the `%PDF` magic bytes before
//! returning so callers get a meaningful error rather than a pdfium failure.

use crate::error::LuminarError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// What kind of document an input is, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    /// A Jupyter notebook, converted to PDF before compositing.
    Notebook,
}

impl InputKind {
    /// Classify `path` by extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(InputKind::Pdf),
            "ipynb" => Some(InputKind::Notebook),
            _ => None,
        }
    }
}

/// The resolved input — either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local { path: PathBuf, kind: InputKind },
    /// Input was a URL; the document was downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until processing completes.
    Downloaded {
        path: PathBuf,
        kind: InputKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    /// Get the path to the document regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } => path,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            ResolvedInput::Local { kind, .. } | ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local file path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, LuminarError> {
    if input.trim().is_empty() {
        return Err(LuminarError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn kind_of(path: &Path) -> Result<InputKind, LuminarError> {
    InputKind::from_path(path).ok_or_else(|| LuminarError::UnsupportedInput {
        path: path.to_path_buf(),
        hint: " or a .ipynb notebook".to_string(),
    })
}

fn check_magic(path: &Path, head: &[u8]) -> Result<(), LuminarError> {
    if head.len() >= 4 && &head[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&head[..4]);
        return Err(LuminarError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Resolve a local file path, validating existence, kind and PDF magic bytes.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, LuminarError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(LuminarError::FileNotFound { path });
    }
    let kind = kind_of(&path)?;

    // Check read permission by attempting to open
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            if kind == InputKind::Pdf {
                use std::io::Read;
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() {
                    check_magic(&path, &magic)?;
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(LuminarError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(LuminarError::FileNotFound { path });
        }
    }

    debug!("Resolved local {:?}: {}", kind, path.display());
    Ok(ResolvedInput::Local { path, kind })
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, LuminarError> {
    info!("Downloading from: {}", url);

    let filename = filename_from_url(url).ok_or_else(|| LuminarError::InvalidInput {
        input: url.to_string(),
    })?;
    let kind = kind_of(Path::new(&filename))?;

    let failed = |reason: String| LuminarError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            LuminarError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let temp_dir = TempDir::new().map_err(|e| LuminarError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    if kind == InputKind::Pdf {
        check_magic(&file_path, &bytes)?;
    }

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| LuminarError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// The last path segment of `url` when it looks like a file name.
/// URLs without one are assumed to serve a PDF.
fn filename_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let last = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty() && last.contains('.'));
    Some(last.map_or_else(|| "downloaded.pdf".to_string(), str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn kind_is_decided_by_extension_case_insensitively() {
        assert_eq!(InputKind::from_path(Path::new("a.pdf")), Some(InputKind::Pdf));
        assert_eq!(InputKind::from_path(Path::new("A.PDF")), Some(InputKind::Pdf));
        assert_eq!(
            InputKind::from_path(Path::new("lab.IPynb")),
            Some(InputKind::Notebook)
        );
        assert_eq!(InputKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(InputKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn filename_comes_from_the_last_segment() {
        assert_eq!(
            filename_from_url("https://x.org/files/lab.ipynb?raw=1").as_deref(),
            Some("lab.ipynb")
        );
        assert_eq!(
            filename_from_url("https://x.org/download/").as_deref(),
            Some("downloaded.pdf")
        );
        assert_eq!(filename_from_url("https://"), None);
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = resolve_input("/definitely/not/here.pdf", 5).await.unwrap_err();
        assert!(matches!(err, LuminarError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let err = resolve_input("  ", 5).await.unwrap_err();
        assert!(matches!(err, LuminarError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pptx");
        std::fs::write(&path, b"PK\x03\x04").unwrap();
        let err = resolve_input(path.to_str().unwrap(), 5).await.unwrap_err();
        assert!(matches!(err, LuminarError::UnsupportedInput { .. }));
    }

    #[tokio::test]
    async fn pdf_without_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"<html></html>").unwrap();
        let err = resolve_input(path.to_str().unwrap(), 5).await.unwrap_err();
        match err {
            LuminarError::NotAPdf { magic, .. } => assert_eq!(&magic, b"<htm"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn notebooks_skip_the_magic_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab.ipynb");
        std::fs::write(&path, br#"{"cells": []}"#).unwrap();
        let resolved = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(resolved.kind(), InputKind::Notebook);
        assert_eq!(resolved.path(), path.as_path());
    }
}
