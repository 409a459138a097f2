//! pdfium binding and document opening.
//!
//! Every pipeline stage that touches a PDF goes through here, so binding
//! failures and open failures are mapped onto [`LuminarError`] in exactly one
//! place.
//!
//! The library is looked up in this order:
//!
//! 1. `PDFIUM_LIB_PATH`, either the library file itself or the directory
//!    containing it;
//! 2. the current working directory;
//! 3. the system library search path.

use crate::error::LuminarError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit pdfium library location.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to a pdfium library.
pub fn bind_pdfium() -> Result<Pdfium, LuminarError> {
    let mut failures = Vec::new();

    if let Some(explicit) = std::env::var_os(PDFIUM_LIB_PATH_ENV) {
        let candidate = library_candidate(Path::new(&explicit));
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => failures.push(format!("{}: {e:?}", candidate.display())),
        }
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    match Pdfium::bind_to_library(&local) {
        Ok(bindings) => {
            debug!("Bound pdfium from {}", local.display());
            return Ok(Pdfium::new(bindings));
        }
        Err(e) => failures.push(format!("{}: {e:?}", local.display())),
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound system pdfium");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            failures.push(format!("system library: {e:?}"));
            Err(LuminarError::PdfiumBindingFailed(failures.join("; ")))
        }
    }
}

/// `PDFIUM_LIB_PATH` may name the library or its directory.
fn library_candidate(explicit: &Path) -> PathBuf {
    if explicit.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(explicit)
    } else {
        explicit.to_path_buf()
    }
}

/// What went wrong opening a document, before it is tied to a pipeline's
/// error variant.
#[derive(Debug)]
pub enum OpenFailure {
    PasswordRequired,
    WrongPassword,
    Unreadable(String),
}

impl OpenFailure {
    fn classify(err: &PdfiumError, password: Option<&str>) -> Self {
        match err {
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                if password.is_some() {
                    OpenFailure::WrongPassword
                } else {
                    OpenFailure::PasswordRequired
                }
            }
            other => OpenFailure::Unreadable(format!("{other:?}")),
        }
    }

    /// Map onto the error used when an annotated source cannot be read.
    pub fn into_source_error(self, path: &Path) -> LuminarError {
        let path = path.to_path_buf();
        match self {
            OpenFailure::PasswordRequired => LuminarError::PasswordRequired { path },
            OpenFailure::WrongPassword => LuminarError::WrongPassword { path },
            OpenFailure::Unreadable(detail) => LuminarError::SourceOpen { path, detail },
        }
    }

    /// Map onto the error used when an overlay source cannot be read.
    pub fn into_overlay_error(self, path: &Path) -> LuminarError {
        let path = path.to_path_buf();
        match self {
            OpenFailure::PasswordRequired => LuminarError::PasswordRequired { path },
            OpenFailure::WrongPassword => LuminarError::WrongPassword { path },
            OpenFailure::Unreadable(detail) => LuminarError::Overlay { path, detail },
        }
    }
}

/// Open a PDF file.
pub fn open_file<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, OpenFailure> {
    pdfium
        .load_pdf_from_file(path, password)
        .map_err(|e| OpenFailure::classify(&e, password))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Bind pdfium for a test, or report why the test is being skipped.
    pub(crate) fn pdfium_or_skip(test: &str) -> Option<Pdfium> {
        match bind_pdfium() {
            Ok(p) => Some(p),
            Err(e) => {
                eprintln!("Skipping {test}: {e}");
                None
            }
        }
    }

    #[test]
    fn password_errors_depend_on_whether_one_was_given() {
        let err = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError);
        assert!(matches!(
            OpenFailure::classify(&err, None),
            OpenFailure::PasswordRequired
        ));
        assert!(matches!(
            OpenFailure::classify(&err, Some("hunter2")),
            OpenFailure::WrongPassword
        ));
    }

    #[test]
    fn other_failures_map_to_pipeline_variant() {
        let err = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError);
        let path = Path::new("broken.pdf");

        let source = OpenFailure::classify(&err, None).into_source_error(path);
        assert!(matches!(source, LuminarError::SourceOpen { .. }));

        let overlay = OpenFailure::classify(&err, None).into_overlay_error(path);
        assert!(matches!(overlay, LuminarError::Overlay { .. }));
    }

    #[test]
    fn directory_candidate_gets_platform_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = library_candidate(dir.path());
        assert!(candidate.starts_with(dir.path()));
        assert!(candidate.to_string_lossy().contains("pdfium"));

        let file = dir.path().join("custom.so");
        assert_eq!(library_candidate(&file), file);
    }

    #[test]
    fn garbage_file_is_unreadable() {
        let Some(pdfium) = pdfium_or_skip("garbage_file_is_unreadable") else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        let result = open_file(&pdfium, &path, None);
        assert!(matches!(result, Err(OpenFailure::Unreadable(_))));
    }
}
