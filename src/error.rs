//! Error types for the luminar-pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`LuminarError`] — **Fatal**: the request cannot produce an output
//!   document at all (unreadable input, no highlights, the overlay source is
//!   corrupt, the notebook converter timed out). Returned as
//!   `Err(LuminarError)` from every entry point in [`crate::convert`].
//!
//! * [`MathError`] — **Non-fatal**: one mathematical expression could not be
//!   typeset. The composer substitutes the raw text as a plain paragraph and
//!   carries on; the error only travels inside
//!   [`crate::pipeline::math::RenderOutcome::FallbackText`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the luminar-pdf library.
///
/// No output artifact is ever written when one of these is returned.
#[derive(Debug, Error)]
pub enum LuminarError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// The input has an extension the pipeline does not accept.
    #[error("Unsupported input '{path}': expected a .pdf file{hint}")]
    UnsupportedInput { path: PathBuf, hint: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Source document errors ────────────────────────────────────────────
    /// The annotated source could not be parsed as a PDF.
    #[error("Could not open '{path}' as a PDF: {detail}")]
    SourceOpen { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The source opened fine but carries no highlighted text.
    #[error("No highlights were found in '{path}'")]
    NoContentFound { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The notes document could not be composed.
    #[error("Failed to compose notes document: {detail}")]
    Compose { detail: String },

    /// The header/footer overlay could not be applied.
    #[error("Failed to process PDF '{path}': {detail}")]
    Overlay { path: PathBuf, detail: String },

    /// The external notebook-to-PDF converter failed or timed out.
    #[error("Notebook conversion failed for '{path}': {detail}")]
    ExternalConversion { path: PathBuf, detail: String },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Luminar looks for libpdfium in this order:\n\
  • PDFIUM_LIB_PATH (a file or the directory that contains it)\n\
  • the current working directory\n\
  • the system library search path\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure to typeset one mathematical expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// The expression is not valid mathtext.
    #[error("cannot parse '{expr}' at offset {offset}: {reason}")]
    Parse {
        expr: String,
        offset: usize,
        reason: String,
    },

    /// Parsing succeeded but rasterising or saving the image failed.
    #[error("cannot rasterise '{expr}': {detail}")]
    Raster { expr: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_content_display() {
        let e = LuminarError::NoContentFound {
            path: PathBuf::from("/tmp/lecture.pdf"),
        };
        let msg = e.to_string();
        assert!(msg.contains("No highlights"), "got: {msg}");
        assert!(msg.contains("lecture.pdf"), "got: {msg}");
    }

    #[test]
    fn overlay_display() {
        let e = LuminarError::Overlay {
            path: PathBuf::from("slides.pdf"),
            detail: "bad xref".into(),
        };
        assert!(e.to_string().contains("slides.pdf"));
        assert!(e.to_string().contains("bad xref"));
    }

    #[test]
    fn external_conversion_display() {
        let e = LuminarError::ExternalConversion {
            path: PathBuf::from("lab.ipynb"),
            detail: "timed out after 60s".into(),
        };
        assert!(e.to_string().contains("lab.ipynb"));
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn math_parse_display() {
        let e = MathError::Parse {
            expr: "x^".into(),
            offset: 2,
            reason: "missing operand".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("offset 2"), "got: {msg}");
        assert!(msg.contains("missing operand"), "got: {msg}");
    }
}
