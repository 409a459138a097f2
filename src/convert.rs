//! Library entry points.
//!
//! Each entry point resolves its input, then hands the pdfium work to a
//! blocking worker thread: pdfium is synchronous and must not stall the async
//! runtime. The async layer itself only downloads URL inputs and supervises
//! the external notebook converter.
//!
//! Every function comes in three flavours: async (`extract_notes`), blocking
//! (`extract_notes_sync`, which builds its own runtime) and in-memory
//! (`extract_notes_from_bytes`, which spills the bytes to a managed temp
//! file first).

use crate::config::{NotesConfig, OverlayConfig};
use crate::error::LuminarError;
use crate::output::{NotesOutput, NotesStats, OverlayOutput, ScanOutput};
use crate::pipeline::classify::ClassifiedLine;
use crate::pipeline::input::{self, InputKind};
use crate::pipeline::{collect, compose, engine, overlay};
use crate::progress::{or_noop, ProgressCallback};
use crate::scratch::ScratchDir;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Suffix of notes documents: `<stem>_notes.pdf`.
pub const NOTES_SUFFIX: &str = "notes";
/// Suffix of formatted documents: `<stem>_formatted.pdf`.
pub const FORMATTED_SUFFIX: &str = "formatted";

/// Extract the highlights of a PDF file or URL into a styled notes PDF.
///
/// # Arguments
/// * `input`   — Local file path or HTTP/HTTPS URL to an annotated PDF
/// * `output`  — Where to write the notes document
/// * `config`  — Page geometry, palette and source password
/// * `scratch` — Directory for rendered math images
///
/// # Errors
/// - input errors (not found, not a PDF, download failure)
/// - `SourceOpen` / `PasswordRequired` / `WrongPassword` for unreadable sources
/// - `NoContentFound` when the source carries no highlighted text
/// - `Compose` / `OutputWriteFailed` when the document cannot be produced
pub async fn extract_notes(
    input: impl AsRef<str>,
    output: impl AsRef<Path>,
    config: &NotesConfig,
    scratch: &ScratchDir,
) -> Result<NotesOutput, LuminarError> {
    extract_notes_with_progress(input, output, config, scratch, None).await
}

/// [`extract_notes`] reporting per-page events to `progress`.
pub async fn extract_notes_with_progress(
    input: impl AsRef<str>,
    output: impl AsRef<Path>,
    config: &NotesConfig,
    scratch: &ScratchDir,
    progress: Option<ProgressCallback>,
) -> Result<NotesOutput, LuminarError> {
    let start = Instant::now();
    let input = input.as_ref();
    let output = output.as_ref().to_path_buf();
    info!("Extracting notes: {}", input);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input, config.download_timeout_secs).await?;
    let source = require_pdf(resolved.path(), resolved.kind())?;

    // ── Step 2: Collect + compose on a blocking thread ───────────────────
    let config = config.clone();
    let scratch = scratch.clone();
    let progress = or_noop(progress);
    let out_path = output.clone();
    let (lines, pages_scanned, composed) = tokio::task::spawn_blocking(move || {
        let pdfium = engine::bind_pdfium()?;
        let document = engine::open_file(&pdfium, &source, config.password.as_deref())
            .map_err(|e| e.into_source_error(&source))?;
        let pages_scanned = document.pages().len() as usize;
        let lines = collect::collect_document(&document, &source, progress.as_ref())?;
        if lines.is_empty() {
            return Err(LuminarError::NoContentFound { path: source });
        }
        let composed = compose::compose_notes(&pdfium, &lines, &out_path, &config, &scratch)?;
        progress.on_complete(composed.pages.len());
        Ok::<_, LuminarError>((lines, pages_scanned, composed))
    })
    .await
    .map_err(|e| LuminarError::Internal(format!("notes task panicked: {e}")))??;

    // ── Step 3: Stats ────────────────────────────────────────────────────
    let mut stats = NotesStats {
        pages_scanned,
        math_fallbacks: composed.math_fallbacks,
        output_pages: composed.pages.len(),
        toc_entries: composed.toc.len(),
        duration_ms: start.elapsed().as_millis() as u64,
        ..NotesStats::default()
    };
    stats.tally(&lines);

    if stats.math_fallbacks > 0 {
        warn!(
            "{} of {} math lines were set as plain text",
            stats.math_fallbacks, stats.math
        );
    }
    info!(
        "Notes complete: {} lines from {} pages → {} pages in {}ms",
        stats.lines, stats.pages_scanned, stats.output_pages, stats.duration_ms
    );

    Ok(NotesOutput {
        path: output,
        toc: composed.toc,
        stats,
    })
}

/// Synchronous wrapper around [`extract_notes`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_notes_sync(
    input: impl AsRef<str>,
    output: impl AsRef<Path>,
    config: &NotesConfig,
    scratch: &ScratchDir,
) -> Result<NotesOutput, LuminarError> {
    runtime()?.block_on(extract_notes(input, output, config, scratch))
}

/// Extract notes from PDF bytes held in memory.
///
/// The bytes are written to a managed temp file that is removed on return.
pub async fn extract_notes_from_bytes(
    bytes: &[u8],
    output: impl AsRef<Path>,
    config: &NotesConfig,
    scratch: &ScratchDir,
) -> Result<NotesOutput, LuminarError> {
    let tmp = spill(bytes, ".pdf")?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `extract_notes` returns
    extract_notes(&path, output, config, scratch).await
}

/// Collect and classify the highlighted lines of a PDF without composing
/// anything. An unannotated source yields an empty list, not an error.
pub async fn scan_highlights(
    input: impl AsRef<str>,
    config: &NotesConfig,
) -> Result<ScanOutput, LuminarError> {
    let resolved = input::resolve_input(input.as_ref(), config.download_timeout_secs).await?;
    let source = require_pdf(resolved.path(), resolved.kind())?;
    let password = config.password.clone();

    let (pages_scanned, lines) = tokio::task::spawn_blocking(move || {
        let pdfium = engine::bind_pdfium()?;
        let document = engine::open_file(&pdfium, &source, password.as_deref())
            .map_err(|e| e.into_source_error(&source))?;
        let lines: Vec<ClassifiedLine> =
            collect::collect_document(&document, &source, &crate::progress::NoopProgressCallback)?;
        Ok::<_, LuminarError>((document.pages().len() as usize, lines))
    })
    .await
    .map_err(|e| LuminarError::Internal(format!("scan task panicked: {e}")))??;

    Ok(ScanOutput {
        pages_scanned,
        lines,
    })
}

/// Stamp headers, footers and page numbers onto a PDF or notebook.
///
/// Notebook inputs (`.ipynb`) are first converted with
/// [`OverlayConfig::notebook`]; the intermediate PDF lives in a run directory
/// under `scratch` and is removed before this function returns.
///
/// # Errors
/// - input errors (not found, unsupported kind, download failure)
/// - `ExternalConversion` when the notebook converter fails or times out
/// - `Overlay` when the source cannot be opened or any page fails
/// - `OutputWriteFailed` when the result cannot be written
pub async fn add_header_footer(
    input: impl AsRef<str>,
    output: impl AsRef<Path>,
    config: &OverlayConfig,
    scratch: &ScratchDir,
) -> Result<OverlayOutput, LuminarError> {
    add_header_footer_with_progress(input, output, config, scratch, None).await
}

/// [`add_header_footer`] reporting per-page events to `progress`.
pub async fn add_header_footer_with_progress(
    input: impl AsRef<str>,
    output: impl AsRef<Path>,
    config: &OverlayConfig,
    scratch: &ScratchDir,
    progress: Option<ProgressCallback>,
) -> Result<OverlayOutput, LuminarError> {
    let start = Instant::now();
    let input = input.as_ref();
    let output = output.as_ref().to_path_buf();
    info!("Formatting: {}", input);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input, config.download_timeout_secs).await?;

    // ── Step 2: Convert notebooks ────────────────────────────────────────
    // The run directory must outlive compositing.
    let (_run_dir, source) = match resolved.kind() {
        InputKind::Pdf => (None, resolved.path().to_path_buf()),
        InputKind::Notebook => {
            let (dir, pdf) = config.notebook.convert(resolved.path(), scratch).await?;
            (Some(dir), pdf)
        }
    };

    // ── Step 3: Composite on a blocking thread ───────────────────────────
    let config = config.clone();
    let progress = or_noop(progress);
    let out_path = output.clone();
    let label = resolved.path().to_path_buf();
    let page_count = tokio::task::spawn_blocking(move || {
        let pdfium = engine::bind_pdfium()?;
        overlay::overlay_file(&pdfium, &source, &out_path, &config, progress.as_ref())
            .map_err(|e| relabel(e, &source, &label))
    })
    .await
    .map_err(|e| LuminarError::Internal(format!("overlay task panicked: {e}")))??;

    let duration_ms = start.elapsed().as_millis() as u64;
    info!("Formatted {} pages in {}ms", page_count, duration_ms);

    Ok(OverlayOutput {
        path: output,
        page_count,
        duration_ms,
    })
}

/// Synchronous wrapper around [`add_header_footer`].
pub fn add_header_footer_sync(
    input: impl AsRef<str>,
    output: impl AsRef<Path>,
    config: &OverlayConfig,
    scratch: &ScratchDir,
) -> Result<OverlayOutput, LuminarError> {
    runtime()?.block_on(add_header_footer(input, output, config, scratch))
}

/// Stamp headers and footers onto PDF bytes held in memory.
pub async fn add_header_footer_from_bytes(
    bytes: &[u8],
    output: impl AsRef<Path>,
    config: &OverlayConfig,
    scratch: &ScratchDir,
) -> Result<OverlayOutput, LuminarError> {
    let tmp = spill(bytes, ".pdf")?;
    let path = tmp.path().to_string_lossy().to_string();
    add_header_footer(&path, output, config, scratch).await
}

/// Default output path next to the input: `<stem>_<suffix>.pdf`.
///
/// For URLs the last path segment supplies the stem and the file lands in
/// the current directory.
///
/// ```rust
/// use luminar_pdf::default_output_path;
/// use std::path::PathBuf;
///
/// assert_eq!(
///     default_output_path("lectures/week3.pdf", "notes"),
///     PathBuf::from("lectures/week3_notes.pdf")
/// );
/// ```
pub fn default_output_path(input: &str, suffix: &str) -> PathBuf {
    let (dir, name) = if input::is_url(input) {
        let name = reqwest::Url::parse(input)
            .ok()
            .and_then(|url| {
                url.path_segments()?
                    .filter(|s| !s.is_empty())
                    .next_back()
                    .map(str::to_string)
            })
            .unwrap_or_default();
        (PathBuf::new(), name)
    } else {
        let path = Path::new(input);
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        (dir, name)
    };

    let stem = Path::new(&name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());
    dir.join(format!("{stem}_{suffix}.pdf"))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn runtime() -> Result<tokio::runtime::Runtime, LuminarError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| LuminarError::Internal(format!("Failed to create tokio runtime: {}", e)))
}

/// Write `bytes` to a named temp file with the given suffix.
fn spill(bytes: &[u8], suffix: &str) -> Result<tempfile::NamedTempFile, LuminarError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("luminar-input-")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| LuminarError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| LuminarError::Internal(format!("tempfile write: {e}")))?;
    Ok(tmp)
}

/// The notes pipeline reads PDFs only.
fn require_pdf(path: &Path, kind: InputKind) -> Result<PathBuf, LuminarError> {
    match kind {
        InputKind::Pdf => Ok(path.to_path_buf()),
        InputKind::Notebook => Err(LuminarError::UnsupportedInput {
            path: path.to_path_buf(),
            hint: " (notebooks are only accepted by the overlay)".to_string(),
        }),
    }
}

/// Report overlay failures against the user's input rather than the
/// converter's intermediate file.
fn relabel(error: LuminarError, intermediate: &Path, input: &Path) -> LuminarError {
    match error {
        LuminarError::Overlay { path, detail } if path == intermediate => LuminarError::Overlay {
            path: input.to_path_buf(),
            detail,
        },
        other => other,
    }
}
