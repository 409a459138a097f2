//! Result types returned by the entry points, and the atomic file writer
//! both pipelines publish through.

use crate::error::LuminarError;
use crate::pipeline::classify::{ClassifiedLine, LineKind};
use crate::pipeline::compose::TocEntry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Summary of one notes run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesStats {
    /// Pages in the annotated source.
    pub pages_scanned: usize,
    /// Highlighted lines collected.
    pub lines: usize,
    pub headings: usize,
    pub code: usize,
    pub math: usize,
    pub points: usize,
    /// Math lines shown as plain text because typesetting failed.
    pub math_fallbacks: usize,
    /// Pages in the composed document, contents pages included.
    pub output_pages: usize,
    pub toc_entries: usize,
    pub duration_ms: u64,
}

impl NotesStats {
    /// Count lines per kind.
    pub fn tally(&mut self, lines: &[ClassifiedLine]) {
        self.lines = lines.len();
        let count = |kind: LineKind| lines.iter().filter(|l| l.kind == kind).count();
        self.headings = count(LineKind::Heading);
        self.code = count(LineKind::Code);
        self.math = count(LineKind::Math);
        self.points = count(LineKind::Point);
    }
}

/// Result of [`crate::extract_notes`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesOutput {
    /// Where the notes PDF was written.
    pub path: PathBuf,
    pub toc: Vec<TocEntry>,
    pub stats: NotesStats,
}

/// Result of [`crate::scan_highlights`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutput {
    pub pages_scanned: usize,
    pub lines: Vec<ClassifiedLine>,
}

/// Result of [`crate::add_header_footer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayOutput {
    /// Where the formatted PDF was written.
    pub path: PathBuf,
    /// Pages written; always equal to the source page count.
    pub page_count: usize,
    pub duration_ms: u64,
}

/// Write `bytes` to `path` via a sibling temp file and a rename, so readers
/// never observe a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), LuminarError> {
    let fail = |source: std::io::Error| LuminarError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    std::fs::write(&tmp_path, bytes).map_err(fail)?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        fail(e)
    })
}
