//! Notebook → PDF conversion through an external program.
//!
//! The converter is configured as a program plus an argument template in
//! which `{input}` and `{outdir}` are substituted. It runs once per request
//! under a hard timeout and is never retried; the child is killed when the
//! timeout fires.

use crate::error::LuminarError;
use crate::scratch::ScratchDir;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

/// External notebook-to-PDF converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookConverter {
    pub program: String,
    /// Argument template. `{input}` and `{outdir}` are replaced per run.
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for NotebookConverter {
    fn default() -> Self {
        Self {
            program: "jupyter".to_string(),
            args: [
                "nbconvert",
                "--to",
                "webpdf",
                "--allow-chromium-download",
                "--output-dir",
                "{outdir}",
                "{input}",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl NotebookConverter {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The argument list for one run.
    pub fn expand_args(&self, input: &Path, outdir: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let outdir = outdir.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace("{input}", &input).replace("{outdir}", &outdir))
            .collect()
    }

    /// Convert `input` into a PDF inside a fresh run directory under
    /// `scratch`.
    ///
    /// Returns the run directory (removed on drop) and the PDF inside it.
    pub async fn convert(
        &self,
        input: &Path,
        scratch: &ScratchDir,
    ) -> Result<(TempDir, PathBuf), LuminarError> {
        let fail = |detail: String| LuminarError::ExternalConversion {
            path: input.to_path_buf(),
            detail,
        };

        let run_dir = scratch.run_dir("notebook-")?;
        let args = self.expand_args(input, run_dir.path());

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        debug!("Notebook converter command: {:?}", cmd);

        info!("Converting notebook {}", input.display());
        let child = cmd
            .spawn()
            .map_err(|e| fail(format!("failed to start '{}': {e}", self.program)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| fail(format!("timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| fail(format!("'{}' failed: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let pdf = find_output_pdf(run_dir.path(), input)
            .ok_or_else(|| fail("the converter produced no PDF".to_string()))?;
        debug!("Notebook converted to {}", pdf.display());
        Ok((run_dir, pdf))
    }
}

/// `<outdir>/<stem>.pdf` if present, otherwise the first PDF in `outdir`.
fn find_output_pdf(outdir: &Path, input: &Path) -> Option<PathBuf> {
    if let Some(stem) = input.file_stem() {
        let expected = outdir.join(stem).with_extension("pdf");
        if expected.is_file() {
            return Some(expected);
        }
    }
    let mut pdfs: Vec<PathBuf> = std::fs::read_dir(outdir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdfs.sort();
    pdfs.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str, timeout: Duration) -> NotebookConverter {
        NotebookConverter {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            timeout,
        }
    }

    #[test]
    fn default_is_nbconvert_webpdf() {
        let c = NotebookConverter::default();
        assert_eq!(c.program, "jupyter");
        assert_eq!(c.timeout, Duration::from_secs(60));
        let args = c.expand_args(Path::new("/in/lab.ipynb"), Path::new("/tmp/out"));
        assert_eq!(
            args,
            vec![
                "nbconvert",
                "--to",
                "webpdf",
                "--allow-chromium-download",
                "--output-dir",
                "/tmp/out",
                "/in/lab.ipynb"
            ]
        );
    }

    #[tokio::test]
    async fn successful_run_returns_the_pdf() {
        let scratch = ScratchDir::new().unwrap();
        let converter = NotebookConverter {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "printf '%%PDF-1.4' > \"$1/lab.pdf\"".to_string(),
                "sh".to_string(),
                "{outdir}".to_string(),
            ],
            timeout: Duration::from_secs(10),
        };
        let (run_dir, pdf) = converter
            .convert(Path::new("lab.ipynb"), &scratch)
            .await
            .unwrap();
        assert_eq!(pdf, run_dir.path().join("lab.pdf"));
        assert_eq!(std::fs::read(&pdf).unwrap(), b"%PDF-1.4");

        let kept = run_dir.path().to_path_buf();
        drop(run_dir);
        assert!(!kept.exists());
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let scratch = ScratchDir::new().unwrap();
        let err = shell("echo boom >&2; exit 3", Duration::from_secs(10))
            .convert(Path::new("lab.ipynb"), &scratch)
            .await
            .unwrap_err();
        match err {
            LuminarError::ExternalConversion { detail, .. } => assert!(detail.contains("boom")),
            other => panic!("expected ExternalConversion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_converter_times_out() {
        let scratch = ScratchDir::new().unwrap();
        let err = shell("sleep 5", Duration::from_millis(200))
            .convert(Path::new("lab.ipynb"), &scratch)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let scratch = ScratchDir::new().unwrap();
        let converter = NotebookConverter {
            program: "luminar-no-such-converter".to_string(),
            ..NotebookConverter::default()
        };
        let err = converter
            .convert(Path::new("lab.ipynb"), &scratch)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }

    #[tokio::test]
    async fn success_without_output_is_an_error() {
        let scratch = ScratchDir::new().unwrap();
        let err = shell("true", Duration::from_secs(10))
            .convert(Path::new("lab.ipynb"), &scratch)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no PDF"));
    }
}
