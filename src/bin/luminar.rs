//! CLI binary for luminar-pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `NotesConfig` / `OverlayConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use luminar_pdf::{
    add_header_footer_with_progress, default_output_path, extract_notes_with_progress,
    scan_highlights, LineKind, NotebookConverter, NotesConfig, OverlayConfig, PageNumberPlacement,
    PipelineProgressCallback, ProgressCallback, ScratchDir, SlotText, FORMATTED_SUFFIX,
    NOTES_SUFFIX,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner until the page count is known, then
/// a bar with one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// "Scanning" or "Formatting".
    verb: &'static str,
    /// What `items` counts on each page, for the log line.
    unit: &'static str,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new(verb: &'static str, unit: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            verb,
            unit,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed_ms(&self, page_num: usize) -> u128 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut times| times.remove(&page_num))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix(self.verb);
        self.bar.reset_eta();
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(page_num, Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, items: usize) {
        let elapsed_ms = self.elapsed_ms(page_num);
        if items > 0 {
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {:<12}  {}",
                green("✓"),
                page_num,
                total,
                dim(&format!("{items:>3} {}", self.unit)),
                dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
            ));
        }
        self.bar.inc(1);
    }

    fn on_complete(&self, _output_pages: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Highlights → notes (writes lecture_notes.pdf)
  luminar notes lecture.pdf

  # Custom title and output path
  luminar notes --title "Networks, week 7" lecture.pdf -o week7.pdf

  # List the highlighted lines and how they were classified
  luminar scan lecture.pdf
  luminar scan --json lecture.pdf > lines.json

  # Headers, footers and page numbers (writes slides_formatted.pdf)
  luminar overlay --header-left "CS101" --header-right "Lab 4" slides.pdf

  # Number from 5, top right
  luminar overlay --start-page 5 --page-num-placement header-right report.pdf

  # Notebooks are converted with jupyter nbconvert first
  luminar overlay --footer-center "Draft" analysis.ipynb

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Override the log filter (e.g. luminar_pdf=debug)
  LUMINAR_*         Every flag can also be set as LUMINAR_<FLAG>
"#;

/// Turn PDF highlights into study notes and stamp headers and footers onto PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "luminar",
    version,
    about = "Turn PDF highlights into study notes and stamp headers, footers and page numbers onto PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "LUMINAR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "LUMINAR_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "LUMINAR_NO_PROGRESS")]
    no_progress: bool,

    /// Print a JSON summary instead of human-readable output.
    #[arg(long, global = true, env = "LUMINAR_JSON")]
    json: bool,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, global = true, env = "LUMINAR_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract highlighted text into a styled notes PDF.
    Notes(NotesArgs),
    /// Print the highlighted lines and their classification.
    Scan(ScanArgs),
    /// Add headers, footers and page numbers to a PDF or notebook.
    Overlay(OverlayArgs),
}

#[derive(Args, Debug)]
struct NotesArgs {
    /// Annotated PDF: local path or HTTP/HTTPS URL.
    input: String,

    /// Output path. Default: <stem>_notes.pdf next to the input.
    #[arg(short, long, env = "LUMINAR_OUTPUT")]
    output: Option<PathBuf>,

    /// Running header printed on every notes page.
    #[arg(long, env = "LUMINAR_TITLE", default_value = "Luminar Notes")]
    title: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "LUMINAR_PASSWORD")]
    password: Option<String>,

    /// Keep rendered math images in this directory instead of a temp dir.
    #[arg(long, env = "LUMINAR_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Annotated PDF: local path or HTTP/HTTPS URL.
    input: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "LUMINAR_PASSWORD")]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// PDF or .ipynb notebook: local path or HTTP/HTTPS URL.
    input: String,

    /// Output path. Default: <stem>_formatted.pdf next to the input.
    #[arg(short, long, env = "LUMINAR_OUTPUT")]
    output: Option<PathBuf>,

    #[arg(long, default_value = "")]
    header_left: String,
    #[arg(long, default_value = "")]
    header_center: String,
    #[arg(long, default_value = "")]
    header_right: String,
    #[arg(long, default_value = "")]
    footer_left: String,
    #[arg(long, default_value = "")]
    footer_center: String,
    #[arg(long, default_value = "")]
    footer_right: String,

    /// Number printed on the first page.
    #[arg(long, env = "LUMINAR_START_PAGE", default_value_t = 1, allow_negative_numbers = true)]
    start_page: i64,

    /// Where the page number goes: header|footer - left|center|right.
    #[arg(long, env = "LUMINAR_PAGE_NUM_PLACEMENT", default_value = "footer-center")]
    page_num_placement: String,

    /// Band offset and content inset in points.
    #[arg(long, env = "LUMINAR_MARGIN", default_value_t = 36.0)]
    margin: f32,

    /// Header / footer font size in points.
    #[arg(long, env = "LUMINAR_FONT_SIZE", default_value_t = 9.0)]
    font_size: f32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "LUMINAR_PASSWORD")]
    password: Option<String>,

    /// Notebook converter timeout in seconds.
    #[arg(long, env = "LUMINAR_CONVERT_TIMEOUT", default_value_t = 60)]
    convert_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Notes(args) => run_notes(&cli, args, show_progress).await,
        Command::Scan(args) => run_scan(&cli, args).await,
        Command::Overlay(args) => run_overlay(&cli, args, show_progress).await,
    }
}

fn progress_for(show: bool, verb: &'static str, unit: &'static str) -> Option<ProgressCallback> {
    show.then(|| CliProgressCallback::new(verb, unit) as Arc<dyn PipelineProgressCallback>)
}

async fn run_notes(cli: &Cli, args: &NotesArgs, show_progress: bool) -> Result<()> {
    let mut builder = NotesConfig::builder()
        .title(&args.title)
        .download_timeout_secs(cli.download_timeout);
    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd);
    }
    let config = builder.build().context("Invalid notes configuration")?;

    let scratch = match args.scratch_dir {
        Some(ref dir) => ScratchDir::at(dir),
        None => ScratchDir::new(),
    }
    .context("Failed to prepare scratch directory")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, NOTES_SUFFIX));

    let progress = progress_for(show_progress, "Scanning", "lines");
    let notes = extract_notes_with_progress(&args.input, &output, &config, &scratch, progress)
        .await
        .context("Notes extraction failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&notes).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        let s = &notes.stats;
        eprintln!(
            "{}  {} lines from {} pages  {}ms  →  {}",
            green("✔"),
            s.lines,
            s.pages_scanned,
            s.duration_ms,
            bold(&notes.path.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "{} headings, {} code, {} math, {} points; {} pages",
                s.headings, s.code, s.math, s.points, s.output_pages
            ))
        );
        if s.math_fallbacks > 0 {
            eprintln!(
                "   {} {} math lines shown as plain text",
                cyan("⚠"),
                s.math_fallbacks
            );
        }
    }
    Ok(())
}

async fn run_scan(cli: &Cli, args: &ScanArgs) -> Result<()> {
    let mut builder = NotesConfig::builder().download_timeout_secs(cli.download_timeout);
    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd);
    }
    let config = builder.build().context("Invalid configuration")?;

    let scan = scan_highlights(&args.input, &config)
        .await
        .context("Highlight scan failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&scan).context("Failed to serialise output")?
        );
        return Ok(());
    }

    for line in &scan.lines {
        let label = format!("{:<8}", line.kind.to_string());
        let label = match line.kind {
            LineKind::Heading => bold(&label),
            LineKind::Code | LineKind::Math => cyan(&label),
            LineKind::Point => dim(&label),
        };
        println!("{label} {}", line.text);
    }
    if !cli.quiet {
        eprintln!(
            "{} highlighted lines on {} pages",
            scan.lines.len(),
            scan.pages_scanned
        );
    }
    Ok(())
}

async fn run_overlay(cli: &Cli, args: &OverlayArgs, show_progress: bool) -> Result<()> {
    let placement: PageNumberPlacement = args
        .page_num_placement
        .parse()
        .context("Invalid --page-num-placement")?;

    let mut builder = OverlayConfig::builder()
        .headers(SlotText::new(
            &args.header_left,
            &args.header_center,
            &args.header_right,
        ))
        .footers(SlotText::new(
            &args.footer_left,
            &args.footer_center,
            &args.footer_right,
        ))
        .start_page(args.start_page)
        .placement(placement)
        .margin(args.margin)
        .font_size(args.font_size)
        .notebook(
            NotebookConverter::default().with_timeout(Duration::from_secs(args.convert_timeout)),
        )
        .download_timeout_secs(cli.download_timeout);
    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd);
    }
    let config = builder.build().context("Invalid overlay configuration")?;

    let scratch = ScratchDir::new().context("Failed to prepare scratch directory")?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, FORMATTED_SUFFIX));

    let progress = progress_for(show_progress, "Formatting", "ops");
    let result = add_header_footer_with_progress(&args.input, &output, &config, &scratch, progress)
        .await
        .context("Formatting failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            result.page_count,
            result.duration_ms,
            bold(&result.path.display().to_string()),
        );
    }
    Ok(())
}
