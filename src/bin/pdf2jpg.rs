//! CLI binary for pdf2jpg.
//!
//! Drives the library's shell [`Controller`] the way a browser page would:
//! the INPUT argument is the "selected file", the shell state is followed
//! until it settles, and the resulting images are written as `page-N.jpg`.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2jpg::{
    gallery, inspect, write_images, ConversionConfig, ConversionProgressCallback, Controller,
    Decoder, PdfiumDecoder, Phase, ProgressCallback, ShellView, UploadedFile,
};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

/// Spinner while the document opens, then a page bar with one log line per
/// encoded page.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message(pdf2jpg::gallery::LOADING_TEXT);
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn abandon(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, encoded_len: usize) {
        let elapsed_ms = self
            .page_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:>6} KiB", encoded_len / 1024)),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages converted",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }

    fn on_conversion_failed(&self, _error: &str) {
        // The shell reports the message once it reaches its Error state.
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every page into ./page-1.jpg, ./page-2.jpg, ...
  pdf2jpg document.pdf

  # Write into a directory and also produce a browsable gallery
  pdf2jpg document.pdf -o out/ --gallery out/index.html

  # Machine-readable summary
  pdf2jpg --json document.pdf -o out/

  # Page count and output sizes without rendering
  pdf2jpg --inspect-only document.pdf

  # A file without a .pdf extension that is known to be a PDF
  pdf2jpg --content-type application/pdf download.bin

RENDERING:
  Every page is drawn at 2× its size in points and saved as a quality-100 JPEG.
  A US-letter page (612 × 792 pt) becomes a 1224 × 1584 pixel image.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Log filter, e.g. RUST_LOG=pdf2jpg=debug
  PDF2JPG_*         Every flag, e.g. PDF2JPG_OUTPUT_DIR=out
"#;

/// Convert every page of a PDF into a JPEG image.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2jpg",
    version,
    about = "Convert every page of a PDF into a JPEG image",
    long_about = "Convert every page of a PDF into a maximum-quality JPEG rendered at twice the \
page's nominal size. Everything runs locally; nothing is uploaded.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    #[arg(env = "PDF2JPG_INPUT")]
    input: Option<PathBuf>,

    /// Directory for page-N.jpg files.
    #[arg(short, long, env = "PDF2JPG_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Also write the HTML gallery view to this file.
    #[arg(long, env = "PDF2JPG_GALLERY")]
    gallery: Option<PathBuf>,

    /// Print a JSON summary of the written images to stdout.
    #[arg(long, env = "PDF2JPG_JSON")]
    json: bool,

    /// Override the MIME type declared for INPUT (normally derived from its extension).
    #[arg(long, env = "PDF2JPG_CONTENT_TYPE")]
    content_type: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2JPG_PASSWORD")]
    password: Option<String>,

    /// Path to libpdfium, or the directory containing it.
    #[arg(long, env = "PDF2JPG_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Print page count and geometry only, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2JPG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2JPG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2JPG_QUIET")]
    quiet: bool,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    input: Option<&'a Path>,
    page_count: usize,
    pages: Vec<JsonPage>,
}

#[derive(Serialize)]
struct JsonPage {
    page_num: usize,
    width: u32,
    height: u32,
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs; -v always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
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

    // ── Selected file ────────────────────────────────────────────────────
    let selected = match cli.input {
        Some(ref path) => {
            let file = UploadedFile::from_path(path)
                .with_context(|| format!("Cannot open {}", path.display()))?;
            Some(match cli.content_type {
                Some(ref mime) => file.with_declared_type(mime.clone()),
                None => file,
            })
        }
        None => None,
    };
    // Rejected selections never reach the engine.
    let file = match pdf2jpg::pipeline::input::accept(selected) {
        Ok(file) => file,
        Err(e) => return Ok(reject(&e.to_string())),
    };

    // ── PDFium engine ────────────────────────────────────────────────────
    let decoder: Arc<dyn Decoder> = Arc::new(
        tokio::task::block_in_place(|| PdfiumDecoder::bind(cli.pdfium_lib.as_deref()))
            .context("PDFium engine unavailable")?,
    );

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let name = file.name.clone();
        let bytes = file.read_bytes().await.context("Failed to read PDF")?;
        let info = inspect(decoder, bytes, cli.password.clone())
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize page info")?
            );
        } else {
            let engine = pdfium_locate::locate(cli.pdfium_lib.as_deref())
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "system library".to_string());
            println!("File:   {}", name);
            println!("Engine: {}", engine);
            println!("Pages:  {}", info.page_count);
            for page in &info.pages {
                println!(
                    "  {:>4}  {:>7.1} × {:<7.1} pt  →  {} × {} px",
                    page.page_num,
                    page.width_pts,
                    page.height_pts,
                    page.viewport.width,
                    page.viewport.height
                );
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(&cli, progress.clone().map(|p| p as ProgressCallback))?;

    // ── Run the shell ────────────────────────────────────────────────────
    let controller = Controller::new(decoder, config);
    spawn_transition_log(&controller);

    let handle = match controller.select_file(Some(file)) {
        Ok(handle) => handle,
        Err(e) => {
            if let Some(ref p) = progress {
                p.abandon();
            }
            return Err(e).context("Conversion could not start");
        }
    };

    let wait = handle.wait();
    tokio::pin!(wait);
    tokio::select! {
        _ = &mut wait => {}
        _ = tokio::signal::ctrl_c() => {
            controller.cancel();
            if let Some(ref p) = progress {
                p.abandon();
            }
            eprintln!("{} Cancelled", cyan("⚠"));
            return Ok(ExitCode::from(130));
        }
    }

    // ── Output ───────────────────────────────────────────────────────────
    let view = controller.view();
    if let Some(ref path) = cli.gallery {
        write_gallery(path, &view).await?;
    }

    match view.phase {
        Phase::Ready => {}
        Phase::Error(ref message) => {
            if let Some(ref p) = progress {
                p.abandon();
            }
            eprintln!("{} {}", red("✘"), red(message));
            return Ok(ExitCode::FAILURE);
        }
        Phase::Idle | Phase::Loading => {
            eprintln!("{} Conversion did not finish", red("✘"));
            return Ok(ExitCode::FAILURE);
        }
    }

    let written = write_images(&view.images, &cli.output_dir)
        .await
        .context("Failed to write images")?;

    if cli.json {
        let summary = JsonSummary {
            input: cli.input.as_deref(),
            page_count: view.images.len(),
            pages: view
                .images
                .iter()
                .zip(&written)
                .map(|(image, path)| JsonPage {
                    page_num: image.page_num,
                    width: image.width,
                    height: image.height,
                    file: path.clone(),
                })
                .collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  →  {}",
            green("✔"),
            written.len(),
            bold(&cli.output_dir.display().to_string()),
        );
        for path in &written {
            eprintln!("   {}", dim(&path.display().to_string()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder();
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

/// The alert shown for a missing or non-PDF selection.
fn reject(message: &str) -> ExitCode {
    eprintln!("{} {}", red("✘"), bold(message));
    ExitCode::from(2)
}

/// Log every shell transition at DEBUG level.
fn spawn_transition_log(controller: &Controller) {
    let mut rx = controller.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let view = rx.borrow_and_update().clone();
            debug!(
                "Shell: {:?} (generation {}, {} images, highlight {})",
                view.phase,
                view.generation,
                view.images.len(),
                view.highlight
            );
        }
    });
}

async fn write_gallery(path: &Path, view: &ShellView) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, gallery::render_html(view))
        .await
        .with_context(|| format!("Failed to write gallery to {}", path.display()))
}
