//! CLI binary for fetchmd.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use fetchmd::{
    convert, convert_to_file, default_output_path, ExtractionConfig, ExtractionProgressCallback,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live page-count bar plus one log line per
/// warning, rendered with [indicatif].
struct CliProgressCallback {
    bar: ProgressBar,
    ocr_pages: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose bar length is set by `on_extraction_start`.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            ocr_pages: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_pages} pages…"))
        ));
    }

    fn on_page_complete(&self, page_num: usize, _total: usize, used_ocr: bool) {
        if used_ocr {
            self.ocr_pages.fetch_add(1, Ordering::SeqCst);
            self.bar
                .println(format!("  {} Page {:>3}  {}", green("✓"), page_num, dim("OCR")));
        }
        self.bar.inc(1);
    }

    fn on_page_warning(&self, page_num: usize, _total: usize, warning: &str) {
        // Truncate very long warnings to keep output tidy.
        let msg = if warning.len() > 80 {
            format!("{}\u{2026}", &warning[..79])
        } else {
            warning.to_string()
        };
        self.bar
            .println(format!("  {} Page {:>3}  {}", yellow("⚠"), page_num, yellow(&msg)));
    }

    fn on_extraction_complete(&self, total_pages: usize, pages_with_content: usize) {
        self.bar.finish_and_clear();
        let ocr = self.ocr_pages.load(Ordering::SeqCst);
        if pages_with_content == total_pages && ocr == 0 {
            eprintln!(
                "{} {} pages extracted",
                green("✔"),
                bold(&total_pages.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages with content  ({} via OCR)",
                cyan("⚠"),
                bold(&pages_with_content.to_string()),
                total_pages,
                ocr,
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (writes document.md next to the input)
  fetchmd document.pdf

  # Explicit output path
  fetchmd document.pdf notes/document.md

  # Clean up formatting with an LLM pass
  fetchmd --enhance document.pdf

  # Just the quality score, as JSON on stdout
  fetchmd --score-only document.pdf

  # Use a specific model for enhancement
  fetchmd --enhance --provider openai --model gpt-4.1 document.pdf

SCORING:
  Every conversion is graded 0-100 from three sub-scores:
    text          page coverage (OCR pages earn half credit)
    structure     tables, images, enhancement bonuses over a 50 baseline
    completeness  100 minus warning and full-OCR penalties
  The report at the end of the Markdown shows the grade (A-F) and every
  warning that cost points.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (enhancement)
  ANTHROPIC_API_KEY       Anthropic API key (enhancement)
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium
"#;

/// Convert PDF files to Markdown with a quality score.
#[derive(Parser, Debug)]
#[command(
    name = "fetchmd",
    version,
    about = "Convert PDF files to Markdown with a quality score",
    long_about = "Convert PDF documents to Markdown via the embedded text layer, with an OCR \
fallback for scanned pages and an optional LLM formatting pass. Every conversion is graded \
with a deterministic 0-100 fetch score so pipelines can gate on extraction quality.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Output Markdown path. Defaults to the input with a .md extension.
    output: Option<PathBuf>,

    /// Run the LLM enhancement pass over the extracted Markdown.
    #[arg(long, visible_alias = "llm-enhance", env = "FETCHMD_ENHANCE")]
    enhance: bool,

    /// Print the fetch score as JSON on stdout and write no file.
    #[arg(long)]
    score_only: bool,

    /// LLM model ID for enhancement (e.g. gpt-4.1-nano, gpt-4.1).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider for enhancement: openai, anthropic, ollama.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "FETCHMD_PASSWORD")]
    password: Option<String>,

    /// Enhancement call timeout in seconds.
    #[arg(long, env = "FETCHMD_ENHANCE_TIMEOUT", default_value_t = 120)]
    enhance_timeout: u64,

    /// Disable the progress bar.
    #[arg(long, env = "FETCHMD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FETCHMD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FETCHMD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active; the
    // bar provides the feedback that matters. Verbose wins over everything.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.score_only;
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Score-only mode ──────────────────────────────────────────────────
    if cli.score_only {
        let output = convert(&cli.input, &config)
            .await
            .context("Conversion failed")?;
        let json = serde_json::to_string_pretty(&output.score)
            .context("Failed to serialise score")?;
        println!("{json}");
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let output = convert_to_file(&cli.input, &output_path, &config)
        .await
        .context("Conversion failed")?;

    if !cli.quiet {
        eprintln!(
            "{}  {}  {}ms",
            green("✔"),
            bold(&output_path.display().to_string()),
            output.stats.total_duration_ms,
        );
        eprintln!(
            "   Fetch Score: {} ({})",
            bold(&format!("{:.0}/100", output.score.overall_score)),
            output.score.grade,
        );
        for warning in &output.score.warnings {
            eprintln!("   {} {}", yellow("⚠"), dim(warning));
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .enhance(cli.enhance)
        .enhance_timeout_secs(cli.enhance_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
