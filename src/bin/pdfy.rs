//! CLI binary for pdfy.
//!
//! A thin shim over the library crate: `serve` runs the proxy, `submit`
//! drives the form client against a running server, `summarize` runs the
//! upload/poll/generate flow directly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdfy::{
    FileState, FormController, GeminiClient, PdfFile, SummarizeConfig, SummarizeObserver,
    Summarizer, UploadedPdf,
};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
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

const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn spinner(prefix: &'static str, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(SPINNER_TICKS);
    bar.set_style(style);
    bar.set_prefix(prefix);
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── Spinner observer for local summarize ─────────────────────────────────────

/// Maps summarize lifecycle events onto a single spinner line.
struct SpinnerObserver {
    bar: ProgressBar,
}

impl SummarizeObserver for SpinnerObserver {
    fn on_upload_start(&self, file_name: &str, size_bytes: usize) {
        self.bar.set_prefix("Uploading");
        self.bar
            .set_message(format!("{file_name} {}", dim(&format!("({size_bytes} bytes)"))));
    }

    fn on_upload_complete(&self, name: &str) {
        self.bar.println(format!("  {} uploaded as {}", green("✓"), name));
        self.bar.set_prefix("Processing");
    }

    fn on_poll(&self, _name: &str, attempt: u32, state: FileState) {
        self.bar
            .set_message(format!("check #{attempt}: {}", dim(&format!("{state:?}"))));
    }

    fn on_ready(&self, _name: &str, waited: Duration) {
        self.bar.println(format!(
            "  {} file ready {}",
            green("✓"),
            dim(&format!("after {:.1}s", waited.as_secs_f64()))
        ));
    }

    fn on_generation_start(&self, model: &str) {
        self.bar.set_prefix("Summarizing");
        self.bar.set_message(model.to_string());
    }

    fn on_summary(&self, summary_len: usize) {
        self.bar.finish_and_clear();
        eprintln!("{} summary ready {}", green("✔"), dim(&format!("({summary_len} chars)")));
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the web app on http://localhost:3000
  GEMINI_API_KEY=AIza... pdfy serve

  # Submit a PDF to a running server
  pdfy submit report.pdf --server http://localhost:3000

  # Summarize directly, without a server
  GEMINI_API_KEY=AIza... pdfy summarize report.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY            Google Gemini API key (serve, summarize)
  PDFY_BIND                 Listen address for `serve`
  PDFY_SERVER               Server URL for `submit`
  PDFY_MODEL                Gemini model ID
  PDFY_POLL_INTERVAL_SECS   Seconds between file-state checks
  PDFY_MAX_POLL_WAIT_SECS   Give up after this many seconds (0 = never)
  PDFY_GENERATE_TIMEOUT_SECS  Timeout for the generation call
  RUST_LOG                  Overrides the log filter
"#;

/// Summarize PDF documents with Google Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "pdfy",
    version,
    about = "Summarize PDF documents with Google Gemini",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDFY_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web app and the /api/summarize proxy.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "PDFY_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },

    /// Submit a PDF to a running pdfy server and print the summary.
    Submit {
        /// PDF file to upload.
        file: Option<PathBuf>,

        /// Base URL of the pdfy server.
        #[arg(long, env = "PDFY_SERVER", default_value = "http://127.0.0.1:3000")]
        server: String,

        /// Print the raw JSON reply state instead of Markdown.
        #[arg(long)]
        json: bool,
    },

    /// Summarize a PDF directly against Gemini, without a server.
    Summarize {
        /// PDF file to summarize.
        file: PathBuf,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },
}

#[derive(clap::Args, Debug)]
struct UpstreamArgs {
    /// Google Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "PDFY_MODEL", default_value = pdfy::prompts::DEFAULT_MODEL)]
    model: String,

    /// Gemini API base URL.
    #[arg(long, env = "PDFY_API_BASE_URL", default_value = pdfy::config::DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Seconds between two file-state checks.
    #[arg(long, env = "PDFY_POLL_INTERVAL_SECS", default_value_t = 2)]
    poll_interval: u64,

    /// Give up waiting for processing after this many seconds (0 = never).
    #[arg(long, env = "PDFY_MAX_POLL_WAIT_SECS", default_value_t = 300)]
    max_poll_wait: u64,

    /// Per-request timeout for uploads and status checks, in seconds.
    #[arg(long, env = "PDFY_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    request_timeout: u64,

    /// Timeout for the summary generation call, in seconds.
    #[arg(long, env = "PDFY_GENERATE_TIMEOUT_SECS", default_value_t = 600)]
    generate_timeout: u64,

    /// Largest accepted upload, in MiB.
    #[arg(long, env = "PDFY_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,
}

impl UpstreamArgs {
    fn to_config(&self) -> Result<SummarizeConfig> {
        let max_wait = (self.max_poll_wait > 0).then(|| Duration::from_secs(self.max_poll_wait));
        let mut builder = SummarizeConfig::builder()
            .model(&self.model)
            .api_base_url(&self.api_base_url)
            .poll_interval(Duration::from_secs(self.poll_interval))
            .max_poll_wait(max_wait)
            .request_timeout_secs(self.request_timeout)
            .generate_timeout_secs(self.generate_timeout)
            .max_upload_bytes(self.max_upload_mb.saturating_mul(1024 * 1024));
        if let Some(ref key) = self.api_key {
            builder = builder.api_key(key);
        }
        builder.build().context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Client commands show a spinner, so library logs stay at ERROR unless
    // asked for; the server logs requests at INFO.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        match cli.command {
            Command::Serve { .. } => "info,tower_http=info",
            _ => "error",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve { bind, upstream } => {
            let config = upstream.to_config()?;
            pdfy::serve(config, bind).await.context("Server failed")?;
        }
        Command::Submit { file, server, json } => {
            submit(file, &server, json, cli.quiet).await?;
        }
        Command::Summarize { file, upstream } => {
            summarize_local(&file, &upstream, cli.quiet).await?;
        }
    }

    Ok(())
}

async fn submit(file: Option<PathBuf>, server: &str, json: bool, quiet: bool) -> Result<()> {
    let mut controller = FormController::new(server)?;

    let pdf = match file {
        Some(ref path) => Some(PdfFile::from_path(path).await?),
        None => None,
    };

    let bar = (!quiet).then(|| spinner("Summarizing", "waiting for server…"));
    let result = controller.submit(pdf).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    let state = result?;

    if json {
        let value = serde_json::json!({
            "summary": state.summary,
            "error": state.error,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if let Some(ref summary) = state.summary {
        write_markdown(summary)?;
    }

    match state.error {
        Some(ref error) => anyhow::bail!("{} {}", red("✘"), error),
        None => Ok(()),
    }
}

async fn summarize_local(path: &Path, upstream: &UpstreamArgs, quiet: bool) -> Result<()> {
    let config = upstream.to_config()?;
    let client = GeminiClient::from_config(&config)
        .context("Failed to build Gemini client")?
        .context("No Gemini API key. Set GEMINI_API_KEY or pass --api-key.")?;

    let pdf = PdfFile::from_path(path).await?;
    let upload = UploadedPdf {
        file_name: pdf.file_name,
        mime_type: "application/pdf".to_string(),
        bytes: pdf.bytes.into(),
    };

    let mut summarizer = Summarizer::new(Arc::new(client), &config);
    let bar = (!quiet).then(|| spinner("Preparing", "reading PDF…"));
    if let Some(ref bar) = bar {
        summarizer = summarizer.with_observer(Arc::new(SpinnerObserver { bar: bar.clone() }));
    }

    let result = summarizer.summarize(upload).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    let summary = result.map_err(|e| anyhow::anyhow!(e.public_message()))?;

    write_markdown(&summary)
}

fn write_markdown(markdown: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(markdown.as_bytes())
        .context("Failed to write to stdout")?;
    if !markdown.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
