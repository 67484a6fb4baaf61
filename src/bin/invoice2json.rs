//! CLI binary for invoice2json.
//!
//! `serve` runs the HTTP service; `extract` processes one local file and
//! prints the invoice record to stdout.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use invoice2json::{AppState, InvoiceProcessor};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on 0.0.0.0:8000
  invoice2json serve

  # Upload a document to a running service
  curl -F file=@invoice.pdf http://localhost:8000/process-invoice/

  # Extract a single file without the server
  invoice2json extract invoice.pdf --pretty

SUPPORTED INPUTS:
  .pdf                 every page transcribed by the vision model
  .jpg .jpeg .png      single image transcribed by the vision model
  .xlsx .xls .csv      first sheet rendered as text, no vision call

ENVIRONMENT VARIABLES:
  TOGETHER_API_KEY         Vision model credential (required)
  GOOGLE_API_KEY           Text model credential (required)
  INVOICE_VISION_MODEL     Override the vision model ID
  INVOICE_VISION_BASE_URL  Override the OpenAI-compatible vision endpoint
  INVOICE_TEXT_MODEL       Override the Gemini model ID
  INVOICE_TEXT_BASE_URL    Override the Gemini API endpoint
  PDFIUM_LIB_PATH          Path to libpdfium (file or directory)
  RUST_LOG                 Log filter, overrides --verbose/--quiet

  A .env file in the working directory is loaded before reading these.
"#;

/// Extract structured invoice JSON from PDFs, images and spreadsheets.
#[derive(Parser, Debug)]
#[command(
    name = "invoice2json",
    version,
    about = "Extract structured invoice JSON from PDFs, images and spreadsheets",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "INVOICE2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "INVOICE2JSON_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Interface to bind.
        #[arg(long, env = "INVOICE2JSON_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to bind.
        #[arg(long, env = "INVOICE2JSON_PORT", default_value_t = 8000)]
        port: u16,
    },

    /// Process one local file and print the invoice record.
    Extract {
        /// PDF, image or spreadsheet to process.
        file: PathBuf,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
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

    match cli.command {
        Command::Serve { host, port } => run_server(&host, port).await,
        Command::Extract { file, pretty } => run_extract(file, pretty, cli.quiet).await,
    }
}

async fn run_server(host: &str, port: u16) -> Result<()> {
    // A misconfigured processor does not stop the service; /health reports it.
    let state = match InvoiceProcessor::from_env() {
        Ok(processor) => AppState::new(Arc::new(processor)),
        Err(e) => {
            error!("Failed to initialize invoice processor: {}", e);
            AppState::uninitialized()
        }
    };

    let addr = tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve {host}:{port}"))?
        .next()
        .ok_or_else(|| anyhow!("No address found for {host}:{port}"))?;

    invoice2json::serve(addr, state)
        .await
        .context("HTTP server failed")
}

async fn run_extract(file: PathBuf, pretty: bool, quiet: bool) -> Result<()> {
    let processor =
        InvoiceProcessor::from_env().context("Failed to initialize invoice processor")?;

    let spinner = (!quiet).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Extracting");
        bar.set_message(file.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = processor.process_file(&file).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    if result.skipped_pages() > 0 && !quiet {
        eprintln!("warning: {} page(s) skipped", result.skipped_pages());
    }

    let record = match result.into_result() {
        Ok(record) => record,
        Err((kind, message)) => bail!("{} ({:?})", message, kind),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&record)
    } else {
        serde_json::to_string(&record)
    }
    .context("Failed to serialise invoice record")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}").context("Failed to write to stdout")?;
    Ok(())
}
