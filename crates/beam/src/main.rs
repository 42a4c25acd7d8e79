//! beam CLI - live mermaid canvas for a watched markdown document.
//!
//! `beam <file.md>` starts the server, watches the file, and opens a browser
//! on the live canvas. Without a file the server still runs and answers
//! ad-hoc `/render` requests.

mod browser;
mod error;
mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use beam_config::{CliSettings, Config};
use beam_server::{run_server, server_config_from_config};

use error::CliError;
use output::Output;

/// beam - live mermaid canvas.
#[derive(Parser)]
#[command(name = "beam", version, about)]
struct Cli {
    /// Markdown document to watch (ad-hoc render mode when omitted).
    file: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover beam.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Kroki server URL for diagram rendering (overrides config,
    /// switches the renderer to kroki mode).
    #[arg(long)]
    kroki_url: Option<String>,

    /// Path to the mmdc binary (overrides config).
    #[arg(long)]
    mmdc_path: Option<PathBuf>,

    /// Do not open a browser after startup.
    #[arg(long)]
    no_open: bool,

    /// Enable verbose output (timing and per-block diagnostics).
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(err) = rt.block_on(run(cli, &output)) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<(), CliError> {
    // Resolve the document up front; a given path that does not exist is a
    // startup error, not something to discover later.
    let document = match &cli.file {
        Some(file) => {
            let absolute = std::path::absolute(file)?;
            if !absolute.is_file() {
                return Err(CliError::FileNotFound(absolute));
            }
            Some(absolute)
        }
        None => {
            output.warning("No document specified; running in ad-hoc render mode.");
            output.info("Usage: beam <markdown-file>");
            output.info("");
            output.info("Example:");
            output.info("  beam ./shaping-doc.md");
            None
        }
    };

    // Build CLI settings from args
    let cli_settings = CliSettings {
        host: cli.host,
        port: cli.port,
        kroki_url: cli.kroki_url,
        mmdc_path: cli.mmdc_path,
    };

    // Load config
    let config = Config::load(cli.config.as_deref(), Some(&cli_settings))?;

    let url = format!("http://{}:{}", config.server.host, config.server.port);

    // Print startup info
    output.highlight(&format!("beam server: {url}"));
    if let Some(document) = &document {
        output.info(&format!("Watching: {}", document.display()));
    }
    match &config.renderer.kroki_url {
        Some(kroki_url) => output.info(&format!("Renderer: kroki ({kroki_url})")),
        None => output.info(&format!(
            "Renderer: mmdc ({})",
            config.renderer.mmdc_path.display()
        )),
    }

    if !cli.no_open {
        browser::open_after_start(url);
    }

    // Build server config and run
    let server_config = server_config_from_config(&config, document);
    run_server(server_config)
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    Ok(())
}
