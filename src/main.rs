//! Redshift Lambda UDF dispatcher (v1)
//!
//! Reads invocation events as JSON lines on stdin and writes one response
//! per line to stdout. Logs go to stderr.
//!
//! # Architecture Overview
//!
//! ```text
//!   event line ──▶ runtime::Invoker ──▶ routing::Router ──▶ handler
//!                                            │                 │
//!                                      rule / fallback   plain / parallel-row / batch
//!                                            │                 │
//!   response line ◀── event::Envelope ◀── dispatch::reconcile ◀┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::io::BufReader;

use udf_mux::config::{load_config, MuxConfig};
use udf_mux::handler::builtin;
use udf_mux::lifecycle::{build_router, shutdown_token};
use udf_mux::observability::logging;
use udf_mux::Invoker;

#[derive(Parser, Debug)]
#[command(name = "udf-mux", version, about = "Redshift Lambda UDF dispatcher")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "UDF_MUX_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MuxConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        routes = config.routes.len(),
        timeout_secs = config.invocation.timeout_secs,
        "udf-mux starting"
    );

    let registry = builtin::registry();
    let router = build_router(&config, &registry)?;
    let invoker = Invoker::new(router, &config.invocation);

    let served = invoker
        .serve(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown_token(),
        )
        .await?;

    tracing::info!(served, "Shutdown complete");
    Ok(())
}
