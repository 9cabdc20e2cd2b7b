//! String service (v1)
//!
//! A small HTTP service exposing two string operations through a generic
//! endpoint / middleware / transport pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌───────────────────────────────────────────────────────────┐
//!                   │                     STRING SERVICE                         │
//!                   │                                                            │
//!   POST /uppercase │  ┌──────────┐   ┌───────────┐   ┌────────────┐            │
//!   POST /count ────┼─▶│   http   │──▶│ transport │──▶│ middleware │            │
//!                   │  │  server  │   │  decode   │   │   chain    │            │
//!                   │  └──────────┘   └───────────┘   └─────┬──────┘            │
//!                   │                                       ▼                    │
//!                   │                                ┌────────────┐              │
//!                   │                                │  endpoint  │              │
//!                   │                                │  + service │              │
//!                   │                                └─────┬──────┘              │
//!   JSON or         │  ┌──────────┐   ┌───────────┐         │                    │
//!   "err: ..." ◀────┼──│   http   │◀──│ transport │◀────────┘                    │
//!                   │  │ response │   │  encode   │                              │
//!                   │  └──────────┘   └───────────┘                              │
//!                   │                                                            │
//!                   │  config · lifecycle · observability (cross-cutting)        │
//!                   └───────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use string_service::config::{load_config, ServiceConfig};
use string_service::lifecycle::startup;
use string_service::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "string-service")]
#[command(about = "HTTP service exposing uppercase and count operations", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:8080).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?args.config,
        "string-service starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
