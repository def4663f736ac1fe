//! web-host binary.
//!
//! Serves the built-in operational routes plus `/info/version`, and the web
//! app when `run.nginx` is set. Configuration comes from an optional TOML
//! file with environment fallback.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use clap::Parser;
use serde_json::{json, Value};

use web_host::config::{Properties, ServerConfig};
use web_host::lifecycle::signals;
use web_host::observability::{logging, metrics};
use web_host::{LifecycleManager, LifecycleStatus, WebHost};

#[derive(Parser)]
#[command(name = "web-host")]
#[command(about = "Embedded HTTP front door", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.port`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Never serve web assets.
    #[arg(long)]
    disallow_web_hosting: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let props = match &cli.config {
        Some(path) => Properties::load(path)?,
        None => Properties::new(),
    }
    .with_env_fallback();
    let config = ServerConfig::from_properties(&props)?;

    logging::init_logging(&config.log_level);
    metrics::init_metrics();

    tracing::info!(
        port = config.port,
        offset_path = %config.offset_path,
        grace_period_secs = config.grace_period_secs,
        api_prefixes = ?config.api_prefixes,
        "Configuration loaded"
    );

    let lifecycle = Arc::new(LifecycleManager::new());
    let resources = Router::new().route("/info/version", get(get_version));

    let mut host = WebHost::new(config, resources, lifecycle.clone());
    if cli.disallow_web_hosting {
        host = host.disallow_web_hosting();
    }

    let running = match cli.port {
        Some(port) => host.start_on(port).await?,
        None => host.start().await?,
    };

    lifecycle.transition(LifecycleStatus::Started).await;
    signals::spawn_signal_listener(lifecycle.clone());

    let outcome = running.stopped().await;
    lifecycle.transition(LifecycleStatus::Terminated).await;

    tracing::info!(outcome = ?outcome, "Shutdown complete");
    Ok(())
}

async fn get_version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
