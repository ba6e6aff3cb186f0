//! Gator - SOCKS4/SOCKS5 CONNECT relay
//!
//! This is the main entry point for the Gator application.

use anyhow::Result;
use clap::Parser;
use gator::config::{load_config, Config};
use gator::run_server;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;

/// Gator - SOCKS4/SOCKS5 CONNECT relay
#[derive(Parser, Debug)]
#[command(name = "gator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the configuration file
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind, overrides the configuration file
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    // Load configuration
    let mut config = match &args.config {
        Some(path) => {
            let config = load_config(path)?;
            info!("Configuration loaded from: {:?}", path);
            config
        }
        None => Config::default(),
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    info!("Gator v{}", gator::VERSION);
    info!("Listen address: {}", config.server.listen_addr());

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Handle Ctrl+C and termination signals (cross-platform)
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            info!("Received Ctrl+C, shutting down...");
                        }
                        _ = sigterm.recv() => {
                            info!("Received SIGTERM, shutting down...");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to setup SIGTERM handler: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Received Ctrl+C, shutting down...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            // On Windows, only handle Ctrl+C
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
        }

        let _ = shutdown_tx_clone.send(true);
    });

    // Run the server
    run_server(config, shutdown_rx).await
}

/// Setup logging based on configuration
///
/// `RUST_LOG` directives, when set, refine the level given on the command line.
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(parse_level(level)).into())
        .from_env_lossy();

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
