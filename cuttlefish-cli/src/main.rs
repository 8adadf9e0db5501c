//! Cuttlefish CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cuttlefish_config::{load_config, LogFormat};
use cuttlefish_runtime::{ServerBuilder, SignalHandler};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cuttlefish")]
#[command(about = "Cuttlefish HTTP-CoAP Gateway", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the gateway (start the server)
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml", env = "CUTTLEFISH_CONFIG")]
        config: PathBuf,

        /// Override the configured log level (trace, debug, info, warn, error)
        #[arg(short, long)]
        log_level: Option<String>,

        /// Override the configured listen address
        #[arg(long)]
        listen: Option<SocketAddr>,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml", env = "CUTTLEFISH_CONFIG")]
        config: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config: path,
            log_level,
            listen,
        } => {
            let mut config = load_config(&path)
                .with_context(|| format!("loading {}", path.display()))?;

            if let Some(level) = log_level {
                config.observability.logging.level = level;
            }
            if let Some(listen) = listen {
                config.gateway.listen = listen;
            }

            init_tracing(
                &config.observability.logging.level,
                config.observability.logging.format,
            )?;

            tracing::info!("Starting Cuttlefish HTTP-CoAP Gateway");
            tracing::info!(
                config = %path.display(),
                listen = %config.gateway.listen,
                workers = config.gateway.worker_count(),
                "Configuration loaded"
            );

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(config.gateway.worker_count())
                .enable_all()
                .build()
                .context("building tokio runtime")?;

            runtime.block_on(async move {
                let server = ServerBuilder::new().config(config).build()?;

                let shutdown_signal = server.shutdown_signal();
                tokio::spawn(async move {
                    let handler = SignalHandler::new(shutdown_signal);
                    handler.run().await;
                });

                server.run().await?;

                tracing::info!("Server stopped");
                Ok::<_, anyhow::Error>(())
            })
        }

        Commands::Validate { config } => {
            tracing_subscriber::fmt().with_target(false).init();

            tracing::info!("Validating configuration: {}", config.display());

            match load_config(&config) {
                Ok(cfg) => {
                    let mounts: Vec<_> = cfg.mounts.iter().map(|m| m.name.as_str()).collect();
                    tracing::info!("Configuration is valid");
                    tracing::info!("  Listen: {}", cfg.gateway.listen);
                    tracing::info!("  Mounts: {:?}", mounts);
                    tracing::info!("  Gateway timeout: {:?}", cfg.gateway.gateway_timeout);
                    tracing::info!(
                        "  Local resources: {:?}",
                        cfg.downstream.coap.local_resources
                    );
                    tracing::info!("  HTTP forwarding: {}", cfg.downstream.http.enabled);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Configuration validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("Cuttlefish HTTP-CoAP Gateway");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_target(true)))
        .with((!json).then(|| {
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
        }))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(filter.into())
                .add_directive("hyper=warn".parse()?),
        )
        .init();

    Ok(())
}
