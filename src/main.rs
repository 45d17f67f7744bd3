//! Mocked Responses Server - CLI Entry Point

use anyhow::Result;
use clap::Parser;
use mocked_responses_server::{create_router, AppState, Registry, ServerConfig};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "mocked-responses-server",
    about = "Programmable HTTP test double - register mocked responses and serve them",
    version
)]
struct Args {
    /// Port to listen on (0 or absent = 9191)
    port: Option<u16>,

    /// Minutes of inactivity after which a mock is removed (0 or absent = never)
    #[arg(allow_negative_numbers = true)]
    expiry_minutes: Option<i64>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

impl Args {
    /// Build the effective configuration: file values, then CLI overrides.
    fn load_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!(path = ?path, "Loading configuration");
                ServerConfig::from_file(path)?
            }
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port.filter(|p| *p != 0) {
            config.port = port;
        }
        if let Some(minutes) = self.expiry_minutes {
            config.mock_expiry_minutes = minutes;
        }
        if let Some(bind) = &self.bind {
            config.bind_address = bind.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.load_config()?;

    if args.validate {
        println!("Configuration is valid (listening on {})", config.socket_addr()?);
        return Ok(());
    }

    let registry = Registry::new();
    registry.configure_expiry(config.mock_expiry_minutes);

    let app = create_router(AppState::new(registry.clone(), config.settings.clone()));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Listening on port {}.", addr.port());
    if config.expiry_enabled() {
        info!("Mock expiry set to {} minutes.", config.mock_expiry_minutes);
    } else {
        info!("Mocks never expire.");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.stop_expiry();
    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
