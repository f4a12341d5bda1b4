//! trackpixel: an email open tracking pixel server.
//!
//! This is the application entry point. It initializes tracing, loads
//! configuration from defaults, an optional TOML file, the `PORT` environment
//! variable and the command line, prepares the pixel source, and starts the
//! HTTP server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackpixel::config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER, PORT_ENV_VAR};
use trackpixel::http::start_server;
use trackpixel::pixel::PixelSource;
use trackpixel::{create_router, AppState};

/// trackpixel: serves a tracking pixel and logs who opened the email
#[derive(Parser, Debug)]
#[command(name = "trackpixel", version, about)]
struct Args {
    /// Path to configuration file (defaults to config/default.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level filter (e.g., "trackpixel=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    // Text logging until the configured format is known
    let config = {
        let _bootstrap =
            tracing::subscriber::set_default(build_subscriber(&log_filter, LogFormat::Text));
        let port_env = std::env::var(PORT_ENV_VAR).ok();
        match AppConfig::resolve(args.config.as_deref(), port_env, args.port) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                return ExitCode::FAILURE;
            }
        }
    };

    build_subscriber(&log_filter, config.logging.format).init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

fn build_subscriber(log_filter: &str, format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(log_filter));

    match format {
        LogFormat::Text => Box::new(registry.with(tracing_subscriber::fmt::layer())),
        LogFormat::Json => Box::new(registry.with(tracing_subscriber::fmt::layer().json())),
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.http.socket_addr()?;
    tracing::info!(
        %addr,
        pixel = %config.pixel.path.display(),
        preload = config.pixel.preload,
        "Loaded configuration"
    );

    let pixel = PixelSource::from_config(&config.pixel).await;
    let app = create_router(AppState::new(pixel));

    start_server(app, addr).await?;

    Ok(())
}
