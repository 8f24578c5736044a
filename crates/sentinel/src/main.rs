//! Sentinel server binary.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sentinel::config::{AppConfig, Overrides};
use sentinel::routes;
use sentinel::state::AppState;

/// Sentinel - verification codes and CAPTCHA answers
#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/sentinel.toml")]
    config: String,

    /// Load .env.<ENV> instead of .env (e.g. --env testing)
    #[arg(long)]
    env: Option<String>,

    /// Redis URL (overrides config)
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Sentinel v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration; any invalid setting stops startup here
    let overrides = Overrides {
        env_file: args.env.clone(),
        redis_url: args.redis_url.clone(),
        listen_addr: args.listen.clone(),
    };
    let config = AppConfig::load(&args.config, &overrides)?;
    info!(
        app = %config.app.name,
        env = %config.app.env,
        backend = ?config.store.backend,
        "Configuration loaded from {}",
        args.config
    );
    if !config.app.env.is_production() {
        tracing::warn!(
            env = %config.app.env,
            "Debug codes and verification bypasses are enabled"
        );
    }

    let listen_addr = config.listen_addr.clone();
    let state = AppState::new(config);

    // Connect eagerly so a dead cache fails startup rather than the first request
    state
        .services()
        .await
        .context("Failed to initialize services")?;

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;
    info!("Sentinel listening on {}", listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("Sentinel shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
