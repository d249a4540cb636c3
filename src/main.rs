use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrawl::ai::OpenAiGateway;
use scrawl::config::Config;
use scrawl::AppState;

#[derive(Parser, Debug)]
#[command(name = "scrawl")]
#[command(author, version, about = "A public guestbook service with AI-assisted moderation", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "scrawl.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Scrawl v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.admin_password.is_empty() {
        tracing::warn!("No admin password configured; admin login is disabled");
    }
    if config.ai.api_key.is_empty() {
        tracing::warn!("No AI API key configured; submissions will fail at moderation");
    }

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir)?;

    // Initialize database and run migrations
    let db = scrawl::db::init(&config.server.data_dir).await?;

    let gateway = Arc::new(OpenAiGateway::new(config.ai.clone()));
    let state = Arc::new(AppState::new(config.clone(), db.clone(), gateway));

    // Clean out inert session rows in the background
    scrawl::api::auth::spawn_session_sweep(db);

    let app = scrawl::api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Guestbook API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
