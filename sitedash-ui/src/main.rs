//! sitedash-ui - Construction Project Dashboard service
//!
//! Holds all project data in memory, ingests uploaded workbooks with
//! project-identifier reconciliation, and serves KPI/report views to the
//! browser dashboard. Nothing persists across restarts.

use anyhow::Result;
use clap::Parser;
use sitedash_common::events::EventBus;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sitedash_ui::AppState;

#[derive(Debug, Parser)]
#[command(name = "sitedash-ui", version, about = "Construction project dashboard service")]
struct Args {
    /// Path to TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = sitedash_common::config::resolve(
        args.config.as_deref(),
        args.host.as_deref(),
        args.port,
    )?;

    // Initialize tracing; RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting sitedash-ui (Construction Project Dashboard)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    // Seeded in-memory state; nothing is ever loaded from disk.
    let state = AppState::new(event_bus);
    info!(
        projects = state.dashboard.read().await.projects.len(),
        "Dashboard state seeded"
    );

    let app = sitedash_ui::build_router(state, config.static_assets.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
