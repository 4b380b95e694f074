use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use docqa_server::config::Settings;
use docqa_server::services::{HttpExtractor, QaService};
use docqa_server::utils::logger::init_logger;
use docqa_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logger(&settings.logging)?;

    info!("🚀 Starting document QA server...");
    info!(
        "✅ Configuration loaded (window={} chars, threshold={}, history_cap={})",
        settings.windowing.max_length,
        settings.answering.relevance_threshold,
        settings.session.history_cap
    );

    let extractor = Arc::new(HttpExtractor::new(&settings.extractor)?);
    info!("✅ Extraction server at {}", extractor.url());

    let qa_service = Arc::new(QaService::from_settings(&settings, extractor));

    if qa_service
        .store()
        .spawn_sweeper(Duration::from_secs(settings.session.sweep_interval_seconds))
        .is_some()
    {
        info!("✅ Session sweeper started");
    }

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    let app = build_router(AppState::new(qa_service, settings));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
