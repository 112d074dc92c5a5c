mod config;
mod document;
mod errors;
mod export;
mod models;
mod notify;
mod render;
mod resume;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::{DiskExportHost, DocumentPipeline, PreviewRegistry, SessionStore};
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};
use crate::routes::build_router;
use crate::state::AppState;

/// How often idle export sessions are swept.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting résumé export API v{}", env!("CARGO_PKG_VERSION"));

    std::fs::create_dir_all(&config.export_dir)?;
    info!("Exports will be saved to {}", config.export_dir.display());

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => {
            info!("Registration notifications go to {url}");
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => {
            info!("NOTIFY_WEBHOOK_URL not set; registration notifications are only logged");
            Arc::new(LogNotifier)
        }
    };

    let idle = chrono::Duration::seconds(i64::try_from(config.session_idle_secs)?);
    let sessions = SessionStore::new(idle);
    spawn_eviction(sessions.clone());

    // Build app state
    let state = AppState {
        sessions,
        generator: Arc::new(DocumentPipeline),
        host: Arc::new(DiskExportHost::new(config.export_dir.clone())),
        previews: PreviewRegistry::new(config.preview_max_bytes),
        notifier,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically closes export views nobody has touched for a while.
fn spawn_eviction(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.evict_idle(chrono::Utc::now());
        }
    });
}
