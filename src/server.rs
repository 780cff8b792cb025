//! HTTP endpoints: Prometheus scrape target, metadata listing and health.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use tracing::{debug, error, info};

use crate::collector::slabinfo::SlabCollector;
use crate::collector::traits::FileSystem;
use crate::exposition;

/// Collector shared by all request handlers.
pub type SharedCollector<F> = Arc<SlabCollector<F>>;

/// Builds the exporter router.
pub fn router<F: FileSystem + 'static>(collector: SharedCollector<F>) -> Router {
    Router::new()
        .route("/metrics", get(handle_metrics::<F>))
        .route("/describe", get(handle_describe::<F>))
        .route("/health", get(handle_health))
        .with_state(collector)
}

/// Serves the exporter on `addr` until Ctrl-C or SIGTERM.
pub async fn serve<F: FileSystem + 'static>(
    collector: SharedCollector<F>,
    addr: SocketAddr,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router(collector))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}

// ============================================================
// Handlers
// ============================================================

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

/// Runs one collection pass on the blocking pool and renders it.
pub(crate) async fn handle_metrics<F: FileSystem + 'static>(
    State(collector): State<SharedCollector<F>>,
) -> Response {
    let rendered = tokio::task::spawn_blocking(move || {
        let snapshot = collector.collect();
        debug!(
            pools = snapshot.pools,
            errors = snapshot.errors.len(),
            "scrape"
        );
        exposition::render(&snapshot.measurements).map_err(|e| e.to_string())
    })
    .await;

    match rendered {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, exposition::CONTENT_TYPE)], body).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
        Err(e) => {
            error!(error = %e, "collection task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Returns the metadata listing as JSON.
pub(crate) async fn handle_describe<F: FileSystem + 'static>(
    State(collector): State<SharedCollector<F>>,
) -> Response {
    match tokio::task::spawn_blocking(move || collector.describe()).await {
        Ok(catalog) => Json(catalog).into_response(),
        Err(e) => {
            error!(error = %e, "describe task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
