//! Webhook receiver
//!
//! - POST {webhook_path}: decode an update and queue it for the dispatcher
//! - GET /health: liveness probe
//! - GET /: running banner

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use predictor::ShutdownManager;
use serde::Serialize;
use telegram::Update;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub updates: mpsc::Sender<Update>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct IndexResponse {
    message: &'static str,
    status: &'static str,
}

/// POST webhook: 200 once queued, 400 for undecodable bodies, 503 when the
/// queue is full so Telegram retries later
async fn webhook_handler(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Rejecting undecodable webhook body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let update_id = update.update_id;
    match state.updates.try_send(update) {
        Ok(()) => {
            debug!("Queued update {}", update_id);
            StatusCode::OK
        }
        Err(TrySendError::Full(_)) => {
            warn!("Update queue full, asking Telegram to retry update {}", update_id);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(TrySendError::Closed(_)) => {
            warn!("Dispatcher stopped, dropping update {}", update_id);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "telegram-bot",
    })
}

async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Telegram Bot is running",
        status: "active",
    })
}

pub fn router(webhook_path: &str, state: AppState) -> Router {
    Router::new()
        .route(webhook_path, post(webhook_handler))
        .route("/health", get(health_handler))
        .route("/", get(index_handler))
        .with_state(state)
}

/// Serve until shutdown is requested
pub async fn serve(listener: TcpListener, app: Router, shutdown: ShutdownManager) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Webhook server listening on {}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}
