//! # HTTP API
//!
//! | Route | Success | Failure |
//! |-------|---------|---------|
//! | `POST /transactions` | 202 `SubmitResponse` | 400 `ErrorResponse` |
//! | `GET /transactions/:id` | 200 `StatusResponse` | 404 |
//! | `GET /store/:name` | 200 `StoreResponse` | 404 |
//! | `GET /health` | 200 | - |

use crate::errors::NodeError;
use crate::node::LedgerNode;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared_types::{
    ErrorResponse, SignedEnvelope, StatusResponse, StoreResponse, SubmissionId, SubmitResponse,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub fn build_router(node: Arc<LedgerNode>) -> Router {
    Router::new()
        .route("/transactions", post(submit_transaction))
        .route("/transactions/:id", get(transaction_status))
        .route("/store/:name", get(store_contents))
        .route("/health", get(health_check))
        .with_state(node)
}

/// Serve the API on `listener` until the node shuts down.
pub async fn serve(node: Arc<LedgerNode>, listener: TcpListener) -> Result<(), NodeError> {
    let mut shutdown = node.shutdown_signal();
    let addr = listener.local_addr()?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, build_router(node))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
            info!("[http] Shutdown signal received");
        })
        .await?;
    Ok(())
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ErrorResponse::new(self.kind(), self.to_string()))).into_response()
    }
}

fn not_found(message: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("not_found", message)),
    )
        .into_response()
}

async fn submit_transaction(
    State(node): State<Arc<LedgerNode>>,
    Json(envelope): Json<SignedEnvelope>,
) -> Result<impl IntoResponse, NodeError> {
    let id = node.submit(envelope).await?;
    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { id })))
}

async fn transaction_status(
    State(node): State<Arc<LedgerNode>>,
    Path(id): Path<String>,
) -> Response {
    let id = SubmissionId::new(id);
    match node.status(&id) {
        Some(status) => Json(StatusResponse { id, status }).into_response(),
        None => not_found(format!("unknown submission {id}")),
    }
}

async fn store_contents(
    State(node): State<Arc<LedgerNode>>,
    Path(name): Path<String>,
) -> Result<Response, NodeError> {
    Ok(match node.store_entries(&name)? {
        Some((block, entries)) => Json(StoreResponse {
            name,
            block,
            entries,
        })
        .into_response(),
        None => not_found(format!("unknown store {name}")),
    })
}

async fn health_check(State(node): State<Arc<LedgerNode>>) -> impl IntoResponse {
    let families: Vec<&str> = node.registry().families().iter().map(|t| t.name).collect();
    Json(serde_json::json!({
        "status": "healthy",
        "block": node.block_height(),
        "pending": node.pending_count(),
        "families": families,
    }))
}
