//! Inbound HTTP routes and handlers.
//!
//! Handlers are thin producers: decode the body, push the request onto the
//! entrance channel, acknowledge. Undecodable bodies are logged and dropped
//! before they ever reach the buffer. Routes accept only POST; axum answers
//! other methods on a known path with 405.

use crate::buffer::BufferedRequest;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use shardload_types::{GenerateAccountsRequest, GenerateTransactionsRequest};
use tokio::sync::mpsc;
use tracing::warn;

/// Shared handler state: the entrance channel into the pipeline.
#[derive(Clone)]
pub struct AppState {
    pub entrance: mpsc::Sender<BufferedRequest>,
}

/// Acknowledgement body returned to clients.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub accepted: bool,
}

/// Build the router for the generation endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/generate_account", post(generate_account_handler))
        .route("/generate_transaction", post(generate_transaction_handler))
        .with_state(state)
}

/// Handler for `POST /generate_account`.
async fn generate_account_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<Ack>) {
    let request: GenerateAccountsRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            warn!(%error, "Dropping undecodable account request");
            return (StatusCode::BAD_REQUEST, Json(Ack { accepted: false }));
        }
    };
    enqueue(&state, BufferedRequest::Accounts(request)).await
}

/// Handler for `POST /generate_transaction`.
async fn generate_transaction_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<Ack>) {
    let request: GenerateTransactionsRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            warn!(%error, "Dropping undecodable transaction request");
            return (StatusCode::BAD_REQUEST, Json(Ack { accepted: false }));
        }
    };
    enqueue(&state, BufferedRequest::Transactions(request)).await
}

async fn enqueue(state: &AppState, request: BufferedRequest) -> (StatusCode, Json<Ack>) {
    match state.entrance.send(request).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(Ack { accepted: true })),
        Err(_) => {
            warn!("Entrance channel closed; pipeline is down");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Ack { accepted: false }),
            )
        }
    }
}
