//! HTTP boundary - accepts a request, calls the core, returns JSON.
//!
//! Authorization failure is a normal protocol response: both accept and
//! reject come back as 200 with the decision body. 4xx/5xx are reserved
//! for requests the boundary itself cannot process.

use crate::error::Error;
use crate::service::VerificationService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Request body of `POST /auth/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    /// Client network address, used for diagnostics and the cache key only.
    pub addr: String,
    /// Wire-encoded credential: `b64(message) ":" b64(signature)`.
    pub auth: String,
    /// Throughput the server observed/intends to enforce, bytes/sec.
    pub tx: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Build the router over a ready verification service.
pub fn router(service: Arc<VerificationService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/auth/verify", post(verify))
        .with_state(service)
}

/// Bind and serve until ctrl-c, draining in-flight requests before
/// returning so a decision is never concurrent with the ledger flush.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(service: Arc<VerificationService>, port: u16) -> crate::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP boundary drained");
    Ok(())
}

async fn shutdown_signal() {
    // Errors installing the handler leave no way to shut down cleanly;
    // treat them the same as a received signal.
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "gateguard",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn verify(
    State(service): State<Arc<VerificationService>>,
    Json(request): Json<VerifyRequest>,
) -> Response {
    match service.verify(&request.addr, &request.auth, request.tx) {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(Error::MalformedCredential(reason)) => {
            info!("[{}] malformed credential: {reason}", request.addr);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "malformed credential",
                }),
            )
                .into_response()
        }
        Err(e) => {
            // Trusted-signer payload mismatch or other internal failure.
            // Reported here (stand-in for the error-tracking collaborator)
            // and converted to a generic response; never crashes the
            // process for one bad request.
            error!("[{}] verification error: {e}", request.addr);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "internal error",
                }),
            )
                .into_response()
        }
    }
}
