// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health endpoint built on axum.
//!
//! Serves an unauthenticated `GET /health` for process supervision.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use roundup_core::RoundupError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

/// State for the health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    start_time: std::time::Instant,
}

async fn get_health(State(state): State<HealthState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Start the health HTTP server; runs until the token is cancelled.
pub async fn serve_health(
    host: &str,
    port: u16,
    cancel: CancellationToken,
) -> Result<(), RoundupError> {
    let state = HealthState {
        start_time: std::time::Instant::now(),
    };

    let app = Router::new()
        .route("/health", get(get_health))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RoundupError::Internal(format!("failed to bind health endpoint to {addr}: {e}")))?;

    tracing::info!("health endpoint listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await
        .map_err(|e| RoundupError::Internal(format!("health endpoint error: {e}")))?;

    Ok(())
}
