use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when the database cannot be reached.
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    /// Round trip of the `SELECT 1` check, in milliseconds.
    pub latency_ms: u128,
}

/// GET /health
///
/// Answers 503 while the employee store is unreachable, since no employee
/// page can be served without it.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let reachable = match bangazon_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            false
        }
    };
    let latency_ms = started.elapsed().as_millis();

    let (code, status) = if reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: DatabaseHealth {
                reachable,
                latency_ms,
            },
        }),
    )
}

/// Mount the health route at the root.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
