use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database is reachable and fully migrated, else `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Embedded migrations not yet applied; absent when the database is down.
    pub pending_migrations: Option<usize>,
}

/// GET /health -- reports database reachability and schema readiness.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = huduma_db::health_check(&state.pool).await.is_ok();
    let pending_migrations = if db_healthy {
        match huduma_db::pending_migrations(&state.pool).await {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read migration state");
                None
            }
        }
    } else {
        None
    };

    let status = if pending_migrations == Some(0) { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        pending_migrations,
    })
}

/// Mount health check routes (root level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
