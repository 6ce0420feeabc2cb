//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::Uri;

use parley_core::error::AppError;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let store = if !state.store.is_available() {
        "unavailable"
    } else {
        match state.store.health_check().await {
            Ok(true) => "connected",
            Ok(false) => "unavailable",
            Err(e) => {
                tracing::warn!(error = %e, "Presence store health check failed");
                "error"
            }
        }
    };

    let connections = &state.realtime.connections;
    let online_users = state.realtime.presence().online_count().await;

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if store == "connected" { "ok" } else { "degraded" }.to_string(),
        store: store.to_string(),
        ws_connections: connections.connection_count(),
        connected_users: connections.user_count(),
        online_users,
        rooms: connections.room_count(),
        metrics: state.realtime.metrics.snapshot(),
    }))
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    AppError::not_found(format!("No route for {}", uri.path())).into()
}
