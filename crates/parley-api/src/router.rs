//! Route definitions for the Parley HTTP surface.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed));

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .fallback(handlers::health::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use parley_auth::jwt::JwtDecoder;
    use parley_cache::MemoryStore;
    use parley_core::config::AppConfig;
    use parley_core::traits::KeyValueStore;
    use parley_database::MemoryUserDirectory;
    use parley_realtime::RealtimeEngine;

    use super::*;

    fn app(store: MemoryStore) -> Router {
        let config = Arc::new(AppConfig::default());
        let store: Arc<dyn KeyValueStore> = Arc::new(store);
        let engine = RealtimeEngine::new(
            config.realtime.clone(),
            store.clone(),
            Arc::new(JwtDecoder::new(&config.auth)),
            Arc::new(MemoryUserDirectory::new()),
        );
        build_router(AppState::new(config, Arc::new(engine), store))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(app(MemoryStore::new()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_detailed_health() {
        let (status, body) = get_json(app(MemoryStore::new()), "/api/health/detailed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["store"], "connected");
        assert_eq!(body["data"]["ws_connections"], 0);
        assert_eq!(body["data"]["metrics"]["connections_total"], 0);
    }

    #[tokio::test]
    async fn test_detailed_health_degraded() {
        let store = MemoryStore::new();
        store.set_available(false);
        let (_, body) = get_json(app(store), "/api/health/detailed").await;
        assert_eq!(body["data"]["status"], "degraded");
        assert_eq!(body["data"]["store"], "unavailable");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get_json(app(MemoryStore::new()), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }
}
