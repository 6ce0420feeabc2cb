//! CORS layer configuration.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

use parley_core::config::CorsConfig;

/// Builds a CORS tower layer from configuration.
///
/// A `*` origin disables credentials, since browsers reject that pair.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    layer
        .allow_origin(origins)
        .allow_credentials(config.allow_credentials)
}
