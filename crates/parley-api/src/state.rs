//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use parley_core::config::AppConfig;
use parley_core::traits::KeyValueStore;
use parley_realtime::RealtimeEngine;

/// Shared dependencies, passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Realtime engine.
    pub realtime: Arc<RealtimeEngine>,
    /// Presence store, probed by the detailed health check.
    pub store: Arc<dyn KeyValueStore>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Assemble the state.
    pub fn new(
        config: Arc<AppConfig>,
        realtime: Arc<RealtimeEngine>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config,
            realtime,
            store,
            started_at: Instant::now(),
        }
    }
}
