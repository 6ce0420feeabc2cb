//! Response DTOs.

use serde::{Deserialize, Serialize};

use parley_realtime::metrics::MetricsSnapshot;

/// Standard success wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status: `ok`, or `degraded` when presence is unavailable.
    pub status: String,
    /// Presence store status.
    pub store: String,
    /// Open WebSocket connections.
    pub ws_connections: usize,
    /// Distinct users with an open connection.
    pub connected_users: usize,
    /// Size of the online set in the presence store.
    pub online_users: usize,
    /// Live rooms.
    pub rooms: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}
