//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// How presence is tracked for users with several live connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceMode {
    /// Only the latest connection id is kept; any disconnect marks the user offline.
    #[default]
    Single,
    /// Every live connection id is tracked; the user goes offline with the last one.
    Multi,
}

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Presence tracking mode.
    #[serde(default)]
    pub presence_mode: PresenceMode,
    /// Per-connection outbound buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Extra time a silent connection is given before it is closed, in seconds.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Time allowed for the handshake payload to arrive, in seconds.
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_seconds: u64,
    /// Maximum conversation groups a single connection may join. The
    /// connection's own identity group is not counted.
    #[serde(default = "default_max_rooms")]
    pub max_rooms_per_connection: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            presence_mode: PresenceMode::default(),
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            handshake_timeout_seconds: default_handshake_timeout(),
            max_rooms_per_connection: default_max_rooms(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    25
}

fn default_ping_timeout() -> u64 {
    20
}

fn default_handshake_timeout() -> u64 {
    10
}

fn default_max_rooms() -> usize {
    200
}
