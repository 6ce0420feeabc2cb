//! Ping/pong heartbeat for WebSocket keepalive.

use std::time::Duration;

use parley_core::config::RealtimeConfig;

use super::handle::ConnectionHandle;

/// Heartbeat timing.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings.
    pub ping_interval: Duration,
    /// Extra time a peer gets to answer before it is considered dead.
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

impl HeartbeatConfig {
    /// Longest silence tolerated from a peer.
    pub fn idle_limit(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }

    /// Whether the connection has been silent for too long.
    pub fn is_expired(&self, handle: &ConnectionHandle) -> bool {
        handle.idle_for() > self.idle_limit()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use parley_entity::user::UserProfile;

    use super::*;

    #[test]
    fn test_defaults() {
        let heartbeat = HeartbeatConfig::from(&RealtimeConfig::default());
        assert_eq!(heartbeat.ping_interval, Duration::from_secs(25));
        assert_eq!(heartbeat.idle_limit(), Duration::from_secs(45));
    }

    #[test]
    fn test_fresh_connection_not_expired() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(UserProfile::new("u1", "Uma"), tx);
        let heartbeat = HeartbeatConfig {
            ping_interval: Duration::from_secs(1),
            ping_timeout: Duration::from_secs(1),
        };
        assert!(!heartbeat.is_expired(&handle));

        let zero = HeartbeatConfig {
            ping_interval: Duration::ZERO,
            ping_timeout: Duration::ZERO,
        };
        std::thread::sleep(Duration::from_millis(5));
        assert!(zero.is_expired(&handle));
    }
}
