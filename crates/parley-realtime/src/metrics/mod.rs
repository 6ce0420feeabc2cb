//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections ever accepted.
    connections_total: AtomicU64,
    /// Connections currently open.
    connections_active: AtomicU64,
    /// Handshakes refused.
    handshakes_rejected: AtomicU64,
    /// Frames received from clients.
    events_received: AtomicU64,
    /// Events queued to a connection.
    events_delivered: AtomicU64,
    /// Events dropped (full buffer or closed connection).
    events_dropped: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a disconnection.
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Record a refused handshake.
    pub fn handshake_rejected(&self) {
        self.handshakes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an inbound frame.
    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record delivery results of one fan-out.
    pub fn record_fanout(&self, delivered: u64, dropped: u64) {
        self.events_delivered.fetch_add(delivered, Ordering::Relaxed);
        self.events_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            handshakes_rejected: self.handshakes_rejected.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever accepted.
    pub connections_total: u64,
    /// Connections currently open.
    pub connections_active: u64,
    /// Handshakes refused.
    pub handshakes_rejected: u64,
    /// Frames received from clients.
    pub events_received: u64,
    /// Events queued to a connection.
    pub events_delivered: u64,
    /// Events dropped.
    pub events_dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = RealtimeMetrics::new();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.record_fanout(3, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connections_total, 2);
        assert_eq!(snapshot.connections_active, 1);
        assert_eq!(snapshot.events_delivered, 3);
        assert_eq!(snapshot.events_dropped, 1);
    }

    #[test]
    fn test_active_never_underflows() {
        let metrics = RealtimeMetrics::new();
        metrics.connection_closed();
        assert_eq!(metrics.snapshot().connections_active, 0);
    }
}
