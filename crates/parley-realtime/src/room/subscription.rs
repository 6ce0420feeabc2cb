//! Membership tracking — which rooms each connection has joined.

use std::collections::HashSet;

use dashmap::DashMap;

use parley_core::types::id::ConnectionId;

/// Connection-to-room reverse index.
#[derive(Debug, Default)]
pub struct MembershipTracker {
    /// Connection ID → set of room names.
    conn_to_rooms: DashMap<ConnectionId, HashSet<String>>,
}

impl MembershipTracker {
    /// Creates a new tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a membership.
    pub fn add(&self, conn_id: ConnectionId, room: String) {
        self.conn_to_rooms.entry(conn_id).or_default().insert(room);
    }

    /// Whether the connection is in `room`.
    pub fn contains(&self, conn_id: ConnectionId, room: &str) -> bool {
        self.conn_to_rooms
            .get(&conn_id)
            .is_some_and(|rooms| rooms.contains(room))
    }

    /// Returns the number of rooms a connection is in.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes every membership of a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.conn_to_rooms
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}
