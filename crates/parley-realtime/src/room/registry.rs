//! Room registry — live membership of every conversation group.

use std::collections::HashSet;

use dashmap::DashMap;

use parley_core::types::id::ConnectionId;

use super::subscription::MembershipTracker;

/// Registry of all non-empty rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connections.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Reverse index.
    memberships: MembershipTracker,
}

impl RoomRegistry {
    /// Creates a new room registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room. Returns `false` if it was already in it.
    pub fn join(&self, room: &str, conn_id: ConnectionId) -> bool {
        let inserted = self
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
        if inserted {
            self.memberships.add(conn_id, room.to_string());
        }
        inserted
    }

    /// Removes a connection from every room it joined.
    pub fn leave_all(&self, conn_id: ConnectionId) {
        for room in self.memberships.remove_all(conn_id) {
            self.rooms.remove_if_mut(&room, |_, members| {
                members.remove(&conn_id);
                members.is_empty()
            });
        }
    }

    /// Current members of a room.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether the connection is in `room`.
    pub fn is_member(&self, room: &str, conn_id: ConnectionId) -> bool {
        self.memberships.contains(conn_id, room)
    }

    /// Number of rooms a connection is in.
    pub fn room_count_for(&self, conn_id: ConnectionId) -> usize {
        self.memberships.count(conn_id)
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
