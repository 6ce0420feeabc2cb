//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use parley_core::types::id::{ConnectionId, UserId};
use parley_entity::user::UserProfile;

/// A handle to a single authenticated connection.
///
/// Holds the sender half of the outbound queue plus the profile the
/// connection authenticated as. The profile never changes after the
/// handshake.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Authenticated user.
    pub profile: UserProfile,
    /// Sender for serialized outbound frames.
    sender: mpsc::Sender<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last inbound activity (frame or pong), in epoch milliseconds.
    last_seen_ms: AtomicI64,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(profile: UserProfile, sender: mpsc::Sender<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectionId::new(),
            profile,
            sender,
            connected_at: now,
            last_seen_ms: AtomicI64::new(now.timestamp_millis()),
            alive: AtomicBool::new(true),
        }
    }

    /// The user this connection belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.profile.id
    }

    /// Queue a frame for this connection without waiting.
    ///
    /// Returns `false` when the frame was dropped because the buffer is
    /// full or the connection is gone.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(conn_id = %self.id, "Outbound queue closed");
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record inbound activity.
    pub fn touch(&self) {
        self.last_seen_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Time since the last inbound activity.
    pub fn idle_for(&self) -> Duration {
        let last = self.last_seen_ms.load(Ordering::Relaxed);
        let elapsed = Utc::now().timestamp_millis().saturating_sub(last);
        Duration::from_millis(elapsed.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(buffer: usize) -> (ConnectionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        (ConnectionHandle::new(UserProfile::new("u1", "Uma"), tx), rx)
    }

    #[tokio::test]
    async fn test_send_delivers_frame() {
        let (handle, mut rx) = handle(4);
        assert!(handle.send("hello".to_string()));
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[test]
    fn test_full_buffer_drops() {
        let (handle, _rx) = handle(1);
        assert!(handle.send("one".to_string()));
        assert!(!handle.send("two".to_string()));
        assert!(handle.is_alive());
    }

    #[test]
    fn test_closed_queue_marks_dead() {
        let (handle, rx) = handle(1);
        drop(rx);
        assert!(!handle.send("lost".to_string()));
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_touch_resets_idle() {
        let (handle, _rx) = handle(1);
        handle.touch();
        assert!(handle.idle_for() < Duration::from_secs(1));
    }
}
