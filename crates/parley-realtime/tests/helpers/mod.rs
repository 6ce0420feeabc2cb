//! Shared helpers for realtime engine tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use parley_auth::jwt::{JwtDecoder, JwtEncoder};
use parley_cache::MemoryStore;
use parley_core::config::{AuthConfig, PresenceMode, RealtimeConfig};
use parley_core::types::id::UserId;
use parley_database::MemoryUserDirectory;
use parley_entity::user::UserProfile;
use parley_realtime::RealtimeEngine;
use parley_realtime::RoomAuthorizer;
use parley_realtime::connection::handle::ConnectionHandle;

/// Engine wired to in-memory collaborators.
pub struct TestEngine {
    /// Engine under test.
    pub engine: RealtimeEngine,
    /// Presence store, for outage simulation.
    pub store: MemoryStore,
    /// User accounts.
    pub directory: MemoryUserDirectory,
    /// Token issuer.
    pub encoder: JwtEncoder,
}

impl TestEngine {
    /// Engine with the default single-connection presence.
    pub fn new() -> Self {
        Self::build(RealtimeConfig::default(), None)
    }

    /// Engine with the given presence mode.
    pub fn with_mode(mode: PresenceMode) -> Self {
        Self::build(
            RealtimeConfig {
                presence_mode: mode,
                ..RealtimeConfig::default()
            },
            None,
        )
    }

    /// Engine with custom realtime settings and an optional join hook.
    pub fn build(config: RealtimeConfig, authorizer: Option<Arc<dyn RoomAuthorizer>>) -> Self {
        let auth = AuthConfig::default();
        let store = MemoryStore::new();
        let directory = MemoryUserDirectory::with_profiles([
            UserProfile::new("alice", "Alice"),
            UserProfile::new("bob", "Bob"),
            UserProfile::new("carol", "Carol"),
        ]);
        let decoder = Arc::new(JwtDecoder::new(&auth));

        let engine = match authorizer {
            Some(authorizer) => RealtimeEngine::with_authorizer(
                config,
                Arc::new(store.clone()),
                decoder,
                Arc::new(directory.clone()),
                authorizer,
            ),
            None => RealtimeEngine::new(
                config,
                Arc::new(store.clone()),
                decoder,
                Arc::new(directory.clone()),
            ),
        };

        Self {
            engine,
            store,
            directory,
            encoder: JwtEncoder::new(&auth),
        }
    }

    /// Valid handshake frame for `user`.
    pub fn handshake(&self, user: &str) -> String {
        let token = self.encoder.issue(&UserId::new(user)).unwrap();
        serde_json::json!({ "token": token }).to_string()
    }

    /// Full handshake + setup for `user`.
    pub async fn connect(&self, user: &str) -> TestClient {
        let profile = self.engine.authenticate(&self.handshake(user)).await.unwrap();
        let (handle, rx) = self.engine.connect(profile).await;
        TestClient { handle, rx }
    }

    /// Sends a frame as `client`.
    pub async fn emit(&self, client: &TestClient, event: &str, data: Value) {
        let frame = serde_json::json!({ "event": event, "data": data }).to_string();
        self.engine.handle_inbound(&client.handle.id, &frame).await;
    }
}

/// One connected client as seen by the engine.
pub struct TestClient {
    /// Server-side handle.
    pub handle: Arc<ConnectionHandle>,
    /// Frames queued for the client.
    pub rx: mpsc::Receiver<String>,
}

impl TestClient {
    /// Takes every queued frame.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    /// Takes every queued frame and keeps those named `event`.
    pub fn take(&mut self, event: &str) -> Vec<Value> {
        self.drain()
            .into_iter()
            .filter(|frame| frame["event"] == event)
            .map(|mut frame| frame["data"].take())
            .collect()
    }
}
