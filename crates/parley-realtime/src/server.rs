//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use parley_auth::jwt::JwtDecoder;
use parley_core::config::RealtimeConfig;
use parley_core::traits::{KeyValueStore, UserDirectory};
use parley_core::types::id::{ConnectionId, UserId};
use parley_entity::message::MessageDeletedNotice;
use parley_entity::user::UserProfile;

use crate::connection::authenticator::{Handshake, HandshakeAuthenticator, HandshakeError};
use crate::connection::handle::ConnectionHandle;
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundEvent;
use crate::metrics::RealtimeMetrics;
use crate::presence::registry::PresenceRegistry;
use crate::room::authorizer::{RoomAuthorizer, TrustedRoomAuthorizer};

/// Central real-time engine. Constructed once at startup and shared by
/// every connection task and by the REST layer.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Handshake authenticator.
    pub authenticator: Arc<HandshakeAuthenticator>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Keepalive timing.
    heartbeat: HeartbeatConfig,
    /// Time a socket gets to send its handshake frame.
    handshake_timeout: Duration,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections)
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates an engine that trusts every room join.
    pub fn new(
        config: RealtimeConfig,
        store: Arc<dyn KeyValueStore>,
        decoder: Arc<JwtDecoder>,
        directory: Arc<dyn UserDirectory<UserProfile>>,
    ) -> Self {
        Self::with_authorizer(config, store, decoder, directory, Arc::new(TrustedRoomAuthorizer))
    }

    /// Creates an engine with a custom room-join hook.
    pub fn with_authorizer(
        config: RealtimeConfig,
        store: Arc<dyn KeyValueStore>,
        decoder: Arc<JwtDecoder>,
        directory: Arc<dyn UserDirectory<UserProfile>>,
        authorizer: Arc<dyn RoomAuthorizer>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let presence = PresenceRegistry::new(store, config.presence_mode);
        let authenticator = Arc::new(HandshakeAuthenticator::new(decoder, directory.clone()));
        let heartbeat = HeartbeatConfig::from(&config);
        let handshake_timeout = Duration::from_secs(config.handshake_timeout_seconds.max(1));
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            presence,
            directory,
            authorizer,
            metrics.clone(),
        ));

        info!(presence_mode = ?config.presence_mode, "Real-time engine initialized");

        Self {
            connections,
            authenticator,
            metrics,
            heartbeat,
            handshake_timeout,
            shutdown_tx,
        }
    }

    /// Authenticates a raw handshake frame.
    pub async fn authenticate(&self, raw: &str) -> Result<UserProfile, HandshakeError> {
        self.authenticate_handshake(&Handshake::parse(raw)).await
    }

    /// Authenticates a parsed handshake. Refusals are counted and logged
    /// with their distinct reason.
    pub async fn authenticate_handshake(
        &self,
        handshake: &Handshake,
    ) -> Result<UserProfile, HandshakeError> {
        let result = self.authenticator.authenticate(handshake).await;
        if let Err(e) = &result {
            self.reject(e);
        }
        result
    }

    /// Records a refused handshake.
    pub fn reject(&self, err: &HandshakeError) {
        self.metrics.handshake_rejected();
        warn!(reason = err.label(), error = ?err, "Handshake refused");
    }

    /// Frame sent right before a refused socket is closed.
    pub fn connect_error_frame(err: &HandshakeError) -> String {
        OutboundEvent::ConnectError {
            message: err.to_string(),
        }
        .to_frame()
        .unwrap_or_default()
    }

    /// Registers an authenticated connection.
    pub async fn connect(
        &self,
        profile: UserProfile,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        self.connections.connect(profile).await
    }

    /// Processes a frame from an authenticated connection.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        self.connections.handle_inbound(conn_id, raw).await;
    }

    /// Tears down a connection. Safe to call more than once.
    pub async fn disconnect(&self, conn_id: &ConnectionId) {
        self.connections.disconnect(conn_id).await;
    }

    /// Entry point for the REST layer after a message is deleted for
    /// everyone. Returns the number of connections reached.
    pub fn broadcast_message_deleted(
        &self,
        notice: MessageDeletedNotice,
        members: &[UserId],
    ) -> usize {
        self.connections.broadcast_message_deleted(notice, members)
    }

    /// Presence registry shared with the REST layer.
    pub fn presence(&self) -> &PresenceRegistry {
        self.connections.presence()
    }

    /// Keepalive timing for connection tasks.
    pub fn heartbeat(&self) -> HeartbeatConfig {
        self.heartbeat
    }

    /// Handshake deadline for new sockets.
    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every connection task to stop and runs the disconnect path
    /// for whatever is still registered.
    pub async fn shutdown(&self) {
        info!("Shutting down real-time engine");

        let _ = self.shutdown_tx.send(());
        self.connections.close_all().await;

        info!("Real-time engine shut down");
    }
}
