//! Connection manager — connection lifecycle and event routing.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use parley_core::config::RealtimeConfig;
use parley_core::traits::UserDirectory;
use parley_core::types::id::{ConnectionId, UserId};
use parley_entity::message::MessageDeletedNotice;
use parley_entity::user::UserProfile;

use crate::message::envelope::MessageEnvelope;
use crate::message::types::{
    DeleteMessageRequest, FORBIDDEN, INVALID_MESSAGE, InboundEvent, MAX_ROOMS, OutboundEvent,
};
use crate::message::validator::{validate_inbound, validate_room_name};
use crate::metrics::RealtimeMetrics;
use crate::presence::registry::PresenceRegistry;
use crate::room::authorizer::RoomAuthorizer;
use crate::room::registry::RoomRegistry;

use super::handle::ConnectionHandle;
use super::pool::ConnectionPool;

/// Manages all authenticated connections and routes their events.
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Conversation and identity groups.
    rooms: RoomRegistry,
    /// Presence registry.
    presence: PresenceRegistry,
    /// Profile hydration for the online snapshot.
    directory: Arc<dyn UserDirectory<UserProfile>>,
    /// Room-join hook.
    authorizer: Arc<dyn RoomAuthorizer>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.pool.connection_count())
            .field("rooms", &self.rooms.room_count())
            .field("presence", &self.presence)
            .finish()
    }
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        presence: PresenceRegistry,
        directory: Arc<dyn UserDirectory<UserProfile>>,
        authorizer: Arc<dyn RoomAuthorizer>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool: ConnectionPool::new(),
            rooms: RoomRegistry::new(),
            presence,
            directory,
            authorizer,
            metrics,
            config,
        }
    }

    /// Registers an authenticated connection and runs the post-handshake
    /// setup: presence, identity group, `user_online` to everyone, then the
    /// `setup_online_users` snapshot to the new connection.
    ///
    /// Returns the handle and the receiver of its outbound frames.
    pub async fn connect(
        &self,
        profile: UserProfile,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(profile, tx));
        let user_id = handle.user_id().clone();

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        self.presence
            .mark_online(&user_id, &handle.id.to_string())
            .await;
        self.rooms.join(user_id.as_str(), handle.id);

        self.broadcast_all(&OutboundEvent::UserOnline(handle.profile.clone()));

        let online = self.online_profiles().await;
        self.send_to(&handle, &OutboundEvent::SetupOnlineUsers(online));

        info!(conn_id = %handle.id, user_id = %user_id, "Connection registered");
        (handle, rx)
    }

    /// Tears a connection down: presence cleanup, group memberships, then
    /// `user_offline` to everyone left. Only the first call per connection
    /// has any effect.
    pub async fn disconnect(&self, conn_id: &ConnectionId) {
        let Some(handle) = self.pool.remove(conn_id) else {
            return;
        };
        handle.mark_dead();
        self.rooms.leave_all(*conn_id);
        self.metrics.connection_closed();

        let user_id = handle.user_id();
        let went_offline = self
            .presence
            .release_connection(user_id, &conn_id.to_string())
            .await;

        if went_offline {
            self.broadcast_all(&OutboundEvent::UserOffline(handle.profile.clone()));
        }

        info!(
            conn_id = %conn_id,
            user_id = %user_id,
            went_offline,
            "Connection unregistered"
        );
    }

    /// Hydrated profiles of every online user. Failures yield an empty list.
    pub async fn online_profiles(&self) -> Vec<UserProfile> {
        let ids = self.presence.list_online().await;
        if ids.is_empty() {
            return Vec::new();
        }
        match self.directory.find_many(&ids).await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(error = %e, "Failed to hydrate online users");
                Vec::new()
            }
        }
    }

    /// Processes a frame received on an authenticated connection.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Frame from unknown connection");
            return;
        };

        handle.touch();
        self.metrics.event_received();

        if let Err(e) = validate_inbound(raw) {
            self.send_to(&handle, &OutboundEvent::error(INVALID_MESSAGE, e.message));
            return;
        }

        let event: InboundEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "Unreadable frame");
                self.send_to(
                    &handle,
                    &OutboundEvent::error(INVALID_MESSAGE, format!("Failed to parse message: {e}")),
                );
                return;
            }
        };

        match event {
            InboundEvent::JoinRoom(room) => self.join_room(&handle, &room).await,
            InboundEvent::SendMessage(payload) => {
                self.send_message(&handle, MessageEnvelope::new(payload));
            }
            InboundEvent::DeleteMessage(request) => {
                self.delete_message(&handle, request);
            }
        }
    }

    /// Adds a connection to a conversation group.
    pub async fn join_room(&self, handle: &ConnectionHandle, room: &str) {
        let room = room.trim();
        if room.is_empty() {
            debug!(conn_id = %handle.id, "Ignoring join_room without a room");
            return;
        }
        if let Err(e) = validate_room_name(room) {
            self.send_to(handle, &OutboundEvent::error(INVALID_MESSAGE, e.message));
            return;
        }
        if self.rooms.is_member(room, handle.id) {
            return;
        }

        let identity_rooms =
            usize::from(self.rooms.is_member(handle.user_id().as_str(), handle.id));
        let joined = self.rooms.room_count_for(handle.id).saturating_sub(identity_rooms);
        if joined >= self.config.max_rooms_per_connection {
            self.send_to(
                handle,
                &OutboundEvent::error(
                    MAX_ROOMS,
                    format!(
                        "Maximum rooms ({}) reached",
                        self.config.max_rooms_per_connection
                    ),
                ),
            );
            return;
        }

        if !self.authorizer.can_join(&handle.profile, room).await {
            warn!(conn_id = %handle.id, user_id = %handle.user_id(), room, "Room join denied");
            self.send_to(
                handle,
                &OutboundEvent::error(FORBIDDEN, format!("Not allowed to join room: {room}")),
            );
            return;
        }

        self.rooms.join(room, handle.id);
        debug!(conn_id = %handle.id, room, "Joined room");
    }

    /// Relays a chat message to the conversation group and the identity
    /// groups of its listed members, skipping every connection of the
    /// sender. Returns the number of connections reached.
    pub fn send_message(&self, handle: &ConnectionHandle, envelope: MessageEnvelope) -> usize {
        let room = envelope.room_id();
        let members = envelope.member_ids();
        if room.is_none() && members.is_empty() {
            self.send_to(
                handle,
                &OutboundEvent::error(INVALID_MESSAGE, "Message has no conversation"),
            );
            return 0;
        }

        let mut targets: HashSet<ConnectionId> = HashSet::new();
        if let Some(room) = &room {
            targets.extend(self.rooms.members(room));
        }
        for member in &members {
            targets.extend(self.rooms.members(member.as_str()));
        }

        let mut senders = vec![handle.user_id().clone()];
        if let Some(author) = envelope.sender_id() {
            if &author != handle.user_id() {
                senders.push(author);
            }
        }
        for sender in &senders {
            for conn in self.pool.user_connections(sender) {
                targets.remove(&conn.id);
            }
        }

        let delivered = self.deliver(targets, &OutboundEvent::ReceiveMessage(envelope.into_value()));
        debug!(
            conn_id = %handle.id,
            room = room.as_deref().unwrap_or_default(),
            delivered,
            "Message relayed"
        );
        delivered
    }

    /// Relays a deletion to the rest of the room.
    pub fn delete_message(&self, handle: &ConnectionHandle, request: DeleteMessageRequest) -> usize {
        let room = request.room.trim().to_string();
        if room.is_empty() {
            debug!(conn_id = %handle.id, "Ignoring delete_message without a room");
            return 0;
        }

        let targets = self
            .rooms
            .members(&room)
            .into_iter()
            .filter(|id| *id != handle.id);

        let mut notice = request.into_notice();
        notice.chat_id = room;
        self.deliver(targets, &OutboundEvent::MessageDeleted(notice))
    }

    /// Sends `message_deleted` to the conversation group and to the identity
    /// groups of `members`, each connection at most once.
    pub fn broadcast_message_deleted(
        &self,
        notice: MessageDeletedNotice,
        members: &[UserId],
    ) -> usize {
        let mut targets: HashSet<ConnectionId> =
            self.rooms.members(&notice.chat_id).into_iter().collect();
        for member in members {
            targets.extend(self.rooms.members(member.as_str()));
        }

        let chat_id = notice.chat_id.clone();
        let delivered = self.deliver(targets, &OutboundEvent::MessageDeleted(notice));
        debug!(chat_id = %chat_id, delivered, "Deletion broadcast");
        delivered
    }

    /// Sends an event to every open connection.
    pub fn broadcast_all(&self, event: &OutboundEvent) -> usize {
        let targets = self.pool.all_connections().into_iter().map(|c| c.id);
        self.deliver(targets, event)
    }

    /// Sends an event to one connection.
    pub fn send_to(&self, handle: &ConnectionHandle, event: &OutboundEvent) -> bool {
        match event.to_frame() {
            Ok(frame) => {
                let sent = handle.send(frame);
                self.metrics.record_fanout(sent as u64, (!sent) as u64);
                sent
            }
            Err(e) => {
                error!(event = event.name(), error = %e, "Failed to serialize event");
                false
            }
        }
    }

    /// Serializes `event` once and queues it on each target. A failing
    /// target never affects the others.
    fn deliver(&self, targets: impl IntoIterator<Item = ConnectionId>, event: &OutboundEvent) -> usize {
        let frame = match event.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(event = event.name(), error = %e, "Failed to serialize event");
                return 0;
            }
        };

        let mut delivered = 0u64;
        let mut dropped = 0u64;
        for conn_id in targets {
            match self.pool.get(&conn_id) {
                Some(conn) if conn.send(frame.clone()) => delivered += 1,
                _ => dropped += 1,
            }
        }

        self.metrics.record_fanout(delivered, dropped);
        delivered as usize
    }

    /// Disconnects every connection.
    pub async fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            self.disconnect(&conn.id).await;
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns a connection by id.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.pool.get(conn_id)
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.room_count()
    }

    /// Returns the presence registry.
    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }
}
