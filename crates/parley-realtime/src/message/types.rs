//! Inbound and outbound event definitions.
//!
//! Every frame is a JSON object `{ "event": <name>, "data": <payload> }`.

use serde::{Deserialize, Serialize};

use parley_core::result::AppResult;
use parley_entity::message::MessageDeletedNotice;
use parley_entity::user::UserProfile;

/// Error code for unreadable or oversized frames.
pub const INVALID_MESSAGE: &str = "INVALID_MESSAGE";
/// Error code for a refused room join.
pub const FORBIDDEN: &str = "FORBIDDEN";
/// Error code for a connection that joined too many rooms.
pub const MAX_ROOMS: &str = "MAX_ROOMS";

/// Events sent by the client after the handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Join a conversation group.
    JoinRoom(String),
    /// Relay a chat message to the conversation.
    SendMessage(serde_json::Value),
    /// Tell the rest of the room a message was deleted.
    DeleteMessage(DeleteMessageRequest),
}

/// Payload of `delete_message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageRequest {
    /// Conversation id.
    pub room: String,
    /// Deleted message id.
    pub message_id: String,
    /// Whether the message was removed for every participant.
    #[serde(default)]
    pub is_deleted_for_everyone: bool,
}

impl DeleteMessageRequest {
    /// The notice relayed to the room.
    pub fn into_notice(self) -> MessageDeletedNotice {
        MessageDeletedNotice {
            message_id: self.message_id,
            chat_id: self.room,
            is_deleted_for_everyone: self.is_deleted_for_everyone,
        }
    }
}

/// Events sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Snapshot of online users, sent once to a new connection.
    SetupOnlineUsers(Vec<UserProfile>),
    /// A user came online.
    UserOnline(UserProfile),
    /// A user went offline.
    UserOffline(UserProfile),
    /// A chat message, relayed verbatim.
    ReceiveMessage(serde_json::Value),
    /// A message was deleted.
    MessageDeleted(MessageDeletedNotice),
    /// The handshake was refused; the socket closes next.
    ConnectError {
        /// Refusal reason.
        message: String,
    },
    /// A request on an open connection failed.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundEvent {
    /// Builds an `error` event.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetupOnlineUsers(_) => "setup_online_users",
            Self::UserOnline(_) => "user_online",
            Self::UserOffline(_) => "user_offline",
            Self::ReceiveMessage(_) => "receive_message",
            Self::MessageDeleted(_) => "message_deleted",
            Self::ConnectError { .. } => "connect_error",
            Self::Error { .. } => "error",
        }
    }

    /// Serializes the event into a text frame.
    pub fn to_frame(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
