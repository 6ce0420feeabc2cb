//! Deletion notice broadcast when a message is removed.

use serde::{Deserialize, Serialize};

/// Payload of the `message_deleted` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeletedNotice {
    /// Deleted message id.
    pub message_id: String,
    /// Conversation the message belonged to.
    pub chat_id: String,
    /// Whether the message was deleted for every participant.
    #[serde(default)]
    pub is_deleted_for_everyone: bool,
}

impl MessageDeletedNotice {
    /// Notice for a delete-for-everyone.
    pub fn for_everyone(message_id: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            chat_id: chat_id.into(),
            is_deleted_for_everyone: true,
        }
    }
}
