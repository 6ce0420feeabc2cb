//! Chat message envelope.
//!
//! Envelopes are relayed verbatim. Only the routing fields are read:
//! the conversation (`chat` or `room`), the `sender`, and the optional
//! member list under `chat.users`. Each of these may be a bare id string
//! or a populated document carrying `_id` / `id`.

use serde_json::Value;

use parley_core::types::id::UserId;

/// A client-supplied chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEnvelope(Value);

impl MessageEnvelope {
    /// Wraps a raw payload.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Conversation the message belongs to.
    pub fn room_id(&self) -> Option<String> {
        self.0
            .get("chat")
            .and_then(document_id)
            .or_else(|| self.0.get("room").and_then(document_id))
    }

    /// Author of the message, when stated.
    pub fn sender_id(&self) -> Option<UserId> {
        self.0.get("sender").and_then(document_id).map(UserId::from)
    }

    /// Members listed on a populated chat document.
    pub fn member_ids(&self) -> Vec<UserId> {
        self.0
            .get("chat")
            .and_then(|chat| chat.get("users"))
            .and_then(Value::as_array)
            .map(|users| {
                users
                    .iter()
                    .filter_map(document_id)
                    .map(UserId::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the raw payload.
    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Id of a reference that is either a string or a document.
fn document_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_plain_ids() {
        let envelope = MessageEnvelope::new(json!({
            "chat": "chat1", "sender": "a", "content": "hi"
        }));
        assert_eq!(envelope.room_id().as_deref(), Some("chat1"));
        assert_eq!(envelope.sender_id(), Some(UserId::new("a")));
        assert!(envelope.member_ids().is_empty());
    }

    #[test]
    fn test_populated_documents() {
        let envelope = MessageEnvelope::new(json!({
            "chat": { "_id": "chat1", "users": [{ "_id": "a" }, "b", { "id": "c" }, 7] },
            "sender": { "_id": "a", "username": "alice" },
            "content": "hi"
        }));
        assert_eq!(envelope.room_id().as_deref(), Some("chat1"));
        assert_eq!(envelope.sender_id(), Some(UserId::new("a")));
        assert_eq!(
            envelope.member_ids(),
            vec![UserId::new("a"), UserId::new("b"), UserId::new("c")]
        );
    }

    #[test]
    fn test_room_fallback_and_missing() {
        let envelope = MessageEnvelope::new(json!({ "room": "r9" }));
        assert_eq!(envelope.room_id().as_deref(), Some("r9"));
        let envelope = MessageEnvelope::new(json!({ "chat": "", "content": "hi" }));
        assert!(envelope.room_id().is_none());
        assert!(envelope.sender_id().is_none());
    }
}
