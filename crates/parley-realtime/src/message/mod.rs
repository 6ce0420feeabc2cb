//! Wire events exchanged over the WebSocket.

pub mod envelope;
pub mod types;
pub mod validator;

pub use envelope::MessageEnvelope;
pub use types::{DeleteMessageRequest, InboundEvent, OutboundEvent};
