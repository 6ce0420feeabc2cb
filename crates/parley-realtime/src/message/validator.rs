//! Inbound frame validation rules.

use parley_core::error::AppError;
use parley_core::result::AppResult;

/// Maximum allowed frame size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 65_536;

/// Maximum room name length.
const MAX_ROOM_LEN: usize = 256;

/// Validates a raw inbound frame.
pub fn validate_inbound(raw: &str) -> AppResult<()> {
    if raw.len() > MAX_MESSAGE_SIZE {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {MAX_MESSAGE_SIZE} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Validates a room name. Room names are opaque ids, so only length and
/// control characters are checked.
pub fn validate_room_name(room: &str) -> AppResult<()> {
    if room.len() > MAX_ROOM_LEN {
        return Err(AppError::validation("Room name too long"));
    }
    if room.chars().any(char::is_control) {
        return Err(AppError::validation("Room name contains control characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_limits() {
        assert!(validate_inbound(r#"{"event":"join_room","data":"x"}"#).is_ok());
        assert!(validate_inbound("   ").is_err());
        assert!(validate_inbound(&"x".repeat(MAX_MESSAGE_SIZE + 1)).is_err());
    }

    #[test]
    fn test_room_names() {
        assert!(validate_room_name("64f0c2aa91").is_ok());
        assert!(validate_room_name(&"r".repeat(300)).is_err());
        assert!(validate_room_name("bad\nname").is_err());
    }
}
