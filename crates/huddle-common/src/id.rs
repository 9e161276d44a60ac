use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AdmissionError;

/// Default upper bound on room id length, in bytes.
pub const DEFAULT_ROOM_ID_MAX_LEN: usize = 64;

/// Validated room identifier: 1..=max_len ASCII alphanumerics, `-` or `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn parse(raw: &str, max_len: usize) -> Result<Self, AdmissionError> {
        let valid = !raw.is_empty()
            && raw.len() <= max_len
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(AdmissionError::InvalidRoomId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short server-assigned peer identifier (8 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Draw a fresh id. Callers that need uniqueness among live peers
    /// must check for collisions themselves.
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let bytes = uuid.as_bytes();
        Self(format!(
            "{:02x}{:02x}{:02x}{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_accepts_alnum_hyphen_underscore() {
        for raw in ["r1", "team-standup", "lobby_2", "A", "x".repeat(64).as_str()] {
            let id = RoomId::parse(raw, DEFAULT_ROOM_ID_MAX_LEN).unwrap();
            assert_eq!(id.as_str(), raw);
        }
    }

    #[test]
    fn room_id_rejects_space_and_slash() {
        assert!(matches!(
            RoomId::parse("my room", 64),
            Err(AdmissionError::InvalidRoomId(ref s)) if s == "my room"
        ));
        assert!(RoomId::parse("a/b", 64).is_err());
        assert!(RoomId::parse("../etc", 64).is_err());
    }

    #[test]
    fn room_id_rejects_empty_and_overlong() {
        assert!(RoomId::parse("", 64).is_err());
        assert!(RoomId::parse(&"x".repeat(65), 64).is_err());
        assert!(RoomId::parse("abcd", 3).is_err());
    }

    #[test]
    fn room_id_rejects_non_ascii() {
        assert!(RoomId::parse("café", 64).is_err());
        assert!(RoomId::parse("room.1", 64).is_err());
    }

    #[test]
    fn room_id_display() {
        let id = RoomId::parse("r1", 64).unwrap();
        assert_eq!(id.to_string(), "r1");
    }

    #[test]
    fn peer_id_is_short_hex() {
        let id = PeerId::generate();
        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn peer_id_is_unique() {
        let a = PeerId::generate();
        let b = PeerId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn peer_id_serializes_as_plain_string() {
        let id = PeerId::from("deadbeef");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"deadbeef\"");
        let back: PeerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn peer_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let a = PeerId::generate();
        set.insert(a.clone());
        set.insert(a);
        assert_eq!(set.len(), 1);
    }
}
