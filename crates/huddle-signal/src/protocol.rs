//! Signaling wire protocol: JSON envelopes tagged by `type`.
//!
//! SDP and ICE candidate payloads are carried as opaque JSON values and
//! never inspected.

use chrono::{DateTime, Utc};
use huddle_common::{PeerId, ProtocolError, RoomId};
use huddle_config::IceServerConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages a client sends after it has been admitted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Offer {
        target_peer_id: Option<PeerId>,
        sdp: Value,
    },
    Answer {
        target_peer_id: Option<PeerId>,
        sdp: Value,
    },
    IceCandidate {
        target_peer_id: Option<PeerId>,
        candidate: Value,
    },
    MuteToggle {
        is_muted: bool,
    },
    Ping,
    #[serde(other)]
    Unknown,
}

/// Why a peer left its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveReason {
    Disconnected,
    Timeout,
}

/// Roster entry as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerInfo {
    pub peer_id: PeerId,
    pub display_name: String,
    pub is_muted: bool,
    pub joined_at: DateTime<Utc>,
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "room_joined")]
    RoomJoined {
        peer_id: PeerId,
        room_id: RoomId,
        peers: Vec<PeerInfo>,
        ice_servers: Vec<IceServerConfig>,
    },

    #[serde(rename = "peer_joined")]
    PeerJoined {
        peer_id: PeerId,
        display_name: String,
        peer_count: usize,
    },

    #[serde(rename = "peer_left")]
    PeerLeft {
        peer_id: PeerId,
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        reason: LeaveReason,
        peer_count: usize,
    },

    #[serde(rename = "offer")]
    Offer {
        from_peer_id: PeerId,
        from_display_name: String,
        sdp: Value,
    },

    #[serde(rename = "answer")]
    Answer {
        from_peer_id: PeerId,
        from_display_name: String,
        sdp: Value,
    },

    #[serde(rename = "ice-candidate")]
    IceCandidate { from_peer_id: PeerId, candidate: Value },

    #[serde(rename = "peer_mute_changed")]
    PeerMuteChanged { peer_id: PeerId, is_muted: bool },

    #[serde(rename = "pong")]
    Pong,

    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerMessage {
    pub fn error(err: &ProtocolError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }

    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> String {
        // Every field is a string, number, bool or an already-valid JSON
        // value, so serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"failed to encode message: {e}"}}"#)
        })
    }
}

/// Decode one inbound text frame.
///
/// Unparseable JSON, a missing `type` and unknown types are all reported
/// as errors so the caller can answer the sender without closing.
pub fn decode(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;

    let kind = match value.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        Some(_) => return Err(ProtocolError::InvalidMessage("type must be a string".into())),
        None => return Err(ProtocolError::MissingField("type")),
    };

    match serde_json::from_value(value) {
        Ok(ClientMessage::Unknown) => Err(ProtocolError::UnknownType(kind)),
        Ok(message) => Ok(message),
        Err(e) => Err(ProtocolError::InvalidMessage(e.to_string())),
    }
}
