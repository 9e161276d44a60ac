//! Read-only status snapshot for dashboards and shutdown logging.

use chrono::{DateTime, Utc};
use huddle_common::RoomId;
use serde::Serialize;

use crate::protocol::PeerInfo;

#[derive(Debug, Clone, Serialize)]
pub struct RoomStatus {
    pub room_id: RoomId,
    pub created_at: DateTime<Utc>,
    pub peer_count: usize,
    pub peers: Vec<PeerInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub room_count: usize,
    pub peer_count: usize,
    pub ice_server_count: usize,
    pub rooms: Vec<RoomStatus>,
}

impl StatusReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
