use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capacity and liveness limits enforced by the signaling manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_peers_per_room: u32,
    pub max_rooms: u32,
    pub room_id_max_len: u32,
    pub display_name_max_len: u32,
    /// Seconds without any inbound message before a peer is evicted.
    pub stale_timeout_secs: u32,
    /// Seconds between reaper passes.
    pub reap_interval_secs: u32,
    /// Seconds of inbound silence before the endpoint pings the client.
    pub idle_ping_secs: u32,
    /// Outbound frames buffered per peer before delivery is dropped.
    pub send_queue_capacity: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_peers_per_room: 8,
            max_rooms: 20,
            room_id_max_len: 64,
            display_name_max_len: 64,
            stale_timeout_secs: 120,
            reap_interval_secs: 60,
            idle_ping_secs: 30,
            send_queue_capacity: 256,
        }
    }
}

impl LimitsConfig {
    pub fn stale_timeout(&self) -> Duration {
        Duration::from_secs(self.stale_timeout_secs.into())
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs.into())
    }

    pub fn idle_ping(&self) -> Duration {
        Duration::from_secs(self.idle_ping_secs.into())
    }
}
