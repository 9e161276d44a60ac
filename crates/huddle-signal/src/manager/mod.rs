//! Signaling manager: the only owner and mutator of room/peer state.
//!
//! All rooms and the peer → room index live under one lock. Outbound frames
//! are queued with non-blocking sends while the lock is held, so every peer
//! observes room events in the same order the registry changed, and a slow
//! socket never holds up anyone else.

mod relay;


use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use huddle_common::{AdmissionError, PeerId, RoomId};
use huddle_config::{HuddleConfig, IceServerConfig};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;

use crate::outbound::PeerLink;
use crate::protocol::{LeaveReason, PeerInfo, ServerMessage};
use crate::room::{Peer, Room};
use crate::status::{RoomStatus, StatusReport};

/// Limits and static data the manager needs.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub max_peers_per_room: usize,
    pub max_rooms: usize,
    pub room_id_max_len: usize,
    pub stale_timeout: Duration,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::from(&HuddleConfig::default())
    }
}

impl From<&HuddleConfig> for ManagerConfig {
    fn from(config: &HuddleConfig) -> Self {
        Self {
            max_peers_per_room: config.limits.max_peers_per_room as usize,
            max_rooms: config.limits.max_rooms as usize,
            room_id_max_len: config.limits.room_id_max_len as usize,
            stale_timeout: config.limits.stale_timeout(),
            ice_servers: config.ice_servers.clone(),
        }
    }
}

/// What a newly admitted peer is told about its room.
#[derive(Debug, Clone)]
pub struct Admission {
    pub peer_id: PeerId,
    pub room_id: RoomId,
    /// Everyone else in the room at the moment of admission.
    pub peers: Vec<PeerInfo>,
    pub ice_servers: Vec<IceServerConfig>,
}

/// A peer removed by the reaper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    pub room_id: RoomId,
    pub peer_id: PeerId,
}

/// Rooms plus the reverse index from peer to room.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    pub(crate) rooms: HashMap<RoomId, Room>,
    pub(crate) peer_rooms: HashMap<PeerId, RoomId>,
}

impl Registry {
    fn fresh_peer_id(&self) -> PeerId {
        loop {
            let id = PeerId::generate();
            if !self.peer_rooms.contains_key(&id) {
                return id;
            }
        }
    }

    /// Remove a peer, tell the rest of its room, and drop the room if it
    /// is now empty. Returns the removed peer, or `None` if it was already gone.
    fn remove_peer(&mut self, peer_id: &PeerId, reason: LeaveReason) -> Option<Peer> {
        let room_id = self.peer_rooms.remove(peer_id)?;
        let room = self.rooms.get_mut(&room_id)?;
        let peer = room.remove(peer_id)?;

        let notice = ServerMessage::PeerLeft {
            peer_id: peer_id.clone(),
            display_name: Some(peer.display_name.clone()),
            reason,
            peer_count: room.len(),
        };
        room.broadcast(&notice.to_json(), None);

        info!(
            room = %room_id,
            peer = %peer_id,
            reason = ?reason,
            remaining = room.len(),
            "Peer left"
        );

        if room.is_empty() {
            self.rooms.remove(&room_id);
            info!(room = %room_id, "Room closed (empty)");
        }
        Some(peer)
    }
}

/// Shared handle to all signaling state. Cheap to clone.
#[derive(Clone)]
pub struct SignalingManager {
    config: Arc<ManagerConfig>,
    state: Arc<RwLock<Registry>>,
}

impl SignalingManager {
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(RwLock::new(Registry::default())),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Admit a peer into `room_id`, creating the room if needed.
    ///
    /// Validation and both capacity checks happen before anything is
    /// inserted. On success the new peer's queue receives `room_joined`
    /// first, then every other peer receives `peer_joined`.
    pub async fn join_room(
        &self,
        room_id: &str,
        link: PeerLink,
        display_name: &str,
    ) -> Result<Admission, AdmissionError> {
        let room_id = RoomId::parse(room_id, self.config.room_id_max_len)?;

        let mut state = self.state.write().await;

        match state.rooms.get(&room_id) {
            Some(room) if room.is_full(self.config.max_peers_per_room) => {
                return Err(AdmissionError::RoomFull {
                    room_id: room_id.to_string(),
                    max: self.config.max_peers_per_room,
                });
            }
            Some(_) => {}
            None if state.rooms.len() >= self.config.max_rooms => {
                return Err(AdmissionError::TooManyRooms {
                    max: self.config.max_rooms,
                });
            }
            None => {}
        }

        let peer_id = state.fresh_peer_id();
        let peer = Peer::new(
            peer_id.clone(),
            room_id.clone(),
            display_name.to_string(),
            link.clone(),
        );

        let room = state.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!(room = %room_id, "Room created");
            Room::new(room_id.clone())
        });
        let peers = room.roster(None);
        room.insert(peer);
        let peer_count = room.len();

        let admission = Admission {
            peer_id: peer_id.clone(),
            room_id: room_id.clone(),
            peers,
            ice_servers: self.config.ice_servers.clone(),
        };

        let joined = ServerMessage::RoomJoined {
            peer_id: peer_id.clone(),
            room_id: room_id.clone(),
            peers: admission.peers.clone(),
            ice_servers: admission.ice_servers.clone(),
        };
        link.deliver(&joined.to_json());

        let notice = ServerMessage::PeerJoined {
            peer_id: peer_id.clone(),
            display_name: display_name.to_string(),
            peer_count,
        };
        room.broadcast(&notice.to_json(), Some(&peer_id));

        state.peer_rooms.insert(peer_id.clone(), room_id.clone());

        info!(room = %room_id, peer = %peer_id, display_name, peer_count, "Peer joined");
        Ok(admission)
    }

    /// Remove a peer. Safe to call any number of times from any path; only
    /// the first call changes state or notifies the room.
    pub async fn leave_room(&self, peer_id: &PeerId, reason: LeaveReason) -> bool {
        self.state
            .write()
            .await
            .remove_peer(peer_id, reason)
            .is_some()
    }

    /// Best-effort fan-out to a room. Returns how many peers accepted the
    /// frame; a missing room counts as zero.
    pub async fn broadcast(
        &self,
        room_id: &RoomId,
        message: &ServerMessage,
        exclude: Option<&PeerId>,
    ) -> usize {
        let state = self.state.read().await;
        match state.rooms.get(room_id) {
            Some(room) => room.broadcast(&message.to_json(), exclude),
            None => 0,
        }
    }

    /// Record liveness for client frames that never reach [`relay`], such as
    /// undecodable text or binary data. WebSocket control frames do not count.
    ///
    /// [`relay`]: SignalingManager::relay
    pub async fn touch(&self, peer_id: &PeerId) {
        let now = Instant::now();
        let mut state = self.state.write().await;
        let Registry { rooms, peer_rooms } = &mut *state;
        if let Some(peer) = peer_rooms
            .get(peer_id)
            .and_then(|room_id| rooms.get_mut(room_id))
            .and_then(|room| room.get_mut(peer_id))
        {
            peer.touch(now);
        }
    }

    /// Evict every peer whose last activity is older than the stale timeout.
    pub async fn reap_stale(&self) -> Vec<Eviction> {
        self.reap_stale_at(Instant::now()).await
    }

    /// [`reap_stale`](SignalingManager::reap_stale) against an explicit clock.
    pub async fn reap_stale_at(&self, now: Instant) -> Vec<Eviction> {
        let mut state = self.state.write().await;

        let stale: Vec<Eviction> = state
            .rooms
            .values()
            .flat_map(|room| {
                room.stale_peers(now, self.config.stale_timeout)
                    .into_iter()
                    .map(move |peer_id| Eviction {
                        room_id: room.room_id.clone(),
                        peer_id,
                    })
            })
            .collect();

        for eviction in &stale {
            if let Some(peer) = state.remove_peer(&eviction.peer_id, LeaveReason::Timeout) {
                peer.link().close();
                info!(room = %eviction.room_id, peer = %eviction.peer_id, "Evicted stale peer");
            }
        }
        stale
    }

    pub async fn room_count(&self) -> usize {
        self.state.read().await.rooms.len()
    }

    pub async fn peer_count(&self, room_id: &RoomId) -> usize {
        self.state
            .read()
            .await
            .rooms
            .get(room_id)
            .map_or(0, Room::len)
    }

    pub async fn total_peers(&self) -> usize {
        self.state.read().await.peer_rooms.len()
    }

    /// Which room a peer is in, if it is still connected.
    pub async fn room_of(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.state.read().await.peer_rooms.get(peer_id).cloned()
    }

    /// Snapshot of one room's roster.
    pub async fn roster(&self, room_id: &RoomId) -> Option<Vec<PeerInfo>> {
        self.state
            .read()
            .await
            .rooms
            .get(room_id)
            .map(|room| room.roster(None))
    }

    pub async fn status(&self) -> StatusReport {
        let state = self.state.read().await;
        let mut rooms: Vec<RoomStatus> = state
            .rooms
            .values()
            .map(|room| RoomStatus {
                room_id: room.room_id.clone(),
                created_at: room.created_at,
                peer_count: room.len(),
                peers: room.roster(None),
            })
            .collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));

        StatusReport {
            room_count: state.rooms.len(),
            peer_count: state.peer_rooms.len(),
            ice_server_count: self.config.ice_servers.len(),
            rooms,
        }
    }
}
