//! Room and peer records held in the manager's registry.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use huddle_common::{PeerId, RoomId};
use tokio::time::Instant;

use crate::outbound::PeerLink;
use crate::protocol::PeerInfo;

/// One admitted participant.
#[derive(Debug)]
pub struct Peer {
    pub peer_id: PeerId,
    pub room_id: RoomId,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
    pub is_muted: bool,
    last_seen: Instant,
    link: PeerLink,
}

impl Peer {
    pub(crate) fn new(peer_id: PeerId, room_id: RoomId, display_name: String, link: PeerLink) -> Self {
        Self {
            peer_id,
            room_id,
            display_name,
            joined_at: Utc::now(),
            is_muted: false,
            last_seen: Instant::now(),
            link,
        }
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// Record activity at `now`. Never moves `last_seen` backwards.
    pub(crate) fn touch(&mut self, now: Instant) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    pub fn is_stale(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > timeout
    }

    pub(crate) fn link(&self) -> &PeerLink {
        &self.link
    }

    pub fn info(&self) -> PeerInfo {
        PeerInfo {
            peer_id: self.peer_id.clone(),
            display_name: self.display_name.clone(),
            is_muted: self.is_muted,
            joined_at: self.joined_at,
        }
    }
}

/// A named set of peers that may signal each other.
#[derive(Debug)]
pub struct Room {
    pub room_id: RoomId,
    pub created_at: DateTime<Utc>,
    peers: HashMap<PeerId, Peer>,
}

impl Room {
    pub(crate) fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            created_at: Utc::now(),
            peers: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn is_full(&self, max_peers: usize) -> bool {
        self.peers.len() >= max_peers
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&Peer> {
        self.peers.get(peer_id)
    }

    pub(crate) fn get_mut(&mut self, peer_id: &PeerId) -> Option<&mut Peer> {
        self.peers.get_mut(peer_id)
    }

    pub(crate) fn insert(&mut self, peer: Peer) {
        self.peers.insert(peer.peer_id.clone(), peer);
    }

    pub(crate) fn remove(&mut self, peer_id: &PeerId) -> Option<Peer> {
        self.peers.remove(peer_id)
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    /// Roster ordered by join time, optionally leaving one peer out.
    pub fn roster(&self, exclude: Option<&PeerId>) -> Vec<PeerInfo> {
        let mut roster: Vec<PeerInfo> = self
            .peers
            .values()
            .filter(|p| Some(&p.peer_id) != exclude)
            .map(Peer::info)
            .collect();
        roster.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.peer_id.cmp(&b.peer_id))
        });
        roster
    }

    /// Queue `frame` for every peer except `exclude`. Returns how many
    /// peers accepted it; failures are left to each peer's own cleanup.
    pub(crate) fn broadcast(&self, frame: &str, exclude: Option<&PeerId>) -> usize {
        let mut delivered = 0;
        for peer in self.peers.values() {
            if Some(&peer.peer_id) == exclude {
                continue;
            }
            if peer.link.deliver(frame) {
                delivered += 1;
            } else {
                tracing::debug!(
                    room = %self.room_id,
                    peer = %peer.peer_id,
                    "Broadcast delivery failed"
                );
            }
        }
        delivered
    }

    /// Ids of peers silent for longer than `timeout` as of `now`.
    pub fn stale_peers(&self, now: Instant, timeout: Duration) -> Vec<PeerId> {
        self.peers
            .values()
            .filter(|p| p.is_stale(now, timeout))
            .map(|p| p.peer_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound;

    fn room() -> Room {
        Room::new(RoomId::parse("r1", 64).unwrap())
    }

    fn peer(id: &str, link: PeerLink) -> Peer {
        Peer::new(
            PeerId::from(id),
            RoomId::parse("r1", 64).unwrap(),
            format!("name-{id}"),
            link,
        )
    }

    #[test]
    fn full_at_capacity() {
        let mut room = room();
        let mut mailboxes = Vec::new();
        for i in 0..3 {
            let (link, mailbox) = outbound::channel(4);
            mailboxes.push(mailbox);
            room.insert(peer(&i.to_string(), link));
        }
        assert_eq!(room.len(), 3);
        assert!(room.is_full(3));
        assert!(!room.is_full(4));
    }

    #[test]
    fn broadcast_skips_excluded_and_survives_dead_peer() {
        let mut room = room();
        let (a_link, mut a_box) = outbound::channel(4);
        let (b_link, b_box) = outbound::channel(4);
        let (c_link, mut c_box) = outbound::channel(4);
        room.insert(peer("a", a_link));
        room.insert(peer("b", b_link));
        room.insert(peer("c", c_link));
        drop(b_box);

        let delivered = room.broadcast("hi", Some(&PeerId::from("a")));
        assert_eq!(delivered, 1);
        assert_eq!(a_box.try_recv(), None);
        assert_eq!(c_box.try_recv().as_deref(), Some("hi"));
    }

    #[test]
    fn roster_excludes_requested_peer() {
        let mut room = room();
        let (a_link, _a) = outbound::channel(4);
        let (b_link, _b) = outbound::channel(4);
        room.insert(peer("a", a_link));
        room.insert(peer("b", b_link));

        let roster = room.roster(Some(&PeerId::from("b")));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].peer_id, PeerId::from("a"));
        assert_eq!(roster[0].display_name, "name-a");
        assert!(!roster[0].is_muted);
    }

    #[tokio::test(start_paused = true)]
    async fn touch_is_monotonic_and_drives_staleness() {
        let (link, _mailbox) = outbound::channel(4);
        let mut p = peer("a", link);
        let start = p.last_seen();

        tokio::time::advance(Duration::from_secs(30)).await;
        let later = Instant::now();
        p.touch(later);
        assert_eq!(p.last_seen(), later);

        p.touch(start);
        assert_eq!(p.last_seen(), later);

        assert!(!p.is_stale(later + Duration::from_secs(120), Duration::from_secs(120)));
        assert!(p.is_stale(later + Duration::from_secs(121), Duration::from_secs(120)));
    }
}
