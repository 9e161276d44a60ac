//! Dispatch of inbound client messages.

use huddle_common::{PeerId, ProtocolError};
use tokio::time::Instant;
use tracing::debug;

use super::{Registry, SignalingManager};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::Room;

impl SignalingManager {
    /// Handle one message from `sender`.
    ///
    /// Refreshes the sender's liveness, then forwards, broadcasts or replies
    /// depending on the message type. Caller mistakes are answered with an
    /// `error` frame to the sender only and also returned; the connection is
    /// never closed from here.
    pub async fn relay(&self, sender: &PeerId, message: ClientMessage) -> Result<(), ProtocolError> {
        let now = Instant::now();
        let mut state = self.state.write().await;
        let Registry { rooms, peer_rooms } = &mut *state;

        let room = peer_rooms
            .get(sender)
            .and_then(|room_id| rooms.get_mut(room_id))
            .ok_or(ProtocolError::NotConnected)?;

        let Some(peer) = room.get_mut(sender) else {
            return Err(ProtocolError::NotConnected);
        };
        peer.touch(now);

        let result = dispatch(room, sender, message);
        if let Err(ref err) = result {
            debug!(room = %room.room_id, peer = %sender, error = %err, "Rejected message");
            if let Some(peer) = room.get(sender) {
                peer.link().deliver(&ServerMessage::error(err).to_json());
            }
        }
        result
    }
}

fn dispatch(room: &mut Room, sender: &PeerId, message: ClientMessage) -> Result<(), ProtocolError> {
    match message {
        ClientMessage::Offer {
            target_peer_id,
            sdp,
        } => forward(room, sender, target_peer_id, |from_peer_id, from_display_name| {
            ServerMessage::Offer {
                from_peer_id,
                from_display_name,
                sdp,
            }
        }),
        ClientMessage::Answer {
            target_peer_id,
            sdp,
        } => forward(room, sender, target_peer_id, |from_peer_id, from_display_name| {
            ServerMessage::Answer {
                from_peer_id,
                from_display_name,
                sdp,
            }
        }),
        ClientMessage::IceCandidate {
            target_peer_id,
            candidate,
        } => forward(room, sender, target_peer_id, |from_peer_id, _| {
            ServerMessage::IceCandidate {
                from_peer_id,
                candidate,
            }
        }),
        ClientMessage::MuteToggle { is_muted } => {
            if let Some(peer) = room.get_mut(sender) {
                peer.is_muted = is_muted;
            }
            let notice = ServerMessage::PeerMuteChanged {
                peer_id: sender.clone(),
                is_muted,
            };
            room.broadcast(&notice.to_json(), Some(sender));
            debug!(room = %room.room_id, peer = %sender, is_muted, "Mute changed");
            Ok(())
        }
        ClientMessage::Ping => {
            if let Some(peer) = room.get(sender) {
                peer.link().deliver(&ServerMessage::Pong.to_json());
            }
            Ok(())
        }
        ClientMessage::Unknown => Err(ProtocolError::UnknownType("unknown".into())),
    }
}

/// Re-tag a signaling payload with the sender's identity and queue it for
/// exactly one target in the same room.
fn forward(
    room: &Room,
    sender: &PeerId,
    target: Option<PeerId>,
    build: impl FnOnce(PeerId, String) -> ServerMessage,
) -> Result<(), ProtocolError> {
    let target = target.ok_or(ProtocolError::MissingField("target_peer_id"))?;
    let target_peer = room
        .get(&target)
        .filter(|peer| peer.peer_id != *sender)
        .ok_or_else(|| ProtocolError::UnknownTarget(target.to_string()))?;

    let from_display_name = room
        .get(sender)
        .map(|peer| peer.display_name.clone())
        .unwrap_or_default();
    let message = build(sender.clone(), from_display_name);

    if !target_peer.link().deliver(&message.to_json()) {
        debug!(room = %room.room_id, from = %sender, to = %target, "Relay delivery failed");
    } else {
        debug!(room = %room.room_id, from = %sender, to = %target, "Relayed");
    }
    Ok(())
}

