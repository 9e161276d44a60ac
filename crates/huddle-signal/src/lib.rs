//! huddle-signal: rendezvous and signaling relay for peer-to-peer voice rooms.
//!
//! Tracks who is in which room, hands each newcomer the roster and the
//! configured STUN/TURN servers, and forwards offer/answer/ICE messages
//! between peers. Media never passes through here; SDP and candidate
//! payloads are forwarded without inspection.

pub mod connection;
pub mod manager;
pub mod outbound;
pub mod protocol;
pub mod reaper;
pub mod room;
pub mod server;
pub mod status;

pub use manager::{Admission, Eviction, ManagerConfig, SignalingManager};
pub use protocol::{ClientMessage, LeaveReason, PeerInfo, ServerMessage};
pub use status::StatusReport;
