pub mod errors;
pub mod id;

pub use errors::{AdmissionError, ConfigError, HuddleError, ProtocolError};
pub use id::{PeerId, RoomId, DEFAULT_ROOM_ID_MAX_LEN};

pub type Result<T> = std::result::Result<T, HuddleError>;
