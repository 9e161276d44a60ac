use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Reasons a connection is refused before any peer state exists.
///
/// Each variant maps to its own WebSocket close code so a client can tell
/// "pick another room" apart from "come back later".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("invalid room id: {0:?}")]
    InvalidRoomId(String),

    #[error("room {room_id} is full ({max} peers)")]
    RoomFull { room_id: String, max: usize },

    #[error("maximum number of rooms reached ({max})")]
    TooManyRooms { max: usize },
}

impl AdmissionError {
    pub const CLOSE_INVALID_ROOM_ID: u16 = 4001;
    pub const CLOSE_ROOM_FULL: u16 = 4002;
    pub const CLOSE_MAX_ROOMS: u16 = 4003;

    /// Application close code (4000-4999 range) sent with the close frame.
    pub fn close_code(&self) -> u16 {
        match self {
            Self::InvalidRoomId(_) => Self::CLOSE_INVALID_ROOM_ID,
            Self::RoomFull { .. } => Self::CLOSE_ROOM_FULL,
            Self::TooManyRooms { .. } => Self::CLOSE_MAX_ROOMS,
        }
    }

    /// Short machine-readable reason carried in the close frame.
    pub fn close_reason(&self) -> &'static str {
        match self {
            Self::InvalidRoomId(_) => "invalid_room_id",
            Self::RoomFull { .. } => "room_full",
            Self::TooManyRooms { .. } => "max_rooms_reached",
        }
    }
}

/// Caller mistakes reported back to the sending peer as an `error` message.
/// None of these close the connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("peer {0} not found in room")]
    UnknownTarget(String),

    #[error("not connected to a room")]
    NotConnected,
}

#[derive(Debug, thiserror::Error)]
pub enum HuddleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
