//! Value objects for the relay domain.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Name of the room every connection lands in after connecting.
pub const DEFAULT_ROOM: &str = "default";

/// Maximum length of a room name, in characters.
pub const ROOM_NAME_MAX_CHARS: usize = 64;

/// Opaque handle for one live WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh, random connection id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Name of a room.
///
/// Leading and trailing whitespace is stripped; the result must be non-empty
/// and at most [`ROOM_NAME_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyRoomName);
        }
        let chars = trimmed.chars().count();
        if chars > ROOM_NAME_MAX_CHARS {
            return Err(ValueObjectError::RoomNameTooLong {
                max: ROOM_NAME_MAX_CHARS,
                actual: chars,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The always-present `"default"` room.
    pub fn default_room() -> Self {
        Self(DEFAULT_ROOM.to_string())
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ROOM
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared secret guarding a room.
///
/// Stored as plain text. Only [`Passcode::matches`] exposes the value, so a
/// hashed representation can replace it without touching callers.
#[derive(Clone, PartialEq, Eq)]
pub struct Passcode(String);

impl Passcode {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Passcode of the default room, which nobody needs to type.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passcode(***)")
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn now() -> Self {
        Self(kangaroo_shared::time::now_millis())
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
