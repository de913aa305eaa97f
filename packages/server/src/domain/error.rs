//! Domain error types.

use thiserror::Error;

/// Errors raised while constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("room name is too long ({actual} characters, max {max})")]
    RoomNameTooLong { max: usize, actual: usize },
}

/// Errors raised by room membership operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room '{0}' already exists.")]
    RoomExists(String),

    #[error("Room '{0}' does not exist.")]
    RoomNotFound(String),

    #[error("Incorrect passcode for room '{0}'.")]
    BadPasscode(String),

    #[error("You are not in a valid room.")]
    NotInValidRoom,

    #[error("connection '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("connection '{0}' is not registered")]
    NotRegistered(String),
}

/// Errors raised while pushing a frame to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Errors raised by the file storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
