//! UseCase error types.

use thiserror::Error;

use crate::domain::{MessagePushError, RoomError, StorageError};

/// Errors raised while bringing a connection online.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Errors raised by the broadcast queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    #[error("broadcast queue is closed")]
    QueueClosed,
}

/// Errors raised while delivering a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("connection '{0}' is not in any room")]
    NotInRoom(String),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}

/// Errors raised while relaying an uploaded file.
#[derive(Debug, Error)]
pub enum FileRelayError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
