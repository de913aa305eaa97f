//! Domain layer for the relay.
//!
//! This module contains business rules that are independent of the
//! WebSocket transport, DTO shapes and storage backends.

pub mod entity;
pub mod error;
pub mod expression;
pub mod file_store;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, FileArtifact, Room, SYSTEM_USERNAME};
pub use error::{MessagePushError, RoomError, StorageError, ValueObjectError};
pub use expression::{EvaluationError, evaluate};
pub use file_store::FileStore;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{LeaveOutcome, RoomDirectory, RoomSnapshot};
pub use value_object::{ConnectionId, DEFAULT_ROOM, Passcode, RoomName, Timestamp};
