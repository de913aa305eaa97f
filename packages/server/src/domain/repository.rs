//! Room directory trait.
//!
//! Defines the membership operations the use cases rely on. The concrete
//! in-memory implementation lives in the infrastructure layer.

use async_trait::async_trait;

use super::{ConnectionId, Passcode, RoomError, RoomName, Timestamp};

/// Result of a successful `leave_room`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The connection moved back to `"default"`.
    ReturnedToDefault,
    /// The connection was already in `"default"`; nothing changed.
    AlreadyInDefault,
}

/// Read-only view of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub name: RoomName,
    pub member_count: usize,
    pub created_at: Timestamp,
}

/// Connection registry and room directory.
///
/// Every connection known to the directory is a member of exactly one room.
/// Implementations must apply each operation atomically with respect to all
/// others, so membership is never observable in zero or two rooms.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Add a connection to the `"default"` room.
    async fn register(&self, id: ConnectionId) -> Result<(), RoomError>;

    /// Remove a connection from whatever room it occupies.
    ///
    /// Returns the room it was removed from, or `None` for unknown ids.
    async fn unregister(&self, id: &ConnectionId) -> Option<RoomName>;

    /// Create an empty room guarded by `passcode`.
    async fn create_room(&self, name: RoomName, passcode: Passcode) -> Result<(), RoomError>;

    /// Move a connection into `name` if `passcode` matches.
    async fn join_room(
        &self,
        id: &ConnectionId,
        name: &RoomName,
        passcode: &str,
    ) -> Result<(), RoomError>;

    /// Move a connection back to `"default"`.
    async fn leave_room(&self, id: &ConnectionId) -> Result<LeaveOutcome, RoomError>;

    /// The room a connection currently occupies.
    async fn room_of(&self, id: &ConnectionId) -> Option<RoomName>;

    /// Current members of a room (empty for unknown rooms).
    async fn members_of(&self, name: &RoomName) -> Vec<ConnectionId>;

    /// All rooms, sorted by name.
    async fn list_rooms(&self) -> Vec<RoomSnapshot>;
}
