//! InMemory Room Directory 実装
//!
//! ドメイン層が定義する `RoomDirectory` trait の具体的な実装。
//! connection → room の対応表と room → members の集合を 1 つの Mutex で
//! まとめて保護し、両者が常に一致するようにします。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, LeaveOutcome, Passcode, Room, RoomDirectory, RoomError, RoomName,
    RoomSnapshot, Timestamp,
};

/// Both maps live together so every mutation is one critical section.
#[derive(Debug)]
struct Directory {
    rooms: HashMap<RoomName, Room>,
    memberships: HashMap<ConnectionId, RoomName>,
}

impl Directory {
    fn new(created_at: Timestamp) -> Self {
        let default = Room::default_room(created_at);
        let mut rooms = HashMap::new();
        rooms.insert(default.name.clone(), default);
        Self {
            rooms,
            memberships: HashMap::new(),
        }
    }

    fn default_room_mut(&mut self) -> &mut Room {
        self.rooms
            .entry(RoomName::default_room())
            .or_insert_with(|| Room::default_room(Timestamp::now()))
    }

    /// Move `id` from `from` (if that room still exists) into `to`.
    fn move_member(&mut self, id: ConnectionId, from: &RoomName, to: &RoomName) {
        if let Some(old) = self.rooms.get_mut(from) {
            old.remove_member(&id);
        }
        if to.is_default() {
            self.default_room_mut().add_member(id);
        } else if let Some(new) = self.rooms.get_mut(to) {
            new.add_member(id);
        }
        self.memberships.insert(id, to.clone());
    }
}

/// インメモリ Room Directory 実装
pub struct InMemoryRoomDirectory {
    inner: Mutex<Directory>,
}

impl InMemoryRoomDirectory {
    /// 新しい InMemoryRoomDirectory を作成（"default" ルームを含む）
    pub fn new() -> Self {
        Self::with_created_at(Timestamp::now())
    }

    /// "default" ルームの作成時刻を指定して作成
    pub fn with_created_at(created_at: Timestamp) -> Self {
        Self {
            inner: Mutex::new(Directory::new(created_at)),
        }
    }
}

impl Default for InMemoryRoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn register(&self, id: ConnectionId) -> Result<(), RoomError> {
        let mut dir = self.inner.lock().await;
        if dir.memberships.contains_key(&id) {
            return Err(RoomError::AlreadyRegistered(id.to_string()));
        }
        dir.default_room_mut().add_member(id);
        dir.memberships.insert(id, RoomName::default_room());
        Ok(())
    }

    async fn unregister(&self, id: &ConnectionId) -> Option<RoomName> {
        let mut dir = self.inner.lock().await;
        let room_name = dir.memberships.remove(id)?;
        if let Some(room) = dir.rooms.get_mut(&room_name) {
            room.remove_member(id);
        }
        Some(room_name)
    }

    async fn create_room(&self, name: RoomName, passcode: Passcode) -> Result<(), RoomError> {
        let mut dir = self.inner.lock().await;
        if dir.rooms.contains_key(&name) {
            return Err(RoomError::RoomExists(name.into_string()));
        }
        let room = Room::new(name.clone(), passcode, Timestamp::now());
        dir.rooms.insert(name, room);
        Ok(())
    }

    async fn join_room(
        &self,
        id: &ConnectionId,
        name: &RoomName,
        passcode: &str,
    ) -> Result<(), RoomError> {
        let mut dir = self.inner.lock().await;
        let current = dir
            .memberships
            .get(id)
            .cloned()
            .ok_or_else(|| RoomError::NotRegistered(id.to_string()))?;

        let target = dir
            .rooms
            .get(name)
            .ok_or_else(|| RoomError::RoomNotFound(name.to_string()))?;
        if !target.verify_passcode(passcode) {
            return Err(RoomError::BadPasscode(name.to_string()));
        }

        if current == *name {
            return Ok(());
        }
        dir.move_member(*id, &current, name);
        Ok(())
    }

    async fn leave_room(&self, id: &ConnectionId) -> Result<LeaveOutcome, RoomError> {
        let mut dir = self.inner.lock().await;
        let current = dir
            .memberships
            .get(id)
            .cloned()
            .ok_or_else(|| RoomError::NotRegistered(id.to_string()))?;

        let default = RoomName::default_room();
        if !dir.rooms.contains_key(&current) {
            // Tracked room vanished; re-home so the connection stays reachable.
            dir.move_member(*id, &current, &default);
            return Err(RoomError::NotInValidRoom);
        }
        if current.is_default() {
            return Ok(LeaveOutcome::AlreadyInDefault);
        }

        dir.move_member(*id, &current, &default);
        Ok(LeaveOutcome::ReturnedToDefault)
    }

    async fn room_of(&self, id: &ConnectionId) -> Option<RoomName> {
        let dir = self.inner.lock().await;
        dir.memberships.get(id).cloned()
    }

    async fn members_of(&self, name: &RoomName) -> Vec<ConnectionId> {
        let dir = self.inner.lock().await;
        dir.rooms
            .get(name)
            .map(Room::member_ids)
            .unwrap_or_default()
    }

    async fn list_rooms(&self) -> Vec<RoomSnapshot> {
        let dir = self.inner.lock().await;
        let mut rooms: Vec<RoomSnapshot> = dir
            .rooms
            .values()
            .map(|room| RoomSnapshot {
                name: room.name.clone(),
                member_count: room.member_count(),
                created_at: room.created_at,
            })
            .collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        rooms
    }
}
