//! Domain entities.

use std::collections::HashSet;

use super::value_object::{ConnectionId, Passcode, RoomName, Timestamp};

/// Display name used for every server-authored message.
pub const SYSTEM_USERNAME: &str = "Kangaroo";

/// A passcode-gated partition of connections.
///
/// The member set is only mutated by the room directory, which keeps it in
/// agreement with the connection → room map.
#[derive(Debug, Clone)]
pub struct Room {
    pub name: RoomName,
    passcode: Passcode,
    members: HashSet<ConnectionId>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(name: RoomName, passcode: Passcode, created_at: Timestamp) -> Self {
        Self {
            name,
            passcode,
            members: HashSet::new(),
            created_at,
        }
    }

    /// The `"default"` room, open to everyone.
    pub fn default_room(created_at: Timestamp) -> Self {
        Self::new(RoomName::default_room(), Passcode::empty(), created_at)
    }

    pub fn verify_passcode(&self, candidate: &str) -> bool {
        self.passcode.matches(candidate)
    }

    /// Returns `false` if the connection was already a member.
    pub fn add_member(&mut self, id: ConnectionId) -> bool {
        self.members.insert(id)
    }

    /// Returns `false` if the connection was not a member.
    pub fn remove_member(&mut self, id: &ConnectionId) -> bool {
        self.members.remove(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().copied().collect()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// A chat payload: sender display name, body, and an optional echo of a raw
/// calculation string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub username: String,
    pub message: String,
    pub calculation: Option<String>,
}

impl ChatMessage {
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
            calculation: None,
        }
    }

    /// A message authored by the server itself.
    pub fn system(message: impl Into<String>) -> Self {
        Self::new(SYSTEM_USERNAME, message)
    }

    pub fn with_calculation(mut self, calculation: Option<String>) -> Self {
        self.calculation = calculation;
        self
    }
}

/// Result of relaying one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    /// Name the modified copy was stored under.
    pub filename: String,
    /// Modified content.
    pub content: Vec<u8>,
    /// Where clients can fetch the modified copy.
    pub download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_membership_add_remove() {
        // テスト項目: メンバーの追加と削除が member set に反映される
        // given (前提条件):
        let mut room = Room::default_room(Timestamp::new(0));
        let alice = ConnectionId::generate();

        // when (操作):
        let added = room.add_member(alice);
        let added_again = room.add_member(alice);

        // then (期待する結果):
        assert!(added);
        assert!(!added_again);
        assert_eq!(room.member_count(), 1);
        assert!(room.contains(&alice));

        assert!(room.remove_member(&alice));
        assert!(!room.remove_member(&alice));
        assert_eq!(room.member_count(), 0);
    }

    #[test]
    fn test_room_verify_passcode() {
        // テスト項目: ルーム作成時のパスコードでのみ認証できる
        // given (前提条件):
        let room = Room::new(
            RoomName::new("lab".to_string()).unwrap(),
            Passcode::new("p".to_string()),
            Timestamp::new(0),
        );

        // when (操作) / then (期待する結果):
        assert!(room.verify_passcode("p"));
        assert!(!room.verify_passcode("wrong"));
    }

    #[test]
    fn test_system_message_author() {
        // テスト項目: システムメッセージの送信者名は Kangaroo
        // given (前提条件) / when (操作):
        let message = ChatMessage::system("hi");

        // then (期待する結果):
        assert_eq!(message.username, "Kangaroo");
        assert_eq!(message.message, "hi");
        assert_eq!(message.calculation, None);
    }
}
