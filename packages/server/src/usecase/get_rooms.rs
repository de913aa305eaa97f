//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{RoomDirectory, RoomSnapshot};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    directory: Arc<dyn RoomDirectory>,
}

impl GetRoomsUseCase {
    pub fn new(directory: Arc<dyn RoomDirectory>) -> Self {
        Self { directory }
    }

    /// 全ルームのスナップショットを名前順で返す
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        let mut rooms = self.directory.list_rooms().await;
        rooms.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, Passcode, RoomName},
        infrastructure::repository::InMemoryRoomDirectory,
    };

    #[tokio::test]
    async fn test_get_rooms_sorted_with_member_counts() {
        // テスト項目: ルーム一覧が名前順で、メンバー数を含む
        // given (前提条件):
        let directory = Arc::new(InMemoryRoomDirectory::new());
        let usecase = GetRoomsUseCase::new(directory.clone());
        for id in [ConnectionId::generate(), ConnectionId::generate()] {
            directory.register(id).await.unwrap();
        }
        directory
            .create_room(
                RoomName::new("annex".to_string()).unwrap(),
                Passcode::new("p".to_string()),
            )
            .await
            .unwrap();

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        let summary: Vec<(&str, usize)> = rooms
            .iter()
            .map(|room| (room.name.as_str(), room.member_count))
            .collect();
        assert_eq!(summary, vec![("annex", 0), ("default", 2)]);
    }
}
