//! UseCase: ルームの作成・入室・退室
//!
//! 成功時は送信者に返すメッセージ本文を返す。失敗時の本文は
//! [`RoomError`] の `Display` をそのまま使う。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, LeaveOutcome, Passcode, RoomDirectory, RoomError, RoomName,
};

/// ルーム操作のユースケース
pub struct ManageRoomUseCase {
    directory: Arc<dyn RoomDirectory>,
}

impl ManageRoomUseCase {
    pub fn new(directory: Arc<dyn RoomDirectory>) -> Self {
        Self { directory }
    }

    /// ルームを作成する（作成者は移動しない）
    pub async fn create(
        &self,
        requester: &ConnectionId,
        name: RoomName,
        passcode: Passcode,
    ) -> Result<String, RoomError> {
        let reply = format!("Room '{}' created successfully.", name);
        self.directory.create_room(name.clone(), passcode).await?;
        tracing::info!("Connection '{}' created room '{}'", requester, name);
        Ok(reply)
    }

    /// パスコードが一致すればルームへ移動する
    pub async fn join(
        &self,
        requester: &ConnectionId,
        name: &RoomName,
        passcode: &str,
    ) -> Result<String, RoomError> {
        self.directory.join_room(requester, name, passcode).await?;
        tracing::info!("Connection '{}' joined room '{}'", requester, name);
        Ok(format!("Joined room '{}'.", name))
    }

    /// "default" ルームへ戻る
    pub async fn leave(&self, requester: &ConnectionId) -> Result<String, RoomError> {
        match self.directory.leave_room(requester).await? {
            LeaveOutcome::ReturnedToDefault => {
                tracing::info!("Connection '{}' returned to the default room", requester);
                Ok("You have left the room and returned to the default room.".to_string())
            }
            LeaveOutcome::AlreadyInDefault => {
                Ok("You are already in the default room.".to_string())
            }
        }
    }
}
