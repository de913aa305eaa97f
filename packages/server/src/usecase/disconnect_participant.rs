//! UseCase: 参加者切断処理
//!
//! 接続のティアダウン時に必ず呼ばれる。ディレクトリからの削除と
//! 送信チャンネルの破棄を行う。未知の ID に対しては何もしない。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomDirectory, RoomName};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    directory: Arc<dyn RoomDirectory>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(directory: Arc<dyn RoomDirectory>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            directory,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// 接続が所属していたルーム（未登録の場合は `None`）
    pub async fn execute(&self, id: &ConnectionId) -> Option<RoomName> {
        // 送信チャンネルを先に破棄し、以降このハンドルへは書き込まれない
        self.message_pusher.unregister_client(id).await;
        let room = self.directory.unregister(id).await;

        match &room {
            Some(room) => tracing::info!("Connection '{}' left room '{}'", id, room),
            None => tracing::debug!("Connection '{}' was already unregistered", id),
        }
        room
    }
}
