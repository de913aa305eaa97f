//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 新しい接続が "default" ルームに所属することを保証
//! - 同じ ConnectionId の二重登録を防ぐ
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録
//! - 異常系：登録済み ConnectionId での再登録
//! - 競合：送信チャンネル登録中に同じルームへのブロードキャストが走る

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel, RoomDirectory};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// RoomDirectory（接続とルーム所属の管理）
    directory: Arc<dyn RoomDirectory>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(directory: Arc<dyn RoomDirectory>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            directory,
            message_pusher,
        }
    }

    /// 接続を "default" ルームに登録し、送信チャンネルを紐付ける
    ///
    /// # Arguments
    ///
    /// * `id` - 新しい接続の ID
    /// * `sender` - 接続の書き込みタスクへのチャンネル
    pub async fn execute(&self, id: ConnectionId, sender: PusherChannel) -> Result<(), ConnectError> {
        // 1. ディレクトリに登録（"default" ルームへ所属）
        self.directory.register(id).await?;

        // 2. MessagePusher に送信チャンネルを登録
        self.message_pusher.register_client(id, sender).await;

        tracing::info!("Connection '{}' registered in the default room", id);
        Ok(())
    }
}
