//! UseCase: チャットメッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::plan() / plan_legacy(): 配信先の決定
//! - SendMessageUseCase::reply() / broadcast(): 送信者への返信とルームへの配信
//!
//! ### なぜこのテストが必要か
//! - 挨拶メッセージは送信者だけに返り、他の接続には届かないことを保証
//! - 通常のメッセージは送信者が現在所属するルームにのみ配信されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：挨拶・別れの挨拶・通常メッセージ・旧形式の "joined"
//! - 異常系：未登録の接続からの送信

use std::sync::Arc;

use crate::domain::{ChatMessage, ConnectionId, MessagePusher, RoomDirectory, RoomName};

use super::{broadcast::BroadcastHub, error::SendMessageError};

const GREETING_PREFIX: &str = "Hello from Client ";
const FAREWELL_PREFIX: &str = "Bye from Client ";
const GREETING_REPLY: &str = "Hello from Server Kangaroo";
const FAREWELL_REPLY: &str =
    "Goodbye! (Refresh the page to establish a new connection with the server)";
const ANONYMOUS: &str = "Anonymous";

/// Where a chat message has to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatDelivery {
    /// Frames for the sender only, in order.
    ToSender(Vec<ChatMessage>),
    /// One frame for every member of the sender's room.
    ToRoom(ChatMessage),
}

/// チャットメッセージ送信のユースケース
pub struct SendMessageUseCase {
    directory: Arc<dyn RoomDirectory>,
    message_pusher: Arc<dyn MessagePusher>,
    hub: BroadcastHub,
}

impl SendMessageUseCase {
    pub fn new(
        directory: Arc<dyn RoomDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
        hub: BroadcastHub,
    ) -> Self {
        Self {
            directory,
            message_pusher,
            hub,
        }
    }

    /// 通常のチャットメッセージの配信先を決める
    ///
    /// `"Hello from Client <user>"` と `"Bye from Client <user>"` は送信者へのエコーと
    /// サーバーからの返答になり、それ以外はルームへ配信される。
    pub fn plan(message: ChatMessage) -> ChatDelivery {
        let expected = |prefix: &str| format!("{}{}", prefix, message.username);

        if message.message == expected(GREETING_PREFIX) {
            ChatDelivery::ToSender(vec![message, ChatMessage::system(GREETING_REPLY)])
        } else if message.message == expected(FAREWELL_PREFIX) {
            ChatDelivery::ToSender(vec![message, ChatMessage::system(FAREWELL_REPLY)])
        } else {
            ChatDelivery::ToRoom(message)
        }
    }

    /// `action` を持たない旧形式のチャットを組み立てる
    ///
    /// 本文が `"joined"` の場合はサーバーからの歓迎メッセージになる。
    pub fn plan_legacy(username: Option<String>, message: String) -> ChatMessage {
        let username = username.unwrap_or_else(|| ANONYMOUS.to_string());
        if message == "joined" {
            ChatMessage::system(format!("Welcome {}!", username))
        } else {
            ChatMessage::new(username, message)
        }
    }

    /// 送信者だけにフレームを返す
    pub async fn reply(&self, to: &ConnectionId, payload: &str) -> Result<(), SendMessageError> {
        self.message_pusher.push_to(to, payload).await?;
        Ok(())
    }

    /// 送信者が現在所属するルームへフレームを配信キューに積む
    ///
    /// # Returns
    ///
    /// * `Ok(RoomName)` - 配信先のルーム
    /// * `Err(SendMessageError)` - 未登録の接続、またはキュー停止
    pub async fn broadcast(
        &self,
        from: &ConnectionId,
        payload: String,
    ) -> Result<RoomName, SendMessageError> {
        let room = self
            .directory
            .room_of(from)
            .await
            .ok_or_else(|| SendMessageError::NotInRoom(from.to_string()))?;

        self.hub.publish(room.clone(), payload)?;
        tracing::debug!("Queued broadcast from '{}' to room '{}'", from, room);
        Ok(room)
    }
}
