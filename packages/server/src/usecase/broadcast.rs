//! UseCase: ルーム単位のブロードキャスト
//!
//! ## 設計ノート
//!
//! 送信要求は複数の接続タスクから共有キュー（unbounded mpsc）に積まれ、
//! 単一の [`BroadcastDispatcher`] タスクが順に取り出してルームメンバーへ配信する。
//! キューは無制限で、ドロップポリシーは持たない。
//!
//! 書き込みに失敗したメンバーはその場でディレクトリと MessagePusher から削除され、
//! 残りのメンバーへの配信は継続する。ディレクトリには登録済みだが送信チャンネルが
//! まだ紐付いていない接続（接続処理の途中）は削除せずに読み飛ばす。

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, RoomDirectory, RoomName};

use super::error::BroadcastError;

/// One queued "send to every member of `room`" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub room: RoomName,
    pub payload: String,
}

/// Producer side of the broadcast queue. Cheap to clone.
#[derive(Clone)]
pub struct BroadcastHub {
    queue: mpsc::UnboundedSender<Outgoing>,
}

impl BroadcastHub {
    /// Create the hub together with its single dispatcher.
    ///
    /// The dispatcher does nothing until it is driven with
    /// [`BroadcastDispatcher::run`] or [`BroadcastDispatcher::spawn`].
    pub fn new(
        directory: Arc<dyn RoomDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> (Self, BroadcastDispatcher) {
        let (queue, inbox) = mpsc::unbounded_channel();
        let dispatcher = BroadcastDispatcher {
            inbox,
            directory,
            message_pusher,
        };
        (Self { queue }, dispatcher)
    }

    /// Enqueue `payload` for every current member of `room`.
    ///
    /// Fails only once the dispatcher has stopped.
    pub fn publish(&self, room: RoomName, payload: String) -> Result<(), BroadcastError> {
        self.queue
            .send(Outgoing { room, payload })
            .map_err(|_| BroadcastError::QueueClosed)
    }
}

/// Consumer side of the broadcast queue.
pub struct BroadcastDispatcher {
    inbox: mpsc::UnboundedReceiver<Outgoing>,
    directory: Arc<dyn RoomDirectory>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastDispatcher {
    /// Run the dispatcher on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drain the queue until every [`BroadcastHub`] handle is dropped.
    pub async fn run(mut self) {
        tracing::debug!("Broadcast dispatcher started");
        while let Some(outgoing) = self.inbox.recv().await {
            self.fan_out(&outgoing).await;
        }
        tracing::info!("Broadcast dispatcher stopped");
    }

    /// Deliver one message to the members of its room.
    ///
    /// Returns the number of members that accepted the frame.
    pub async fn fan_out(&self, outgoing: &Outgoing) -> usize {
        let members = self.directory.members_of(&outgoing.room).await;
        let mut delivered = 0;

        for member in members {
            match self
                .message_pusher
                .push_to(&member, &outgoing.payload)
                .await
            {
                Ok(()) => delivered += 1,
                // Registered in the directory but its channel is not attached yet.
                Err(MessagePushError::ClientNotFound(_)) => {
                    tracing::debug!(
                        "Skipping connection '{}' in room '{}': still attaching",
                        member,
                        outgoing.room
                    );
                }
                Err(e @ MessagePushError::PushFailed(_)) => {
                    tracing::warn!(
                        "Dropping connection '{}' from room '{}': {}",
                        member,
                        outgoing.room,
                        e
                    );
                    self.evict(&member).await;
                }
            }
        }

        tracing::debug!(
            "Broadcast to room '{}' delivered to {} member(s)",
            outgoing.room,
            delivered
        );
        delivered
    }

    async fn evict(&self, member: &ConnectionId) {
        self.message_pusher.unregister_client(member).await;
        self.directory.unregister(member).await;
    }
}
