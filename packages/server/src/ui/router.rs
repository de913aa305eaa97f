//! Per-connection message routing.
//!
//! Each inbound text frame is decoded into an [`ActionRequest`] and handed to
//! the matching use case. Everything addressed to the sender goes through the
//! same outbound channel as room broadcasts, so a connection observes one
//! ordered stream.

use std::sync::Arc;

use axum::extract::ws::Message;
use serde::Serialize;

use crate::{
    domain::{ChatMessage, ConnectionId},
    infrastructure::dto::websocket::{
        ActionKind, ActionRequest, ChatFrame, DecodeError, FileResultFrame,
    },
    ui::state::AppState,
    usecase::{ChatDelivery, SendMessageUseCase},
};

/// Lifecycle of a router. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Open,
    Closed,
}

/// Routes the frames of one connection.
///
/// Owns nothing but the identity of its connection; all shared state lives
/// behind the use cases in [`AppState`].
pub struct MessageRouter {
    id: ConnectionId,
    app: Arc<AppState>,
    state: RouterState,
}

impl MessageRouter {
    pub fn new(id: ConnectionId, app: Arc<AppState>) -> Self {
        Self {
            id,
            app,
            state: RouterState::Open,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    /// Mark the router closed after a read failure.
    pub fn close(&mut self) {
        self.state = RouterState::Closed;
    }

    /// Handle one WebSocket frame and report the resulting state.
    pub async fn handle_message(&mut self, message: Message) -> RouterState {
        if self.state == RouterState::Closed {
            return self.state;
        }

        match message {
            Message::Text(text) => self.handle_text(text.as_str()).await,
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", self.id);
                self.close();
            }
            Message::Ping(_) => {
                // Ping/pong is handled automatically by the WebSocket protocol
                tracing::trace!("Received ping from '{}'", self.id);
            }
            Message::Binary(_) | Message::Pong(_) => {}
        }
        self.state
    }

    /// Decode and dispatch one text payload.
    ///
    /// Malformed payloads are answered with an error message to the sender and
    /// never close the connection.
    pub async fn handle_text(&self, text: &str) {
        tracing::debug!("Received from '{}': {}", self.id, text);

        match ActionRequest::decode(text) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => self.reject(e).await,
        }
    }

    async fn dispatch(&self, request: ActionRequest) {
        tracing::debug!("Routing '{}' action from '{}'", request.kind(), self.id);

        match request {
            ActionRequest::Chat {
                username,
                message,
                calculation,
            } => {
                let message = ChatMessage::new(username, message).with_calculation(calculation);
                self.deliver(SendMessageUseCase::plan(message)).await;
            }
            ActionRequest::LegacyChat { username, message } => {
                let message = SendMessageUseCase::plan_legacy(username, message);
                self.deliver(ChatDelivery::ToRoom(message)).await;
            }
            ActionRequest::Calculate { calculation } => {
                let reply = self.app.calculate_usecase.execute(&calculation);
                self.reply(reply).await;
            }
            ActionRequest::FileUpload { filename, data } => {
                match self.app.file_relay_usecase.relay(&filename, data).await {
                    Ok(artifact) => self.send(&FileResultFrame::from(artifact)).await,
                    // Storage failures are not reported to the client
                    Err(e) => tracing::error!(
                        "Failed to relay file '{}' from '{}': {}",
                        filename,
                        self.id,
                        e
                    ),
                }
            }
            ActionRequest::CreateRoom {
                room_name,
                passcode,
            } => {
                let result = self
                    .app
                    .manage_room_usecase
                    .create(&self.id, room_name, passcode)
                    .await;
                self.reply_room_result(result).await;
            }
            ActionRequest::JoinRoom {
                room_name,
                passcode,
            } => {
                let result = self
                    .app
                    .manage_room_usecase
                    .join(&self.id, &room_name, &passcode)
                    .await;
                self.reply_room_result(result).await;
            }
            ActionRequest::LeaveRoom => {
                let result = self.app.manage_room_usecase.leave(&self.id).await;
                self.reply_room_result(result).await;
            }
        }
    }

    async fn reject(&self, error: DecodeError) {
        tracing::warn!("Rejected payload from '{}': {}", self.id, error);

        let reply = match error.action {
            ActionKind::Calculate => self.app.calculate_usecase.invalid_format(),
            _ => ChatMessage::system(format!("Invalid request: {}", error.reason)),
        };
        self.reply(reply).await;
    }

    async fn deliver(&self, delivery: ChatDelivery) {
        match delivery {
            ChatDelivery::ToSender(messages) => {
                for message in messages {
                    self.reply(message).await;
                }
            }
            ChatDelivery::ToRoom(message) => {
                let Some(payload) = encode(&ChatFrame::from(message)) else {
                    return;
                };
                if let Err(e) = self
                    .app
                    .send_message_usecase
                    .broadcast(&self.id, payload)
                    .await
                {
                    tracing::warn!("Failed to broadcast from '{}': {}", self.id, e);
                }
            }
        }
    }

    async fn reply_room_result<E: std::fmt::Display>(&self, result: Result<String, E>) {
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Room action from '{}' failed: {}", self.id, e);
                e.to_string()
            }
        };
        self.reply(ChatMessage::system(text)).await;
    }

    async fn reply(&self, message: ChatMessage) {
        self.send(&ChatFrame::from(message)).await;
    }

    async fn send<T: Serialize>(&self, frame: &T) {
        let Some(payload) = encode(frame) else {
            return;
        };
        if let Err(e) = self.app.send_message_usecase.reply(&self.id, &payload).await {
            tracing::warn!("Failed to reply to '{}': {}", self.id, e);
        }
    }
}

fn encode<T: Serialize>(frame: &T) -> Option<String> {
    serde_json::to_string(frame)
        .map_err(|e| tracing::error!("Failed to serialize frame: {}", e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomDirectory, RoomName},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomDirectory,
            storage::LocalFileStore,
        },
    };
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 各アクションのルーティングと送信者への返信
    // - ルーム単位の配信（他のルームには届かない）
    // - 不正なペイロードへのエラー返信と、接続が閉じないこと
    // - Close フレームでの状態遷移
    // ========================================

    struct Harness {
        app: Arc<AppState>,
        directory: Arc<InMemoryRoomDirectory>,
        files: tempfile::TempDir,
    }

    struct Client {
        router: MessageRouter,
        rx: mpsc::UnboundedReceiver<String>,
    }

    impl Client {
        async fn send(&mut self, payload: Value) {
            self.router.handle_text(&payload.to_string()).await;
        }

        async fn recv(&mut self) -> Value {
            let text = self.rx.recv().await.unwrap();
            serde_json::from_str(&text).unwrap()
        }

        fn assert_silent(&mut self) {
            assert!(self.rx.try_recv().is_err());
        }
    }

    impl Harness {
        fn new() -> Self {
            let directory = Arc::new(InMemoryRoomDirectory::new());
            let pusher = Arc::new(WebSocketMessagePusher::new());
            let files = tempfile::tempdir().unwrap();
            let store = Arc::new(LocalFileStore::new(files.path()));
            let (app, dispatcher) =
                AppState::new(directory.clone(), pusher, store, "http://localhost:8080");
            dispatcher.spawn();
            Self {
                app: Arc::new(app),
                directory,
                files,
            }
        }

        async fn connect(&self) -> Client {
            let id = ConnectionId::generate();
            let (tx, rx) = mpsc::unbounded_channel();
            self.app
                .connect_participant_usecase
                .execute(id, tx)
                .await
                .unwrap();
            Client {
                router: MessageRouter::new(id, self.app.clone()),
                rx,
            }
        }
    }

    fn system(message: &str) -> Value {
        json!({"username": "Kangaroo", "message": message})
    }

    #[tokio::test]
    async fn test_hello_is_answered_to_sender_only() {
        // テスト項目: "Hello from Client alice" は alice にだけ 2 フレーム返り、他には届かない
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;
        let mut bob = harness.connect().await;

        // when (操作):
        alice
            .send(json!({"action": "chat", "username": "alice", "message": "Hello from Client alice"}))
            .await;

        // then (期待する結果):
        assert_eq!(
            alice.recv().await,
            json!({"username": "alice", "message": "Hello from Client alice"})
        );
        assert_eq!(alice.recv().await, system("Hello from Server Kangaroo"));
        // 後続の通常メッセージで順序を確認し、bob には挨拶が届いていないことを確かめる
        alice
            .send(json!({"action": "chat", "username": "alice", "message": "next"}))
            .await;
        assert_eq!(
            bob.recv().await,
            json!({"username": "alice", "message": "next"})
        );
        assert_eq!(
            alice.recv().await,
            json!({"username": "alice", "message": "next"})
        );
    }

    #[tokio::test]
    async fn test_bye_keeps_connection_open() {
        // テスト項目: "Bye from Client bob" はエコーと別れの挨拶を返し、接続は開いたまま
        // given (前提条件):
        let harness = Harness::new();
        let mut bob = harness.connect().await;

        // when (操作):
        bob.send(json!({"action": "chat", "username": "bob", "message": "Bye from Client bob"}))
            .await;

        // then (期待する結果):
        assert_eq!(
            bob.recv().await,
            json!({"username": "bob", "message": "Bye from Client bob"})
        );
        assert_eq!(
            bob.recv().await,
            system("Goodbye! (Refresh the page to establish a new connection with the server)")
        );
        assert_eq!(bob.router.state(), RouterState::Open);
    }

    #[tokio::test]
    async fn test_chat_is_broadcast_with_calculation_echo() {
        // テスト項目: 通常のチャットは calculation を含めてルーム全員に配信される
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;
        let mut bob = harness.connect().await;

        // when (操作):
        alice
            .send(json!({"action": "chat", "username": "alice", "message": "look", "calculation": "1+1"}))
            .await;

        // then (期待する結果):
        let expected = json!({"username": "alice", "message": "look", "calculation": "1+1"});
        assert_eq!(alice.recv().await, expected);
        assert_eq!(bob.recv().await, expected);
    }

    #[tokio::test]
    async fn test_rooms_isolate_broadcasts() {
        // テスト項目: ルームに入ると、そのルームの配信だけを受け取る
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;
        let mut bob = harness.connect().await;
        let mut carol = harness.connect().await;

        alice
            .send(json!({"action": "create_room", "roomName": "lab", "passcode": "p"}))
            .await;
        assert_eq!(alice.recv().await, system("Room 'lab' created successfully."));
        for client in [&mut alice, &mut bob] {
            client
                .send(json!({"action": "join_room", "roomName": "lab", "passcode": "p"}))
                .await;
            assert_eq!(client.recv().await, system("Joined room 'lab'."));
        }

        // when (操作):
        alice
            .send(json!({"action": "chat", "username": "alice", "message": "in lab"}))
            .await;
        carol
            .send(json!({"action": "chat", "username": "carol", "message": "in default"}))
            .await;

        // then (期待する結果):
        let in_lab = json!({"username": "alice", "message": "in lab"});
        let in_default = json!({"username": "carol", "message": "in default"});
        assert_eq!(alice.recv().await, in_lab);
        assert_eq!(bob.recv().await, in_lab);
        assert_eq!(carol.recv().await, in_default);
        alice.assert_silent();
        bob.assert_silent();
    }

    #[tokio::test]
    async fn test_room_errors_are_replied() {
        // テスト項目: ルーム操作の失敗はエラー文として送信者に返る
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;
        alice
            .send(json!({"action": "create_room", "roomName": "lab", "passcode": "p"}))
            .await;
        alice.recv().await;

        // when (操作) / then (期待する結果):
        alice
            .send(json!({"action": "create_room", "roomName": "lab", "passcode": "q"}))
            .await;
        assert_eq!(alice.recv().await, system("Room 'lab' already exists."));

        alice
            .send(json!({"action": "join_room", "roomName": "lab", "passcode": "nope"}))
            .await;
        assert_eq!(alice.recv().await, system("Incorrect passcode for room 'lab'."));

        alice
            .send(json!({"action": "join_room", "roomName": "attic", "passcode": ""}))
            .await;
        assert_eq!(alice.recv().await, system("Room 'attic' does not exist."));

        alice.send(json!({"action": "leave_room"})).await;
        assert_eq!(
            alice.recv().await,
            system("You are already in the default room.")
        );
        assert_eq!(
            harness.directory.room_of(&alice.router.connection_id()).await,
            Some(RoomName::default_room())
        );
    }

    #[tokio::test]
    async fn test_calculate_replies_to_sender() {
        // テスト項目: 計算結果は送信者にだけ返る
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;
        let mut bob = harness.connect().await;

        // when (操作):
        alice
            .send(json!({"action": "calculate", "calculation": "2 + 3 * 4"}))
            .await;
        alice
            .send(json!({"action": "calculate", "calculation": "4 / 0"}))
            .await;
        alice.send(json!({"action": "calculate"})).await;

        // then (期待する結果):
        assert_eq!(alice.recv().await, system("Result: 2 + 3 * 4 = 14.00"));
        assert_eq!(
            alice.recv().await,
            system("Invalid calculation: division by zero")
        );
        assert_eq!(
            alice.recv().await,
            system("Invalid calculation request format.")
        );
        bob.assert_silent();
    }

    #[tokio::test]
    async fn test_legacy_payloads() {
        // テスト項目: action のない旧形式のペイロードが計算・歓迎・チャットに振り分けられる
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;
        let mut bob = harness.connect().await;

        // when (操作) / then (期待する結果):
        alice
            .send(json!({"message": "calculate", "calculation": "sin(0)"}))
            .await;
        assert_eq!(alice.recv().await, system("Result: sin(0) = 0.00"));

        alice
            .send(json!({"username": "alice", "message": "joined"}))
            .await;
        assert_eq!(alice.recv().await, system("Welcome alice!"));
        assert_eq!(bob.recv().await, system("Welcome alice!"));

        bob.send(json!({"message": "plain"})).await;
        let expected = json!({"username": "Anonymous", "message": "plain"});
        assert_eq!(alice.recv().await, expected);
        assert_eq!(bob.recv().await, expected);
    }

    #[tokio::test]
    async fn test_file_upload_round_trip() {
        // テスト項目: アップロードしたファイルが保存され、加工済みファイルの情報が返る
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;

        // when (操作):
        alice
            .send(json!({"action": "file_upload", "filename": "a.txt", "data": [104, 105]}))
            .await;

        // then (期待する結果):
        assert_eq!(
            alice.recv().await,
            json!({
                "type": "file_result",
                "filename": "modified_a.txt",
                "content": "hi\nThis is an added line from the server.",
                "downloadUrl": "http://localhost:8080/files/modified_a.txt",
            })
        );
        let dir = harness.files.path();
        assert_eq!(std::fs::read(dir.join("a.txt")).unwrap(), b"hi");
        assert_eq!(
            std::fs::read_to_string(dir.join("modified_a.txt")).unwrap(),
            "hi\nThis is an added line from the server."
        );
    }

    #[tokio::test]
    async fn test_invalid_payloads_keep_connection_open() {
        // テスト項目: 不正なペイロードにはエラー文が返り、接続は閉じない
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;

        // when (操作):
        alice.router.handle_text("not json").await;
        alice
            .send(json!({"action": "file_upload", "filename": "../x", "data": [1]}))
            .await;
        let state = alice
            .router
            .handle_message(Message::Text(
                json!({"action": 5}).to_string().into(),
            ))
            .await;

        // then (期待する結果):
        let first = alice.recv().await;
        assert!(
            first["message"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request: malformed JSON")
        );
        assert_eq!(
            alice.recv().await,
            system("Invalid request: invalid filename '../x'")
        );
        assert_eq!(
            alice.recv().await,
            system("Invalid request: field 'action' must be a string")
        );
        assert_eq!(state, RouterState::Open);
    }

    #[tokio::test]
    async fn test_close_frame_closes_router() {
        // テスト項目: Close フレームで Closed になり、以降のフレームは処理されない
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.connect().await;

        // when (操作):
        let state = alice.router.handle_message(Message::Close(None)).await;
        let after = alice
            .router
            .handle_message(Message::Text(
                json!({"action": "calculate", "calculation": "1+1"})
                    .to_string()
                    .into(),
            ))
            .await;

        // then (期待する結果):
        assert_eq!(state, RouterState::Closed);
        assert_eq!(after, RouterState::Closed);
        alice.assert_silent();
    }
}
