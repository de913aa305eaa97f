//! Server state shared by every connection.

use std::sync::Arc;

use crate::{
    domain::{FileStore, MessagePusher, RoomDirectory},
    usecase::{
        BroadcastDispatcher, BroadcastHub, CalculateUseCase, ConnectParticipantUseCase,
        DisconnectParticipantUseCase, FileRelayUseCase, GetRoomsUseCase, ManageRoomUseCase,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（チャット送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// ManageRoomUseCase（ルーム操作のユースケース）
    pub manage_room_usecase: Arc<ManageRoomUseCase>,
    /// CalculateUseCase（計算のユースケース）
    pub calculate_usecase: CalculateUseCase,
    /// FileRelayUseCase（ファイル中継のユースケース）
    pub file_relay_usecase: Arc<FileRelayUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
}

impl AppState {
    /// Wire every use case to the given collaborators.
    ///
    /// The returned dispatcher must be driven exactly once for broadcasts to
    /// be delivered.
    pub fn new(
        directory: Arc<dyn RoomDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
        file_store: Arc<dyn FileStore>,
        public_url: &str,
    ) -> (Self, BroadcastDispatcher) {
        let (hub, dispatcher) = BroadcastHub::new(directory.clone(), message_pusher.clone());

        let state = Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                directory.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                directory.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                directory.clone(),
                message_pusher,
                hub,
            )),
            manage_room_usecase: Arc::new(ManageRoomUseCase::new(directory.clone())),
            calculate_usecase: CalculateUseCase::new(),
            file_relay_usecase: Arc::new(FileRelayUseCase::new(file_store, public_url)),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(directory)),
        };
        (state, dispatcher)
    }
}
