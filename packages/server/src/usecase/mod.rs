//! UseCase layer.
//!
//! Application operations composed from the domain traits. Transport details
//! (socket frames, JSON shapes) stay in the UI and infrastructure layers.

mod broadcast;
mod calculate;
mod connect_participant;
mod disconnect_participant;
mod error;
mod file_relay;
mod get_rooms;
mod manage_room;
mod send_message;

pub use broadcast::{BroadcastDispatcher, BroadcastHub, Outgoing};
pub use calculate::CalculateUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{BroadcastError, ConnectError, FileRelayError, SendMessageError};
pub use file_relay::{FileRelayUseCase, MODIFIED_PREFIX, SERVER_APPENDED_LINE};
pub use get_rooms::GetRoomsUseCase;
pub use manage_room::ManageRoomUseCase;
pub use send_message::{ChatDelivery, SendMessageUseCase};
