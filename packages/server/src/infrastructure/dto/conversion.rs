//! Conversion logic between DTOs and domain entities.

use kangaroo_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, FileArtifact, RoomSnapshot};
use crate::infrastructure::dto::{
    http::RoomSummaryDto,
    websocket::{ChatFrame, FileResultFrame, FrameType},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for ChatFrame {
    fn from(model: ChatMessage) -> Self {
        Self {
            username: model.username,
            message: model.message,
            calculation: model.calculation,
        }
    }
}

impl From<FileArtifact> for FileResultFrame {
    fn from(model: FileArtifact) -> Self {
        Self {
            r#type: FrameType::FileResult,
            filename: model.filename,
            content: String::from_utf8_lossy(&model.content).into_owned(),
            download_url: model.download_url,
        }
    }
}

impl From<RoomSnapshot> for RoomSummaryDto {
    fn from(model: RoomSnapshot) -> Self {
        Self {
            name: model.name.into_string(),
            member_count: model.member_count,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}
