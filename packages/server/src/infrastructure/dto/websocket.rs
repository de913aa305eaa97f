//! WebSocket message DTOs.
//!
//! Inbound payloads are parsed as a generic JSON object first and then
//! validated field by field into an [`ActionRequest`]; older clients that
//! never send an `action` tag are still accepted.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{Passcode, RoomName, ValueObjectError};

/// Which action a payload was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Chat,
    Calculate,
    FileUpload,
    CreateRoom,
    JoinRoom,
    LeaveRoom,
    Legacy,
    Unknown,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Chat => "chat",
            ActionKind::Calculate => "calculate",
            ActionKind::FileUpload => "file_upload",
            ActionKind::CreateRoom => "create_room",
            ActionKind::JoinRoom => "join_room",
            ActionKind::LeaveRoom => "leave_room",
            ActionKind::Legacy => "legacy",
            ActionKind::Unknown => "unknown",
        }
    }

    /// Tags not listed here are handled as chat.
    fn from_tag(tag: &str) -> Self {
        match tag {
            "calculate" => ActionKind::Calculate,
            "file_upload" => ActionKind::FileUpload,
            "create_room" => ActionKind::CreateRoom,
            "join_room" => ActionKind::JoinRoom,
            "leave_room" => ActionKind::LeaveRoom,
            _ => ActionKind::Chat,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeReason {
    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("data[{index}] is not a byte (0-255)")]
    InvalidByte { index: usize },

    #[error("invalid filename '{0}'")]
    InvalidFilename(String),

    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),
}

/// A payload that failed validation, tagged with the action it was meant for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {action} request: {reason}")]
pub struct DecodeError {
    pub action: ActionKind,
    pub reason: DecodeReason,
}

impl DecodeError {
    fn new(action: ActionKind, reason: impl Into<DecodeReason>) -> Self {
        Self {
            action,
            reason: reason.into(),
        }
    }
}

/// One validated inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    Chat {
        username: String,
        message: String,
        calculation: Option<String>,
    },
    Calculate {
        calculation: String,
    },
    FileUpload {
        filename: String,
        data: Vec<u8>,
    },
    CreateRoom {
        room_name: RoomName,
        passcode: Passcode,
    },
    JoinRoom {
        room_name: RoomName,
        passcode: String,
    },
    LeaveRoom,
    /// Payload without an `action` tag.
    LegacyChat {
        username: Option<String>,
        message: String,
    },
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::Chat { .. } => ActionKind::Chat,
            ActionRequest::Calculate { .. } => ActionKind::Calculate,
            ActionRequest::FileUpload { .. } => ActionKind::FileUpload,
            ActionRequest::CreateRoom { .. } => ActionKind::CreateRoom,
            ActionRequest::JoinRoom { .. } => ActionKind::JoinRoom,
            ActionRequest::LeaveRoom => ActionKind::LeaveRoom,
            ActionRequest::LegacyChat { .. } => ActionKind::Legacy,
        }
    }

    /// Decode one text frame.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| DecodeError::new(ActionKind::Unknown, DecodeReason::Json(e.to_string())))?;
        let fields = value
            .as_object()
            .ok_or_else(|| DecodeError::new(ActionKind::Unknown, DecodeReason::NotAnObject))?;

        match fields.get("action") {
            Some(Value::String(tag)) => {
                let kind = ActionKind::from_tag(tag);
                Self::decode_action(kind, fields).map_err(|reason| DecodeError::new(kind, reason))
            }
            Some(_) => Err(DecodeError::new(
                ActionKind::Unknown,
                DecodeReason::WrongType {
                    field: "action",
                    expected: "a string",
                },
            )),
            None => Self::decode_legacy(fields),
        }
    }

    fn decode_action(kind: ActionKind, fields: &Map<String, Value>) -> Result<Self, DecodeReason> {
        match kind {
            ActionKind::Calculate => Ok(ActionRequest::Calculate {
                calculation: required_str(fields, "calculation")?,
            }),
            ActionKind::FileUpload => Ok(ActionRequest::FileUpload {
                filename: filename(fields)?,
                data: bytes(fields, "data")?,
            }),
            ActionKind::CreateRoom => {
                let room_name = RoomName::new(required_str(fields, "roomName")?)?;
                let passcode = required_str(fields, "passcode")?;
                if passcode.is_empty() {
                    return Err(DecodeReason::EmptyField("passcode"));
                }
                Ok(ActionRequest::CreateRoom {
                    room_name,
                    passcode: Passcode::new(passcode),
                })
            }
            ActionKind::JoinRoom => Ok(ActionRequest::JoinRoom {
                room_name: RoomName::new(required_str(fields, "roomName")?)?,
                passcode: required_str(fields, "passcode")?,
            }),
            ActionKind::LeaveRoom => Ok(ActionRequest::LeaveRoom),
            ActionKind::Chat | ActionKind::Legacy | ActionKind::Unknown => {
                Ok(ActionRequest::Chat {
                    username: required_str(fields, "username")?,
                    message: required_str(fields, "message")?,
                    calculation: optional_str(fields, "calculation")?,
                })
            }
        }
    }

    /// Older clients put the action name in `message` (`"calculate"`,
    /// `"file_upload"`) or send a bare chat body.
    fn decode_legacy(fields: &Map<String, Value>) -> Result<Self, DecodeError> {
        let message = required_str(fields, "message")
            .map_err(|reason| DecodeError::new(ActionKind::Legacy, reason))?;

        match message.as_str() {
            "calculate" | "file_upload" => {
                let kind = ActionKind::from_tag(&message);
                Self::decode_action(kind, fields).map_err(|reason| DecodeError::new(kind, reason))
            }
            _ => Ok(ActionRequest::LegacyChat {
                username: optional_str(fields, "username")
                    .map_err(|reason| DecodeError::new(ActionKind::Legacy, reason))?,
                message,
            }),
        }
    }
}

fn required_str(fields: &Map<String, Value>, field: &'static str) -> Result<String, DecodeReason> {
    optional_str(fields, field)?.ok_or(DecodeReason::MissingField(field))
}

fn optional_str(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, DecodeReason> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeReason::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// A plain file name: no directories, no `.`/`..`.
fn filename(fields: &Map<String, Value>) -> Result<String, DecodeReason> {
    let name = required_str(fields, "filename")?;
    let is_plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if is_plain {
        Ok(name)
    } else {
        Err(DecodeReason::InvalidFilename(name))
    }
}

fn bytes(fields: &Map<String, Value>, field: &'static str) -> Result<Vec<u8>, DecodeReason> {
    let items = match fields.get(field) {
        None | Some(Value::Null) => return Err(DecodeReason::MissingField(field)),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(DecodeReason::WrongType {
                field,
                expected: "an array of bytes",
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or(DecodeReason::InvalidByte { index })
        })
        .collect()
}

/// Chat or system message sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFrame {
    pub username: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    FileResult,
}

/// Reply to a successful file upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResultFrame {
    pub r#type: FrameType,
    pub filename: String,
    pub content: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}
