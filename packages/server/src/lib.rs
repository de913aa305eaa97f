//! Room-scoped WebSocket relay.
//!
//! Clients chat, request arithmetic evaluation and exchange files through a
//! central hub, partitioned into passcode-protected rooms.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
