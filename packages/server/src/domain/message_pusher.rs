//! Outbound delivery trait.
//!
//! Abstracts "send this serialized frame to that connection" so use cases do
//! not depend on the WebSocket plumbing.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// Channel feeding one connection's socket writer task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Attach the outbound channel for a connection.
    async fn register_client(&self, id: ConnectionId, sender: PusherChannel);

    /// Drop the outbound channel for a connection.
    async fn unregister_client(&self, id: &ConnectionId);

    /// Send a frame to one connection.
    async fn push_to(&self, id: &ConnectionId, content: &str) -> Result<(), MessagePushError>;
}
