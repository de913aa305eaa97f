//! Persistence collaborator for uploaded files.

use async_trait::async_trait;

use super::StorageError;

/// Byte-addressable store keyed by plain file name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;
}
