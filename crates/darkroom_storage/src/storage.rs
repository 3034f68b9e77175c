//! Storage backend trait.

use async_trait::async_trait;
use darkroom_error::DarkroomResult;

/// Trait for pluggable media storage backends.
///
/// Keys are relative, `/`-separated paths produced by a naming strategy.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Write `data` under `key`, replacing any previous content.
    ///
    /// Returns the number of bytes written.
    async fn put(&self, key: &str, data: &[u8]) -> DarkroomResult<u64>;

    /// Read the content stored under `key`.
    async fn get(&self, key: &str) -> DarkroomResult<Vec<u8>>;

    /// Remove the content stored under `key`.
    async fn delete(&self, key: &str) -> DarkroomResult<()>;

    /// Whether content is stored under `key`.
    async fn exists(&self, key: &str) -> DarkroomResult<bool>;

    /// Move content from one key to another.
    ///
    /// Fails if the destination is already occupied.
    async fn relocate(&self, from: &str, to: &str) -> DarkroomResult<()>;
}
