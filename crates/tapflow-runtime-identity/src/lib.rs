//! Unique-id provisioning for Tapflow runtime surfaces.
//!
//! The script editor never mints its own identifiers; every task and node
//! id comes from an [`IdProvider`] supplied by the host. The provider is
//! asynchronous because the production implementation lives behind an IPC
//! boundary, and it may fail — callers propagate that failure instead of
//! inventing a fallback id.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by an id provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The backing id service could not be reached or refused the request.
    #[error("Id provider unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias using IdentityError
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Source of globally unique, monotonic-ish identifiers.
///
/// Implementations must be safe to share across surfaces; the editor holds
/// the provider behind an `Arc`.
#[async_trait]
pub trait IdProvider: Send + Sync {
    /// Generate one fresh identifier.
    async fn generate_id(&self) -> Result<String>;
}

/// Default provider backed by UUID v4.
#[derive(Debug, Default)]
pub struct UuidProvider;

#[async_trait]
impl IdProvider for UuidProvider {
    async fn generate_id(&self) -> Result<String> {
        Ok(uuid::Uuid::new_v4().to_string())
    }
}

/// Deterministic provider producing `prefix-1`, `prefix-2`, ...
///
/// Useful in tests and offline tooling where stable ids matter more than
/// global uniqueness.
#[derive(Debug)]
pub struct SequentialProvider {
    prefix: String,
    next: AtomicU64,
}

impl SequentialProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialProvider {
    fn default() -> Self {
        Self::new("id")
    }
}

#[async_trait]
impl IdProvider for SequentialProvider {
    async fn generate_id(&self) -> Result<String> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Ok(format!("{}-{}", self.prefix, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uuid_provider_yields_unique_ids() {
        let provider = UuidProvider;
        let a = provider.generate_id().await.unwrap();
        let b = provider.generate_id().await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn sequential_provider_counts_up() {
        let provider = SequentialProvider::new("node");
        assert_eq!(provider.generate_id().await.unwrap(), "node-1");
        assert_eq!(provider.generate_id().await.unwrap(), "node-2");
        assert_eq!(provider.generate_id().await.unwrap(), "node-3");
    }
}
