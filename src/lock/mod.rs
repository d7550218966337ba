pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

/// Named, time-bounded exclusion lease over a shared store. Provides
/// mutual exclusion under normal operation, not fencing — it is an
/// optimization to avoid wasted ledger posts on racing retries, never the
/// sole guard against a double-spend. That guard is the journal's
/// `UNIQUE(reference, account_id)` constraint.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Atomic test-and-set with expiry. `true` on success, `false` if
    /// already held. A store error surfaces to the caller as `LockError`.
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<bool, LockError>;

    /// Best-effort deletion; idempotent. Errors are logged and swallowed by
    /// the caller.
    async fn release(&self, key: &str);

    /// Best-effort refresh.
    async fn extend(&self, key: &str, ttl: Duration);
}

#[derive(Debug, thiserror::Error)]
#[error("lock store error: {0}")]
pub struct LockError(pub String);
