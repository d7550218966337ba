pub mod memory;
pub mod redis;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Short-TTL read-through cache for balance queries. Never authoritative:
/// a cache-store error collapses to a miss, and writers must not use a
/// cached value to enforce `balance >= amount`.
#[async_trait]
pub trait BalanceCache: Send + Sync {
    async fn get_balance(&self, account_id: Uuid) -> Option<(i64, DateTime<Utc>)>;

    /// Best-effort write with a 60s TTL. Failure is logged and swallowed by
    /// the caller, never propagated as a fatal error.
    async fn set_balance(&self, account_id: Uuid, balance: i64, updated_at: DateTime<Utc>);
}

pub const BALANCE_CACHE_TTL_SECONDS: u64 = 60;
