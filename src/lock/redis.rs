use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{DistributedLock, LockError};

fn lock_key(key: &str) -> String {
    format!("lock:{key}")
}

pub struct RedisLock {
    conn: ConnectionManager,
}

impl RedisLock {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DistributedLock for RedisLock {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<bool, LockError> {
        let mut conn = self.conn.clone();
        let opts = redis::SetOptions::default()
            .conditional_set(redis::ExistenceCheck::NX)
            .with_expiration(redis::SetExpiry::PX(ttl.as_millis() as u64));

        let result: Option<String> = redis::Cmd::set_options(&lock_key(key), "held", opts)
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError(e.to_string()))?;

        Ok(result.is_some())
    }

    async fn release(&self, key: &str) {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = conn.del(lock_key(key)).await;
        if let Err(e) = result {
            tracing::warn!(error = %e, %key, "failed to release lock");
        }
    }

    async fn extend(&self, key: &str, ttl: Duration) {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = conn.expire(lock_key(key), ttl.as_secs() as i64).await;
        if let Err(e) = result {
            tracing::warn!(error = %e, %key, "failed to extend lock");
        }
    }
}
