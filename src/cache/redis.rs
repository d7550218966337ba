use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BalanceCache, BALANCE_CACHE_TTL_SECONDS};

#[derive(Serialize, Deserialize)]
struct CachedBalance {
    balance: i64,
    updated_at: DateTime<Utc>,
}

fn key(account_id: Uuid) -> String {
    format!("account:balance:{account_id}")
}

pub struct RedisBalanceCache {
    conn: ConnectionManager,
}

impl RedisBalanceCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl BalanceCache for RedisBalanceCache {
    async fn get_balance(&self, account_id: Uuid) -> Option<(i64, DateTime<Utc>)> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key(account_id)).await.ok()?;
        let raw = raw?;
        let cached: CachedBalance = serde_json::from_str(&raw).ok()?;
        Some((cached.balance, cached.updated_at))
    }

    async fn set_balance(&self, account_id: Uuid, balance: i64, updated_at: DateTime<Utc>) {
        let mut conn = self.conn.clone();
        let payload = match serde_json::to_string(&CachedBalance { balance, updated_at }) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize balance cache entry");
                return;
            }
        };

        let result: redis::RedisResult<()> = conn
            .set_ex(key(account_id), payload, BALANCE_CACHE_TTL_SECONDS)
            .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, %account_id, "failed to write balance cache entry");
        }
    }
}
