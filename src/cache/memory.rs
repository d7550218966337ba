use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::BalanceCache;

#[derive(Default)]
pub struct MemoryBalanceCache {
    entries: Mutex<HashMap<Uuid, (i64, DateTime<Utc>)>>,
}

impl MemoryBalanceCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceCache for MemoryBalanceCache {
    async fn get_balance(&self, account_id: Uuid) -> Option<(i64, DateTime<Utc>)> {
        self.entries.lock().unwrap().get(&account_id).copied()
    }

    async fn set_balance(&self, account_id: Uuid, balance: i64, updated_at: DateTime<Utc>) {
        self.entries
            .lock()
            .unwrap()
            .insert(account_id, (balance, updated_at));
    }
}
