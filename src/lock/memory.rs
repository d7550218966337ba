use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{DistributedLock, LockError};

#[derive(Default)]
pub struct MemoryLock {
    held: Mutex<HashMap<String, Instant>>,
}

impl MemoryLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DistributedLock for MemoryLock {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<bool, LockError> {
        let mut held = self.held.lock().unwrap();
        let now = Instant::now();

        if let Some(expires_at) = held.get(key) {
            if *expires_at > now {
                return Ok(false);
            }
        }

        held.insert(key.to_string(), now + ttl);
        Ok(true)
    }

    async fn release(&self, key: &str) {
        self.held.lock().unwrap().remove(key);
    }

    async fn extend(&self, key: &str, ttl: Duration) {
        if let Some(expires_at) = self.held.lock().unwrap().get_mut(key) {
            *expires_at = Instant::now() + ttl;
        }
    }
}
