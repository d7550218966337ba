use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::UserStore;
use crate::domain::{ApiKey, User};
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    emails: HashMap<String, Uuid>,
    keys_by_hash: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.emails.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.users.get(&id).cloned().ok_or(AppError::UserNotFound)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.emails.contains_key(email))
    }

    async fn create_api_key(&self, key: &ApiKey) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.keys_by_hash.insert(key.key_hash.clone(), key.user_id);
        Ok(())
    }

    async fn get_user_by_key_hash(&self, key_hash: &str) -> Result<User, AppError> {
        let inner = self.inner.lock().unwrap();
        let user_id = inner
            .keys_by_hash
            .get(key_hash)
            .copied()
            .ok_or(AppError::UserNotFound)?;
        inner.users.get(&user_id).cloned().ok_or(AppError::UserNotFound)
    }
}
