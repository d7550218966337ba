pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{ApiKey, User};
use crate::error::AppError;

/// Relational store for users and their API keys. Narrow on purpose —
/// the coordinator never touches these tables; only `UserService` does.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), AppError>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<User, AppError>;
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
    async fn create_api_key(&self, key: &ApiKey) -> Result<(), AppError>;
    async fn get_user_by_key_hash(&self, key_hash: &str) -> Result<User, AppError>;
}

fn hash_key(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    hex::encode(digest)
}

fn generate_plaintext_key() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Registration and API-key issuance/verification. Keys are 32 random
/// bytes, hex-encoded; only their sha256 digest is ever persisted.
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, name: String, email: String) -> Result<(User, String), AppError> {
        if self.store.email_exists(&email).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        let user = User::new(name, email);
        self.store.create_user(&user).await?;

        let plaintext = generate_plaintext_key();
        let key = ApiKey::new(user.id, hash_key(&plaintext));
        self.store.create_api_key(&key).await?;

        Ok((user, plaintext))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.store.get_user_by_id(id).await
    }

    pub async fn authenticate(&self, plaintext_key: &str) -> Result<User, AppError> {
        let key_hash = hash_key(plaintext_key);
        self.store
            .get_user_by_key_hash(&key_hash)
            .await
            .map_err(|_| AppError::Unauthorized)
    }
}
