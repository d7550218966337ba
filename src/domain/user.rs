use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
            email,
            created_at: Utc::now(),
        }
    }
}

/// Stored as a sha256 hex digest; the plaintext key is only ever disclosed
/// once, at creation, in the `POST /api/v1/users` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub user_id: Uuid,
    pub key_hash: String,
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    pub fn new(user_id: Uuid, key_hash: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            key_hash,
            created_at: Utc::now(),
        }
    }
}
