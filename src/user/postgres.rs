use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::UserStore;
use crate::domain::{ApiKey, User};
use crate::error::AppError;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, AppError> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, AppError> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::UserNotFound)?;

        row_to_user(&row)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create_api_key(&self, key: &ApiKey) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO api_keys (id, user_id, key_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(key.id)
        .bind(key.user_id)
        .bind(&key.key_hash)
        .bind(key.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_user_by_key_hash(&self, key_hash: &str) -> Result<User, AppError> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.name, u.email, u.created_at
            FROM users u
            JOIN api_keys k ON k.user_id = u.id
            WHERE k.key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::UserNotFound)?;

        row_to_user(&row)
    }
}
