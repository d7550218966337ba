use async_trait::async_trait;
use rand::RngCore;
use sqlx::{PgPool, Row};

use super::LedgerGateway;
use crate::domain::Currency;
use crate::error::AppError;

fn new_ledger_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Postgres-backed double-entry engine standing in for the external ledger.
/// The coordinator never queries these tables directly — only through the
/// `LedgerGateway` trait — so swapping this for a real external engine
/// later is a constructor change, not a coordinator change.
pub struct PostgresLedgerGateway {
    pool: PgPool,
}

impl PostgresLedgerGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledger_accounts (
                id TEXT PRIMARY KEY,
                currency_code INTEGER NOT NULL,
                debits_posted BIGINT NOT NULL DEFAULT 0,
                credits_posted BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledger_transfers (
                id TEXT PRIMARY KEY,
                from_id TEXT NOT NULL REFERENCES ledger_accounts(id),
                to_id TEXT NOT NULL REFERENCES ledger_accounts(id),
                amount BIGINT NOT NULL CHECK (amount > 0),
                reference TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_transfers_reference
            ON ledger_transfers(reference)
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerGateway for PostgresLedgerGateway {
    async fn create_account(&self, currency: Currency) -> Result<String, AppError> {
        let id = new_ledger_id();

        sqlx::query(
            r#"
            INSERT INTO ledger_accounts (id, currency_code, debits_posted, credits_posted)
            VALUES ($1, $2, 0, 0)
            "#,
        )
        .bind(&id)
        .bind(currency.code() as i64)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_balance(&self, ledger_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            r#"
            SELECT debits_posted, credits_posted
            FROM ledger_accounts
            WHERE id = $1
            "#,
        )
        .bind(ledger_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::LedgerRejected(format!("unknown ledger account {ledger_id}")))?;

        let debits: i64 = row.try_get("debits_posted")?;
        let credits: i64 = row.try_get("credits_posted")?;

        Ok(credits - debits)
    }

    async fn create_transfer(
        &self,
        from_ledger_id: &str,
        to_ledger_id: &str,
        amount: i64,
        reference: &str,
    ) -> Result<String, AppError> {
        if amount <= 0 {
            return Err(AppError::LedgerRejected("amount must be positive".into()));
        }

        let mut tx = self.pool.begin().await?;

        // Lock both rows for the duration of the post so two concurrent
        // transfers touching the same account never interleave their
        // read-modify-write of debits/credits.
        let locked = sqlx::query(
            r#"
            SELECT id FROM ledger_accounts
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(&[from_ledger_id, to_ledger_id][..])
        .fetch_all(&mut *tx)
        .await?;

        if locked.len() != 2 {
            tx.rollback().await.ok();
            return Err(AppError::LedgerRejected("unknown ledger account".into()));
        }

        sqlx::query("UPDATE ledger_accounts SET debits_posted = debits_posted + $1 WHERE id = $2")
            .bind(amount)
            .bind(from_ledger_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE ledger_accounts SET credits_posted = credits_posted + $1 WHERE id = $2")
            .bind(amount)
            .bind(to_ledger_id)
            .execute(&mut *tx)
            .await?;

        let transfer_id = new_ledger_id();
        sqlx::query(
            r#"
            INSERT INTO ledger_transfers (id, from_id, to_id, amount, reference)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&transfer_id)
        .bind(from_ledger_id)
        .bind(to_ledger_id)
        .bind(amount)
        .bind(reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(transfer_id)
    }
}
