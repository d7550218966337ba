use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::AccountStore;
use crate::domain::{
    Account, Currency, SystemAccount, Transaction, TransactionStatus, TransactionType,
};
use crate::error::AppError;

pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users(id),
                key_hash TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_api_keys_user_id ON api_keys(user_id)")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users(id),
                ledger_id TEXT NOT NULL UNIQUE,
                currency TEXT NOT NULL,
                balance BIGINT NOT NULL DEFAULT 0 CHECK (balance >= 0),
                version BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_user_id ON accounts(user_id)")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS system_accounts (
                id UUID PRIMARY KEY,
                ledger_id TEXT NOT NULL UNIQUE,
                currency TEXT NOT NULL UNIQUE,
                amount BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id UUID PRIMARY KEY,
                account_id UUID NOT NULL REFERENCES accounts(id),
                reference TEXT NOT NULL,
                amount BIGINT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('deposit', 'transfer', 'withdraw')),
                status TEXT NOT NULL CHECK (status IN ('pending', 'completed', 'failed')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (reference, account_id)
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_account_created
            ON transactions(account_id, created_at DESC, id DESC)
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<Account, AppError> {
    let currency_str: String = row.try_get("currency")?;
    Ok(Account {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        ledger_id: row.try_get("ledger_id")?,
        currency: currency_str.parse().map_err(|_| {
            AppError::StoreError(format!("invalid currency in row: {currency_str}"))
        })?,
        balance: row.try_get("balance")?,
        version: row.try_get("version")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_system_account(row: &sqlx::postgres::PgRow) -> Result<SystemAccount, AppError> {
    let currency_str: String = row.try_get("currency")?;
    Ok(SystemAccount {
        id: row.try_get("id")?,
        ledger_id: row.try_get("ledger_id")?,
        currency: currency_str.parse().map_err(|_| {
            AppError::StoreError(format!("invalid currency in row: {currency_str}"))
        })?,
        amount: row.try_get("amount")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_transaction(row: &sqlx::postgres::PgRow) -> Result<Transaction, AppError> {
    let type_str: String = row.try_get("type")?;
    let status_str: String = row.try_get("status")?;
    Ok(Transaction {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        reference: row.try_get("reference")?,
        amount: row.try_get("amount")?,
        kind: match type_str.as_str() {
            "deposit" => TransactionType::Deposit,
            "transfer" => TransactionType::Transfer,
            "withdraw" => TransactionType::Withdraw,
            other => {
                return Err(AppError::StoreError(format!(
                    "invalid transaction type in row: {other}"
                )))
            }
        },
        status: match status_str.as_str() {
            "pending" => TransactionStatus::Pending,
            "completed" => TransactionStatus::Completed,
            "failed" => TransactionStatus::Failed,
            other => {
                return Err(AppError::StoreError(format!(
                    "invalid transaction status in row: {other}"
                )))
            }
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn create_account(&self, account: &Account) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, user_id, ledger_id, currency, balance, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id)
        .bind(account.user_id)
        .bind(&account.ledger_id)
        .bind(account.currency.to_string())
        .bind(account.balance)
        .bind(account.version)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Account, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, ledger_id, currency, balance, version, created_at, updated_at
            FROM accounts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::AccountNotFound)?;

        row_to_account(&row)
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, ledger_id, currency, balance, version, created_at, updated_at
            FROM accounts WHERE user_id = $1 ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_account).collect()
    }

    async fn update_balance(&self, id: Uuid, balance: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE accounts SET balance = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(balance)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::AccountNotFound);
        }
        Ok(())
    }

    async fn create_system_account(&self, account: &SystemAccount) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO system_accounts (id, ledger_id, currency, amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id)
        .bind(&account.ledger_id)
        .bind(account.currency.to_string())
        .bind(account.amount)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_system_account_by_currency(
        &self,
        currency: Currency,
    ) -> Result<SystemAccount, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, ledger_id, currency, amount, created_at, updated_at
            FROM system_accounts WHERE currency = $1
            "#,
        )
        .bind(currency.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::AccountNotFound)?;

        row_to_system_account(&row)
    }

    async fn system_account_exists_by_currency(&self, currency: Currency) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM system_accounts WHERE currency = $1)",
        )
        .bind(currency.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn transaction_exists_by_reference(
        &self,
        reference: &str,
        account_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE reference = $1 AND account_id = $2)",
        )
        .bind(reference)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_transaction_and_update_balance(
        &self,
        mut txn: Transaction,
        account_id: Uuid,
        new_balance: i64,
    ) -> Result<Transaction, AppError> {
        let mut tx = self.pool.begin().await?;

        txn.complete();

        let insert = sqlx::query(
            r#"
            INSERT INTO transactions (id, account_id, reference, amount, type, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(txn.id)
        .bind(txn.account_id)
        .bind(&txn.reference)
        .bind(txn.amount)
        .bind(type_str(txn.kind))
        .bind(status_str(txn.status))
        .bind(txn.created_at)
        .bind(txn.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            tx.rollback().await.ok();
            return if is_unique_violation(&e) {
                Err(AppError::DuplicateTransaction)
            } else {
                Err(e.into())
            };
        }

        let result = sqlx::query("UPDATE accounts SET balance = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_balance)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Err(AppError::AccountNotFound);
        }

        tx.commit().await?;
        Ok(txn)
    }

    async fn create_transfer_transactions(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        reference: &str,
        amount: i64,
        from_new_balance: i64,
        to_new_balance: i64,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let mut from_txn = Transaction::new(from_id, reference.to_string(), -amount, TransactionType::Transfer);
        from_txn.complete();
        let mut to_txn = Transaction::new(to_id, reference.to_string(), amount, TransactionType::Transfer);
        to_txn.complete();

        let insert_query = r#"
            INSERT INTO transactions (id, account_id, reference, amount, type, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#;

        for t in [&from_txn, &to_txn] {
            let result = sqlx::query(insert_query)
                .bind(t.id)
                .bind(t.account_id)
                .bind(&t.reference)
                .bind(t.amount)
                .bind(type_str(t.kind))
                .bind(status_str(t.status))
                .bind(t.created_at)
                .bind(t.updated_at)
                .execute(&mut *tx)
                .await;

            if let Err(e) = result {
                tx.rollback().await.ok();
                return if is_unique_violation(&e) {
                    Err(AppError::DuplicateTransaction)
                } else {
                    Err(e.into())
                };
            }
        }

        let update_query = "UPDATE accounts SET balance = $1, updated_at = NOW() WHERE id = $2";

        let from_result = sqlx::query(update_query)
            .bind(from_new_balance)
            .bind(from_id)
            .execute(&mut *tx)
            .await?;
        if from_result.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Err(AppError::AccountNotFound);
        }

        let to_result = sqlx::query(update_query)
            .bind(to_new_balance)
            .bind(to_id)
            .execute(&mut *tx)
            .await?;
        if to_result.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Err(AppError::AccountNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_account_transactions(
        &self,
        account_id: Uuid,
        limit: i64,
        after: Option<Uuid>,
    ) -> Result<Vec<Transaction>, AppError> {
        let rows = match after {
            None => {
                sqlx::query(
                    r#"
                    SELECT id, account_id, reference, amount, type, status, created_at, updated_at
                    FROM transactions WHERE account_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2
                    "#,
                )
                .bind(account_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            Some(cursor) => {
                sqlx::query(
                    r#"
                    SELECT id, account_id, reference, amount, type, status, created_at, updated_at
                    FROM transactions
                    WHERE account_id = $1
                      AND (created_at, id) < (
                          SELECT created_at, id FROM transactions WHERE id = $2
                      )
                    ORDER BY created_at DESC, id DESC
                    LIMIT $3
                    "#,
                )
                .bind(account_id)
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(row_to_transaction).collect()
    }
}

fn type_str(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Deposit => "deposit",
        TransactionType::Transfer => "transfer",
        TransactionType::Withdraw => "withdraw",
    }
}

fn status_str(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Pending => "pending",
        TransactionStatus::Completed => "completed",
        TransactionStatus::Failed => "failed",
    }
}
