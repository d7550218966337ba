pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Currency, SystemAccount, Transaction};
use crate::error::AppError;

/// Relational mirror of accounts, system accounts, and the transaction
/// journal. All writes are ACID at the store level — a single
/// store-transaction per workflow call, rolled back on any failure.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, account: &Account) -> Result<(), AppError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Account, AppError>;
    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>, AppError>;

    /// Standalone update, used only for cache-miss reconciliation against
    /// the ledger — never for the deposit/transfer workflow writes, which
    /// go through `create_transaction_and_update_balance` /
    /// `create_transfer_transactions` instead.
    async fn update_balance(&self, id: Uuid, balance: i64) -> Result<(), AppError>;

    async fn create_system_account(&self, account: &SystemAccount) -> Result<(), AppError>;
    async fn get_system_account_by_currency(
        &self,
        currency: Currency,
    ) -> Result<SystemAccount, AppError>;
    async fn system_account_exists_by_currency(&self, currency: Currency) -> Result<bool, AppError>;

    async fn transaction_exists_by_reference(
        &self,
        reference: &str,
        account_id: Uuid,
    ) -> Result<bool, AppError>;

    /// Inserts the completed journal row and updates the account's balance
    /// in one store-transaction. Fails with `AppError::DuplicateTransaction`
    /// on a `(reference, account_id)` unique-constraint violation.
    async fn create_transaction_and_update_balance(
        &self,
        txn: Transaction,
        account_id: Uuid,
        new_balance: i64,
    ) -> Result<Transaction, AppError>;

    /// Inserts both sides of a transfer (opposite-signed amounts sharing
    /// `reference`) and updates both balances in one store-transaction.
    /// Fails with `DuplicateTransaction` on a unique-constraint violation,
    /// or `AccountNotFound` if either account row is missing.
    async fn create_transfer_transactions(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        reference: &str,
        amount: i64,
        from_new_balance: i64,
        to_new_balance: i64,
    ) -> Result<(), AppError>;

    /// Cursor-paginated, ordered by `(created_at desc, id desc)`. `after`
    /// is the id of the last row seen by the caller.
    async fn get_account_transactions(
        &self,
        account_id: Uuid,
        limit: i64,
        after: Option<Uuid>,
    ) -> Result<Vec<Transaction>, AppError>;
}
