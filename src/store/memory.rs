use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::AccountStore;
use crate::domain::{Account, Currency, SystemAccount, Transaction, TransactionType};
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    system_accounts: HashMap<Currency, SystemAccount>,
    transactions: HashMap<Uuid, Vec<Transaction>>,
    references: HashMap<(String, Uuid), ()>,
}

/// In-memory stand-in for the relational mirror, used in unit and property
/// tests. Holds one mutex for the duration of each logical operation so it
/// emulates a single store-transaction the same way the real pool does.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Inner>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_account(&self, account: &Account) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Account, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.accounts.get(&id).cloned().ok_or(AppError::AccountNotFound)
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut accounts: Vec<Account> = inner
            .accounts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn update_balance(&self, id: Uuid, balance: i64) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let account = inner.accounts.get_mut(&id).ok_or(AppError::AccountNotFound)?;
        account.balance = balance;
        account.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn create_system_account(&self, account: &SystemAccount) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.system_accounts.insert(account.currency, account.clone());
        Ok(())
    }

    async fn get_system_account_by_currency(
        &self,
        currency: Currency,
    ) -> Result<SystemAccount, AppError> {
        let inner = self.inner.lock().unwrap();
        inner
            .system_accounts
            .get(&currency)
            .cloned()
            .ok_or(AppError::AccountNotFound)
    }

    async fn system_account_exists_by_currency(&self, currency: Currency) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.system_accounts.contains_key(&currency))
    }

    async fn transaction_exists_by_reference(
        &self,
        reference: &str,
        account_id: Uuid,
    ) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.references.contains_key(&(reference.to_string(), account_id)))
    }

    async fn create_transaction_and_update_balance(
        &self,
        mut txn: Transaction,
        account_id: Uuid,
        new_balance: i64,
    ) -> Result<Transaction, AppError> {
        let mut inner = self.inner.lock().unwrap();

        let key = (txn.reference.clone(), account_id);
        if inner.references.contains_key(&key) {
            return Err(AppError::DuplicateTransaction);
        }

        if !inner.accounts.contains_key(&account_id) {
            return Err(AppError::AccountNotFound);
        }

        txn.complete();
        inner.references.insert(key, ());
        inner.transactions.entry(account_id).or_default().push(txn.clone());
        inner.accounts.get_mut(&account_id).unwrap().balance = new_balance;
        inner.accounts.get_mut(&account_id).unwrap().updated_at = chrono::Utc::now();

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
        let mut inner = self.inner.lock().unwrap();

        if inner.references.contains_key(&(reference.to_string(), from_id))
            || inner.references.contains_key(&(reference.to_string(), to_id))
        {
            return Err(AppError::DuplicateTransaction);
        }

        if !inner.accounts.contains_key(&from_id) || !inner.accounts.contains_key(&to_id) {
            return Err(AppError::AccountNotFound);
        }

        let mut from_txn = Transaction::new(from_id, reference.to_string(), -amount, TransactionType::Transfer);
        from_txn.complete();
        let mut to_txn = Transaction::new(to_id, reference.to_string(), amount, TransactionType::Transfer);
        to_txn.complete();

        inner.references.insert((reference.to_string(), from_id), ());
        inner.references.insert((reference.to_string(), to_id), ());
        inner.transactions.entry(from_id).or_default().push(from_txn);
        inner.transactions.entry(to_id).or_default().push(to_txn);
        inner.accounts.get_mut(&from_id).unwrap().balance = from_new_balance;
        inner.accounts.get_mut(&to_id).unwrap().balance = to_new_balance;
        let now = chrono::Utc::now();
        inner.accounts.get_mut(&from_id).unwrap().updated_at = now;
        inner.accounts.get_mut(&to_id).unwrap().updated_at = now;

        Ok(())
    }

    async fn get_account_transactions(
        &self,
        account_id: Uuid,
        limit: i64,
        after: Option<Uuid>,
    ) -> Result<Vec<Transaction>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut txns = inner.transactions.get(&account_id).cloned().unwrap_or_default();
        txns.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        if let Some(cursor) = after {
            if let Some(pos) = txns.iter().position(|t| t.id == cursor) {
                txns = txns.split_off(pos + 1);
            } else {
                txns.clear();
            }
        }

        txns.truncate(limit.max(0) as usize);
        Ok(txns)
    }
}
