use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cache::BalanceCache;
use crate::domain::{Account, Currency, SystemAccount, Transaction, TransactionType};
use crate::error::AppError;
use crate::ledger_gateway::LedgerGateway;
use crate::lock::DistributedLock;
use crate::store::AccountStore;

const LEASE_TTL: Duration = Duration::from_secs(30);

const SYSTEM_ACCOUNT_INITIAL_AMOUNT: i64 = 100_000_000;
const MAX_REFERENCE_LEN: usize = 255;

fn validate_reference(reference: &str) -> Result<(), AppError> {
    if reference.is_empty() {
        return Err(AppError::ValidationFailed("reference must not be empty".into()));
    }
    if reference.len() > MAX_REFERENCE_LEN {
        return Err(AppError::ValidationFailed(format!(
            "reference must not exceed {MAX_REFERENCE_LEN} characters"
        )));
    }
    Ok(())
}

pub struct DepositResult {
    pub transaction: Transaction,
    pub transfer_id: String,
    pub new_balance: i64,
}

pub struct TransferResult {
    pub from_new_balance: i64,
    pub to_new_balance: i64,
    pub transfer_id: String,
}

/// Orchestrates deposit and transfer workflows across the ledger gateway,
/// the relational mirror, the balance cache and the distributed lock.
/// Every public method here is the single place those four collaborators
/// are stitched together; callers (the HTTP layer) never touch them
/// directly.
pub struct TransactionCoordinator {
    ledger: Arc<dyn LedgerGateway>,
    store: Arc<dyn AccountStore>,
    cache: Arc<dyn BalanceCache>,
    lock: Arc<dyn DistributedLock>,
}

impl TransactionCoordinator {
    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        store: Arc<dyn AccountStore>,
        cache: Arc<dyn BalanceCache>,
        lock: Arc<dyn DistributedLock>,
    ) -> Self {
        Self {
            ledger,
            store,
            cache,
            lock,
        }
    }

    pub async fn deposit(
        &self,
        account_id: Uuid,
        reference: String,
        amount: i64,
    ) -> Result<DepositResult, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount);
        }
        validate_reference(&reference)?;

        let lease_key = format!("deposit:{account_id}:{reference}");
        if !self.lock.acquire(&lease_key, LEASE_TTL).await? {
            return Err(AppError::LockBusy);
        }

        // Detached so that a client disconnect (axum drops the handler's
        // future) cannot abandon the workflow between the ledger post and
        // the mirror write; the task keeps running on the runtime and we
        // just stop waiting on it.
        let ledger = self.ledger.clone();
        let store = self.store.clone();
        let cache = self.cache.clone();
        let handle = tokio::spawn(async move {
            deposit_inner(ledger, store, cache, account_id, &reference, amount).await
        });

        let result = match handle.await {
            Ok(result) => result,
            Err(_) => Err(AppError::StoreError("deposit task panicked".into())),
        };
        self.lock.release(&lease_key).await;
        result
    }

    pub async fn transfer(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        reference: String,
        amount: i64,
    ) -> Result<TransferResult, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount);
        }
        if from_id == to_id {
            return Err(AppError::SameAccount);
        }
        validate_reference(&reference)?;

        let lease_key = format!("transfer:{from_id}:{reference}");
        if !self.lock.acquire(&lease_key, LEASE_TTL).await? {
            return Err(AppError::LockBusy);
        }

        // See the note in `deposit`: detached so the ledger-post-then-mirror
        // write pair survives a dropped handler future.
        let ledger = self.ledger.clone();
        let store = self.store.clone();
        let cache = self.cache.clone();
        let handle = tokio::spawn(async move {
            transfer_inner(ledger, store, cache, from_id, to_id, &reference, amount).await
        });

        let result = match handle.await {
            Ok(result) => result,
            Err(_) => Err(AppError::StoreError("transfer task panicked".into())),
        };
        self.lock.release(&lease_key).await;
        result
    }

    /// Cache-first balance read, reconciling against the ledger (the
    /// authority) on a miss and repairing the mirror if it has drifted.
    pub async fn get_account_balance(
        &self,
        account_id: Uuid,
    ) -> Result<(i64, DateTime<Utc>), AppError> {
        if let Some(cached) = self.cache.get_balance(account_id).await {
            return Ok(cached);
        }

        let account = self.store.get_by_id(account_id).await?;
        let ledger_balance = self.ledger.get_balance(&account.ledger_id).await?;

        if ledger_balance != account.balance {
            self.store.update_balance(account_id, ledger_balance).await?;
        }

        let now = Utc::now();
        self.cache.set_balance(account_id, ledger_balance, now).await;
        Ok((ledger_balance, now))
    }

    /// Idempotent across restarts: allocates the per-currency funding
    /// account only if it doesn't already exist.
    pub async fn bootstrap_system_accounts(&self, currencies: &[Currency]) -> Result<(), AppError> {
        for &currency in currencies {
            if self.store.system_account_exists_by_currency(currency).await? {
                continue;
            }

            let ledger_id = self.ledger.create_account(currency).await?;
            let system_account =
                SystemAccount::new(currency, ledger_id, SYSTEM_ACCOUNT_INITIAL_AMOUNT);
            self.store.create_system_account(&system_account).await?;
        }

        Ok(())
    }

    pub async fn create_account(&self, user_id: Uuid, currency: Currency) -> Result<Account, AppError> {
        let ledger_id = self.ledger.create_account(currency).await?;
        let account = Account::new(user_id, currency, ledger_id);
        self.store.create_account(&account).await?;
        Ok(account)
    }

    pub async fn get_account(&self, id: Uuid) -> Result<Account, AppError> {
        self.store.get_by_id(id).await
    }

    pub async fn get_accounts_for_user(&self, user_id: Uuid) -> Result<Vec<Account>, AppError> {
        self.store.get_by_user_id(user_id).await
    }

    pub async fn get_account_transactions(
        &self,
        account_id: Uuid,
        limit: i64,
        after: Option<Uuid>,
    ) -> Result<Vec<Transaction>, AppError> {
        self.store.get_account_transactions(account_id, limit, after).await
    }
}

/// Body of `deposit`, pulled out as a free function over owned `Arc`
/// collaborators so it can run inside `tokio::spawn` independent of the
/// lifetime of the request that triggered it.
async fn deposit_inner(
    ledger: Arc<dyn LedgerGateway>,
    store: Arc<dyn AccountStore>,
    cache: Arc<dyn BalanceCache>,
    account_id: Uuid,
    reference: &str,
    amount: i64,
) -> Result<DepositResult, AppError> {
    if store
        .transaction_exists_by_reference(reference, account_id)
        .await?
    {
        return Err(AppError::DuplicateTransaction);
    }

    let account = store.get_by_id(account_id).await?;
    let system_account = store
        .get_system_account_by_currency(account.currency)
        .await?;

    let transfer_id = ledger
        .create_transfer(
            &system_account.ledger_id,
            &account.ledger_id,
            amount,
            reference,
        )
        .await?;

    let new_balance = account.balance + amount;
    let txn = Transaction::new(
        account_id,
        reference.to_string(),
        amount,
        TransactionType::Deposit,
    );

    let persisted = store
        .create_transaction_and_update_balance(txn, account_id, new_balance)
        .await?;

    cache
        .set_balance(account_id, new_balance, persisted.updated_at)
        .await;

    Ok(DepositResult {
        transaction: persisted,
        transfer_id,
        new_balance,
    })
}

/// Body of `transfer`; see `deposit_inner` for why this is a free function.
async fn transfer_inner(
    ledger: Arc<dyn LedgerGateway>,
    store: Arc<dyn AccountStore>,
    cache: Arc<dyn BalanceCache>,
    from_id: Uuid,
    to_id: Uuid,
    reference: &str,
    amount: i64,
) -> Result<TransferResult, AppError> {
    if store
        .transaction_exists_by_reference(reference, from_id)
        .await?
    {
        return Err(AppError::DuplicateTransaction);
    }

    let from = store.get_by_id(from_id).await?;
    let to = store.get_by_id(to_id).await?;

    if from.currency != to.currency {
        return Err(AppError::CurrencyMismatch);
    }
    if from.balance < amount {
        return Err(AppError::InsufficientFunds);
    }

    let transfer_id = ledger
        .create_transfer(&from.ledger_id, &to.ledger_id, amount, reference)
        .await?;

    let from_new_balance = from.balance - amount;
    let to_new_balance = to.balance + amount;

    store
        .create_transfer_transactions(
            from_id,
            to_id,
            reference,
            amount,
            from_new_balance,
            to_new_balance,
        )
        .await?;

    let now = Utc::now();
    cache.set_balance(from_id, from_new_balance, now).await;
    cache.set_balance(to_id, to_new_balance, now).await;

    Ok(TransferResult {
        from_new_balance,
        to_new_balance,
        transfer_id,
    })
}
