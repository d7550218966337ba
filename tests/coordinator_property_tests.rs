use std::sync::Arc;

use proptest::prelude::*;
use transact::cache::memory::MemoryBalanceCache;
use transact::coordinator::TransactionCoordinator;
use transact::domain::{Account, Currency, SystemAccount};
use transact::error::AppError;
use transact::ledger_gateway::memory::MemoryLedgerGateway;
use transact::lock::memory::MemoryLock;
use transact::store::memory::MemoryAccountStore;
use transact::store::AccountStore;
use uuid::Uuid;

async fn new_coordinator() -> (TransactionCoordinator, Arc<MemoryAccountStore>) {
    let ledger = Arc::new(MemoryLedgerGateway::new());
    let store = Arc::new(MemoryAccountStore::new());
    let cache = Arc::new(MemoryBalanceCache::new());
    let lock = Arc::new(MemoryLock::new());

    let coordinator = TransactionCoordinator::new(
        ledger.clone(),
        store.clone(),
        cache,
        lock,
    );

    coordinator
        .bootstrap_system_accounts(&Currency::all())
        .await
        .unwrap();

    (coordinator, store)
}

async fn open_account(
    coordinator: &TransactionCoordinator,
    store: &Arc<MemoryAccountStore>,
    currency: Currency,
) -> Account {
    let account = coordinator.create_account(Uuid::now_v7(), currency).await.unwrap();
    // sanity check the mirror actually has the row
    store.get_by_id(account.id).await.unwrap();
    account
}

#[tokio::test]
async fn happy_path_transfer() {
    let (coordinator, _store) = new_coordinator().await;

    let a = open_account(&coordinator, &_store, Currency::Usd).await;
    let b = open_account(&coordinator, &_store, Currency::Usd).await;

    coordinator.deposit(a.id, "d1".into(), 10_000).await.unwrap();
    coordinator.deposit(b.id, "d2".into(), 5_000).await.unwrap();
    coordinator.transfer(a.id, b.id, "t1".into(), 2_000).await.unwrap();

    let (balance_a, _) = coordinator.get_account_balance(a.id).await.unwrap();
    let (balance_b, _) = coordinator.get_account_balance(b.id).await.unwrap();
    assert_eq!(balance_a, 8_000);
    assert_eq!(balance_b, 7_000);

    let a_txns = coordinator.get_account_transactions(a.id, 10, None).await.unwrap();
    let b_txns = coordinator.get_account_transactions(b.id, 10, None).await.unwrap();
    assert_eq!(a_txns.len(), 2);
    assert_eq!(b_txns.len(), 2);
}

#[tokio::test]
async fn deposit_idempotency() {
    let (coordinator, _store) = new_coordinator().await;
    let a = open_account(&coordinator, &_store, Currency::Usd).await;

    coordinator.deposit(a.id, "x".into(), 1_000).await.unwrap();
    let second = coordinator.deposit(a.id, "x".into(), 1_000).await;

    assert!(matches!(second, Err(AppError::DuplicateTransaction)));

    let (balance, _) = coordinator.get_account_balance(a.id).await.unwrap();
    assert_eq!(balance, 1_000);

    let txns = coordinator.get_account_transactions(a.id, 10, None).await.unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].reference, "x");
}

#[tokio::test]
async fn insufficient_funds_leaves_no_journal_rows() {
    let (coordinator, _store) = new_coordinator().await;
    let a = open_account(&coordinator, &_store, Currency::Usd).await;
    let b = open_account(&coordinator, &_store, Currency::Usd).await;

    coordinator.deposit(a.id, "d1".into(), 1_000).await.unwrap();

    let result = coordinator.transfer(a.id, b.id, "t".into(), 2_000).await;
    assert!(matches!(result, Err(AppError::InsufficientFunds)));

    let (balance, _) = coordinator.get_account_balance(a.id).await.unwrap();
    assert_eq!(balance, 1_000);

    let txns = coordinator.get_account_transactions(a.id, 10, None).await.unwrap();
    assert_eq!(txns.len(), 1, "only the deposit row should exist");
}

#[tokio::test]
async fn same_account_transfer_rejected() {
    let (coordinator, _store) = new_coordinator().await;
    let a = open_account(&coordinator, &_store, Currency::Usd).await;

    let result = coordinator.transfer(a.id, a.id, "t".into(), 100).await;
    assert!(matches!(result, Err(AppError::SameAccount)));
}

#[tokio::test]
async fn currency_mismatch_rejected() {
    let (coordinator, _store) = new_coordinator().await;
    let a = open_account(&coordinator, &_store, Currency::Usd).await;
    let b = open_account(&coordinator, &_store, Currency::Eur).await;

    let result = coordinator.transfer(a.id, b.id, "t".into(), 100).await;
    assert!(matches!(result, Err(AppError::CurrencyMismatch)));
}

#[tokio::test]
async fn cache_miss_reconciles_against_ledger() {
    let (coordinator, store) = new_coordinator().await;
    let a = open_account(&coordinator, &store, Currency::Usd).await;

    coordinator.deposit(a.id, "d1".into(), 1_000).await.unwrap();

    // Simulate mirror drift: directly overwrite the mirror's balance without
    // touching the cache or the ledger.
    store.update_balance(a.id, 999_999).await.unwrap();

    let (balance, _) = coordinator.get_account_balance(a.id).await.unwrap();
    assert_eq!(balance, 1_000, "ledger is authoritative on a cache miss");

    let repaired = store.get_by_id(a.id).await.unwrap();
    assert_eq!(repaired.balance, 1_000, "mirror must be repaired after reconciliation");
}

#[tokio::test]
async fn zero_amount_rejected() {
    let (coordinator, _store) = new_coordinator().await;
    let a = open_account(&coordinator, &_store, Currency::Usd).await;

    let result = coordinator.deposit(a.id, "r".into(), 0).await;
    assert!(matches!(result, Err(AppError::InvalidAmount)));
}

#[tokio::test]
async fn empty_reference_rejected() {
    let (coordinator, _store) = new_coordinator().await;
    let a = open_account(&coordinator, &_store, Currency::Usd).await;

    let result = coordinator.deposit(a.id, "".into(), 100).await;
    assert!(matches!(result, Err(AppError::ValidationFailed(_))));
}

#[tokio::test]
async fn oversized_reference_rejected() {
    let (coordinator, _store) = new_coordinator().await;
    let a = open_account(&coordinator, &_store, Currency::Usd).await;

    let reference = "r".repeat(256);
    let result = coordinator.deposit(a.id, reference, 100).await;
    assert!(matches!(result, Err(AppError::ValidationFailed(_))));
}

#[tokio::test]
async fn bootstrap_system_accounts_is_idempotent() {
    let ledger = Arc::new(MemoryLedgerGateway::new());
    let store = Arc::new(MemoryAccountStore::new());
    let cache = Arc::new(MemoryBalanceCache::new());
    let lock = Arc::new(MemoryLock::new());

    let coordinator = TransactionCoordinator::new(
        ledger,
        store.clone(),
        cache,
        lock,
    );

    coordinator.bootstrap_system_accounts(&Currency::all()).await.unwrap();
    let first: SystemAccount = store.get_system_account_by_currency(Currency::Usd).await.unwrap();

    coordinator.bootstrap_system_accounts(&Currency::all()).await.unwrap();
    let second = store.get_system_account_by_currency(Currency::Usd).await.unwrap();

    assert_eq!(first.id, second.id, "a second bootstrap must not allocate a new ledger account");
}

proptest! {
    /// Conservation: after any sequence of deposits followed by a transfer,
    /// the sum of the two account balances equals the sum of deposits minus
    /// nothing — a transfer moves money between them, it never creates or
    /// destroys it.
    #[test]
    fn conservation_across_transfer(
        deposit_a in 1_i64..1_000_000,
        deposit_b in 1_i64..1_000_000,
        transfer_amount in 1_i64..1_000_000,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let (coordinator, _store) = new_coordinator().await;
            let a = open_account(&coordinator, &_store, Currency::Usd).await;
            let b = open_account(&coordinator, &_store, Currency::Usd).await;

            coordinator.deposit(a.id, "da".into(), deposit_a).await.unwrap();
            coordinator.deposit(b.id, "db".into(), deposit_b).await.unwrap();

            let total_before = deposit_a + deposit_b;

            let transfer_result = coordinator.transfer(a.id, b.id, "t".into(), transfer_amount).await;

            let (balance_a, _) = coordinator.get_account_balance(a.id).await.unwrap();
            let (balance_b, _) = coordinator.get_account_balance(b.id).await.unwrap();

            if transfer_result.is_ok() {
                prop_assert!(transfer_amount <= deposit_a);
            } else {
                prop_assert_eq!(balance_a, deposit_a);
                prop_assert_eq!(balance_b, deposit_b);
            }

            prop_assert_eq!(balance_a + balance_b, total_before);
        });
    }
}
