use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::RngCore;

use super::LedgerGateway;
use crate::domain::Currency;
use crate::error::AppError;

fn new_ledger_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

struct LedgerAccount {
    debits_posted: i64,
    credits_posted: i64,
}

/// In-process ledger double used by the coordinator's unit and property
/// tests. Mirrors the Postgres adapter's locking semantics with a single
/// mutex held for the duration of a transfer — equivalent to holding a row
/// lock on both accounts for the posting.
#[derive(Default)]
pub struct MemoryLedgerGateway {
    accounts: Mutex<HashMap<String, LedgerAccount>>,
}

impl MemoryLedgerGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerGateway for MemoryLedgerGateway {
    async fn create_account(&self, _currency: Currency) -> Result<String, AppError> {
        let id = new_ledger_id();
        self.accounts.lock().unwrap().insert(
            id.clone(),
            LedgerAccount {
                debits_posted: 0,
                credits_posted: 0,
            },
        );
        Ok(id)
    }

    async fn get_balance(&self, ledger_id: &str) -> Result<i64, AppError> {
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(ledger_id)
            .ok_or_else(|| AppError::LedgerRejected(format!("unknown ledger account {ledger_id}")))?;
        Ok(account.credits_posted - account.debits_posted)
    }

    async fn create_transfer(
        &self,
        from_ledger_id: &str,
        to_ledger_id: &str,
        amount: i64,
        _reference: &str,
    ) -> Result<String, AppError> {
        if amount <= 0 {
            return Err(AppError::LedgerRejected("amount must be positive".into()));
        }

        let mut accounts = self.accounts.lock().unwrap();
        if !accounts.contains_key(from_ledger_id) || !accounts.contains_key(to_ledger_id) {
            return Err(AppError::LedgerRejected("unknown ledger account".into()));
        }

        accounts.get_mut(from_ledger_id).unwrap().debits_posted += amount;
        accounts.get_mut(to_ledger_id).unwrap().credits_posted += amount;

        Ok(new_ledger_id())
    }
}
