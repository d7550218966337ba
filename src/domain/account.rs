use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currency::Currency;

/// User-owned money container. `balance` is the relational mirror's view —
/// best-effort, reconciled against the ledger on read-miss, never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ledger_id: String,
    pub currency: Currency,
    pub balance: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: Uuid, currency: Currency, ledger_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            ledger_id,
            currency,
            balance: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-currency funding source for deposits. Exactly one per currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemAccount {
    pub id: Uuid,
    pub ledger_id: String,
    pub currency: Currency,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SystemAccount {
    pub fn new(currency: Currency, ledger_id: String, amount: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            ledger_id,
            currency,
            amount,
            created_at: now,
            updated_at: now,
        }
    }
}
