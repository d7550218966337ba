pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::Currency;
use crate::error::AppError;

/// Adapter to the external double-entry ledger engine. The ledger is
/// treated as an opaque, linearizable remote store: account creation,
/// balance lookup, and transfer posting are the only operations the
/// coordinator needs.
///
/// Sign convention (decided in SPEC_FULL §4.2): `get_balance` returns
/// `credits_posted - debits_posted`; `create_transfer(from, to, amount)`
/// debits `from` and credits `to`. Crediting a user's ledger account
/// therefore always increases its computed balance, and the deposit
/// direction (`system -> user`) agrees with this read.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Allocates a ledger account tagged with `currency`'s numeric code.
    /// Returns the opaque 128-bit id as a lowercase hex string.
    async fn create_account(&self, currency: Currency) -> Result<String, AppError>;

    /// Posted balance for the given ledger account id, in minor units.
    async fn get_balance(&self, ledger_id: &str) -> Result<i64, AppError>;

    /// Posts a single double-entry movement: debit `from_ledger_id`,
    /// credit `to_ledger_id`, for `amount` minor units. Fails atomically —
    /// the external engine does not permit partial posting. `reference`
    /// is stamped into the transfer's metadata so an out-of-band
    /// reconciliation job can find orphaned transfers (spec.md §7).
    async fn create_transfer(
        &self,
        from_ledger_id: &str,
        to_ledger_id: &str,
        amount: i64,
        reference: &str,
    ) -> Result<String, AppError>;
}
