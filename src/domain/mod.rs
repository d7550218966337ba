pub mod account;
pub mod currency;
pub mod transaction;
pub mod user;

pub use account::{Account, SystemAccount};
pub use currency::Currency;
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::{ApiKey, User};
