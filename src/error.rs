use axum::http::StatusCode;
use thiserror::Error;

/// Stable error kind, surfaced across the whole service. Each caller-facing
/// variant maps to a fixed HTTP status; the wrapped cause is logged but
/// never serialized into the response body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("from and to accounts must differ")]
    SameAccount,
    #[error("accounts have different currencies")]
    CurrencyMismatch,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("unsupported currency")]
    InvalidCurrency,
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("duplicate transaction for this reference")]
    DuplicateTransaction,
    #[error("missing or invalid api key")]
    Unauthorized,
    #[error("account not found")]
    AccountNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("email already registered")]
    EmailAlreadyExists,
    #[error("account already exists")]
    AccountAlreadyExists,
    #[error("lock busy, retry later")]
    LockBusy,
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),
    #[error("ledger rejected the operation: {0}")]
    LedgerRejected(String),
    #[error("store error: {0}")]
    StoreError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        use AppError::*;
        match self {
            InvalidAmount
            | SameAccount
            | CurrencyMismatch
            | InsufficientFunds
            | InvalidCurrency
            | ValidationFailed(_)
            | DuplicateTransaction => StatusCode::BAD_REQUEST,
            Unauthorized => StatusCode::UNAUTHORIZED,
            AccountNotFound | UserNotFound => StatusCode::NOT_FOUND,
            EmailAlreadyExists | AccountAlreadyExists => StatusCode::CONFLICT,
            LockBusy | LedgerUnavailable(_) | LedgerRejected(_) | StoreError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to put in a client-facing response. The 500-class
    /// variants wrap a raw store/ledger error string that must never leave
    /// the process — the cause is still logged via `tracing::error!` at the
    /// call site, this only governs what gets serialized into the envelope.
    pub fn client_message(&self) -> String {
        use AppError::*;
        match self {
            LockBusy => "lock busy, retry later".to_string(),
            LedgerUnavailable(_) => "ledger unavailable".to_string(),
            LedgerRejected(_) => "ledger rejected the operation".to_string(),
            StoreError(_) => "store error".to_string(),
            other => other.to_string(),
        }
    }

    /// Short machine-stable code, independent of the Display message, used
    /// in the `{code, message, ...}` envelope.
    pub fn code(&self) -> &'static str {
        use AppError::*;
        match self {
            InvalidAmount => "invalid_amount",
            SameAccount => "same_account",
            CurrencyMismatch => "currency_mismatch",
            InsufficientFunds => "insufficient_funds",
            InvalidCurrency => "invalid_currency",
            ValidationFailed(_) => "validation_failed",
            DuplicateTransaction => "duplicate_transaction",
            Unauthorized => "unauthorized",
            AccountNotFound => "account_not_found",
            UserNotFound => "user_not_found",
            EmailAlreadyExists => "email_already_exists",
            AccountAlreadyExists => "account_already_exists",
            LockBusy => "lock_busy",
            LedgerUnavailable(_) => "ledger_unavailable",
            LedgerRejected(_) => "ledger_rejected",
            StoreError(_) => "store_error",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::StoreError(e.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::StoreError(e.to_string())
    }
}

impl From<crate::lock::LockError> for AppError {
    fn from(e: crate::lock::LockError) -> Self {
        AppError::StoreError(e.0)
    }
}

pub type AppResult<T> = Result<T, AppError>;
