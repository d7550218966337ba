use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::middleware::AuthenticatedUser;
use super::response::ApiResponse;
use super::AppState;
use crate::domain::{Currency, Transaction};
use crate::error::AppError;

#[derive(Deserialize)]
pub struct CreateAccountRequest {
    pub currency: Currency,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ledger_id: String,
    pub currency: Currency,
    pub balance: i64,
}

pub async fn create_account(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(req): Json<CreateAccountRequest>,
) -> Result<ApiResponse, AppError> {
    let account = state.coordinator.create_account(user.id, req.currency).await?;

    Ok(ApiResponse::created(AccountResponse {
        id: account.id,
        user_id: account.user_id,
        ledger_id: account.ledger_id,
        currency: account.currency,
        balance: account.balance,
    }))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<ApiResponse, AppError> {
    let accounts = state.coordinator.get_accounts_for_user(user.id).await?;

    let payload: Vec<AccountResponse> = accounts
        .into_iter()
        .map(|a| AccountResponse {
            id: a.id,
            user_id: a.user_id,
            ledger_id: a.ledger_id,
            currency: a.currency,
            balance: a.balance,
        })
        .collect();

    Ok(ApiResponse::ok(payload))
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
    pub updated_at: DateTime<Utc>,
}

pub async fn get_balance(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse, AppError> {
    let (balance, updated_at) = state.coordinator.get_account_balance(id).await?;
    Ok(ApiResponse::ok(BalanceResponse { balance, updated_at }))
}

#[derive(Deserialize)]
pub struct DepositRequest {
    pub amount: i64,
    pub reference: String,
}

#[derive(Serialize)]
pub struct DepositResponse {
    pub transaction_id: Uuid,
    pub transfer_id: String,
    pub amount: i64,
    pub new_balance: i64,
    pub status: &'static str,
}

pub async fn deposit(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<DepositRequest>,
) -> Result<ApiResponse, AppError> {
    let result = state
        .coordinator
        .deposit(id, req.reference, req.amount)
        .await?;

    Ok(ApiResponse::ok(DepositResponse {
        transaction_id: result.transaction.id,
        transfer_id: result.transfer_id,
        amount: result.transaction.amount,
        new_balance: result.new_balance,
        status: "completed",
    }))
}

#[derive(Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<i64>,
    pub after: Option<Uuid>,
}

#[derive(Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub next_cursor: Option<Uuid>,
    pub has_more: bool,
}

const DEFAULT_PAGE_LIMIT: i64 = 50;
const MAX_PAGE_LIMIT: i64 = 200;

pub async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<TransactionsQuery>,
) -> Result<ApiResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);

    // Fetch one extra row to detect whether another page follows without a
    // second round-trip.
    let mut rows = state
        .coordinator
        .get_account_transactions(id, limit + 1, query.after)
        .await?;

    let has_more = rows.len() as i64 > limit;
    if has_more {
        rows.truncate(limit as usize);
    }
    let next_cursor = rows.last().map(|t| t.id);

    Ok(ApiResponse::ok(TransactionsResponse {
        transactions: rows,
        next_cursor,
        has_more,
    }))
}
