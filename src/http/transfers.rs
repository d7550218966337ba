use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::middleware::AuthenticatedUser;
use super::response::ApiResponse;
use super::AppState;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct TransferRequest {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: i64,
    pub reference: String,
}

#[derive(Serialize)]
pub struct TransferResponse {
    pub transfer_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: i64,
    pub from_new_balance: i64,
    pub to_new_balance: i64,
    pub status: &'static str,
}

pub async fn transfer(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    Json(req): Json<TransferRequest>,
) -> Result<ApiResponse, AppError> {
    let result = state
        .coordinator
        .transfer(req.from_account_id, req.to_account_id, req.reference, req.amount)
        .await?;

    Ok(ApiResponse::ok(TransferResponse {
        transfer_id: result.transfer_id,
        from_account_id: req.from_account_id,
        to_account_id: req.to_account_id,
        amount: req.amount,
        from_new_balance: result.from_new_balance,
        to_new_balance: result.to_new_balance,
        status: "completed",
    }))
}
