pub mod accounts;
pub mod health;
pub mod middleware;
pub mod response;
pub mod transfers;
pub mod users;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::coordinator::TransactionCoordinator;
use crate::user::UserService;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<TransactionCoordinator>,
    pub users: Arc<UserService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/users", post(users::register))
        .route("/api/v1/users/:id", get(users::get_user))
        .route("/api/v1/accounts", post(accounts::create_account).get(accounts::list_accounts))
        .route("/api/v1/accounts/:id/balance", get(accounts::get_balance))
        .route("/api/v1/accounts/:id/deposit", post(accounts::deposit))
        .route(
            "/api/v1/accounts/:id/transactions",
            get(accounts::list_transactions),
        )
        .route("/api/v1/transfers", post(transfers::transfer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
