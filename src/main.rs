use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;

use transact::cache::redis::RedisBalanceCache;
use transact::config::Config;
use transact::coordinator::TransactionCoordinator;
use transact::domain::Currency;
use transact::ledger_gateway::postgres::PostgresLedgerGateway;
use transact::lock::redis::RedisLock;
use transact::store::postgres::PostgresAccountStore;
use transact::user::postgres::PostgresUserStore;
use transact::user::UserService;
use transact::{http, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    telemetry::init(&config.logger.level);

    tracing::info!("starting transact");

    let pg_pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database.connection_string())
        .await?;

    let ledger = PostgresLedgerGateway::new(pg_pool.clone());
    ledger.init_schema().await?;

    let account_store = PostgresAccountStore::new(pg_pool.clone());
    account_store.init_schema().await?;

    let user_store = PostgresUserStore::new(pg_pool.clone());

    let cache_client = redis::Client::open(config.redis.connection_string(0))?;
    let cache_conn = ConnectionManager::new(cache_client).await?;
    let balance_cache = RedisBalanceCache::new(cache_conn);

    let lock_client = redis::Client::open(config.redis.connection_string(1))?;
    let lock_conn = ConnectionManager::new(lock_client).await?;
    let lock = RedisLock::new(lock_conn);

    let coordinator = Arc::new(TransactionCoordinator::new(
        Arc::new(ledger),
        Arc::new(account_store),
        Arc::new(balance_cache),
        Arc::new(lock),
    ));

    coordinator
        .bootstrap_system_accounts(&Currency::all())
        .await?;

    let users = Arc::new(UserService::new(Arc::new(user_store)));

    let state = http::AppState { coordinator, users };
    let app = http::build_router(state);

    let addr = format!("0.0.0.0:{}", config.server.port);
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
