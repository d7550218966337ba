pub mod cache;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod http;
pub mod ledger_gateway;
pub mod lock;
pub mod store;
pub mod telemetry;
pub mod user;
