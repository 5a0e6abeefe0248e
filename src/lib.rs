//! In-memory, hash-linked transaction ledger.
//!
//! Submitted transactions collect in a pending pool; once the pool reaches
//! its batching threshold they are sealed into a block that links to the
//! previous one by hash and is validated before it is appended.

pub mod catalog;
pub mod chain;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod pool;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use tower_http::trace::TraceLayer;

use config::NodeConfig;
use ledger::Ledger;

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<Ledger>>,
    pub config: Arc<NodeConfig>,
}

impl AppState {
    /// Seeds a fresh genesis chain sized by `config.batch_threshold`.
    pub fn new(config: NodeConfig) -> Self {
        let ledger = Ledger::new(config.batch_threshold);
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::get_chain).post(routes::submit_tx))
        .route("/new", post(routes::new_service))
        .route("/flush", post(routes::flush))
        .route("/pending", get(routes::pending))
        .route("/validate", get(routes::validate_chain))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
