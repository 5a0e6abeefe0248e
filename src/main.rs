//! Application entrypoint and state wiring.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tx_ledger_node::{app, config::NodeConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 0) logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1) config
    let config = NodeConfig::from_env().map_err(|e| {
        tracing::error!("invalid configuration: {e}");
        e
    })?;
    info!(
        threshold = config.batch_threshold,
        submitter = %config.default_submitter,
        "configuration loaded"
    );

    // 2) ledger with genesis
    let addr = config.addr;
    let state = AppState::new(config);
    {
        let guard = state.ledger.lock();
        for block in guard.chain().blocks() {
            info!(
                position = block.position,
                hash = %block.hash,
                previous_hash = %block.previous_hash,
                txs = block.transactions.len(),
                "chain block"
            );
        }
    }

    // 3) serve
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
