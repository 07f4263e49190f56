//! Ledger node binary

use token_ledger::{spawn_ledger_actor, Config, Ledger, Metrics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match std::env::var("LEDGER_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::from_env()?,
    };

    tracing::info!(service = %config.service_name, "Starting token ledger node");

    let ledger = Ledger::from_config(&config)?;
    let metrics = Metrics::new()?;
    let handle = spawn_ledger_actor(ledger, config.actor.mailbox_capacity, metrics);

    let supply = handle.total_supply().await?;
    tracing::info!(
        treasury = %config.genesis.treasury,
        supply = %supply,
        journal_capacity = config.journal.capacity,
        "Ledger actor running"
    );

    tokio::signal::ctrl_c().await?;

    let snapshot = serde_json::to_string(&handle.snapshot().await?)?;
    tracing::info!(snapshot = %snapshot, "Final ledger state");

    let ledger = handle.shutdown().await?;
    ledger.check_conservation()?;

    tracing::info!("Shutting down token ledger node");
    Ok(())
}
