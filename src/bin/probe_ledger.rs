use stake_history_service::{
    blockchain::{EvmRpcClient, LedgerQuery},
    cache::TtlCache,
    config::Config,
    service::{PageOutcome, StakeService},
    validation::validate_evm_address,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, Level};

// Manual smoke check against a live node:
//   cargo run --bin probe_ledger -- 0xYourWallet
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let Some(raw_address) = std::env::args().nth(1) else {
        error!("Usage: probe_ledger <wallet address>");
        return Ok(());
    };
    let address = validate_evm_address(&raw_address)?;

    // 1. Setup
    let config = Config::from_env();
    let client = Arc::new(EvmRpcClient::new(&config)?);
    info!("Probing contract {} via {}", config.contract_address, config.rpc_url);

    // 2. Total stake
    match client.fetch_total(address).await {
        Ok(total) => info!("✅ Total staked by {}: {}", address, total),
        Err(e) => error!("❌ Failed to get total: {}", e),
    }

    // 3. Read-through: the second call should be served from memory
    let service = StakeService::from_config(client, TtlCache::new(16), &config);

    for attempt in 1..=2 {
        let started = Instant::now();
        match service.get_page(&address, 1, 5).await {
            Ok(PageOutcome::Success { records, total }) => {
                info!("✅ Attempt {}: {} of {} records in {:?}", attempt, records.len(), total, started.elapsed());
                for record in &records {
                    info!("   {} staked {} at {}", record.sender, record.amount, record.time);
                }
            }
            Ok(PageOutcome::NoData) => info!("✅ Attempt {}: no stakes recorded ({:?})", attempt, started.elapsed()),
            Ok(PageOutcome::PageOutOfRange { total }) => info!("Attempt {}: page out of range, {} records", attempt, total),
            Err(e) => error!("❌ Attempt {} failed: {}", attempt, e),
        }
    }

    Ok(())
}
