//! State Relayer Bot entry point
//!
//! Usage: cargo run --bin state-relayer-bot
//!
//! Reads configuration from config/*.toml and RELAYER__* environment
//! variables. With `bot.dry_run` the snapshot is executed against an
//! in-process relayer; otherwise it is signed with PRIVATE_KEY and sent
//! to `chain.contract_address`.

use anyhow::{Context, Result};
use ethers::types::{Address, H160};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use state_relayer_bot::aggregator::DataAggregator;
use state_relayer_bot::chain::{EthersRelayer, LocalRelayer, RelayerClient};
use state_relayer_bot::config::{AppConfig, LoggingConfig};
use state_relayer_bot::ocean::OceanClient;
use state_relayer_bot::relayer::StateRelayer;
use state_relayer_bot::sync::SyncOrchestrator;

/// Operator account of the in-process relayer used for dry runs
const DRY_RUN_OPERATOR: Address = H160([0x0b; 20]);

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    info!("🚀 State relayer bot starting");
    info!("Config: {}", config);

    let ocean = OceanClient::new(&config.ocean.url, &config.ocean.network, config.ocean_timeout())?;
    let aggregator = DataAggregator::new(config.aggregator_config());
    let client = build_client(&config)?;
    let orchestrator = SyncOrchestrator::new(client, config.bot.policy);

    if config.schedule.interval_secs == 0 {
        let outcome = orchestrator
            .run_cycle(&aggregator, &ocean)
            .await
            .context("Relay cycle failed")?;
        info!("✅ {}", outcome.snapshot);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.schedule.interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match orchestrator.run_cycle(&aggregator, &ocean).await {
                    Ok(outcome) => info!(
                        transactions = outcome.receipts.len(),
                        "✅ {}", outcome.snapshot
                    ),
                    Err(e) => error!(error = %e, "❌ Relay cycle failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Shutdown signal received");
                break;
            }
        }
    }

    info!("👋 State relayer bot stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_client(config: &AppConfig) -> Result<Arc<dyn RelayerClient>> {
    let contract = config.contract_address()?;

    if config.bot.dry_run {
        info!(operator = ?DRY_RUN_OPERATOR, "Dry run: executing against in-process relayer");
        let relayer = StateRelayer::initialize(contract, DRY_RUN_OPERATOR, DRY_RUN_OPERATOR);
        return Ok(Arc::new(LocalRelayer::new(
            Arc::new(Mutex::new(relayer)),
            DRY_RUN_OPERATOR,
        )));
    }

    config.validate_env()?;
    let private_key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY not set")?;
    let relayer = EthersRelayer::new(
        &config.chain.rpc_url,
        &private_key,
        config.chain.chain_id,
        contract,
        config.chain.confirmations,
    )?;
    info!(
        signer = ?relayer.signer_address(),
        contract = ?contract,
        "Submitting to chain {}", config.chain.chain_id
    );

    Ok(Arc::new(relayer))
}
