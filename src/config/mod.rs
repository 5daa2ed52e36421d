//! Configuration management for the relayer bot
//!
//! Loads from optional config files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use ethers::types::Address;
use serde::Deserialize;
use std::time::Duration;

use crate::aggregator::AggregatorConfig;
use crate::sync::SubmissionPolicy;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub relay: RelayConfig,
    pub ocean: OceanConfig,
    pub chain: ChainConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Bot version tag for logging
    pub tag: String,
    /// Execute against an in-process relayer instead of the chain
    pub dry_run: bool,
    /// Granular or batched submission
    pub policy: SubmissionPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Reference denomination for pair prices
    pub denomination: String,
    /// Fixed-point precision of relayed values
    pub decimals: u32,
    /// Pool pairs requested per cycle
    pub pool_pair_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OceanConfig {
    /// Ocean API base url
    pub url: String,
    /// Network path segment (mainnet, testnet)
    pub network: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// EVM chain id
    pub chain_id: u64,
    /// StateRelayer proxy address
    pub contract_address: String,
    /// Confirmations to wait for per transaction
    pub confirmations: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between cycles; 0 runs a single cycle and exits
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (RELAYER__*)
            .add_source(Environment::with_prefix("RELAYER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            // Bot defaults
            .set_default("bot.tag", env!("CARGO_PKG_VERSION"))?
            .set_default("bot.dry_run", true)?
            .set_default("bot.policy", "granular")?
            // Relay defaults
            .set_default("relay.denomination", "USDT")?
            .set_default("relay.decimals", 10)?
            .set_default("relay.pool_pair_limit", 200)?
            // Ocean defaults
            .set_default("ocean.url", "https://ocean.defichain.com")?
            .set_default("ocean.network", "mainnet")?
            .set_default("ocean.timeout_secs", 30)?
            // Chain defaults
            .set_default("chain.rpc_url", "https://eth.mainnet.ocean.jellyfishsdk.com")?
            .set_default("chain.chain_id", 1130)?
            .set_default("chain.contract_address", "0x0000000000000000000000000000000000000000")?
            .set_default("chain.confirmations", 1)?
            // Schedule defaults
            .set_default("schedule.interval_secs", 0)?
            // Logging defaults
            .set_default("logging.filter", "info")?
            .set_default("logging.json", false)?)
    }

    /// Aggregation settings derived from the relay section
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            denomination: self.relay.denomination.clone(),
            decimals: self.relay.decimals,
            pool_pair_limit: self.relay.pool_pair_limit,
        }
    }

    pub fn ocean_timeout(&self) -> Duration {
        Duration::from_secs(self.ocean.timeout_secs)
    }

    /// Parsed StateRelayer address
    pub fn contract_address(&self) -> Result<Address> {
        self.chain
            .contract_address
            .parse()
            .with_context(|| format!("Invalid contract address '{}'", self.chain.contract_address))
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "bot={} dry_run={} policy={} denom={} decimals={} ocean={}/{} chain_id={} contract={}",
            self.bot.tag,
            self.bot.dry_run,
            self.bot.policy,
            self.relay.denomination,
            self.relay.decimals,
            self.ocean.url,
            self.ocean.network,
            self.chain.chain_id,
            self.chain.contract_address
        )
    }

    /// Validate required environment variables for on-chain submission
    pub fn validate_env(&self) -> Result<()> {
        let pk = match std::env::var("PRIVATE_KEY") {
            Ok(pk) => pk,
            Err(_) => bail!("Required environment variable PRIVATE_KEY is not set"),
        };

        // Validate private key format
        if !pk.starts_with("0x") || pk.len() != 66 {
            bail!("PRIVATE_KEY must be a hex string with 0x prefix (66 chars total)");
        }

        if self.contract_address()? == Address::zero() {
            bail!("chain.contract_address must be set when dry_run is disabled");
        }

        Ok(())
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
