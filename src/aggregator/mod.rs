//! Data aggregator - builds a `Snapshot` from the statistics source
//!
//! Fetches stats, pool pairs and denomination prices concurrently, then
//! normalizes them into fixed-point records. Any fetch or parse failure
//! aborts the whole aggregation; a partial snapshot is never produced.

mod price;

pub use price::resolve_pair_price;

use chrono::{DateTime, Utc};
use ethers::types::U256;
use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use crate::codec::{
    self, encode, encode_decimal, encode_or_zero, parse_decimal, to_integer, FixedDecimal,
};
use crate::error::SyncError;
use crate::ocean::types::{LockedMasternode, StatsData};
use crate::ocean::{DexPricesResult, PoolPairData, StatsSource};
use crate::relayer::{DexInfo, MasterNodeInformation, VaultGeneralInformation};
use crate::types::{DexSummary, Snapshot};

/// Lock durations of the three master-node terms, in weeks
const ZERO_YEAR_WEEKS: u32 = 0;
const FIVE_YEAR_WEEKS: u32 = 260;
const TEN_YEAR_WEEKS: u32 = 520;

/// Aggregation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Reference denomination all pair prices are expressed in
    pub denomination: String,
    /// Fixed-point precision
    pub decimals: u32,
    /// Pool-pair page size requested from the source
    pub pool_pair_limit: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            denomination: "USDT".to_string(),
            decimals: codec::DEFAULT_DECIMALS,
            pool_pair_limit: 200,
        }
    }
}

/// Snapshot builder
pub struct DataAggregator {
    config: AggregatorConfig,
}

impl DataAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Aggregate a snapshot stamped with the current time
    pub async fn aggregate(&self, source: &dyn StatsSource) -> Result<Snapshot, SyncError> {
        self.aggregate_at(source, Utc::now()).await
    }

    /// Aggregate a snapshot stamped with `captured_at`
    pub async fn aggregate_at(
        &self,
        source: &dyn StatsSource,
        captured_at: DateTime<Utc>,
    ) -> Result<Snapshot, SyncError> {
        let (stats, pool_pairs, dex_prices) = tokio::try_join!(
            source.get_stats(),
            source.list_pool_pairs(self.config.pool_pair_limit),
            source.list_dex_prices(&self.config.denomination),
        )?;

        debug!(
            pool_pairs = pool_pairs.len(),
            priced_tokens = dex_prices.dex_prices.len(),
            "Upstream data fetched"
        );

        let snapshot = self.assemble(&stats, pool_pairs, &dex_prices, captured_at)?;
        info!(snapshot = %snapshot, "Snapshot assembled");
        Ok(snapshot)
    }

    /// Build a snapshot from already fetched payloads
    pub fn assemble(
        &self,
        stats: &StatsData,
        pool_pairs: Vec<PoolPairData>,
        dex_prices: &DexPricesResult,
        captured_at: DateTime<Utc>,
    ) -> Result<Snapshot, SyncError> {
        let last_updated = U256::from(captured_at.timestamp().max(0) as u64);

        let (retained, composite): (Vec<_>, Vec<_>) =
            pool_pairs.into_iter().partition(|p| !p.is_composite());
        if !composite.is_empty() {
            debug!(skipped = composite.len(), "Skipping composite pool pairs");
        }

        let dex_summary = self.dex_summary(stats, &retained)?;

        let mut pair_records = IndexMap::with_capacity(retained.len());
        for pair in &retained {
            let record = self.pair_record(pair, dex_prices, last_updated)?;
            pair_records.insert(pair.display_symbol.clone(), record);
        }

        Ok(Snapshot {
            captured_at,
            decimals: self.config.decimals,
            dex_summary,
            pair_records,
            vault_summary: self.vault_summary(stats, last_updated)?,
            master_node_summary: self.master_node_summary(stats, last_updated)?,
        })
    }

    fn dex_summary(
        &self,
        stats: &StatsData,
        pairs: &[PoolPairData],
    ) -> Result<DexSummary, SyncError> {
        let decimals = self.config.decimals;

        // Sum of floored values, so the total never exceeds the true sum
        let mut total_volume = U256::zero();
        for pair in pairs {
            let volume = encode_or_zero(
                pair.volume.as_ref().and_then(|v| v.h24.as_deref()),
                decimals,
            )?;
            total_volume = total_volume.checked_add(volume).ok_or_else(|| {
                SyncError::invalid_numeric(volume.to_string(), "24h volume sum exceeds uint256")
            })?;
        }

        Ok(DexSummary {
            total_value_locked: encode_or_zero(stats.tvl.dex.as_deref(), decimals)?,
            total_24h_volume: total_volume,
        })
    }

    fn pair_record(
        &self,
        pair: &PoolPairData,
        dex_prices: &DexPricesResult,
        last_updated: U256,
    ) -> Result<DexInfo, SyncError> {
        let decimals = self.config.decimals;
        let price = resolve_pair_price(
            &pair.price_ratio.ba,
            &pair.token_b.symbol,
            &self.config.denomination,
            dex_prices,
        )?;
        let apr = pair.apr.as_ref();

        Ok(DexInfo {
            primary_token_price: encode_decimal(&price, decimals)?,
            volume_24h: encode_or_zero(
                pair.volume.as_ref().and_then(|v| v.h24.as_deref()),
                decimals,
            )?,
            total_liquidity: encode_or_zero(pair.total_liquidity.usd.as_deref(), decimals)?,
            apr: encode_or_zero(apr.and_then(|a| a.total.as_deref()), decimals)?,
            first_token_balance: encode(&pair.token_a.reserve, decimals)?,
            second_token_balance: encode(&pair.token_b.reserve, decimals)?,
            rewards: encode_or_zero(apr.and_then(|a| a.reward.as_deref()), decimals)?,
            commissions: encode(&pair.commission, decimals)?,
            last_updated,
            decimals: U256::from(decimals),
        })
    }

    fn vault_summary(
        &self,
        stats: &StatsData,
        last_updated: U256,
    ) -> Result<VaultGeneralInformation, SyncError> {
        let decimals = self.config.decimals;
        let loan = optional_decimal(stats.loan.value.loan.as_deref())?;
        let collateral = optional_decimal(stats.loan.value.collateral.as_deref())?;

        Ok(VaultGeneralInformation {
            no_of_vaults: U256::from(stats.loan.count.open_vaults.unwrap_or(0)),
            total_loan_value: encode_decimal(&loan, decimals)?,
            total_collateral_value: encode_decimal(&collateral, decimals)?,
            total_collateralization_ratio: collateralization_ratio(&collateral, &loan)?,
            active_auctions: U256::from(stats.loan.count.open_auctions.unwrap_or(0)),
            last_updated,
        })
    }

    fn master_node_summary(
        &self,
        stats: &StatsData,
        last_updated: U256,
    ) -> Result<MasterNodeInformation, SyncError> {
        let decimals = self.config.decimals;
        let locked = &stats.masternodes.locked;
        let bucket = |weeks: u32| -> Result<U256, SyncError> {
            encode_or_zero(
                locked_bucket(locked, weeks).and_then(|b| b.tvl.as_deref()),
                decimals,
            )
        };

        Ok(MasterNodeInformation {
            total_value_locked_in_master_nodes: encode_or_zero(
                stats.tvl.masternodes.as_deref(),
                decimals,
            )?,
            zero_year_locked: bucket(ZERO_YEAR_WEEKS)?,
            five_year_locked: bucket(FIVE_YEAR_WEEKS)?,
            ten_year_locked: bucket(TEN_YEAR_WEEKS)?,
            last_updated,
        })
    }
}

fn optional_decimal(value: Option<&str>) -> Result<FixedDecimal, SyncError> {
    value.map(parse_decimal).unwrap_or_else(|| Ok(FixedDecimal::zero()))
}

/// `round(collateral / loan * 100)`; zero when there is no outstanding loan
fn collateralization_ratio(
    collateral: &FixedDecimal,
    loan: &FixedDecimal,
) -> Result<U256, SyncError> {
    if loan.is_zero() {
        return Ok(U256::zero());
    }
    let collateral = collateral.to_decimal()?;
    let loan = loan.to_decimal()?;

    let ratio = collateral
        .checked_div(loan)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| {
            SyncError::invalid_numeric(
                format!("{} / {}", collateral, loan),
                "collateralization ratio overflow",
            )
        })?;

    to_integer(ratio.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Locked-value bucket for a lock duration.
///
/// Buckets are matched on their `weeks` tag. Untagged entries fall back to
/// the positional order `[0] = zero-year, [1] = ten-year, [2] = five-year`.
fn locked_bucket(locked: &[LockedMasternode], weeks: u32) -> Option<&LockedMasternode> {
    if let Some(tagged) = locked.iter().find(|b| b.weeks == Some(weeks)) {
        return Some(tagged);
    }

    let index = match weeks {
        ZERO_YEAR_WEEKS => 0,
        TEN_YEAR_WEEKS => 1,
        FIVE_YEAR_WEEKS => 2,
        _ => return None,
    };
    locked.get(index).filter(|b| b.weeks.is_none())
}
