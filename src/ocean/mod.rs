//! Ocean module - upstream statistics source
//!
//! The aggregator only sees the `StatsSource` trait; `OceanClient` is the
//! HTTP implementation used in production.

mod client;
pub mod types;

pub use client::OceanClient;
pub use types::{DexPricesResult, PoolPairData, StatsData};

use async_trait::async_trait;

use crate::error::SyncError;

/// Trait for statistics sources
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Global chain statistics (TVL, loans, master nodes)
    async fn get_stats(&self) -> Result<StatsData, SyncError>;

    /// First page of pool pairs, at most `limit` entries
    async fn list_pool_pairs(&self, limit: usize) -> Result<Vec<PoolPairData>, SyncError>;

    /// DEX prices of every token in `denomination`
    async fn list_dex_prices(&self, denomination: &str) -> Result<DexPricesResult, SyncError>;
}
