//! Chain module - submitting calls to the StateRelayer contract
//!
//! `EthersRelayer` sends signed transactions to a deployed contract.
//! `LocalRelayer` executes the same calldata against an in-process
//! `StateRelayer`, for dry runs and tests.

mod local;
mod rpc;

pub use local::LocalRelayer;
pub use rpc::EthersRelayer;

use async_trait::async_trait;
use ethers::types::H256;

use crate::error::SyncError;
use crate::relayer::StateRelayerCalls;

/// Confirmation of one submitted call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Solidity function that was called
    pub function: String,
    /// Transaction hash, if the call went on-chain
    pub tx_hash: Option<H256>,
    pub block_number: Option<u64>,
}

/// Trait for StateRelayer submitters
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelayerClient: Send + Sync {
    /// Submit one call as its own transaction and wait until it is final
    async fn submit(&self, call: StateRelayerCalls) -> Result<SubmissionReceipt, SyncError>;
}
