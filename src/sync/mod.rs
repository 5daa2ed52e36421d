//! Sync orchestrator - pushes a snapshot into the relayer contract
//!
//! Granular policy: three transactions in fixed order (DEX, master node,
//! vault); the first failure stops the cycle. Batched policy: one
//! `batchCallByBot` transaction carrying all three, all-or-nothing.
//! Failed submissions are never retried.

use ethers::types::Bytes;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::aggregator::DataAggregator;
use crate::chain::{RelayerClient, SubmissionReceipt};
use crate::error::SyncError;
use crate::ocean::StatsSource;
use crate::relayer::{BatchCallByBotCall, StateRelayerCalls};
use crate::types::Snapshot;

/// How a snapshot is submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPolicy {
    /// One transaction per slot
    #[default]
    Granular,
    /// A single atomic `batchCallByBot` transaction
    Batched,
}

impl fmt::Display for SubmissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionPolicy::Granular => write!(f, "granular"),
            SubmissionPolicy::Batched => write!(f, "batched"),
        }
    }
}

/// Result of one successful run
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub policy: SubmissionPolicy,
    pub receipts: Vec<SubmissionReceipt>,
    pub snapshot: Snapshot,
}

pub struct SyncOrchestrator {
    client: Arc<dyn RelayerClient>,
    policy: SubmissionPolicy,
}

impl SyncOrchestrator {
    pub fn new(client: Arc<dyn RelayerClient>, policy: SubmissionPolicy) -> Self {
        Self { client, policy }
    }

    /// Submit `snapshot` according to the configured policy
    pub async fn run(&self, snapshot: Snapshot) -> Result<SyncOutcome, SyncError> {
        let receipts = match self.policy {
            SubmissionPolicy::Granular => self.submit_granular(&snapshot).await?,
            SubmissionPolicy::Batched => vec![self.submit_batched(&snapshot).await?],
        };

        info!(
            policy = %self.policy,
            transactions = receipts.len(),
            pairs = snapshot.pair_records.len(),
            "State relayed"
        );

        Ok(SyncOutcome {
            policy: self.policy,
            receipts,
            snapshot,
        })
    }

    /// Aggregate a fresh snapshot from `source` and submit it
    pub async fn run_cycle(
        &self,
        aggregator: &DataAggregator,
        source: &dyn StatsSource,
    ) -> Result<SyncOutcome, SyncError> {
        let snapshot = match aggregator.aggregate(source).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Aggregation failed, skipping cycle");
                return Err(e);
            }
        };
        self.run(snapshot).await
    }

    async fn submit_granular(&self, snapshot: &Snapshot) -> Result<Vec<SubmissionReceipt>, SyncError> {
        let mut receipts = Vec::with_capacity(3);
        for call in snapshot.update_calls() {
            let function = call.function_name();
            match self.client.submit(call).await {
                Ok(receipt) => {
                    info!(function, tx = ?receipt.tx_hash, "Update submitted");
                    receipts.push(receipt);
                }
                Err(e) => {
                    error!(
                        function,
                        completed = receipts.len(),
                        error = %e,
                        "Update failed, aborting cycle"
                    );
                    return Err(e);
                }
            }
        }
        Ok(receipts)
    }

    async fn submit_batched(&self, snapshot: &Snapshot) -> Result<SubmissionReceipt, SyncError> {
        let func_calls: Vec<Bytes> = snapshot
            .update_calls()
            .into_iter()
            .map(|call| Bytes::from(call.encode()))
            .collect();
        let batch = StateRelayerCalls::from(BatchCallByBotCall { func_calls });

        self.client.submit(batch).await.map_err(|e| {
            error!(error = %e, "Batch submission failed, no state was changed");
            e
        })
    }
}
