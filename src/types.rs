//! Core types shared by the aggregator and the orchestrator

use chrono::{DateTime, Utc};
use ethers::types::U256;
use indexmap::IndexMap;
use std::fmt;

use crate::relayer::{
    DexInfo, MasterNodeInformation, StateRelayerCalls, UpdateDexInfoCall,
    UpdateMasterNodeInformationCall, UpdateVaultGeneralInformationCall, VaultGeneralInformation,
};

/// One relayed pool pair row
pub type PairRecord = DexInfo;

/// DEX-wide totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DexSummary {
    /// Total value locked in pool pairs (fixed-point)
    pub total_value_locked: U256,
    /// Sum of the relayed pairs' 24h volume (fixed-point)
    pub total_24h_volume: U256,
}

/// Normalized output of one synchronization cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    /// Fixed-point precision of every encoded value
    pub decimals: u32,
    pub dex_summary: DexSummary,
    /// Keyed by display symbol, in source order
    pub pair_records: IndexMap<String, PairRecord>,
    pub vault_summary: VaultGeneralInformation,
    pub master_node_summary: MasterNodeInformation,
}

impl Snapshot {
    pub fn dex_info_call(&self) -> UpdateDexInfoCall {
        UpdateDexInfoCall {
            dex: self.pair_records.keys().cloned().collect(),
            dex_info: self.pair_records.values().cloned().collect(),
        }
    }

    pub fn master_node_call(&self) -> UpdateMasterNodeInformationCall {
        UpdateMasterNodeInformationCall {
            master_node_information: self.master_node_summary.clone(),
        }
    }

    pub fn vault_call(&self) -> UpdateVaultGeneralInformationCall {
        UpdateVaultGeneralInformationCall {
            vault_info: self.vault_summary.clone(),
        }
    }

    /// The three update calls in submission order: DEX, master node, vault
    pub fn update_calls(&self) -> [StateRelayerCalls; 3] {
        [
            self.dex_info_call().into(),
            self.master_node_call().into(),
            self.vault_call().into(),
        ]
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "captured_at={} pairs={} dex_tvl={} dex_vol24h={} vaults={} mn_tvl={}",
            self.captured_at.to_rfc3339(),
            self.pair_records.len(),
            self.dex_summary.total_value_locked,
            self.dex_summary.total_24h_volume,
            self.vault_summary.no_of_vaults,
            self.master_node_summary.total_value_locked_in_master_nodes
        )
    }
}
