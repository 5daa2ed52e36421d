//! Error types for the relayer bot and the StateRelayer contract
//!
//! `SyncError` covers one synchronization cycle end to end. `RelayerError`
//! mirrors the revert reasons of the contract itself.

use ethers::types::{Address, H256};
use std::fmt::Display;
use thiserror::Error;

/// Failure of a synchronization cycle
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network or API failure while talking to the statistics source
    #[error("upstream fetch from {endpoint} failed: {reason}")]
    UpstreamFetch { endpoint: String, reason: String },

    /// A source value that is not a non-negative decimal number
    #[error("invalid numeric input '{value}': {reason}")]
    InvalidNumericInput { value: String, reason: String },

    /// Transaction rejected, reverted or never confirmed
    #[error("submission of {function} failed: {reason}")]
    Submission { function: String, reason: String },

    /// The contract reverted the call
    #[error("relayer reverted: {0}")]
    Relayer(#[from] RelayerError),
}

impl SyncError {
    pub fn upstream(endpoint: impl Into<String>, reason: impl Display) -> Self {
        Self::UpstreamFetch {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_numeric(value: impl Into<String>, reason: impl Display) -> Self {
        Self::InvalidNumericInput {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn submission(function: impl Into<String>, reason: impl Display) -> Self {
        Self::Submission {
            function: function.into(),
            reason: reason.to_string(),
        }
    }
}

/// Revert reasons of the StateRelayer contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayerError {
    #[error("AccessControl: account {account:#x} is missing role {role:#x}")]
    Unauthorized { account: Address, role: H256 },

    #[error("ALREADY_IN_BATCH_CALL_BY_BOT")]
    AlreadyInBatchCallByBot,

    #[error("updateDEXInfo: {symbols} symbols but {records} records")]
    LengthMismatch { symbols: usize, records: usize },

    #[error("unknown function selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("malformed calldata: {0}")]
    MalformedCalldata(String),

    #[error("AccessControl: can only renounce roles for self")]
    RenounceForOther,
}
