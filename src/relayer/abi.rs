//! StateRelayer ABI - on-chain tuples and function calls
//!
//! Field order of every struct is its ABI tuple order.

use ethers::abi::{AbiDecode, AbiEncode};
use ethers::contract::{EthAbiCodec, EthAbiType, EthCall};
use ethers::types::{Address, Bytes, U256};

use crate::error::RelayerError;

/// One DEX pair row of the `DEXInfoMapping`
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthAbiType, EthAbiCodec)]
pub struct DexInfo {
    pub primary_token_price: U256,
    pub volume_24h: U256,
    pub total_liquidity: U256,
    pub apr: U256,
    pub first_token_balance: U256,
    pub second_token_balance: U256,
    pub rewards: U256,
    pub commissions: U256,
    pub last_updated: U256,
    pub decimals: U256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthAbiType, EthAbiCodec)]
pub struct MasterNodeInformation {
    pub total_value_locked_in_master_nodes: U256,
    pub zero_year_locked: U256,
    pub five_year_locked: U256,
    pub ten_year_locked: U256,
    pub last_updated: U256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthAbiType, EthAbiCodec)]
pub struct VaultGeneralInformation {
    pub no_of_vaults: U256,
    pub total_loan_value: U256,
    pub total_collateral_value: U256,
    pub total_collateralization_ratio: U256,
    pub active_auctions: U256,
    pub last_updated: U256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthCall)]
#[ethcall(
    name = "updateDEXInfo",
    abi = "updateDEXInfo(string[],(uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint256)[])"
)]
pub struct UpdateDexInfoCall {
    pub dex: Vec<String>,
    pub dex_info: Vec<DexInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthCall)]
#[ethcall(
    name = "updateMasterNodeInformation",
    abi = "updateMasterNodeInformation((uint256,uint256,uint256,uint256,uint256))"
)]
pub struct UpdateMasterNodeInformationCall {
    pub master_node_information: MasterNodeInformation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthCall)]
#[ethcall(
    name = "updateVaultGeneralInformation",
    abi = "updateVaultGeneralInformation((uint256,uint256,uint256,uint256,uint256,uint256))"
)]
pub struct UpdateVaultGeneralInformationCall {
    pub vault_info: VaultGeneralInformation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthCall)]
#[ethcall(name = "batchCallByBot", abi = "batchCallByBot(bytes[])")]
pub struct BatchCallByBotCall {
    pub func_calls: Vec<Bytes>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthCall)]
#[ethcall(name = "grantRole", abi = "grantRole(bytes32,address)")]
pub struct GrantRoleCall {
    pub role: [u8; 32],
    pub account: Address,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthCall)]
#[ethcall(name = "revokeRole", abi = "revokeRole(bytes32,address)")]
pub struct RevokeRoleCall {
    pub role: [u8; 32],
    pub account: Address,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EthCall)]
#[ethcall(name = "renounceRole", abi = "renounceRole(bytes32,address)")]
pub struct RenounceRoleCall {
    pub role: [u8; 32],
    pub account: Address,
}

/// Every state-changing entry point of the contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateRelayerCalls {
    UpdateDexInfo(UpdateDexInfoCall),
    UpdateMasterNodeInformation(UpdateMasterNodeInformationCall),
    UpdateVaultGeneralInformation(UpdateVaultGeneralInformationCall),
    BatchCallByBot(BatchCallByBotCall),
    GrantRole(GrantRoleCall),
    RevokeRole(RevokeRoleCall),
    RenounceRole(RenounceRoleCall),
}

impl StateRelayerCalls {
    /// Solidity name of the called function
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::UpdateDexInfo(_) => "updateDEXInfo",
            Self::UpdateMasterNodeInformation(_) => "updateMasterNodeInformation",
            Self::UpdateVaultGeneralInformation(_) => "updateVaultGeneralInformation",
            Self::BatchCallByBot(_) => "batchCallByBot",
            Self::GrantRole(_) => "grantRole",
            Self::RevokeRole(_) => "revokeRole",
            Self::RenounceRole(_) => "renounceRole",
        }
    }

    /// Selector-prefixed calldata
    pub fn encode(self) -> Vec<u8> {
        match self {
            Self::UpdateDexInfo(call) => call.encode(),
            Self::UpdateMasterNodeInformation(call) => call.encode(),
            Self::UpdateVaultGeneralInformation(call) => call.encode(),
            Self::BatchCallByBot(call) => call.encode(),
            Self::GrantRole(call) => call.encode(),
            Self::RevokeRole(call) => call.encode(),
            Self::RenounceRole(call) => call.encode(),
        }
    }

    /// Decode calldata by its 4-byte selector
    pub fn decode(calldata: &[u8]) -> Result<Self, RelayerError> {
        let selector: [u8; 4] = calldata
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| {
                RelayerError::MalformedCalldata(format!(
                    "{} bytes is shorter than a selector",
                    calldata.len()
                ))
            })?;

        let decoded = if selector == UpdateDexInfoCall::selector() {
            UpdateDexInfoCall::decode(calldata).map(Self::UpdateDexInfo)
        } else if selector == UpdateMasterNodeInformationCall::selector() {
            UpdateMasterNodeInformationCall::decode(calldata).map(Self::UpdateMasterNodeInformation)
        } else if selector == UpdateVaultGeneralInformationCall::selector() {
            UpdateVaultGeneralInformationCall::decode(calldata)
                .map(Self::UpdateVaultGeneralInformation)
        } else if selector == BatchCallByBotCall::selector() {
            BatchCallByBotCall::decode(calldata).map(Self::BatchCallByBot)
        } else if selector == GrantRoleCall::selector() {
            GrantRoleCall::decode(calldata).map(Self::GrantRole)
        } else if selector == RevokeRoleCall::selector() {
            RevokeRoleCall::decode(calldata).map(Self::RevokeRole)
        } else if selector == RenounceRoleCall::selector() {
            RenounceRoleCall::decode(calldata).map(Self::RenounceRole)
        } else {
            return Err(RelayerError::UnknownSelector(selector));
        };

        decoded.map_err(|e| RelayerError::MalformedCalldata(e.to_string()))
    }
}

impl From<UpdateDexInfoCall> for StateRelayerCalls {
    fn from(call: UpdateDexInfoCall) -> Self {
        Self::UpdateDexInfo(call)
    }
}

impl From<UpdateMasterNodeInformationCall> for StateRelayerCalls {
    fn from(call: UpdateMasterNodeInformationCall) -> Self {
        Self::UpdateMasterNodeInformation(call)
    }
}

impl From<UpdateVaultGeneralInformationCall> for StateRelayerCalls {
    fn from(call: UpdateVaultGeneralInformationCall) -> Self {
        Self::UpdateVaultGeneralInformation(call)
    }
}

impl From<BatchCallByBotCall> for StateRelayerCalls {
    fn from(call: BatchCallByBotCall) -> Self {
        Self::BatchCallByBot(call)
    }
}

impl From<GrantRoleCall> for StateRelayerCalls {
    fn from(call: GrantRoleCall) -> Self {
        Self::GrantRole(call)
    }
}
