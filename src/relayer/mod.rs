//! StateRelayer contract logic
//!
//! Holds the relayed on-chain state (DEX mapping, master-node and vault
//! singletons) behind role-based access control, and exposes the granular
//! update entry points plus the atomic `batchCallByBot`.
//!
//! Every entry point takes a `CallContext`. Calls made from inside a batch
//! carry the relayer's own address as `sender` while `origin` stays the
//! external caller, and authorization is checked against `origin`. If the
//! relayer address itself is granted a role, calls from inside a batch also
//! pass on that grant. This is supported but hazardous: granting the relayer
//! `DEFAULT_ADMIN_ROLE` lets any operator grant roles through a batch.

pub mod abi;
pub mod access;
pub mod guard;

pub use abi::{
    BatchCallByBotCall, DexInfo, GrantRoleCall, MasterNodeInformation, RenounceRoleCall,
    RevokeRoleCall, StateRelayerCalls, UpdateDexInfoCall, UpdateMasterNodeInformationCall,
    UpdateVaultGeneralInformationCall, VaultGeneralInformation,
};
pub use access::{bot_role, AccessControl, DEFAULT_ADMIN_ROLE};
pub use guard::{BatchFlag, BatchGuard};

use ethers::types::{Address, Bytes, H256, U256};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::RelayerError;

/// Caller identity and block data for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Account that signed the outer transaction
    pub origin: Address,
    /// Immediate caller; the relayer itself for calls inside a batch
    pub sender: Address,
    /// Block timestamp in seconds
    pub timestamp: U256,
}

impl CallContext {
    /// Context of a transaction sent directly by `caller`
    pub fn external(caller: Address, timestamp: u64) -> Self {
        Self {
            origin: caller,
            sender: caller,
            timestamp: U256::from(timestamp),
        }
    }

    fn internal(&self, relayer: Address) -> Self {
        Self {
            origin: self.origin,
            sender: relayer,
            timestamp: self.timestamp,
        }
    }
}

/// Relayed state; every slot is overwritten wholesale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnChainState {
    pub dex_info: HashMap<String, DexInfo>,
    pub master_node: MasterNodeInformation,
    pub vault: VaultGeneralInformation,
}

/// Events emitted by the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayerEvent {
    UpdateDexInfo {
        dex: Vec<String>,
        dex_info: Vec<DexInfo>,
        timestamp: U256,
    },
    UpdateMasterNodeInformation {
        master_node_information: MasterNodeInformation,
        timestamp: U256,
    },
    UpdateVaultGeneralInformation {
        vault_info: VaultGeneralInformation,
        timestamp: U256,
    },
    RoleGranted {
        role: H256,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        role: H256,
        account: Address,
        sender: Address,
    },
}

struct Checkpoint {
    state: OnChainState,
    access: AccessControl,
    events: usize,
}

/// The StateRelayer contract
#[derive(Debug)]
pub struct StateRelayer {
    address: Address,
    state: OnChainState,
    access: AccessControl,
    events: Vec<RelayerEvent>,
    batch: BatchFlag,
}

impl StateRelayer {
    /// Deploy at `address` with zeroed state, `admin` as default admin and
    /// `bot` as the operator
    pub fn initialize(address: Address, admin: Address, bot: Address) -> Self {
        let mut access = AccessControl::new();
        access.grant(DEFAULT_ADMIN_ROLE, admin);
        access.grant(bot_role(), bot);

        Self {
            address,
            state: OnChainState::default(),
            access,
            events: Vec::new(),
            batch: BatchFlag::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn state(&self) -> &OnChainState {
        &self.state
    }

    pub fn dex_info(&self, symbol: &str) -> Option<&DexInfo> {
        self.state.dex_info.get(symbol)
    }

    pub fn master_node_information(&self) -> &MasterNodeInformation {
        &self.state.master_node
    }

    pub fn vault_info(&self) -> &VaultGeneralInformation {
        &self.state.vault
    }

    pub fn events(&self) -> &[RelayerEvent] {
        &self.events
    }

    pub fn has_role(&self, role: H256, account: Address) -> bool {
        self.access.has_role(role, account)
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_active()
    }

    fn check_role(&self, role: H256, ctx: &CallContext) -> Result<(), RelayerError> {
        if self.access.has_role(role, ctx.origin) {
            return Ok(());
        }
        if ctx.sender == self.address && self.access.has_role(role, self.address) {
            return Ok(());
        }
        Err(RelayerError::Unauthorized {
            account: ctx.origin,
            role,
        })
    }

    /// `updateDEXInfo(string[],DEXInfo[])`
    pub fn update_dex_info(
        &mut self,
        ctx: &CallContext,
        dex: Vec<String>,
        dex_info: Vec<DexInfo>,
    ) -> Result<(), RelayerError> {
        self.check_role(bot_role(), ctx)?;
        if dex.len() != dex_info.len() {
            return Err(RelayerError::LengthMismatch {
                symbols: dex.len(),
                records: dex_info.len(),
            });
        }

        for (symbol, info) in dex.iter().zip(dex_info.iter()) {
            self.state.dex_info.insert(symbol.clone(), info.clone());
        }

        self.events.push(RelayerEvent::UpdateDexInfo {
            dex,
            dex_info,
            timestamp: ctx.timestamp,
        });
        Ok(())
    }

    /// `updateMasterNodeInformation(MasterNode)`
    pub fn update_master_node_information(
        &mut self,
        ctx: &CallContext,
        master_node_information: MasterNodeInformation,
    ) -> Result<(), RelayerError> {
        self.check_role(bot_role(), ctx)?;
        self.state.master_node = master_node_information.clone();
        self.events.push(RelayerEvent::UpdateMasterNodeInformation {
            master_node_information,
            timestamp: ctx.timestamp,
        });
        Ok(())
    }

    /// `updateVaultGeneralInformation(VaultGeneralInformation)`
    pub fn update_vault_general_information(
        &mut self,
        ctx: &CallContext,
        vault_info: VaultGeneralInformation,
    ) -> Result<(), RelayerError> {
        self.check_role(bot_role(), ctx)?;
        self.state.vault = vault_info.clone();
        self.events.push(RelayerEvent::UpdateVaultGeneralInformation {
            vault_info,
            timestamp: ctx.timestamp,
        });
        Ok(())
    }

    /// `batchCallByBot(bytes[])`
    ///
    /// Executes every call against the relayer itself, in order. Either all
    /// of them take effect or none do. A nested batch fails with
    /// `AlreadyInBatchCallByBot` and reverts the outer batch.
    pub fn batch_call_by_bot(
        &mut self,
        ctx: &CallContext,
        func_calls: Vec<Bytes>,
    ) -> Result<(), RelayerError> {
        self.check_role(bot_role(), ctx)?;
        let _guard = self.batch.enter()?;

        let checkpoint = self.checkpoint();
        let inner = ctx.internal(self.address);

        for (index, calldata) in func_calls.iter().enumerate() {
            if let Err(e) = self.execute(&inner, calldata) {
                warn!(index, error = %e, "Batch call failed, reverting batch");
                self.restore(checkpoint);
                return Err(e);
            }
        }

        debug!(calls = func_calls.len(), "Batch committed");
        Ok(())
    }

    /// `grantRole(bytes32,address)`
    pub fn grant_role(
        &mut self,
        ctx: &CallContext,
        role: H256,
        account: Address,
    ) -> Result<(), RelayerError> {
        self.check_role(DEFAULT_ADMIN_ROLE, ctx)?;
        if self.access.grant(role, account) {
            self.events.push(RelayerEvent::RoleGranted {
                role,
                account,
                sender: ctx.sender,
            });
        }
        Ok(())
    }

    /// `revokeRole(bytes32,address)`
    pub fn revoke_role(
        &mut self,
        ctx: &CallContext,
        role: H256,
        account: Address,
    ) -> Result<(), RelayerError> {
        self.check_role(DEFAULT_ADMIN_ROLE, ctx)?;
        self.remove_role(role, account, ctx.sender);
        Ok(())
    }

    /// `renounceRole(bytes32,address)`; only for the immediate caller
    pub fn renounce_role(
        &mut self,
        ctx: &CallContext,
        role: H256,
        account: Address,
    ) -> Result<(), RelayerError> {
        if account != ctx.sender {
            return Err(RelayerError::RenounceForOther);
        }
        self.remove_role(role, account, ctx.sender);
        Ok(())
    }

    fn remove_role(&mut self, role: H256, account: Address, sender: Address) {
        if self.access.revoke(role, account) {
            self.events.push(RelayerEvent::RoleRevoked {
                role,
                account,
                sender,
            });
        }
    }

    /// Decode ABI calldata and dispatch it to the matching entry point
    pub fn execute(&mut self, ctx: &CallContext, calldata: &[u8]) -> Result<(), RelayerError> {
        match StateRelayerCalls::decode(calldata)? {
            StateRelayerCalls::UpdateDexInfo(call) => {
                self.update_dex_info(ctx, call.dex, call.dex_info)
            }
            StateRelayerCalls::UpdateMasterNodeInformation(call) => {
                self.update_master_node_information(ctx, call.master_node_information)
            }
            StateRelayerCalls::UpdateVaultGeneralInformation(call) => {
                self.update_vault_general_information(ctx, call.vault_info)
            }
            StateRelayerCalls::BatchCallByBot(call) => self.batch_call_by_bot(ctx, call.func_calls),
            StateRelayerCalls::GrantRole(call) => {
                self.grant_role(ctx, H256::from(call.role), call.account)
            }
            StateRelayerCalls::RevokeRole(call) => {
                self.revoke_role(ctx, H256::from(call.role), call.account)
            }
            StateRelayerCalls::RenounceRole(call) => {
                self.renounce_role(ctx, H256::from(call.role), call.account)
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            access: self.access.clone(),
            events: self.events.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.access = checkpoint.access;
        self.events.truncate(checkpoint.events);
    }
}
