//! In-process relayer used for dry runs

use async_trait::async_trait;
use chrono::Utc;
use ethers::types::Address;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{RelayerClient, SubmissionReceipt};
use crate::error::SyncError;
use crate::relayer::{CallContext, StateRelayer, StateRelayerCalls};

/// Executes calls against a shared `StateRelayer` as `caller`
#[derive(Clone)]
pub struct LocalRelayer {
    relayer: Arc<Mutex<StateRelayer>>,
    caller: Address,
}

impl LocalRelayer {
    pub fn new(relayer: Arc<Mutex<StateRelayer>>, caller: Address) -> Self {
        Self { relayer, caller }
    }

    pub fn relayer(&self) -> Arc<Mutex<StateRelayer>> {
        Arc::clone(&self.relayer)
    }
}

#[async_trait]
impl RelayerClient for LocalRelayer {
    async fn submit(&self, call: StateRelayerCalls) -> Result<SubmissionReceipt, SyncError> {
        let function = call.function_name();
        let calldata = call.encode();
        let ctx = CallContext::external(self.caller, Utc::now().timestamp().max(0) as u64);

        let mut relayer = self.relayer.lock().await;
        relayer.execute(&ctx, &calldata)?;
        debug!(function, bytes = calldata.len(), "Executed call on local relayer");

        Ok(SubmissionReceipt {
            function: function.to_string(),
            tx_hash: None,
            block_number: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayerError;
    use crate::relayer::{UpdateVaultGeneralInformationCall, VaultGeneralInformation};
    use ethers::types::U256;

    fn vault_call() -> StateRelayerCalls {
        UpdateVaultGeneralInformationCall {
            vault_info: VaultGeneralInformation {
                no_of_vaults: U256::from(7u8),
                ..Default::default()
            },
        }
        .into()
    }

    #[test]
    fn test_submit_executes_calldata() {
        let bot = Address::repeat_byte(0xb0);
        let relayer = StateRelayer::initialize(Address::repeat_byte(0x5e), bot, bot);
        let client = LocalRelayer::new(Arc::new(Mutex::new(relayer)), bot);

        let receipt = tokio_test::block_on(client.submit(vault_call())).unwrap();

        assert_eq!(receipt.function, "updateVaultGeneralInformation");
        let shared = client.relayer();
        let relayer = shared.try_lock().unwrap();
        assert_eq!(relayer.vault_info().no_of_vaults, U256::from(7u8));
    }

    #[tokio::test]
    async fn test_revert_surfaces_as_relayer_error() {
        let admin = Address::repeat_byte(0xad);
        let relayer = StateRelayer::initialize(Address::repeat_byte(0x5e), admin, admin);
        let client = LocalRelayer::new(Arc::new(Mutex::new(relayer)), Address::repeat_byte(0x01));

        let err = client.submit(vault_call()).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Relayer(RelayerError::Unauthorized { .. })
        ));
    }
}
