//! JSON-RPC submitter for a deployed StateRelayer contract

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, TransactionRequest, U64};
use std::sync::Arc;
use tracing::{debug, info};

use super::{RelayerClient, SubmissionReceipt};
use crate::error::SyncError;
use crate::relayer::StateRelayerCalls;

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signs with a local key and waits for each receipt
pub struct EthersRelayer {
    client: Arc<SignerClient>,
    contract: Address,
    confirmations: usize,
}

impl EthersRelayer {
    pub fn new(
        rpc_url: &str,
        private_key: &str,
        chain_id: u64,
        contract: Address,
        confirmations: usize,
    ) -> Result<Self, SyncError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| SyncError::submission("provider", format!("invalid RPC url: {}", e)))?;
        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| SyncError::submission("signer", format!("invalid private key: {}", e)))?
            .with_chain_id(chain_id);

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            contract,
            confirmations,
        })
    }

    /// Account the transactions are sent from
    pub fn signer_address(&self) -> Address {
        self.client.address()
    }
}

#[async_trait]
impl RelayerClient for EthersRelayer {
    async fn submit(&self, call: StateRelayerCalls) -> Result<SubmissionReceipt, SyncError> {
        let function = call.function_name();
        let tx = TransactionRequest::new()
            .to(self.contract)
            .data(call.encode());

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| SyncError::submission(function, e))?;
        let tx_hash = pending.tx_hash();
        debug!(function, tx = ?tx_hash, "Transaction sent");

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| SyncError::submission(function, e))?
            .ok_or_else(|| {
                SyncError::submission(function, format!("transaction {:#x} was dropped", tx_hash))
            })?;

        if receipt.status != Some(U64::one()) {
            return Err(SyncError::submission(
                function,
                format!("transaction {:#x} reverted", tx_hash),
            ));
        }

        let block_number = receipt.block_number.map(|n| n.as_u64());
        info!(function, tx = ?tx_hash, block = ?block_number, "Transaction confirmed");

        Ok(SubmissionReceipt {
            function: function.to_string(),
            tx_hash: Some(tx_hash),
            block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x59c6995e998f97a5a0044966f0945387dc9f5a59e86cdc84e64546a1d8f76d59";

    #[test]
    fn test_signer_address_from_key() {
        let relayer = EthersRelayer::new(
            "http://127.0.0.1:8545",
            TEST_KEY,
            1130,
            Address::repeat_byte(0x5e),
            1,
        )
        .unwrap();

        let expected = TEST_KEY.parse::<LocalWallet>().unwrap().address();
        assert_eq!(relayer.signer_address(), expected);
    }

    #[test]
    fn test_rejects_bad_key() {
        let result = EthersRelayer::new(
            "http://127.0.0.1:8545",
            "0xnot-a-key",
            1130,
            Address::zero(),
            1,
        );
        assert!(matches!(result, Err(SyncError::Submission { .. })));
    }
}
