//! End-to-end tests: Ocean payloads -> snapshot -> StateRelayer

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use ethers::types::{Address, Bytes, H160, U256};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use state_relayer_bot::aggregator::{AggregatorConfig, DataAggregator};
    use state_relayer_bot::chain::LocalRelayer;
    use state_relayer_bot::error::{RelayerError, SyncError};
    use state_relayer_bot::ocean::types::ApiResponse;
    use state_relayer_bot::ocean::{DexPricesResult, PoolPairData, StatsData, StatsSource};
    use state_relayer_bot::relayer::{
        BatchCallByBotCall, CallContext, OnChainState, StateRelayer, StateRelayerCalls,
        UpdateVaultGeneralInformationCall, VaultGeneralInformation,
    };
    use state_relayer_bot::sync::{SubmissionPolicy, SyncOrchestrator};

    const CONTRACT: Address = H160([0x5e; 20]);
    const ADMIN: Address = H160([0xad; 20]);
    const BOT: Address = H160([0xb0; 20]);

    /// Serves fixed Ocean payloads, parsed from their JSON envelopes
    struct FixtureSource {
        stats: StatsData,
        pool_pairs: Vec<PoolPairData>,
        dex_prices: DexPricesResult,
        offline: bool,
    }

    #[async_trait]
    impl StatsSource for FixtureSource {
        async fn get_stats(&self) -> Result<StatsData, SyncError> {
            if self.offline {
                return Err(SyncError::upstream("stats", "connection refused"));
            }
            Ok(self.stats.clone())
        }

        async fn list_pool_pairs(&self, limit: usize) -> Result<Vec<PoolPairData>, SyncError> {
            Ok(self.pool_pairs.iter().take(limit).cloned().collect())
        }

        async fn list_dex_prices(&self, _denomination: &str) -> Result<DexPricesResult, SyncError> {
            Ok(self.dex_prices.clone())
        }
    }

    fn unwrap_envelope<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value::<ApiResponse<T>>(value).unwrap().data
    }

    fn fixture() -> FixtureSource {
        let stats = unwrap_envelope(json!({
            "data": {
                "count": { "blocks": 3_000_000 },
                "tvl": { "dex": 1_000_000, "masternodes": "3000", "loan": 40, "total": 1_003_040 },
                "loan": {
                    "count": { "openVaults": 12, "openAuctions": 3, "schemes": 6 },
                    "value": { "collateral": "2345", "loan": 1000 }
                },
                "masternodes": {
                    "locked": [
                        { "weeks": 0, "count": 10, "tvl": 100 },
                        { "weeks": 520, "count": 2, "tvl": "20.5" },
                        { "weeks": 260, "count": 5, "tvl": 50 }
                    ]
                }
            }
        }));

        let pool_pairs = unwrap_envelope(json!({
            "data": [
                {
                    "id": "5",
                    "symbol": "BTC-USDT",
                    "displaySymbol": "BTC-USDT",
                    "tokenA": { "symbol": "BTC", "displaySymbol": "dBTC", "reserve": "10" },
                    "tokenB": { "symbol": "USDT", "displaySymbol": "dUSDT", "reserve": "20" },
                    "priceRatio": { "ab": "0.5", "ba": "2" },
                    "commission": "0.002",
                    "totalLiquidity": { "token": "14.1", "usd": "40" },
                    "apr": { "total": 0.25, "reward": 0.2, "commission": 0.05 },
                    "volume": { "h24": 500, "d30": 15000 }
                },
                {
                    "id": "17",
                    "symbol": "dUSDT-DFI",
                    "displaySymbol": "dUSDT-DFI/v1",
                    "tokenA": { "symbol": "USDT", "reserve": "1" },
                    "tokenB": { "symbol": "DFI", "reserve": "1" },
                    "priceRatio": { "ab": "1", "ba": "1" },
                    "commission": "0",
                    "volume": { "h24": 999 }
                },
                {
                    "id": "4",
                    "symbol": "ETH-DFI",
                    "displaySymbol": "ETH-DFI",
                    "tokenA": { "symbol": "ETH", "reserve": "3" },
                    "tokenB": { "symbol": "DFI", "reserve": "30" },
                    "priceRatio": { "ab": "0.1", "ba": "10" },
                    "commission": "0.001",
                    "volume": { "h24": "7" }
                }
            ]
        }));

        let dex_prices = unwrap_envelope(json!({
            "data": {
                "denomination": { "id": "3", "symbol": "USDT" },
                "dexPrices": {
                    "DFI": { "token": { "symbol": "DFI" }, "denominationPrice": "0.5" }
                }
            }
        }));

        FixtureSource {
            stats,
            pool_pairs,
            dex_prices,
            offline: false,
        }
    }

    fn fp(units: u64) -> U256 {
        U256::from(units) * U256::exp10(10)
    }

    fn local_client(caller: Address) -> LocalRelayer {
        let relayer = StateRelayer::initialize(CONTRACT, ADMIN, BOT);
        LocalRelayer::new(Arc::new(Mutex::new(relayer)), caller)
    }

    async fn relay(policy: SubmissionPolicy, caller: Address) -> (LocalRelayer, Result<usize, SyncError>) {
        let client = local_client(caller);
        let orchestrator = SyncOrchestrator::new(Arc::new(client.clone()), policy);
        let aggregator = DataAggregator::new(AggregatorConfig::default());

        let result = orchestrator
            .run_cycle(&aggregator, &fixture())
            .await
            .map(|outcome| outcome.receipts.len());
        (client, result)
    }

    fn assert_relayed_state(relayer: &StateRelayer) {
        let btc = relayer.dex_info("BTC-USDT").unwrap();
        assert_eq!(btc.primary_token_price, fp(2));
        assert_eq!(btc.volume_24h, fp(500));
        assert_eq!(btc.total_liquidity, fp(40));
        assert_eq!(btc.apr, U256::from(2_500_000_000u64));
        assert_eq!(btc.rewards, U256::from(2_000_000_000u64));
        assert_eq!(btc.commissions, U256::from(20_000_000u64));
        assert_eq!(btc.decimals, U256::from(10u8));

        let eth = relayer.dex_info("ETH-DFI").unwrap();
        assert_eq!(eth.primary_token_price, fp(5));
        assert_eq!(eth.second_token_balance, fp(30));
        assert!(relayer.dex_info("dUSDT-DFI/v1").is_none());

        let vault = relayer.vault_info();
        assert_eq!(vault.no_of_vaults, U256::from(12u8));
        assert_eq!(vault.total_loan_value, fp(1000));
        assert_eq!(vault.total_collateral_value, fp(2345));
        // 234.5 rounds half away from zero
        assert_eq!(vault.total_collateralization_ratio, U256::from(235u16));
        assert_eq!(vault.active_auctions, U256::from(3u8));

        let master_node = relayer.master_node_information();
        assert_eq!(master_node.total_value_locked_in_master_nodes, fp(3000));
        assert_eq!(master_node.zero_year_locked, fp(100));
        assert_eq!(master_node.five_year_locked, fp(50));
        assert_eq!(master_node.ten_year_locked, U256::from(205_000_000_000u64));
    }

    // ============================================================================
    // Granular and batched relays
    // ============================================================================

    #[tokio::test]
    async fn test_granular_relay_updates_every_slot() {
        let (client, result) = relay(SubmissionPolicy::Granular, BOT).await;
        assert_eq!(result.unwrap(), 3);

        let shared = client.relayer();
        let relayer = shared.lock().await;
        assert_relayed_state(&relayer);
        assert_eq!(relayer.events().len(), 3);
    }

    #[tokio::test]
    async fn test_batched_relay_matches_granular_state() {
        let (batched, result) = relay(SubmissionPolicy::Batched, BOT).await;
        assert_eq!(result.unwrap(), 1);

        let (granular, _) = relay(SubmissionPolicy::Granular, BOT).await;

        let batched = batched.relayer();
        let granular = granular.relayer();
        let batched = batched.lock().await;
        assert_relayed_state(&batched);
        assert_eq!(batched.state(), granular.lock().await.state());
        assert!(!batched.in_batch());
    }

    // ============================================================================
    // Failure paths
    // ============================================================================

    #[tokio::test]
    async fn test_unauthorized_relay_changes_nothing() {
        for policy in [SubmissionPolicy::Granular, SubmissionPolicy::Batched] {
            let outsider = Address::repeat_byte(0x01);
            let (client, result) = relay(policy, outsider).await;

            match result {
                Err(SyncError::Relayer(RelayerError::Unauthorized { account, .. })) => {
                    assert_eq!(account, outsider)
                }
                other => panic!("expected unauthorized, got {:?}", other),
            }

            let shared = client.relayer();
            let relayer = shared.lock().await;
            assert_eq!(relayer.state(), &OnChainState::default());
            assert!(relayer.events().is_empty());
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_submits_nothing() {
        let client = local_client(BOT);
        let orchestrator = SyncOrchestrator::new(Arc::new(client.clone()), SubmissionPolicy::Granular);
        let aggregator = DataAggregator::new(AggregatorConfig::default());
        let mut source = fixture();
        source.offline = true;

        let err = orchestrator.run_cycle(&aggregator, &source).await.unwrap_err();
        assert!(matches!(err, SyncError::UpstreamFetch { .. }));

        let shared = client.relayer();
        assert!(shared.lock().await.events().is_empty());
    }

    #[test]
    fn test_nested_batch_reverts_outer_batch() {
        let mut relayer = StateRelayer::initialize(CONTRACT, ADMIN, BOT);
        let ctx = CallContext::external(BOT, 1_700_000_000);

        let vault: StateRelayerCalls = UpdateVaultGeneralInformationCall {
            vault_info: VaultGeneralInformation {
                no_of_vaults: U256::from(9u8),
                ..Default::default()
            },
        }
        .into();
        let inner_batch: StateRelayerCalls = BatchCallByBotCall {
            func_calls: vec![Bytes::from(vault.clone().encode())],
        }
        .into();
        let outer: StateRelayerCalls = BatchCallByBotCall {
            func_calls: vec![
                Bytes::from(vault.encode()),
                Bytes::from(inner_batch.encode()),
            ],
        }
        .into();

        let err = relayer.execute(&ctx, &outer.encode()).unwrap_err();

        assert_eq!(err, RelayerError::AlreadyInBatchCallByBot);
        assert_eq!(relayer.vault_info().no_of_vaults, U256::zero());
        assert!(relayer.events().is_empty());
        assert!(!relayer.in_batch());
    }

    #[tokio::test]
    async fn test_snapshot_timestamp_is_relayed() {
        let aggregator = DataAggregator::new(AggregatorConfig::default());
        let captured_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let snapshot = aggregator.aggregate_at(&fixture(), captured_at).await.unwrap();

        let client = local_client(BOT);
        let orchestrator = SyncOrchestrator::new(Arc::new(client.clone()), SubmissionPolicy::Batched);
        orchestrator.run(snapshot).await.unwrap();

        let shared = client.relayer();
        let relayer = shared.lock().await;
        let expected = U256::from(1_700_000_000u64);
        assert_eq!(relayer.vault_info().last_updated, expected);
        assert_eq!(relayer.master_node_information().last_updated, expected);
        assert_eq!(relayer.dex_info("ETH-DFI").unwrap().last_updated, expected);
    }
}
