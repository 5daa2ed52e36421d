//! Ocean REST API client
//!
//! Endpoints: `{url}/v0/{network}/stats`, `/poolpairs`, `/poolpairs/dexprices`

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::types::{ApiResponse, DexPricesResult, PoolPairData, StatsData};
use super::StatsSource;
use crate::error::SyncError;

/// HTTP client for the Ocean statistics API
pub struct OceanClient {
    client: Client,
    base_url: String,
    network: String,
}

impl OceanClient {
    /// Create a new client for `network` (e.g. `mainnet`, `testnet`)
    pub fn new(base_url: &str, network: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::upstream(base_url, e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            network: network.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v0/{}/{}", self.base_url, self.network, path)
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let url = self.endpoint(path);
        debug!(url = %url, ?query, "Fetching from Ocean");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::upstream(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::upstream(&url, format!("HTTP {}: {}", status, body)));
        }

        let payload: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| SyncError::upstream(&url, format!("malformed payload: {}", e)))?;

        Ok(payload.data)
    }
}

#[async_trait]
impl StatsSource for OceanClient {
    async fn get_stats(&self) -> Result<StatsData, SyncError> {
        self.get_data("stats", &[]).await
    }

    async fn list_pool_pairs(&self, limit: usize) -> Result<Vec<PoolPairData>, SyncError> {
        let pairs: Vec<PoolPairData> = self
            .get_data("poolpairs", &[("size", limit.to_string())])
            .await?;
        debug!(count = pairs.len(), limit, "Fetched pool pairs");
        Ok(pairs)
    }

    async fn list_dex_prices(&self, denomination: &str) -> Result<DexPricesResult, SyncError> {
        self.get_data(
            "poolpairs/dexprices",
            &[("denomination", denomination.to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_layout() {
        let client =
            OceanClient::new("https://ocean.defichain.com/", "mainnet", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.endpoint("poolpairs/dexprices"),
            "https://ocean.defichain.com/v0/mainnet/poolpairs/dexprices"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_upstream_error() {
        // Reserve a free port, then close it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = format!("http://127.0.0.1:{}", port);
        let client = OceanClient::new(&url, "mainnet", Duration::from_millis(500)).unwrap();
        let err = client.get_stats().await.unwrap_err();
        assert!(matches!(err, SyncError::UpstreamFetch { .. }));
    }
}
