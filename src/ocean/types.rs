//! Ocean API payloads
//!
//! Only the fields the relayer consumes are modelled; serde skips the rest
//! of each payload. Numeric fields arrive either as JSON numbers or as
//! decimal strings and are kept as text so the codec can parse them exactly.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Envelope every Ocean endpoint wraps its payload in
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// `GET /stats`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsData {
    #[serde(default)]
    pub tvl: TvlStats,
    #[serde(default)]
    pub loan: LoanStats,
    #[serde(default)]
    pub masternodes: MasternodeStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TvlStats {
    #[serde(default, deserialize_with = "decimal_text")]
    pub dex: Option<String>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub masternodes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanStats {
    #[serde(default)]
    pub count: LoanCount,
    #[serde(default)]
    pub value: LoanValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanCount {
    #[serde(rename = "openVaults", default)]
    pub open_vaults: Option<u64>,
    #[serde(rename = "openAuctions", default)]
    pub open_auctions: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanValue {
    #[serde(default, deserialize_with = "decimal_text")]
    pub collateral: Option<String>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub loan: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MasternodeStats {
    #[serde(default)]
    pub locked: Vec<LockedMasternode>,
}

/// One staking-term bucket of locked master nodes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockedMasternode {
    /// Lock duration in weeks (0, 260 or 520)
    #[serde(default)]
    pub weeks: Option<u32>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub tvl: Option<String>,
}

/// `GET /poolpairs`
#[derive(Debug, Clone, Deserialize)]
pub struct PoolPairData {
    #[serde(rename = "displaySymbol")]
    pub display_symbol: String,
    #[serde(rename = "tokenA")]
    pub token_a: PoolPairToken,
    #[serde(rename = "tokenB")]
    pub token_b: PoolPairToken,
    #[serde(rename = "priceRatio")]
    pub price_ratio: PriceRatio,
    #[serde(deserialize_with = "required_decimal_text")]
    pub commission: String,
    #[serde(rename = "totalLiquidity", default)]
    pub total_liquidity: TotalLiquidity,
    #[serde(default)]
    pub apr: Option<PoolPairApr>,
    #[serde(default)]
    pub volume: Option<PoolPairVolume>,
}

impl PoolPairData {
    /// Composite pairs (e.g. `dUSDT-DFI/v1`) are not relayed
    pub fn is_composite(&self) -> bool {
        self.display_symbol.contains('/')
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolPairToken {
    pub symbol: String,
    #[serde(deserialize_with = "required_decimal_text")]
    pub reserve: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRatio {
    #[serde(deserialize_with = "required_decimal_text")]
    pub ba: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TotalLiquidity {
    #[serde(default, deserialize_with = "decimal_text")]
    pub usd: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolPairApr {
    #[serde(default, deserialize_with = "decimal_text")]
    pub total: Option<String>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub reward: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolPairVolume {
    #[serde(default, deserialize_with = "decimal_text")]
    pub h24: Option<String>,
}

/// `GET /poolpairs/dexprices?denomination=...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexPricesResult {
    #[serde(rename = "dexPrices", default)]
    pub dex_prices: HashMap<String, DexPrice>,
}

impl DexPricesResult {
    /// Price of `symbol` in the requested denomination, if listed
    pub fn denomination_price(&self, symbol: &str) -> Option<&str> {
        self.dex_prices
            .get(symbol)
            .and_then(|p| p.denomination_price.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexPrice {
    #[serde(rename = "denominationPrice", default, deserialize_with = "decimal_text")]
    pub denomination_price: Option<String>,
}

fn decimal_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a number or decimal string, got {}",
            other
        ))),
    }
}

fn required_decimal_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    decimal_text(deserializer)?.ok_or_else(|| D::Error::custom("missing numeric value"))
}
