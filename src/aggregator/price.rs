//! Pair price resolution in the reference denomination

use crate::codec::{parse_decimal, FixedDecimal};
use crate::error::SyncError;
use crate::ocean::DexPricesResult;

/// Price of a pair's primary token in `denomination`.
///
/// `price_ratio` is the token-B per token-A ratio. When token B is the
/// denomination itself, or the ratio is zero, the ratio is the price.
/// Otherwise the ratio is chained through token B's denomination price,
/// which counts as zero when the price map does not list it. The product is
/// exact, so flooring it later never rounds a price up.
pub fn resolve_pair_price(
    price_ratio: &str,
    token_b_symbol: &str,
    denomination: &str,
    dex_prices: &DexPricesResult,
) -> Result<FixedDecimal, SyncError> {
    let ratio = parse_decimal(price_ratio)?;
    if token_b_symbol == denomination || ratio.is_zero() {
        return Ok(ratio);
    }

    let token_b_price = match dex_prices.denomination_price(token_b_symbol) {
        Some(price) => parse_decimal(price)?,
        None => FixedDecimal::zero(),
    };

    token_b_price.checked_mul(&ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_decimal;
    use crate::ocean::types::DexPrice;
    use ethers::types::U256;
    use rust_decimal_macros::dec;

    fn price(ratio: &str, token_b: &str, map: &DexPricesResult) -> FixedDecimal {
        resolve_pair_price(ratio, token_b, "USDT", map).unwrap()
    }

    fn prices(entries: &[(&str, &str)]) -> DexPricesResult {
        DexPricesResult {
            dex_prices: entries
                .iter()
                .map(|(symbol, price)| {
                    (
                        symbol.to_string(),
                        DexPrice {
                            denomination_price: Some(price.to_string()),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_denomination_pair_passes_ratio_through() {
        let map = prices(&[("USDT", "999"), ("DFI", "0.5")]);
        assert_eq!(price("2.5", "USDT", &map).to_decimal().unwrap(), dec!(2.5));
        assert_eq!(
            price("2.5", "USDT", &DexPricesResult::default()),
            parse_decimal("2.5").unwrap()
        );
    }

    #[test]
    fn test_zero_ratio_skips_lookup() {
        let map = prices(&[("DFI", "0.5")]);
        assert!(price("0", "DFI", &map).is_zero());
        assert!(price("0.000", "BTC", &DexPricesResult::default()).is_zero());
    }

    #[test]
    fn test_chains_through_token_b_price() {
        // 1 BTC = 20000 DFI, 1 DFI = 0.42 USDT
        let map = prices(&[("DFI", "0.42")]);
        assert_eq!(price("20000", "DFI", &map).to_decimal().unwrap(), dec!(8400));
    }

    #[test]
    fn test_chained_price_never_rounds_up() {
        let map = prices(&[("DFI", "1.000000000000000000000000001")]);
        let chained = price("0.999999999999999999999999999", "DFI", &map);

        assert_eq!(encode_decimal(&chained, 10).unwrap(), U256::from(9_999_999_999u64));
    }

    #[test]
    fn test_unlisted_token_b_prices_at_zero() {
        let map = prices(&[("DFI", "0.42")]);
        assert!(price("3", "ETH", &map).is_zero());
    }

    #[test]
    fn test_malformed_ratio() {
        assert!(matches!(
            resolve_pair_price("n/a", "DFI", "USDT", &DexPricesResult::default()),
            Err(SyncError::InvalidNumericInput { .. })
        ));
    }
}
