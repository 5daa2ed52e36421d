//! Numeric codec - decimal strings to on-chain fixed-point integers
//!
//! Every quantity written to the relayer contract is an unsigned integer
//! scaled by `10^decimals`. Scaling always floors, so an encoded value never
//! overstates the off-chain quantity it came from.
//!
//! Source values are parsed into a `FixedDecimal`, an exact digit string with
//! a base-10 exponent. Precision is unbounded until the final conversion into
//! `U256`, where exceeding 256 bits is the only range error.

use ethers::types::U256;
use rust_decimal::Decimal;
use std::fmt;

use crate::error::SyncError;

/// Fixed-point precision used by the relayer contract
pub const DEFAULT_DECIMALS: u32 = 10;

/// Digits of `U256::MAX`
const UINT256_DIGITS: usize = 78;

/// Exact non-negative decimal: `digits * 10^exponent`.
///
/// Kept normalized (no leading or trailing zeros in `digits`, zero is `"0"`
/// with exponent 0), so derived equality is value equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDecimal {
    digits: String,
    exponent: i64,
}

impl FixedDecimal {
    pub fn zero() -> Self {
        Self {
            digits: "0".to_string(),
            exponent: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }

    /// Parse plain (`"1234.5"`) or scientific (`"1.5e21"`) notation, which is
    /// what JSON numbers turn into once they are kept as text.
    pub fn parse(value: &str) -> Result<Self, SyncError> {
        let invalid = |reason: &str| SyncError::invalid_numeric(value, reason);

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty string"));
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (mantissa, exponent) = match unsigned.find(|c| c == 'e' || c == 'E') {
            Some(at) => {
                let exponent = unsigned[at + 1..]
                    .parse::<i64>()
                    .map_err(|_| invalid("malformed exponent"))?;
                (&unsigned[..at], exponent)
            }
            None => (unsigned, 0),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("no digits"));
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a decimal number"));
        }

        let frac_len = i64::try_from(frac_part.len()).map_err(|_| invalid("too many digits"))?;
        let exponent = exponent
            .checked_sub(frac_len)
            .ok_or_else(|| invalid("exponent out of range"))?;
        let parsed = Self::normalized(format!("{}{}", int_part, frac_part), exponent)
            .ok_or_else(|| invalid("exponent out of range"))?;

        if negative && !parsed.is_zero() {
            return Err(invalid("on-chain quantities are unsigned"));
        }
        Ok(parsed)
    }

    fn normalized(digits: String, exponent: i64) -> Option<Self> {
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Some(Self::zero());
        }
        let trimmed = significant.trim_end_matches('0');
        let trailing = i64::try_from(significant.len() - trimmed.len()).ok()?;

        Some(Self {
            digits: trimmed.to_string(),
            exponent: exponent.checked_add(trailing)?,
        })
    }

    /// Exact product; no digit is ever rounded away
    pub fn checked_mul(&self, other: &Self) -> Result<Self, SyncError> {
        if self.is_zero() || other.is_zero() {
            return Ok(Self::zero());
        }

        let a: Vec<u32> = self.digits.bytes().rev().map(|b| u32::from(b - b'0')).collect();
        let b: Vec<u32> = other.digits.bytes().rev().map(|b| u32::from(b - b'0')).collect();
        let mut product = vec![0u32; a.len() + b.len()];
        for (i, x) in a.iter().enumerate() {
            let mut carry = 0;
            for (j, y) in b.iter().enumerate() {
                let cell = product[i + j] + x * y + carry;
                product[i + j] = cell % 10;
                carry = cell / 10;
            }
            product[i + b.len()] += carry;
        }

        let digits: String = product
            .iter()
            .rev()
            .map(|d| char::from(b'0' + *d as u8))
            .collect();
        let exponent = self.exponent.checked_add(other.exponent);

        exponent
            .and_then(|e| Self::normalized(digits, e))
            .ok_or_else(|| {
                SyncError::invalid_numeric(format!("{} * {}", self, other), "exponent out of range")
            })
    }

    /// `floor(self * 10^decimals)` as a `U256`
    pub fn scale_floor(&self, decimals: u32) -> Result<U256, SyncError> {
        if self.is_zero() {
            return Ok(U256::zero());
        }

        let overflow = || SyncError::invalid_numeric(self.to_string(), "exceeds uint256");
        let shift = self.exponent.saturating_add(i64::from(decimals));

        let integer_digits = if shift >= 0 {
            let zeros = usize::try_from(shift).map_err(|_| overflow())?;
            if self.digits.len().saturating_add(zeros) > UINT256_DIGITS {
                return Err(overflow());
            }
            format!("{}{}", self.digits, "0".repeat(zeros))
        } else {
            let dropped = usize::try_from(shift.unsigned_abs()).unwrap_or(usize::MAX);
            if dropped >= self.digits.len() {
                return Ok(U256::zero());
            }
            self.digits[..self.digits.len() - dropped].to_string()
        };

        U256::from_dec_str(&integer_digits).map_err(|_| overflow())
    }

    /// Nearest `rust_decimal` value, truncating digits beyond its 28-digit
    /// precision
    pub fn to_decimal(&self) -> Result<Decimal, SyncError> {
        const MAX_DIGITS: usize = 28;
        const MAX_SCALE: i64 = 28;

        let mut digits = self.digits.as_str();
        let mut exponent = self.exponent;
        if digits.len() > MAX_DIGITS {
            exponent += (digits.len() - MAX_DIGITS) as i64;
            digits = &digits[..MAX_DIGITS];
        }
        if exponent < -MAX_SCALE {
            let excess = usize::try_from(-MAX_SCALE - exponent).unwrap_or(usize::MAX);
            if excess >= digits.len() {
                return Ok(Decimal::ZERO);
            }
            digits = &digits[..digits.len() - excess];
            exponent = -MAX_SCALE;
        }

        Decimal::from_scientific(&format!("{}e{}", digits, exponent))
            .map_err(|e| SyncError::invalid_numeric(self.to_string(), e))
    }
}

impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent == 0 {
            write!(f, "{}", self.digits)
        } else {
            write!(f, "{}e{}", self.digits, self.exponent)
        }
    }
}

/// Parse a decimal string exactly, without going through binary floating point
pub fn parse_decimal(value: &str) -> Result<FixedDecimal, SyncError> {
    FixedDecimal::parse(value)
}

/// Encode a decimal string as `floor(value * 10^decimals)`
pub fn encode(value: &str, decimals: u32) -> Result<U256, SyncError> {
    parse_decimal(value)?.scale_floor(decimals)
}

/// Encode an optional source value; a missing value is the zero quantity
pub fn encode_or_zero(value: Option<&str>, decimals: u32) -> Result<U256, SyncError> {
    match value {
        Some(v) => encode(v, decimals),
        None => Ok(U256::zero()),
    }
}

/// Encode an already parsed decimal as `floor(value * 10^decimals)`
pub fn encode_decimal(value: &FixedDecimal, decimals: u32) -> Result<U256, SyncError> {
    value.scale_floor(decimals)
}

/// Integer part of a non-negative `rust_decimal` value, for percentages
pub fn to_integer(value: Decimal) -> Result<U256, SyncError> {
    encode(&value.to_string(), 0)
}
