//! Wei-denominated amounts.
//!
//! Prices, order costs and balances are fixed-point integers in wei
//! (10^-18 ether). Arithmetic stays in 256-bit integers; `rust_decimal` is
//! only used to parse human-entered ether strings.

use core::fmt;
use core::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of decimal places between ether and wei.
pub const ETHER_DECIMALS: u32 = 18;

/// Errors that can occur when parsing an ether amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WeiError {
    /// The input is not a decimal number.
    #[error("invalid ether amount: {0}")]
    Invalid(String),
    /// The input is below zero.
    #[error("ether amount cannot be negative")]
    Negative,
    /// The input has more precision than wei can represent.
    #[error("ether amount has more than {max} decimal places")]
    TooPrecise {
        /// Maximum allowed decimal places.
        max: u32,
    },
}

/// An amount of wei.
///
/// ## Examples
///
/// ```
/// use shop_agile_core::Wei;
///
/// let price = Wei::parse_ether("0.67").unwrap();
/// assert_eq!(price, Wei::from_wei(670_000_000_000_000_000));
/// assert_eq!(price.to_ether_string(), "0.67");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wei(U256);

impl Wei {
    /// Zero wei.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wrap a raw 256-bit wei amount.
    #[must_use]
    pub const fn new(amount: U256) -> Self {
        Self(amount)
    }

    /// Create an amount from a wei count.
    #[must_use]
    pub fn from_wei(amount: u128) -> Self {
        Self(U256::from(amount))
    }

    /// Get the raw 256-bit amount.
    #[must_use]
    pub const fn as_u256(self) -> U256 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a decimal ether string such as `"0.11"` or `"5"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number, is negative, or
    /// has more than 18 decimal places.
    pub fn parse_ether(s: &str) -> Result<Self, WeiError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|e| WeiError::Invalid(format!("{s}: {e}")))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(WeiError::Negative);
        }

        let scale = amount.scale();
        if scale > ETHER_DECIMALS {
            return Err(WeiError::TooPrecise {
                max: ETHER_DECIMALS,
            });
        }

        // A decimal mantissa is at most 96 bits, so this cannot overflow.
        let mantissa = U256::from(amount.mantissa().unsigned_abs());
        let factor = U256::from(10u64).pow(U256::from(ETHER_DECIMALS - scale));
        Ok(Self(mantissa * factor))
    }

    /// Format as a decimal ether string with trailing zeros removed.
    #[must_use]
    pub fn to_ether_string(&self) -> String {
        let unit = U256::from(10u64).pow(U256::from(ETHER_DECIMALS));
        let (whole, frac) = self.0.div_rem(unit);
        let frac: u64 = frac.saturating_to();

        if frac == 0 {
            return whole.to_string();
        }

        let frac = format!("{frac:018}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Checked multiplication by an integer factor.
    #[must_use]
    pub fn checked_mul(self, factor: u64) -> Option<Self> {
        self.0.checked_mul(U256::from(factor)).map(Self)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", self.to_ether_string())
    }
}

impl FromStr for Wei {
    type Err = WeiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_ether(s)
    }
}

impl From<U256> for Wei {
    fn from(amount: U256) -> Self {
        Self(amount)
    }
}

impl From<Wei> for U256 {
    fn from(amount: Wei) -> Self {
        amount.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_ether() {
        let amount = Wei::parse_ether("5").unwrap();
        assert_eq!(amount, Wei::from_wei(5_000_000_000_000_000_000));
    }

    #[test]
    fn test_parse_fractional_ether() {
        assert_eq!(
            Wei::parse_ether("0.559").unwrap(),
            Wei::from_wei(559_000_000_000_000_000)
        );
        assert_eq!(
            Wei::parse_ether("0.000000000000000001").unwrap(),
            Wei::from_wei(1)
        );
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Wei::parse_ether("-1"), Err(WeiError::Negative));
    }

    #[test]
    fn test_parse_rejects_too_precise() {
        assert_eq!(
            Wei::parse_ether("0.0000000000000000001"),
            Err(WeiError::TooPrecise { max: 18 })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Wei::parse_ether("lots"),
            Err(WeiError::Invalid(_))
        ));
    }

    #[test]
    fn test_to_ether_string() {
        assert_eq!(Wei::ZERO.to_ether_string(), "0");
        assert_eq!(
            Wei::from_wei(1_115_000_000_000_000_000).to_ether_string(),
            "1.115"
        );
        assert_eq!(Wei::from_wei(1).to_ether_string(), "0.000000000000000001");
    }

    #[test]
    fn test_display() {
        let amount = Wei::parse_ether("0.11").unwrap();
        assert_eq!(format!("{amount}"), "0.11 ETH");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Wei::from_wei(10);
        assert_eq!(a.checked_add(Wei::from_wei(5)), Some(Wei::from_wei(15)));
        assert_eq!(a.checked_sub(Wei::from_wei(11)), None);
        assert_eq!(a.checked_mul(3), Some(Wei::from_wei(30)));
        assert_eq!(Wei::new(U256::MAX).checked_mul(2), None);
    }

    #[test]
    fn test_raw_amount() {
        let amount = Wei::from_wei(1_115_000_000_000_000_000);
        let raw = Some(amount).map(Wei::as_u256);
        assert_eq!(raw, Some(U256::from(1_115_000_000_000_000_000u128)));
        assert!(Wei::ZERO.is_zero());
        assert!(!amount.is_zero());
    }
}
