//! Item stock levels.
//!
//! The contract stores stock as an `int256` where `-1` means the item is
//! never sold out. That sentinel is decoded into [`Stock::Unlimited`] at the
//! boundary so nothing downstream does arithmetic on it.

use alloy_primitives::I256;
use serde::{Deserialize, Serialize};

/// Errors that can occur when decoding a raw stock value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    /// Negative values other than the `-1` sentinel are not meaningful.
    #[error("invalid negative stock value: {0}")]
    Negative(String),
    /// The count is larger than this client can track.
    #[error("stock value {0} does not fit in 64 bits")]
    Overflow(String),
}

/// Stock level of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stock {
    /// No stock tracking; any quantity can be ordered.
    Unlimited,
    /// Finite number of units left.
    Count(u64),
}

impl Stock {
    /// Decode the contract's raw `int256` stock value.
    ///
    /// # Errors
    ///
    /// Returns an error for negative values other than `-1` and for counts
    /// above `u64::MAX`.
    pub fn from_raw(raw: I256) -> Result<Self, StockError> {
        if raw == I256::MINUS_ONE {
            return Ok(Self::Unlimited);
        }
        if raw.is_negative() {
            return Err(StockError::Negative(raw.to_string()));
        }
        u64::try_from(raw.into_raw())
            .map(Self::Count)
            .map_err(|_| StockError::Overflow(raw.to_string()))
    }

    /// Returns `true` if `quantity` units can be taken.
    #[must_use]
    pub const fn can_supply(self, quantity: u64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Count(n) => n >= quantity,
        }
    }

    /// Stock left after taking `quantity` units, or `None` if there is not
    /// enough.
    #[must_use]
    pub const fn take(self, quantity: u64) -> Option<Self> {
        match self {
            Self::Unlimited => Some(Self::Unlimited),
            Self::Count(n) => match n.checked_sub(quantity) {
                Some(left) => Some(Self::Count(left)),
                None => None,
            },
        }
    }
}

impl core::fmt::Display for Stock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    #[test]
    fn test_sentinel_is_unlimited() {
        assert_eq!(Stock::from_raw(I256::MINUS_ONE).unwrap(), Stock::Unlimited);
    }

    #[test]
    fn test_count_decodes() {
        let raw = I256::from_raw(U256::from(200u64));
        assert_eq!(Stock::from_raw(raw).unwrap(), Stock::Count(200));
    }

    #[test]
    fn test_other_negative_rejected() {
        let raw = I256::MINUS_ONE - I256::ONE;
        assert!(matches!(Stock::from_raw(raw), Err(StockError::Negative(_))));
    }

    #[test]
    fn test_take() {
        assert_eq!(Stock::Count(200).take(2), Some(Stock::Count(198)));
        assert_eq!(Stock::Count(1).take(2), None);
        assert_eq!(Stock::Unlimited.take(500), Some(Stock::Unlimited));
    }

    #[test]
    fn test_can_supply() {
        assert!(Stock::Unlimited.can_supply(u64::MAX));
        assert!(Stock::Count(150).can_supply(150));
        assert!(!Stock::Count(150).can_supply(151));
        assert!(!Stock::Count(0).can_supply(1));
    }
}
