//! Order status.

use serde::{Deserialize, Serialize};

/// Error decoding a raw order status.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct OrderStatusError(pub u8);

/// Order lifecycle status.
///
/// Maps to the contract's `OrderStatus` enum (`uint8` on the wire). The
/// contract only moves orders forward: `Ordered` → `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Paid for and waiting to be collected.
    #[default]
    Ordered,
    /// Collected at the pickup location.
    Completed,
}

impl OrderStatus {
    /// Decode the contract's `uint8` representation.
    ///
    /// # Errors
    ///
    /// Returns an error for values the contract does not define.
    pub const fn from_raw(raw: u8) -> Result<Self, OrderStatusError> {
        match raw {
            0 => Ok(Self::Ordered),
            1 => Ok(Self::Completed),
            other => Err(OrderStatusError(other)),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordered => write!(f, "ordered"),
            Self::Completed => write!(f, "completed"),
        }
    }
}
