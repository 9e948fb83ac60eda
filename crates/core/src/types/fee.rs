//! Order fee schedule.
//!
//! The contract charges `baseFee + price * quantity * percentFee / 100` for
//! an order and is the authority on that amount. The client mirrors the
//! formula only to choose how much value to send with `placeOrder`.

use serde::{Deserialize, Serialize};

use super::Wei;

/// Fee parameters read from the contract's `baseFee()` and `percentFee()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Flat fee added to every order.
    pub base_fee: Wei,
    /// Percentage of the item subtotal that is charged.
    pub percent_fee: u64,
}

impl FeeSchedule {
    /// Create a fee schedule.
    #[must_use]
    pub const fn new(base_fee: Wei, percent_fee: u64) -> Self {
        Self {
            base_fee,
            percent_fee,
        }
    }

    /// Expected cost of ordering `quantity` units at `price`.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn quote(&self, price: Wei, quantity: u64) -> Option<Wei> {
        let subtotal = price.checked_mul(quantity)?.checked_mul(self.percent_fee)?;
        let charged = Wei::new(subtotal.as_u256() / alloy_primitives::U256::from(100u64));
        self.base_fee.checked_add(charged)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bakery_fees() -> FeeSchedule {
        FeeSchedule::new(Wei::parse_ether("0.11").unwrap(), 75)
    }

    #[test]
    fn test_quote_finite_item() {
        let price = Wei::parse_ether("0.67").unwrap();
        assert_eq!(
            bakery_fees().quote(price, 2),
            Some(Wei::from_wei(1_115_000_000_000_000_000))
        );
    }

    #[test]
    fn test_quote_bulk_order() {
        let price = Wei::parse_ether("5").unwrap();
        assert_eq!(
            bakery_fees().quote(price, 500),
            Some(Wei::parse_ether("1875.11").unwrap())
        );
    }

    #[test]
    fn test_quote_overflow() {
        let price = Wei::new(alloy_primitives::U256::MAX);
        assert_eq!(bakery_fees().quote(price, 2), None);
    }
}
