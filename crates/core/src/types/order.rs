//! Orders.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::{ItemId, OrderId, OrderStatus, PickupLocationId, Wei};

/// An order placed through the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// On-chain order id (starts at 1).
    pub id: OrderId,
    /// Account that placed the order.
    pub user: Address,
    /// Ordered item.
    pub item_id: ItemId,
    /// Units ordered.
    pub quantity: u64,
    /// Where the order will be collected.
    pub pickup_location_id: PickupLocationId,
    /// Amount charged, in wei.
    pub cost: Wei,
    /// Lifecycle status.
    pub status: OrderStatus,
}

impl Order {
    /// Returns `true` if the order can still be collected.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Ordered)
    }
}
