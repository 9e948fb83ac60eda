//! Revert reasons raised by the shop contract.
//!
//! Checks on `placeOrder` run in the order the constants appear below, so
//! a call that breaks several rules reports the first one.

pub const INVALID_ITEM_ID: &str = "Invalid itemId.";
pub const ZERO_QUANTITY: &str = "Quantity must be greater than 0.";
pub const INVALID_PICKUP_LOCATION_ID: &str = "Invalid pickupLocationId.";
pub const NOT_ENOUGH_STOCK: &str = "Not enough items in stock.";
pub const INSUFFICIENT_PAYMENT: &str = "Insufficient payment.";

pub const INVALID_ORDER_ID: &str = "Invalid orderId.";
pub const ALREADY_COLLECTED: &str = "Order is already collected.";

pub const ONLY_OWNER: &str = "Only the owner can perform this action.";
pub const ONLY_MANAGERS: &str = "Only managers can perform this action.";
pub const ALREADY_MANAGER: &str = "Address is already a manager.";
pub const NOT_MANAGER: &str = "Address is not a manager.";
