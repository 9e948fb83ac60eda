//! Pickup locations.

use serde::{Deserialize, Serialize};

use super::PickupLocationId;

/// A store where orders are collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupLocation {
    /// On-chain id (position in the contract's location array).
    pub id: PickupLocationId,
    /// Store name.
    pub name: String,
    /// Street address.
    pub street_address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Contact phone number.
    pub phone: String,
}

impl PickupLocation {
    /// Single-line address for display.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}", self.street_address, self.city, self.state)
    }
}
