//! Shop items.

use serde::{Deserialize, Serialize};

use super::{ItemId, Stock, Wei};

/// An item for sale, as read from the contract.
///
/// Items are fetched as a batch snapshot; a change on chain is only seen
/// after the next full re-fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// On-chain id (position in the contract's item array).
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Unit price in wei.
    pub price: Wei,
    /// Units left, or unlimited.
    pub stock: Stock,
    /// Image/metadata URI.
    pub ipfs_uri: String,
}

impl Item {
    /// Returns `true` if `quantity` units can currently be ordered.
    #[must_use]
    pub const fn can_order(&self, quantity: u64) -> bool {
        quantity > 0 && self.stock.can_supply(quantity)
    }
}
