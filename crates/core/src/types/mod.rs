//! Core types for Shop Agile Web3.
//!
//! This module provides type-safe wrappers for the shop's on-chain concepts.

pub mod fee;
pub mod id;
pub mod item;
pub mod location;
pub mod network;
pub mod order;
pub mod snapshot;
pub mod status;
pub mod stock;
pub mod wei;

pub use fee::FeeSchedule;
pub use id::*;
pub use item::Item;
pub use location::PickupLocation;
pub use network::{NetworkId, NetworkIdError, Session};
pub use order::Order;
pub use snapshot::Snapshot;
pub use status::{OrderStatus, OrderStatusError};
pub use stock::{Stock, StockError};
pub use wei::{Wei, WeiError};
