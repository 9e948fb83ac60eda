//! Shop Agile Core - Shared domain types.
//!
//! This crate provides the types every Shop Agile Web3 component agrees on:
//! - `dapp` - Wallet connector, contract gateway and view-state synchronizer
//! - `cli` - Operator commands against a deployed shop contract
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no RPC clients, no async
//! runtime. Canonical state lives in the `ShopAgileWeb3` contract; these types
//! are read-only projections of it.
//!
//! # Modules
//!
//! - [`types`] - Ids, wei amounts, stock, items, orders, pickup locations,
//!   network ids and sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use alloy_primitives::{Address, I256, U256};
pub use types::*;
