//! Network ids and wallet sessions.

use core::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`NetworkId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid network id: {0}")]
pub struct NetworkIdError(pub String);

/// Numeric network (chain) id, e.g. `31337` for a local Hardhat node.
///
/// Parses both the decimal form returned by `net_version` and the
/// `0x`-prefixed form returned by `eth_chainId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(u64);

impl NetworkId {
    /// The default network id of a local Hardhat node.
    pub const HARDHAT: Self = Self(31337);

    /// Create a network id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl core::str::FromStr for NetworkId {
    type Err = NetworkIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        parsed.map(Self).map_err(|_| NetworkIdError(s.to_owned()))
    }
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A connected wallet session.
///
/// Absent (`None` at the holder) before connect and after disconnect,
/// account removal or a network change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Account the wallet selected.
    pub selected_address: Address,
    /// Network the wallet is on.
    pub network: NetworkId,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub const fn new(selected_address: Address, network: NetworkId) -> Self {
        Self {
            selected_address,
            network,
        }
    }

    /// Abbreviated address for display, e.g. `0xf39...2266`.
    #[must_use]
    pub fn short_address(&self) -> String {
        let full = self.selected_address.to_checksum(None);
        let head = full.get(..5).unwrap_or(&full);
        let tail = full.get(full.len().saturating_sub(4)..).unwrap_or_default();
        format!("{head}...{tail}")
    }
}
