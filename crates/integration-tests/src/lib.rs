//! Integration tests for the Shop Agile Web3 client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-agile-integration-tests
//! ```
//!
//! Every test runs against [`MemoryChain`] seeded with the bakery fixture,
//! so no node is needed.
//!
//! # Test Categories
//!
//! - `session` - Wallet connect, account and network changes
//! - `supersession` - Late reads of a previous account are discarded
//! - `orders` - Placing and collecting orders through the synchronizer
//! - `permissions` - Owner and manager restrictions

use std::sync::Arc;

use shop_agile_core::{Address, NetworkId};
use shop_agile_dapp::memory::{MemoryChain, ShopFixture};
use shop_agile_dapp::sync::{SyncHandle, Synchronizer};
use shop_agile_dapp::{ChainConnector, NetworkRequirement};
use tokio::task::JoinHandle;

/// Name of the network the bakery fixture is deployed on.
pub const HARDHAT_NAME: &str = "Hardhat localhost";

/// Synchronizer wired to an in-memory chain.
pub type MemorySync = Synchronizer<MemoryChain, MemoryChain>;

/// An in-memory deployment of the bakery fixture.
pub struct TestShop {
    pub chain: MemoryChain,
    pub fixture: ShopFixture,
}

impl TestShop {
    /// Deploy the bakery fixture on a fresh chain.
    #[must_use]
    pub fn bakery() -> Self {
        let fixture = ShopFixture::bakery();
        Self {
            chain: MemoryChain::new(fixture.clone()),
            fixture,
        }
    }

    /// Contract owner, selected by the wallet at start.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.fixture.owner
    }

    /// Manager assigned at deployment.
    #[must_use]
    pub fn manager(&self) -> Address {
        self.account(1)
    }

    /// Wallet account `index`.
    ///
    /// # Panics
    ///
    /// Panics if the fixture has no such account.
    #[must_use]
    pub fn account(&self, index: usize) -> Address {
        self.fixture.accounts.get(index).copied().unwrap_or_else(|| {
            panic!(
                "fixture has {} accounts, no #{index}",
                self.fixture.accounts.len()
            )
        })
    }

    /// A synchronizer in the Disconnected phase.
    #[must_use]
    pub fn synchronizer(&self) -> MemorySync {
        let connector = ChainConnector::new(
            Arc::new(self.chain.clone()),
            NetworkRequirement::new(NetworkId::HARDHAT, HARDHAT_NAME),
        );
        Synchronizer::new(connector, self.chain.clone())
    }

    /// A synchronizer connected with the selected account and settled.
    ///
    /// # Panics
    ///
    /// Panics if the connect fails.
    pub async fn ready(&self) -> MemorySync {
        let mut sync = self.synchronizer();
        if let Err(e) = sync.connect().await {
            panic!("connect failed: {e}");
        }
        sync.settle().await;
        sync
    }

    /// A synchronizer running on its own task.
    #[must_use]
    pub fn spawn(&self) -> (SyncHandle, JoinHandle<()>) {
        self.synchronizer().spawn()
    }
}
