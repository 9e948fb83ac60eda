//! Chain Connector.
//!
//! Wraps a [`WalletProvider`] and turns it into a session: request account
//! access, check the network against the deployment and keep one long-lived
//! subscription to account and network changes.

mod rpc;

use std::future::Future;
use std::sync::Arc;

use shop_agile_core::{Address, NetworkId, Session, Wei};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::error::DappError;

pub use rpc::RpcWallet;

/// Notification pushed by the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletEvent {
    /// The selected account changed; `None` when the wallet exposes none.
    AccountsChanged(Option<Address>),
    /// The wallet switched networks.
    ChainChanged(NetworkId),
}

/// A wallet holding the user's keys (external collaborator).
pub trait WalletProvider: Send + Sync + 'static {
    /// Ask for account access. The selected account comes first.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, DappError>> + Send;

    /// Network the wallet is currently on.
    fn network_version(&self) -> impl Future<Output = Result<NetworkId, DappError>> + Send;

    /// Native balance of `account`.
    fn balance(&self, account: Address) -> impl Future<Output = Result<Wei, DappError>> + Send;

    /// Start receiving account and network notifications.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent>;
}

/// Network the contract is deployed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRequirement {
    /// Required network id.
    pub id: NetworkId,
    /// Human-readable name used in error messages.
    pub name: String,
}

impl NetworkRequirement {
    /// Create a network requirement.
    #[must_use]
    pub fn new(id: NetworkId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Session-level wrapper around a wallet provider.
pub struct ChainConnector<W> {
    wallet: Arc<W>,
    required: NetworkRequirement,
    events: Option<mpsc::UnboundedReceiver<WalletEvent>>,
}

impl<W: WalletProvider> ChainConnector<W> {
    /// Create a connector that only accepts wallets on `required`.
    #[must_use]
    pub const fn new(wallet: Arc<W>, required: NetworkRequirement) -> Self {
        Self {
            wallet,
            required,
            events: None,
        }
    }

    /// The wrapped wallet.
    #[must_use]
    pub const fn wallet(&self) -> &Arc<W> {
        &self.wallet
    }

    /// Network this connector requires.
    #[must_use]
    pub const fn required_network(&self) -> &NetworkRequirement {
        &self.required
    }

    /// Request account access and validate the network.
    ///
    /// Subscribes to wallet notifications on the first successful connect;
    /// later connects reuse that subscription.
    ///
    /// # Errors
    ///
    /// Returns `DappError::WalletUnavailable` if no wallet answers,
    /// `DappError::NoAccounts` if it exposes no account and
    /// `DappError::NetworkMismatch` if it is on the wrong network.
    #[instrument(skip(self), fields(required = %self.required.id))]
    pub async fn connect(&mut self) -> Result<Session, DappError> {
        let accounts = self.wallet.request_accounts().await?;
        let selected = *accounts.first().ok_or(DappError::NoAccounts)?;

        let network = self.wallet.network_version().await?;
        if network != self.required.id {
            warn!(actual = %network, "Wallet is on the wrong network");
            return Err(DappError::NetworkMismatch {
                required: self.required.id,
                required_name: self.required.name.clone(),
                actual: network,
            });
        }

        if self.events.is_none() {
            self.events = Some(self.wallet.subscribe());
        }

        info!(account = %selected, network = %network, "Wallet connected");
        Ok(Session::new(selected, network))
    }

    /// Wait for the next wallet notification.
    ///
    /// Pends forever before the first successful connect. Returns `None` once
    /// the wallet closes its notification stream.
    pub async fn next_event(&mut self) -> Option<WalletEvent> {
        match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => std::future::pending().await,
        }
    }
}
