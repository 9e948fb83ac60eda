//! Wallet provider backed by a node's unlocked accounts.
//!
//! Development nodes (Hardhat, Anvil) hold the keys of their test accounts
//! and sign `eth_sendTransaction` themselves, so the node can stand in for a
//! browser wallet. Account and network changes are detected by polling.

use std::time::Duration;

use alloy_primitives::U256;
use shop_agile_core::{Address, NetworkId, Wei};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use super::{WalletEvent, WalletProvider};
use crate::error::DappError;
use crate::rpc::{NO_PARAMS, RpcClient};

/// Wallet that selects one of the node's unlocked accounts.
#[derive(Clone)]
pub struct RpcWallet {
    rpc: RpcClient,
    account_index: usize,
    poll_interval: Duration,
}

impl RpcWallet {
    /// Create a wallet that uses the node account at `account_index`.
    #[must_use]
    pub const fn new(rpc: RpcClient, account_index: usize, poll_interval: Duration) -> Self {
        Self {
            rpc,
            account_index,
            poll_interval,
        }
    }

    async fn selected_account(&self) -> Result<Option<Address>, DappError> {
        let accounts: Vec<Address> = self.rpc.request("eth_accounts", NO_PARAMS).await?;
        Ok(accounts.get(self.account_index).copied())
    }

    async fn current_network(&self) -> Result<NetworkId, DappError> {
        let version: String = self.rpc.request("net_version", NO_PARAMS).await?;
        version
            .parse()
            .map_err(|e| DappError::Decode(format!("net_version: {e}")))
    }
}

impl WalletProvider for RpcWallet {
    #[instrument(skip(self), fields(account_index = self.account_index))]
    async fn request_accounts(&self) -> Result<Vec<Address>, DappError> {
        match self.selected_account().await {
            Ok(account) => Ok(account.into_iter().collect()),
            Err(DappError::RpcTransport(e)) => {
                warn!(error = %e, "Node wallet unreachable");
                Err(DappError::WalletUnavailable)
            }
            Err(e) => Err(e),
        }
    }

    async fn network_version(&self) -> Result<NetworkId, DappError> {
        self.current_network().await
    }

    #[instrument(skip(self), fields(account = %account))]
    async fn balance(&self, account: Address) -> Result<Wei, DappError> {
        let balance: U256 = self
            .rpc
            .request("eth_getBalance", (account, "latest"))
            .await?;
        Ok(Wei::new(balance))
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let wallet = self.clone();

        info!(interval_ms = ?self.poll_interval.as_millis(), "Spawning wallet poller");
        tokio::spawn(async move {
            wallet.poll_changes(tx).await;
            debug!("Wallet poller stopped");
        });

        rx
    }
}

impl RpcWallet {
    /// Emit an event whenever the selected account or network changes.
    ///
    /// Runs until the receiving side is dropped.
    async fn poll_changes(&self, tx: mpsc::UnboundedSender<WalletEvent>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_account = None;
        let mut last_network = None;
        let mut primed = false;

        while !tx.is_closed() {
            ticker.tick().await;

            let (account, network) =
                match tokio::try_join!(self.selected_account(), self.current_network()) {
                    Ok(observed) => observed,
                    Err(e) => {
                        warn!(error = %e, "Wallet poll failed");
                        continue;
                    }
                };

            if primed {
                if network != last_network.unwrap_or(network) {
                    let _ = tx.send(WalletEvent::ChainChanged(network));
                }
                if account != last_account {
                    let _ = tx.send(WalletEvent::AccountsChanged(account));
                }
            }

            last_account = account;
            last_network = Some(network);
            primed = true;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use alloy_primitives::address;
    use secrecy::SecretString;
    use serde_json::json;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;
    use crate::testing::{MockNode, Reply, find_available_port};

    const POLL: Duration = Duration::from_millis(20);

    const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    struct NodeState {
        accounts: Vec<Address>,
        network: &'static str,
    }

    async fn node(state: Arc<Mutex<NodeState>>) -> MockNode {
        MockNode::start(move |method, _| {
            let state = state.lock().unwrap();
            match method {
                "eth_accounts" => Reply::Result(json!(state.accounts)),
                "net_version" => Reply::Result(json!(state.network)),
                _ => Reply::Error {
                    code: -32601,
                    message: format!("Method {method} not found"),
                },
            }
        })
        .await
    }

    fn state() -> Arc<Mutex<NodeState>> {
        Arc::new(Mutex::new(NodeState {
            accounts: vec![ALICE, BOB],
            network: "31337",
        }))
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<WalletEvent>) -> WalletEvent {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_request_accounts_selects_index() {
        let node = node(state()).await;
        let rpc = RpcClient::new(node.url()).unwrap();

        let wallet = RpcWallet::new(rpc.clone(), 1, POLL);
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![BOB]);

        let wallet = RpcWallet::new(rpc, 5, POLL);
        assert!(wallet.request_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_network_version_parses() {
        let node = node(state()).await;
        let wallet = RpcWallet::new(RpcClient::new(node.url()).unwrap(), 0, POLL);

        assert_eq!(wallet.network_version().await.unwrap(), NetworkId::HARDHAT);
    }

    #[tokio::test]
    async fn test_unreachable_node_is_wallet_unavailable() {
        let port = find_available_port();
        let rpc = RpcClient::new(SecretString::from(format!("http://127.0.0.1:{port}"))).unwrap();
        let wallet = RpcWallet::new(rpc, 0, POLL);

        assert!(matches!(
            wallet.request_accounts().await,
            Err(DappError::WalletUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_poller_reports_changes_once() {
        let state = state();
        let node = node(Arc::clone(&state)).await;
        let wallet = RpcWallet::new(RpcClient::new(node.url()).unwrap(), 0, POLL);

        let mut rx = wallet.subscribe();

        // The first poll only records what the node reports.
        tokio::time::sleep(POLL * 5).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        state.lock().unwrap().accounts = vec![BOB, ALICE];
        assert_eq!(
            next_event(&mut rx).await,
            WalletEvent::AccountsChanged(Some(BOB))
        );

        state.lock().unwrap().network = "1";
        assert_eq!(
            next_event(&mut rx).await,
            WalletEvent::ChainChanged(NetworkId::new(1))
        );

        tokio::time::sleep(POLL * 5).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_poller_reports_locked_wallet() {
        let state = state();
        let node = node(Arc::clone(&state)).await;
        let wallet = RpcWallet::new(RpcClient::new(node.url()).unwrap(), 0, POLL);

        let mut rx = wallet.subscribe();
        tokio::time::sleep(POLL * 5).await;

        state.lock().unwrap().accounts.clear();
        assert_eq!(next_event(&mut rx).await, WalletEvent::AccountsChanged(None));
    }
}
