//! Shop Agile dApp client.
//!
//! Connects a wallet to the deployed `ShopAgileWeb3` contract and keeps a
//! consistent, re-renderable view of it.
//!
//! # Architecture
//!
//! - [`wallet`] - Chain Connector: wallet provider trait, account/network
//!   events, connect and disconnect
//! - [`contract`] - Contract Gateway: typed reads and confirmed writes
//!   against the contract
//! - [`sync`] - View-State Synchronizer: reconciles wallet events and read
//!   results into one published [`sync::ViewState`]
//! - [`memory`] - In-memory chain implementing both the wallet and the
//!   contract, for tests and offline use
//!
//! Supporting modules: [`config`] (environment), [`artifacts`] (deployment
//! files), [`rpc`] (JSON-RPC transport) and [`error`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use shop_agile_dapp::{ChainConnector, DappConfig, RpcClient, RpcDeployment, RpcWallet};
//! use shop_agile_dapp::artifacts::ContractArtifacts;
//! use shop_agile_dapp::sync::Synchronizer;
//!
//! let config = DappConfig::from_env()?;
//! let artifacts = ContractArtifacts::load(&config.artifacts_dir).await?;
//! let rpc = RpcClient::new(config.rpc_url.clone())?;
//!
//! let wallet = Arc::new(RpcWallet::new(rpc.clone(), config.account_index, config.poll_interval));
//! let connector = ChainConnector::new(wallet, config.network.clone());
//! let deployment = RpcDeployment::new(rpc, artifacts.address, config.poll_interval);
//!
//! let (handle, _task) = Synchronizer::new(connector, deployment).spawn();
//! handle.connect().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod artifacts;
pub mod config;
pub mod contract;
pub mod error;
pub mod memory;
pub mod rpc;
pub mod sync;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, DappConfig};
pub use contract::{ContractGateway, Deployment, RpcDeployment, ShopContract, TxHash};
pub use error::DappError;
pub use rpc::RpcClient;
pub use wallet::{ChainConnector, NetworkRequirement, RpcWallet, WalletEvent, WalletProvider};
