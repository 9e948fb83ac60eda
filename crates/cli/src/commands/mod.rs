//! CLI command implementations.
//!
//! Every command except `deployment` opens a [`ShopSession`]: it loads the
//! deployment artifacts, connects the node wallet and runs a synchronizer
//! until the first complete view.

pub mod catalog;
pub mod managers;
pub mod orders;
pub mod watch;

use std::sync::Arc;

use shop_agile_core::Session;
use shop_agile_dapp::artifacts::{ArtifactError, ContractArtifacts};
use shop_agile_dapp::sync::{Phase, SyncHandle, Synchronizer, ViewState};
use shop_agile_dapp::{
    ChainConnector, ContractGateway, DappConfig, DappError, Deployment, RpcClient, RpcDeployment,
    RpcWallet,
};
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Deployment artifacts could not be loaded.
    #[error(transparent)]
    Artifacts(#[from] ArtifactError),

    /// Wallet, RPC or contract failure.
    #[error(transparent)]
    Dapp(#[from] DappError),

    /// The session fell back to Disconnected while loading.
    #[error("Session lost while loading: {0}")]
    SessionLost(String),
}

/// A connected wallet session with its synchronizer task.
pub struct ShopSession {
    /// Handle to the running synchronizer.
    pub handle: SyncHandle,
    /// Gateway bound to the session's account, for reads the view does not
    /// carry.
    pub gateway: ContractGateway,
    /// The connected session.
    pub session: Session,
    task: JoinHandle<()>,
}

/// Load and validate the deployment artifacts.
///
/// # Errors
///
/// Returns an error if the files are missing, malformed or lack a function
/// the client calls.
pub async fn load_artifacts(config: &DappConfig) -> Result<ContractArtifacts, CommandError> {
    Ok(ContractArtifacts::load(&config.artifacts_dir).await?)
}

impl ShopSession {
    /// Connect the configured node account and start synchronizing.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifacts are unusable or the wallet cannot
    /// connect.
    pub async fn open(config: &DappConfig) -> Result<Self, CommandError> {
        let artifacts = load_artifacts(config).await?;
        let rpc = RpcClient::new(config.rpc_url.clone())?;

        let wallet = Arc::new(RpcWallet::new(
            rpc.clone(),
            config.account_index,
            config.poll_interval,
        ));
        let connector = ChainConnector::new(wallet, config.network.clone());
        let deployment = RpcDeployment::new(rpc, artifacts.address, config.poll_interval);

        tracing::info!(
            "Connecting to {} at {}...",
            connector.required_network().name,
            config.rpc_host().unwrap_or_default()
        );
        let (handle, task) = Synchronizer::new(connector, deployment.clone()).spawn();
        let session = handle.connect().await?;
        tracing::info!(
            "Connected as {} on network {}",
            session.selected_address,
            session.network
        );

        Ok(Self {
            handle,
            gateway: deployment.bind(session.selected_address),
            session,
            task,
        })
    }

    /// Wait until the view has left Initializing.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::SessionLost` if a read failed and the
    /// session fell back to Disconnected.
    pub async fn ready(&self) -> Result<ViewState, CommandError> {
        let state = self
            .handle
            .wait_until(|state| state.phase != Phase::Initializing)
            .await?;

        match state.phase {
            Phase::Ready => Ok(state),
            _ => Err(CommandError::SessionLost(
                state.last_error.unwrap_or_default(),
            )),
        }
    }

    /// Stop the synchronizer and wait for its task to end.
    pub async fn close(self) {
        drop(self.handle);
        if let Err(e) = self.task.await {
            tracing::warn!("Synchronizer task ended abnormally: {e}");
        }
    }
}
