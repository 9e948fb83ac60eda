//! Cloneable handle to a running synchronizer.

use shop_agile_core::{Address, ItemId, OrderId, PickupLocationId, Session, Wei};
use tokio::sync::{mpsc, oneshot, watch};

use super::state::ViewState;
use crate::contract::TxHash;
use crate::error::DappError;

type Responder<T> = oneshot::Sender<Result<T, DappError>>;

/// Requests served by [`super::Synchronizer::run`].
pub(crate) enum Command {
    Connect(Responder<Session>),
    Disconnect,
    Refresh,
    Quote {
        item_id: ItemId,
        quantity: u64,
        respond: Responder<Wei>,
    },
    PlaceOrder {
        item_id: ItemId,
        quantity: u64,
        pickup_location_id: PickupLocationId,
        value: Option<Wei>,
        respond: Responder<OrderId>,
    },
    CollectOrder {
        order_id: OrderId,
        respond: Responder<TxHash>,
    },
    AssignManager {
        manager: Address,
        respond: Responder<TxHash>,
    },
    AssignManagers {
        managers: Vec<Address>,
        respond: Responder<TxHash>,
    },
    UnassignManager {
        manager: Address,
        respond: Responder<TxHash>,
    },
    Withdraw(Responder<TxHash>),
}

/// Handle used by callers to drive a synchronizer task.
///
/// Commands are served in order by the task's event loop, interleaved with
/// wallet notifications and read completions.
#[derive(Clone)]
pub struct SyncHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ViewState>,
}

impl SyncHandle {
    pub(crate) const fn new(
        commands: mpsc::Sender<Command>,
        state: watch::Receiver<ViewState>,
    ) -> Self {
        Self { commands, state }
    }

    /// Receiver of published view states.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// The most recently published view state.
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Connect the wallet and start initializing.
    ///
    /// # Errors
    ///
    /// Returns the connector's error, or `DappError::SynchronizerStopped`.
    pub async fn connect(&self) -> Result<Session, DappError> {
        self.request(Command::Connect).await
    }

    /// Drop the session locally.
    ///
    /// # Errors
    ///
    /// Returns `DappError::SynchronizerStopped` if the task is gone.
    pub async fn disconnect(&self) -> Result<(), DappError> {
        self.send(Command::Disconnect).await
    }

    /// Re-read items and orders.
    ///
    /// # Errors
    ///
    /// Returns `DappError::SynchronizerStopped` if the task is gone.
    pub async fn refresh(&self) -> Result<(), DappError> {
        self.send(Command::Refresh).await
    }

    /// Expected cost of an order under the current fee schedule.
    ///
    /// # Errors
    ///
    /// Returns `DappError::NotConnected` without a session, or a read error.
    pub async fn quote_order(&self, item_id: ItemId, quantity: u64) -> Result<Wei, DappError> {
        self.request(|respond| Command::Quote {
            item_id,
            quantity,
            respond,
        })
        .await
    }

    /// Place an order; `value` defaults to the quoted cost.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    pub async fn place_order(
        &self,
        item_id: ItemId,
        quantity: u64,
        pickup_location_id: PickupLocationId,
        value: Option<Wei>,
    ) -> Result<OrderId, DappError> {
        self.request(|respond| Command::PlaceOrder {
            item_id,
            quantity,
            pickup_location_id,
            value,
            respond,
        })
        .await
    }

    /// Mark an order as collected.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    pub async fn collect_order(&self, order_id: OrderId) -> Result<TxHash, DappError> {
        self.request(|respond| Command::CollectOrder { order_id, respond })
            .await
    }

    /// Grant manager rights.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    pub async fn assign_manager(&self, manager: Address) -> Result<TxHash, DappError> {
        self.request(|respond| Command::AssignManager { manager, respond })
            .await
    }

    /// Grant manager rights to several accounts.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    pub async fn assign_managers(&self, managers: Vec<Address>) -> Result<TxHash, DappError> {
        self.request(|respond| Command::AssignManagers { managers, respond })
            .await
    }

    /// Revoke manager rights.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    pub async fn unassign_manager(&self, manager: Address) -> Result<TxHash, DappError> {
        self.request(|respond| Command::UnassignManager { manager, respond })
            .await
    }

    /// Move the contract balance to the owner.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    pub async fn withdraw(&self) -> Result<TxHash, DappError> {
        self.request(Command::Withdraw).await
    }

    /// Wait until a published state satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `DappError::SynchronizerStopped` if the task ends first.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&ViewState) -> bool,
    ) -> Result<ViewState, DappError> {
        let mut state = self.state.clone();
        let matched = state
            .wait_for(predicate)
            .await
            .map_err(|_| DappError::SynchronizerStopped)?;
        Ok(matched.clone())
    }

    async fn send(&self, command: Command) -> Result<(), DappError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DappError::SynchronizerStopped)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Responder<T>) -> Command,
    ) -> Result<T, DappError> {
        let (respond, response) = oneshot::channel();
        self.send(command(respond)).await?;
        response.await.map_err(|_| DappError::SynchronizerStopped)?
    }
}
