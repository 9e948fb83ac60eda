//! View-State Synchronizer.
//!
//! Owns the session, the bound contract gateway and every snapshot, and is
//! the only thing that mutates them. Wallet notifications, read completions
//! and caller commands are applied one at a time.
//!
//! # Supersession
//!
//! Every session (connect or account change) gets a new generation number,
//! and every spawned read carries the generation and a per-kind sequence
//! number. A completion is applied only if both still match, so results of a
//! previous account, or of a read that was re-issued, are dropped.

mod handle;
mod state;

use std::collections::HashMap;
use std::sync::Arc;

use shop_agile_core::{
    Address, ItemId, NetworkId, OrderId, PickupLocationId, Session, Snapshot, Wei,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::contract::{Deployment, ShopContract, TxHash};
use crate::error::DappError;
use crate::wallet::{ChainConnector, WalletEvent, WalletProvider};

pub use handle::SyncHandle;
pub use state::{Loading, Phase, ReadKind, ViewState};

use handle::Command;

/// Capacity of the command queue behind a [`SyncHandle`].
const COMMAND_BUFFER: usize = 32;

/// Outcome of applying one read completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The snapshot was replaced.
    Updated(ReadKind),
    /// The read failed; the error was recorded.
    Failed(ReadKind),
    /// The read belonged to a superseded session or request and was dropped.
    Stale(ReadKind),
}

enum ReadOutput {
    Balance(Wei),
    Items(Vec<shop_agile_core::Item>),
    PickupLocations(Vec<shop_agile_core::PickupLocation>),
    Orders(Vec<shop_agile_core::Order>),
}

struct Completion {
    generation: u64,
    kind: ReadKind,
    seq: u64,
    result: Result<ReadOutput, DappError>,
}

/// Reconciles wallet events and contract reads into one [`ViewState`].
pub struct Synchronizer<W: WalletProvider, D: Deployment> {
    connector: ChainConnector<W>,
    deployment: D,
    contract: Option<Arc<D::Contract>>,
    view: ViewState,
    generation: u64,
    read_seq: HashMap<ReadKind, u64>,
    /// Set between a (re-)initialization and its first Ready.
    initializing: bool,
    /// Network of the connected wallet; cleared by a network change or an
    /// explicit disconnect, after which only `connect` starts a session.
    wallet_network: Option<NetworkId>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    publisher: watch::Sender<ViewState>,
}

impl<W: WalletProvider, D: Deployment> Synchronizer<W, D> {
    /// Create a synchronizer in the Disconnected phase.
    #[must_use]
    pub fn new(connector: ChainConnector<W>, deployment: D) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (publisher, _) = watch::channel(ViewState::default());

        Self {
            connector,
            deployment,
            contract: None,
            view: ViewState::default(),
            generation: 0,
            read_seq: HashMap::new(),
            initializing: false,
            wallet_network: None,
            completions_tx,
            completions_rx,
            publisher,
        }
    }

    /// Receiver of published view states.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.publisher.subscribe()
    }

    /// Current view state.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.view
    }

    /// Bound contract gateway of the current session.
    #[must_use]
    pub fn contract(&self) -> Option<&Arc<D::Contract>> {
        self.contract.as_ref()
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Connect the wallet and start initializing.
    ///
    /// # Errors
    ///
    /// Returns the connector's error; the state stays Disconnected and
    /// records the message.
    #[instrument(skip(self))]
    pub async fn connect(&mut self) -> Result<Session, DappError> {
        match self.connector.connect().await {
            Ok(session) => {
                self.wallet_network = Some(session.network);
                self.initialize(session);
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Wallet connect failed");
                self.wallet_network = None;
                self.reset();
                self.view.last_error = Some(e.user_message());
                self.publish();
                Err(e)
            }
        }
    }

    /// Drop the session locally. Wallet notifications are ignored until the
    /// next [`Self::connect`].
    pub fn disconnect(&mut self) {
        info!("Disconnecting wallet session");
        self.wallet_network = None;
        self.reset();
    }

    /// Apply a wallet notification.
    #[instrument(skip(self))]
    pub fn handle_wallet_event(&mut self, event: WalletEvent) {
        match event {
            WalletEvent::ChainChanged(network) => {
                info!(network = %network, "Network changed, resetting session");
                self.wallet_network = None;
                self.reset();
            }
            WalletEvent::AccountsChanged(None) => {
                info!("Wallet exposes no account, resetting session");
                self.reset();
            }
            WalletEvent::AccountsChanged(Some(account)) => match self.wallet_network {
                Some(network) => {
                    info!(account = %account, "Account changed, re-initializing");
                    self.initialize(Session::new(account, network));
                }
                None => debug!(account = %account, "Ignoring account change without a session"),
            },
        }
    }

    /// Start a fresh session: bind the gateway, then issue every read.
    fn initialize(&mut self, session: Session) {
        self.generation += 1;
        debug!(
            account = %session.selected_address,
            contract = %self.deployment.address(),
            generation = self.generation,
            "Binding contract gateway"
        );
        self.contract = Some(Arc::new(self.deployment.bind(session.selected_address)));
        self.view = ViewState {
            session: Some(session),
            generation: self.generation,
            ..ViewState::default()
        };
        self.initializing = true;

        for kind in ReadKind::ALL {
            self.spawn_read(kind);
        }
        self.view.update_phase();
        self.publish();
    }

    /// Clear everything and supersede in-flight reads.
    fn reset(&mut self) {
        self.generation += 1;
        self.contract = None;
        self.initializing = false;
        self.view = ViewState {
            generation: self.generation,
            ..ViewState::default()
        };
        self.publish();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Issue one read for the current session.
    fn spawn_read(&mut self, kind: ReadKind) {
        let (Some(contract), Some(session)) = (self.contract.clone(), self.view.session) else {
            return;
        };

        let slot = self.read_seq.entry(kind).or_default();
        *slot += 1;
        let seq = *slot;
        let generation = self.generation;
        self.view.loading.set(kind, true);

        let wallet = Arc::clone(self.connector.wallet());
        let completions = self.completions_tx.clone();
        debug!(%kind, generation, seq, "Spawning read");

        tokio::spawn(async move {
            let result = match kind {
                ReadKind::Balance => wallet
                    .balance(session.selected_address)
                    .await
                    .map(ReadOutput::Balance),
                ReadKind::Items => contract.list_items().await.map(ReadOutput::Items),
                ReadKind::PickupLocations => contract
                    .list_pickup_locations()
                    .await
                    .map(ReadOutput::PickupLocations),
                ReadKind::Orders => contract.list_my_orders().await.map(ReadOutput::Orders),
            };
            // The synchronizer may be gone; the result is moot then.
            let _ = completions.send(Completion {
                generation,
                kind,
                seq,
                result,
            });
        });
    }

    /// Re-read items and orders (the lists a user action can change).
    pub fn refresh(&mut self) {
        self.refresh_reads(&[ReadKind::Items, ReadKind::Orders]);
    }

    /// Re-read the item catalog.
    pub fn refresh_items(&mut self) {
        self.refresh_reads(&[ReadKind::Items]);
    }

    /// Re-read the account's orders.
    pub fn refresh_orders(&mut self) {
        self.refresh_reads(&[ReadKind::Orders]);
    }

    /// Re-read the account balance.
    pub fn refresh_balance(&mut self) {
        self.refresh_reads(&[ReadKind::Balance]);
    }

    fn refresh_reads(&mut self, kinds: &[ReadKind]) {
        if self.contract.is_none() {
            debug!("Refresh requested without a session");
            return;
        }
        for &kind in kinds {
            self.spawn_read(kind);
        }
        self.view.update_phase();
        self.publish();
    }

    /// Apply one read completion.
    fn apply(&mut self, completion: Completion) -> Applied {
        let Completion {
            generation,
            kind,
            seq,
            result,
        } = completion;

        if generation != self.generation || self.read_seq.get(&kind) != Some(&seq) {
            debug!(%kind, generation, seq, current = self.generation, "Discarding stale read");
            return Applied::Stale(kind);
        }

        self.view.loading.set(kind, false);

        let applied = match result {
            Ok(output) => {
                match output {
                    ReadOutput::Balance(balance) => self.view.balance = Some(balance),
                    ReadOutput::Items(items) => self.view.items = Some(Snapshot::new(items)),
                    ReadOutput::PickupLocations(locations) => {
                        self.view.pickup_locations = Some(Snapshot::new(locations));
                    }
                    ReadOutput::Orders(orders) => self.view.orders = Some(Snapshot::new(orders)),
                }
                self.view.last_error = None;
                Applied::Updated(kind)
            }
            Err(e) if self.initializing => {
                warn!(%kind, error = %e, "Read failed during initialization, disconnecting");
                let message = e.user_message();
                self.reset();
                self.view.last_error = Some(message);
                self.publish();
                return Applied::Failed(kind);
            }
            Err(e) => {
                warn!(%kind, error = %e, "Refresh failed, keeping previous snapshot");
                self.view.last_error = Some(e.user_message());
                Applied::Failed(kind)
            }
        };

        self.view.update_phase();
        if self.view.is_ready() {
            self.initializing = false;
        }
        self.publish();
        applied
    }

    /// Wait for the next read completion and apply it.
    pub async fn next_completion(&mut self) -> Option<Applied> {
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply completions until no read of the current session is
    /// outstanding.
    pub async fn settle(&mut self) {
        while self.view.loading.any() {
            if self.next_completion().await.is_none() {
                break;
            }
        }
    }

    /// Wait for the next wallet notification and apply it.
    pub async fn next_wallet_event(&mut self) -> Option<WalletEvent> {
        let event = self.connector.next_event().await?;
        self.handle_wallet_event(event);
        Some(event)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    fn require_contract(&self) -> Result<Arc<D::Contract>, DappError> {
        self.contract.clone().ok_or(DappError::NotConnected)
    }

    /// Expected cost of ordering `quantity` units of `item_id`.
    ///
    /// Uses the item snapshot when present. An unknown item quotes zero so
    /// that the contract reports why the order is invalid.
    ///
    /// # Errors
    ///
    /// Returns `DappError::NotConnected` without a session, or a read error.
    pub async fn quote_order(&self, item_id: ItemId, quantity: u64) -> Result<Wei, DappError> {
        let contract = self.require_contract()?;

        let price = match self.view.items.as_ref() {
            Some(items) => items.find(|item| item.id == item_id).map(|item| item.price),
            None => contract
                .list_items()
                .await?
                .into_iter()
                .find(|item| item.id == item_id)
                .map(|item| item.price),
        };
        let Some(price) = price else {
            return Ok(Wei::ZERO);
        };

        let fees = contract.fee_schedule().await?;
        fees.quote(price, quantity)
            .ok_or_else(|| DappError::Decode(format!("cost of {quantity} x {price} overflows")))
    }

    /// Place an order, then refresh items, orders and balance.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason;
    /// the view state is left untouched.
    #[instrument(skip(self))]
    pub async fn place_order(
        &mut self,
        item_id: ItemId,
        quantity: u64,
        pickup_location_id: PickupLocationId,
        value: Option<Wei>,
    ) -> Result<OrderId, DappError> {
        let contract = self.require_contract()?;
        let value = match value {
            Some(value) => value,
            None => self.quote_order(item_id, quantity).await?,
        };

        let order_id = contract
            .place_order(item_id, quantity, pickup_location_id, value)
            .await
            .inspect_err(|e| log_write_error("placeOrder", e))?;
        info!(order = %order_id, "Order placed");

        self.refresh_reads(&[ReadKind::Items, ReadKind::Orders, ReadKind::Balance]);
        Ok(order_id)
    }

    /// Collect an order, then refresh orders.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    #[instrument(skip(self))]
    pub async fn collect_order(&mut self, order_id: OrderId) -> Result<TxHash, DappError> {
        let tx = self
            .require_contract()?
            .collect_order(order_id)
            .await
            .inspect_err(|e| log_write_error("collectOrder", e))?;
        self.refresh_orders();
        Ok(tx)
    }

    /// Grant manager rights.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    #[instrument(skip(self))]
    pub async fn assign_manager(&mut self, manager: Address) -> Result<TxHash, DappError> {
        self.require_contract()?
            .assign_manager(manager)
            .await
            .inspect_err(|e| log_write_error("assignManager", e))
    }

    /// Grant manager rights to several accounts.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    #[instrument(skip(self, managers), fields(count = managers.len()))]
    pub async fn assign_managers(&mut self, managers: Vec<Address>) -> Result<TxHash, DappError> {
        self.require_contract()?
            .assign_managers(managers)
            .await
            .inspect_err(|e| log_write_error("assignManagers", e))
    }

    /// Revoke manager rights.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    #[instrument(skip(self))]
    pub async fn unassign_manager(&mut self, manager: Address) -> Result<TxHash, DappError> {
        self.require_contract()?
            .unassign_manager(manager)
            .await
            .inspect_err(|e| log_write_error("unassignManager", e))
    }

    /// Withdraw the contract balance, then refresh the balance.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` with the contract's reason.
    #[instrument(skip(self))]
    pub async fn withdraw(&mut self) -> Result<TxHash, DappError> {
        let tx = self
            .require_contract()?
            .withdraw()
            .await
            .inspect_err(|e| log_write_error("withdraw", e))?;
        self.refresh_balance();
        Ok(tx)
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Publish the current view, logging phase transitions.
    fn publish(&self) {
        let previous = self.publisher.borrow().phase;
        if previous != self.view.phase {
            info!(
                from = ?previous,
                to = ?self.view.phase,
                generation = self.generation,
                "View state transition"
            );
        }
        self.publisher.send_replace(self.view.clone());
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect(respond) => {
                let _ = respond.send(self.connect().await);
            }
            Command::Disconnect => self.disconnect(),
            Command::Refresh => self.refresh(),
            Command::Quote {
                item_id,
                quantity,
                respond,
            } => {
                let _ = respond.send(self.quote_order(item_id, quantity).await);
            }
            Command::PlaceOrder {
                item_id,
                quantity,
                pickup_location_id,
                value,
                respond,
            } => {
                let result = self
                    .place_order(item_id, quantity, pickup_location_id, value)
                    .await;
                let _ = respond.send(result);
            }
            Command::CollectOrder { order_id, respond } => {
                let _ = respond.send(self.collect_order(order_id).await);
            }
            Command::AssignManager { manager, respond } => {
                let _ = respond.send(self.assign_manager(manager).await);
            }
            Command::AssignManagers { managers, respond } => {
                let _ = respond.send(self.assign_managers(managers).await);
            }
            Command::UnassignManager { manager, respond } => {
                let _ = respond.send(self.unassign_manager(manager).await);
            }
            Command::Withdraw(respond) => {
                let _ = respond.send(self.withdraw().await);
            }
        }
    }

    /// Serve wallet notifications, read completions and commands until every
    /// [`SyncHandle`] is dropped.
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut wallet_open = true;

        loop {
            tokio::select! {
                Some(completion) = self.completions_rx.recv() => {
                    self.apply(completion);
                }
                event = self.connector.next_event(), if wallet_open => match event {
                    Some(event) => self.handle_wallet_event(event),
                    None => {
                        warn!("Wallet notification stream closed");
                        wallet_open = false;
                    }
                },
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
            }
        }

        info!("Synchronizer stopped");
    }

    /// Run the event loop on a tokio task.
    pub fn spawn(self) -> (SyncHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = SyncHandle::new(commands_tx, self.subscribe());
        let task = tokio::spawn(self.run(commands_rx));
        (handle, task)
    }
}

/// Contract rejections are reported at info; anything else is a fault.
fn log_write_error(function: &'static str, error: &DappError) {
    if error.is_revert() {
        info!(function, reason = error.revert_reason(), "Contract rejected write");
    } else {
        warn!(function, error = %error, "Write failed");
    }
}
