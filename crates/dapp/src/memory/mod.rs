//! In-memory chain.
//!
//! [`MemoryChain`] plays both the wallet and the deployed contract over one
//! shared state, enforcing the contract's rules with its revert messages.
//! Tests use its controls to switch accounts and networks, inject read
//! failures and hold reads back to deliver them late.

mod fixture;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::keccak256;
use shop_agile_core::{
    Address, FeeSchedule, Item, ItemId, NetworkId, Order, OrderId, OrderStatus, PickupLocation,
    PickupLocationId, Wei,
};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::contract::{Deployment, ShopContract, TxHash, revert};
use crate::error::DappError;
use crate::wallet::{WalletEvent, WalletProvider};

pub use fixture::ShopFixture;

/// Error returned by reads while a failure is injected.
const SIMULATED_FAILURE: &str = "simulated node failure";

/// Wallet and shop contract backed by memory.
///
/// Cheap to clone; clones share the same chain.
#[derive(Clone)]
pub struct MemoryChain {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<ChainState>,
}

struct ChainState {
    wallet_installed: bool,
    selected: Option<Address>,
    network: NetworkId,
    balances: HashMap<Address, Wei>,
    subscribers: Vec<mpsc::UnboundedSender<WalletEvent>>,
    read_gates: HashMap<Address, watch::Sender<bool>>,
    failing_reads: usize,
    nonce: u64,
    contract: ContractState,
}

struct ContractState {
    address: Address,
    owner: Address,
    managers: BTreeSet<Address>,
    fees: FeeSchedule,
    balance: Wei,
    items: Vec<Item>,
    pickup_locations: Vec<PickupLocation>,
    orders: Vec<Order>,
}

impl MemoryChain {
    /// Deploy `fixture` on a fresh chain.
    #[must_use]
    pub fn new(fixture: ShopFixture) -> Self {
        let mut managers: BTreeSet<Address> = fixture.managers.into_iter().collect();
        managers.insert(fixture.owner);

        let state = ChainState {
            wallet_installed: true,
            selected: fixture.accounts.first().copied(),
            network: fixture.network,
            balances: fixture
                .accounts
                .iter()
                .map(|&account| (account, fixture.starting_balance))
                .collect(),
            subscribers: Vec::new(),
            read_gates: HashMap::new(),
            failing_reads: 0,
            nonce: 0,
            contract: ContractState {
                address: fixture.contract_address,
                owner: fixture.owner,
                managers,
                fees: fixture.fees,
                balance: Wei::ZERO,
                items: fixture.items,
                pickup_locations: fixture.pickup_locations,
                orders: Vec::new(),
            },
        };

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Wallet controls
    // =========================================================================

    /// Make the wallet disappear; connects fail with `WalletUnavailable`.
    pub fn uninstall_wallet(&self) {
        self.lock().wallet_installed = false;
    }

    /// Select another account (or none) and notify subscribers.
    pub fn switch_account(&self, account: Option<Address>) {
        let mut state = self.lock();
        state.selected = account;
        state.broadcast(WalletEvent::AccountsChanged(account));
    }

    /// Move the wallet to another network and notify subscribers.
    pub fn switch_network(&self, network: NetworkId) {
        let mut state = self.lock();
        state.network = network;
        state.broadcast(WalletEvent::ChainChanged(network));
    }

    /// Number of live wallet subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    // =========================================================================
    // Read controls
    // =========================================================================

    /// Suspend every read issued on behalf of `account`.
    pub fn hold_reads(&self, account: Address) {
        self.lock().gate(account).send_replace(false);
    }

    /// Let reads of `account` proceed, including suspended ones.
    pub fn release_reads(&self, account: Address) {
        self.lock().gate(account).send_replace(true);
    }

    /// Make the next `count` reads fail with a node error.
    pub fn fail_next_reads(&self, count: usize) {
        self.lock().failing_reads = count;
    }

    async fn read<T>(
        &self,
        account: Address,
        read: impl FnOnce(&ChainState) -> T,
    ) -> Result<T, DappError> {
        let mut open = self.lock().gate(account).subscribe();
        // A dropped gate can only mean the chain is gone; let the read finish.
        let _ = open.wait_for(|open| *open).await;

        let mut state = self.lock();
        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(DappError::Rpc {
                code: -32603,
                message: SIMULATED_FAILURE.to_string(),
            });
        }
        Ok(read(&state))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Native balance of `account`.
    #[must_use]
    pub fn balance_of(&self, account: Address) -> Wei {
        self.lock().balance_of(account)
    }

    /// Ether held by the contract.
    #[must_use]
    pub fn contract_balance(&self) -> Wei {
        self.lock().contract.balance
    }

    /// Every order placed, by any account.
    #[must_use]
    pub fn all_orders(&self) -> Vec<Order> {
        self.lock().contract.orders.clone()
    }

    /// Current state of one item.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<Item> {
        self.lock().contract.item(id).cloned()
    }

    /// Gateway bound to `account`, bypassing the wallet.
    #[must_use]
    pub fn shop(&self, account: Address) -> MemoryShop {
        self.bind(account)
    }
}

impl ChainState {
    fn broadcast(&mut self, event: WalletEvent) {
        debug!(?event, subscribers = self.subscribers.len(), "Wallet event");
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    fn gate(&mut self, account: Address) -> &watch::Sender<bool> {
        self.read_gates
            .entry(account)
            .or_insert_with(|| watch::channel(true).0)
    }

    fn balance_of(&self, account: Address) -> Wei {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn next_tx_hash(&mut self) -> TxHash {
        self.nonce += 1;
        keccak256(self.nonce.to_be_bytes())
    }
}

impl ContractState {
    fn item(&self, id: ItemId) -> Option<&Item> {
        usize::try_from(id.as_u64())
            .ok()
            .and_then(|index| self.items.get(index))
    }

    fn ensure_owner(&self, sender: Address) -> Result<(), DappError> {
        if sender == self.owner {
            Ok(())
        } else {
            Err(reverted(revert::ONLY_OWNER))
        }
    }
}

fn reverted(reason: &str) -> DappError {
    DappError::TransactionReverted(reason.to_string())
}

impl WalletProvider for MemoryChain {
    async fn request_accounts(&self) -> Result<Vec<Address>, DappError> {
        let state = self.lock();
        if !state.wallet_installed {
            return Err(DappError::WalletUnavailable);
        }
        Ok(state.selected.into_iter().collect())
    }

    async fn network_version(&self) -> Result<NetworkId, DappError> {
        let state = self.lock();
        if !state.wallet_installed {
            return Err(DappError::WalletUnavailable);
        }
        Ok(state.network)
    }

    async fn balance(&self, account: Address) -> Result<Wei, DappError> {
        self.read(account, |state| state.balance_of(account)).await
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }
}

impl Deployment for MemoryChain {
    type Contract = MemoryShop;

    fn address(&self) -> Address {
        self.lock().contract.address
    }

    fn bind(&self, account: Address) -> MemoryShop {
        MemoryShop {
            chain: self.clone(),
            sender: account,
        }
    }
}

/// In-memory contract gateway bound to one sender.
#[derive(Clone)]
pub struct MemoryShop {
    chain: MemoryChain,
    sender: Address,
}

impl ShopContract for MemoryShop {
    fn account(&self) -> Address {
        self.sender
    }

    async fn list_items(&self) -> Result<Vec<Item>, DappError> {
        self.chain
            .read(self.sender, |state| state.contract.items.clone())
            .await
    }

    async fn list_pickup_locations(&self) -> Result<Vec<PickupLocation>, DappError> {
        self.chain
            .read(self.sender, |state| state.contract.pickup_locations.clone())
            .await
    }

    async fn list_my_orders(&self) -> Result<Vec<Order>, DappError> {
        let sender = self.sender;
        self.chain
            .read(sender, |state| {
                state
                    .contract
                    .orders
                    .iter()
                    .filter(|order| order.user == sender)
                    .cloned()
                    .collect()
            })
            .await
    }

    async fn owner(&self) -> Result<Address, DappError> {
        Ok(self.chain.lock().contract.owner)
    }

    async fn is_manager(&self, account: Address) -> Result<bool, DappError> {
        Ok(self.chain.lock().contract.managers.contains(&account))
    }

    async fn fee_schedule(&self) -> Result<FeeSchedule, DappError> {
        Ok(self.chain.lock().contract.fees)
    }

    async fn place_order(
        &self,
        item_id: ItemId,
        quantity: u64,
        pickup_location_id: PickupLocationId,
        value: Wei,
    ) -> Result<OrderId, DappError> {
        let mut state = self.chain.lock();

        let item = state
            .contract
            .item(item_id)
            .ok_or_else(|| reverted(revert::INVALID_ITEM_ID))?;
        if quantity == 0 {
            return Err(reverted(revert::ZERO_QUANTITY));
        }
        let location_known = usize::try_from(pickup_location_id.as_u64())
            .is_ok_and(|index| index < state.contract.pickup_locations.len());
        if !location_known {
            return Err(reverted(revert::INVALID_PICKUP_LOCATION_ID));
        }
        let stock_left = item
            .stock
            .take(quantity)
            .ok_or_else(|| reverted(revert::NOT_ENOUGH_STOCK))?;
        let cost = state
            .contract
            .fees
            .quote(item.price, quantity)
            .filter(|cost| value >= *cost)
            .ok_or_else(|| reverted(revert::INSUFFICIENT_PAYMENT))?;

        let sender_balance = state
            .balance_of(self.sender)
            .checked_sub(value)
            .ok_or_else(|| DappError::Rpc {
                code: -32000,
                message: "insufficient funds for gas * price + value".to_string(),
            })?;
        let contract_balance = state
            .contract
            .balance
            .checked_add(value)
            .ok_or_else(|| DappError::Decode("contract balance overflow".to_string()))?;

        state.balances.insert(self.sender, sender_balance);
        state.contract.balance = contract_balance;
        if let Some(item) = usize::try_from(item_id.as_u64())
            .ok()
            .and_then(|index| state.contract.items.get_mut(index))
        {
            item.stock = stock_left;
        }

        let id = OrderId::new(state.contract.orders.len() as u64 + 1);
        state.contract.orders.push(Order {
            id,
            user: self.sender,
            item_id,
            quantity,
            pickup_location_id,
            cost,
            status: OrderStatus::Ordered,
        });
        state.next_tx_hash();

        debug!(order = %id, sender = %self.sender, "Order placed");
        Ok(id)
    }

    async fn collect_order(&self, order_id: OrderId) -> Result<TxHash, DappError> {
        let mut state = self.chain.lock();
        if !state.contract.managers.contains(&self.sender) {
            return Err(reverted(revert::ONLY_MANAGERS));
        }

        let order = order_id
            .as_u64()
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| state.contract.orders.get_mut(index))
            .ok_or_else(|| reverted(revert::INVALID_ORDER_ID))?;
        if order.status == OrderStatus::Completed {
            return Err(reverted(revert::ALREADY_COLLECTED));
        }
        order.status = OrderStatus::Completed;

        Ok(state.next_tx_hash())
    }

    async fn assign_manager(&self, manager: Address) -> Result<TxHash, DappError> {
        let mut state = self.chain.lock();
        state.contract.ensure_owner(self.sender)?;
        if !state.contract.managers.insert(manager) {
            return Err(reverted(revert::ALREADY_MANAGER));
        }
        Ok(state.next_tx_hash())
    }

    async fn assign_managers(&self, managers: Vec<Address>) -> Result<TxHash, DappError> {
        let mut state = self.chain.lock();
        state.contract.ensure_owner(self.sender)?;

        let mut seen = BTreeSet::new();
        for manager in &managers {
            if state.contract.managers.contains(manager) || !seen.insert(*manager) {
                return Err(reverted(revert::ALREADY_MANAGER));
            }
        }
        state.contract.managers.extend(managers);
        Ok(state.next_tx_hash())
    }

    async fn unassign_manager(&self, manager: Address) -> Result<TxHash, DappError> {
        let mut state = self.chain.lock();
        state.contract.ensure_owner(self.sender)?;
        if !state.contract.managers.remove(&manager) {
            return Err(reverted(revert::NOT_MANAGER));
        }
        Ok(state.next_tx_hash())
    }

    async fn withdraw(&self) -> Result<TxHash, DappError> {
        let mut state = self.chain.lock();
        state.contract.ensure_owner(self.sender)?;

        let amount = std::mem::take(&mut state.contract.balance);
        let owner = state.contract.owner;
        let credited = state
            .balance_of(owner)
            .checked_add(amount)
            .ok_or_else(|| DappError::Decode("owner balance overflow".to_string()))?;
        state.balances.insert(owner, credited);

        Ok(state.next_tx_hash())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shop_agile_core::Stock;

    use super::*;

    fn chain() -> (MemoryChain, ShopFixture) {
        let fixture = ShopFixture::bakery();
        (MemoryChain::new(fixture.clone()), fixture)
    }

    fn paid(value: u128) -> Wei {
        Wei::from_wei(value)
    }

    #[tokio::test]
    async fn test_place_order_moves_funds_and_stock() {
        let (chain, fixture) = chain();
        let shop = chain.shop(fixture.owner);
        let cost = paid(1_115_000_000_000_000_000);

        let id = shop
            .place_order(ItemId::new(1), 2, PickupLocationId::new(1), cost)
            .await
            .unwrap();

        assert_eq!(id, OrderId::new(1));
        assert_eq!(chain.item(ItemId::new(1)).unwrap().stock, Stock::Count(198));
        assert_eq!(chain.contract_balance(), cost);
        assert_eq!(
            chain.balance_of(fixture.owner),
            fixture.starting_balance.checked_sub(cost).unwrap()
        );
    }

    #[tokio::test]
    async fn test_place_order_check_order() {
        let (chain, fixture) = chain();
        let shop = chain.shop(fixture.owner);

        let err = shop
            .place_order(ItemId::new(9), 0, PickupLocationId::new(9), Wei::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::INVALID_ITEM_ID));

        let err = shop
            .place_order(ItemId::new(1), 0, PickupLocationId::new(9), Wei::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::ZERO_QUANTITY));

        let err = shop
            .place_order(ItemId::new(1), 201, PickupLocationId::new(9), Wei::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::INVALID_PICKUP_LOCATION_ID));

        let err = shop
            .place_order(ItemId::new(1), 201, PickupLocationId::new(0), Wei::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::NOT_ENOUGH_STOCK));

        let err = shop
            .place_order(ItemId::new(1), 2, PickupLocationId::new(0), paid(1))
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::INSUFFICIENT_PAYMENT));

        assert!(chain.all_orders().is_empty());
    }

    #[tokio::test]
    async fn test_manager_rules() {
        let (chain, fixture) = chain();
        let owner = chain.shop(fixture.owner);
        let stranger = fixture.accounts[2];

        let err = owner.assign_manager(fixture.accounts[1]).await.unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::ALREADY_MANAGER));

        owner.assign_manager(stranger).await.unwrap();
        assert!(owner.is_manager(stranger).await.unwrap());

        owner.unassign_manager(stranger).await.unwrap();
        let err = owner.unassign_manager(stranger).await.unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::NOT_MANAGER));

        let err = chain
            .shop(stranger)
            .assign_manager(stranger)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::ONLY_OWNER));
    }

    #[tokio::test]
    async fn test_assign_managers_is_all_or_nothing() {
        let (chain, fixture) = chain();
        let owner = chain.shop(fixture.owner);
        let (a, b) = (fixture.accounts[3], fixture.accounts[4]);

        let err = owner.assign_managers(vec![a, a]).await.unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::ALREADY_MANAGER));
        assert!(!owner.is_manager(a).await.unwrap());

        owner.assign_managers(vec![a, b]).await.unwrap();
        assert!(owner.is_manager(a).await.unwrap());
        assert!(owner.is_manager(b).await.unwrap());
    }

    #[tokio::test]
    async fn test_collect_order_rules() {
        let (chain, fixture) = chain();
        let owner = chain.shop(fixture.owner);

        let err = owner.collect_order(OrderId::new(1)).await.unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::INVALID_ORDER_ID));

        let err = chain
            .shop(fixture.accounts[2])
            .collect_order(OrderId::new(1))
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some(revert::ONLY_MANAGERS));
    }

    #[tokio::test]
    async fn test_withdraw_pays_owner() {
        let (chain, fixture) = chain();
        let owner = chain.shop(fixture.owner);
        let buyer = chain.shop(fixture.accounts[2]);
        let cost = paid(1_115_000_000_000_000_000);

        buyer
            .place_order(ItemId::new(1), 2, PickupLocationId::new(1), cost)
            .await
            .unwrap();
        owner.withdraw().await.unwrap();

        assert_eq!(chain.contract_balance(), Wei::ZERO);
        assert_eq!(
            chain.balance_of(fixture.owner),
            fixture.starting_balance.checked_add(cost).unwrap()
        );
    }

    #[tokio::test]
    async fn test_injected_failure_hits_next_read_only() {
        let (chain, fixture) = chain();
        let shop = chain.shop(fixture.owner);

        chain.fail_next_reads(1);
        assert!(matches!(
            shop.list_items().await,
            Err(DappError::Rpc { code: -32603, .. })
        ));
        assert_eq!(shop.list_items().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_orders_are_per_account() {
        let (chain, fixture) = chain();
        let cost = paid(1_115_000_000_000_000_000);
        chain
            .shop(fixture.accounts[2])
            .place_order(ItemId::new(1), 2, PickupLocationId::new(1), cost)
            .await
            .unwrap();

        assert!(chain.shop(fixture.owner).list_my_orders().await.unwrap().is_empty());
        assert_eq!(
            chain
                .shop(fixture.accounts[2])
                .list_my_orders()
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
