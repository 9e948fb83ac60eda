//! Contract Gateway.
//!
//! Typed access to the deployed `ShopAgileWeb3` contract. A gateway is bound
//! to one sending account; reads run as that account (so `getMyOrders`
//! answers for it) and writes resolve only once the transaction is mined.

pub(crate) mod abi;
mod gateway;
pub mod revert;

use std::future::Future;

use alloy_primitives::B256;
use shop_agile_core::{
    Address, FeeSchedule, Item, ItemId, Order, OrderId, PickupLocation, PickupLocationId, Wei,
};

use crate::error::DappError;

pub use gateway::{ContractGateway, RpcDeployment};

/// Hash of a mined transaction.
pub type TxHash = B256;

/// Operations offered by the shop contract, on behalf of one account.
///
/// Every write resolves only after the transaction is confirmed, or fails
/// with [`DappError::TransactionReverted`] carrying the contract's reason.
pub trait ShopContract: Send + Sync + 'static {
    /// Account this gateway sends calls from.
    fn account(&self) -> Address;

    /// All items in catalog order.
    fn list_items(&self) -> impl Future<Output = Result<Vec<Item>, DappError>> + Send;

    /// All pickup locations in catalog order.
    fn list_pickup_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<PickupLocation>, DappError>> + Send;

    /// Orders placed by [`Self::account`], oldest first.
    fn list_my_orders(&self) -> impl Future<Output = Result<Vec<Order>, DappError>> + Send;

    /// Contract owner.
    fn owner(&self) -> impl Future<Output = Result<Address, DappError>> + Send;

    /// Whether `account` may collect orders.
    fn is_manager(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<bool, DappError>> + Send;

    /// Current base and percent fee.
    fn fee_schedule(&self) -> impl Future<Output = Result<FeeSchedule, DappError>> + Send;

    /// Pay for an order; returns the id the contract assigned.
    fn place_order(
        &self,
        item_id: ItemId,
        quantity: u64,
        pickup_location_id: PickupLocationId,
        value: Wei,
    ) -> impl Future<Output = Result<OrderId, DappError>> + Send;

    /// Mark an order as collected (managers only).
    fn collect_order(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<TxHash, DappError>> + Send;

    /// Grant manager rights (owner only).
    fn assign_manager(
        &self,
        manager: Address,
    ) -> impl Future<Output = Result<TxHash, DappError>> + Send;

    /// Grant manager rights to several accounts at once (owner only).
    fn assign_managers(
        &self,
        managers: Vec<Address>,
    ) -> impl Future<Output = Result<TxHash, DappError>> + Send;

    /// Revoke manager rights (owner only).
    fn unassign_manager(
        &self,
        manager: Address,
    ) -> impl Future<Output = Result<TxHash, DappError>> + Send;

    /// Move the contract's balance to the owner (owner only).
    fn withdraw(&self) -> impl Future<Output = Result<TxHash, DappError>> + Send;
}

/// A deployed contract that gateways can be bound to.
pub trait Deployment: Send + Sync + 'static {
    /// Gateway type produced by [`Self::bind`].
    type Contract: ShopContract;

    /// Address of the deployed contract.
    fn address(&self) -> Address;

    /// Create a gateway that sends calls from `account`.
    fn bind(&self, account: Address) -> Self::Contract;
}
