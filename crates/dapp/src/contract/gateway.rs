//! JSON-RPC implementation of the contract gateway.
//!
//! Reads go through `eth_call` with `from` set to the bound account. Writes
//! go through `eth_sendTransaction`, which the node signs with its unlocked
//! key, and then wait for the receipt.

use std::time::Duration;

use alloy_primitives::{B256, Bytes, LogData, U64, U256};
use alloy_sol_types::{SolCall, SolEvent};
use serde::{Deserialize, Serialize};
use shop_agile_core::{
    Address, FeeSchedule, Item, ItemId, Order, OrderId, PickupLocation, PickupLocationId, Wei,
};
use tracing::{debug, info, instrument};

use super::abi::{self, IShopAgileWeb3};
use super::{Deployment, ShopContract, TxHash};
use crate::error::DappError;
use crate::rpc::RpcClient;

/// Reason reported when a mined transaction failed without a revert string.
const REVERTED_WITHOUT_REASON: &str = "Transaction reverted without a reason.";

/// The contract as deployed on a node.
#[derive(Clone)]
pub struct RpcDeployment {
    rpc: RpcClient,
    address: Address,
    poll_interval: Duration,
}

impl RpcDeployment {
    /// Create a deployment handle for the contract at `address`.
    ///
    /// `poll_interval` paces receipt polling after a write.
    #[must_use]
    pub const fn new(rpc: RpcClient, address: Address, poll_interval: Duration) -> Self {
        Self {
            rpc,
            address,
            poll_interval,
        }
    }
}

impl Deployment for RpcDeployment {
    type Contract = ContractGateway;

    fn address(&self) -> Address {
        self.address
    }

    fn bind(&self, account: Address) -> ContractGateway {
        ContractGateway {
            rpc: self.rpc.clone(),
            address: self.address,
            from: account,
            poll_interval: self.poll_interval,
        }
    }
}

/// Gateway to the shop contract bound to one sending account.
#[derive(Clone)]
pub struct ContractGateway {
    rpc: RpcClient,
    address: Address,
    from: Address,
    poll_interval: Duration,
}

/// Call object for `eth_call` and `eth_sendTransaction`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallRequest {
    from: Address,
    to: Address,
    data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<U256>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    transaction_hash: B256,
    /// `0x1` on success, `0x0` if execution reverted
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    logs: Vec<ReceiptLog>,
}

#[derive(Debug, Deserialize)]
struct ReceiptLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

impl TransactionReceipt {
    fn succeeded(&self) -> bool {
        self.status != Some(U64::ZERO)
    }

    /// Decode the first `E` event emitted by `contract`.
    fn find_event<E: SolEvent>(&self, contract: Address) -> Result<Option<E>, DappError> {
        let Some(log) = self.logs.iter().find(|log| {
            log.address == contract && log.topics.first() == Some(&E::SIGNATURE_HASH)
        }) else {
            return Ok(None);
        };

        let data = LogData::new_unchecked(log.topics.clone(), log.data.clone());
        Ok(Some(E::decode_log_data(&data)?))
    }
}

impl ContractGateway {
    /// Run a read-only call as the bound account.
    async fn call<C: SolCall + Send + Sync>(&self, call: C) -> Result<C::Return, DappError> {
        let request = CallRequest {
            from: self.from,
            to: self.address,
            data: call.abi_encode().into(),
            value: None,
        };

        let output: Bytes = self.rpc.request("eth_call", (request, "latest")).await?;
        Ok(C::abi_decode_returns(&output)?)
    }

    /// Send a transaction and wait until it is mined.
    async fn transact<C: SolCall + Send + Sync>(
        &self,
        call: C,
        value: Option<Wei>,
    ) -> Result<TransactionReceipt, DappError> {
        let request = CallRequest {
            from: self.from,
            to: self.address,
            data: call.abi_encode().into(),
            value: value.map(Wei::as_u256),
        };

        let hash: TxHash = self.rpc.request("eth_sendTransaction", [request]).await?;
        debug!(tx = %hash, function = C::SIGNATURE, "Transaction submitted");

        let receipt = self.wait_for_receipt(hash).await?;
        if !receipt.succeeded() {
            return Err(DappError::TransactionReverted(
                REVERTED_WITHOUT_REASON.to_string(),
            ));
        }

        info!(tx = %hash, function = C::SIGNATURE, "Transaction confirmed");
        Ok(receipt)
    }

    /// Poll for the receipt of `hash`; there is no upper bound on the wait.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, DappError> {
        loop {
            let receipt: Option<TransactionReceipt> = self
                .rpc
                .request("eth_getTransactionReceipt", [hash])
                .await?;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl ShopContract for ContractGateway {
    fn account(&self) -> Address {
        self.from
    }

    #[instrument(skip(self), fields(account = %self.from))]
    async fn list_items(&self) -> Result<Vec<Item>, DappError> {
        let raw = self.call(IShopAgileWeb3::getAllItemsCall {}).await?;
        abi::decode_all(raw, abi::decode_item)
    }

    #[instrument(skip(self), fields(account = %self.from))]
    async fn list_pickup_locations(&self) -> Result<Vec<PickupLocation>, DappError> {
        let raw = self.call(IShopAgileWeb3::getAllPickupLocationsCall {}).await?;
        abi::decode_all(raw, abi::decode_pickup_location)
    }

    #[instrument(skip(self), fields(account = %self.from))]
    async fn list_my_orders(&self) -> Result<Vec<Order>, DappError> {
        let raw = self.call(IShopAgileWeb3::getMyOrdersCall {}).await?;
        abi::decode_all(raw, abi::decode_order)
    }

    async fn owner(&self) -> Result<Address, DappError> {
        self.call(IShopAgileWeb3::ownerCall {}).await
    }

    async fn is_manager(&self, account: Address) -> Result<bool, DappError> {
        self.call(IShopAgileWeb3::isManagerCall { account }).await
    }

    #[instrument(skip(self))]
    async fn fee_schedule(&self) -> Result<FeeSchedule, DappError> {
        let (base_fee, percent_fee) = tokio::try_join!(
            self.call(IShopAgileWeb3::baseFeeCall {}),
            self.call(IShopAgileWeb3::percentFeeCall {}),
        )?;
        Ok(FeeSchedule::new(
            Wei::new(base_fee),
            abi::decode_quantity(percent_fee)?,
        ))
    }

    #[instrument(skip(self, value), fields(account = %self.from, value = %value))]
    async fn place_order(
        &self,
        item_id: ItemId,
        quantity: u64,
        pickup_location_id: PickupLocationId,
        value: Wei,
    ) -> Result<OrderId, DappError> {
        let call = IShopAgileWeb3::placeOrderCall {
            itemId: item_id.to_u256(),
            quantity: U256::from(quantity),
            pickupLocationId: pickup_location_id.to_u256(),
        };
        let receipt = self.transact(call, Some(value)).await?;

        let placed = receipt
            .find_event::<IShopAgileWeb3::OrderPlaced>(self.address)?
            .ok_or_else(|| {
                DappError::Decode(format!(
                    "no OrderPlaced event in receipt {}",
                    receipt.transaction_hash
                ))
            })?;
        OrderId::try_from(placed.orderId).map_err(|e| DappError::Decode(e.to_string()))
    }

    #[instrument(skip(self), fields(account = %self.from))]
    async fn collect_order(&self, order_id: OrderId) -> Result<TxHash, DappError> {
        let call = IShopAgileWeb3::collectOrderCall {
            orderId: order_id.to_u256(),
        };
        Ok(self.transact(call, None).await?.transaction_hash)
    }

    #[instrument(skip(self), fields(account = %self.from))]
    async fn assign_manager(&self, manager: Address) -> Result<TxHash, DappError> {
        let call = IShopAgileWeb3::assignManagerCall { manager };
        Ok(self.transact(call, None).await?.transaction_hash)
    }

    #[instrument(skip(self, managers), fields(account = %self.from, count = managers.len()))]
    async fn assign_managers(&self, managers: Vec<Address>) -> Result<TxHash, DappError> {
        let call = IShopAgileWeb3::assignManagersCall { managers };
        Ok(self.transact(call, None).await?.transaction_hash)
    }

    #[instrument(skip(self), fields(account = %self.from))]
    async fn unassign_manager(&self, manager: Address) -> Result<TxHash, DappError> {
        let call = IShopAgileWeb3::unassignManagerCall { manager };
        Ok(self.transact(call, None).await?.transaction_hash)
    }

    #[instrument(skip(self), fields(account = %self.from))]
    async fn withdraw(&self) -> Result<TxHash, DappError> {
        Ok(self
            .transact(IShopAgileWeb3::withdrawCall {}, None)
            .await?
            .transaction_hash)
    }
}
