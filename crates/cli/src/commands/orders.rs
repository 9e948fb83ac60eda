//! Order commands.
//!
//! # Usage
//!
//! ```bash
//! # Orders of the selected account
//! shop-cli orders
//!
//! # Two units of item 1 for pickup at location 1, paying the quote
//! shop-cli place-order --item 1 --quantity 2 --location 1
//!
//! # Mark order 1 as collected (managers only)
//! shop-cli collect --order 1
//! ```

use shop_agile_core::{ItemId, OrderId, PickupLocationId, Wei};
use shop_agile_dapp::DappConfig;
use shop_agile_dapp::sync::ViewState;

use super::{CommandError, ShopSession};

fn log_orders(state: &ViewState) {
    let Some(orders) = state.orders.as_ref() else {
        return;
    };

    tracing::info!("{} orders:", orders.len());
    for order in orders {
        let item = state
            .item_for(order)
            .map_or("<unknown item>", |item| item.name.as_str());
        let location = state
            .location_for(order)
            .map_or("<unknown location>", |location| location.name.as_str());
        tracing::info!(
            "  #{} {} x {} at {} - {} [{}]",
            order.id,
            order.quantity,
            item,
            location,
            order.cost,
            order.status
        );
    }
}

/// List orders of the selected account.
pub async fn list(config: &DappConfig) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;
    let state = shop.ready().await?;

    log_orders(&state);

    shop.close().await;
    Ok(())
}

/// Place an order and show the refreshed order list.
pub async fn place(
    config: &DappConfig,
    item_id: ItemId,
    quantity: u64,
    pickup_location_id: PickupLocationId,
    value: Option<Wei>,
) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;
    shop.ready().await?;

    let value = match value {
        Some(value) => value,
        None => {
            let quote = shop.handle.quote_order(item_id, quantity).await?;
            tracing::info!("Quoted cost: {quote}");
            quote
        }
    };

    tracing::info!(
        "Placing order: item {item_id} x {quantity}, pickup location {pickup_location_id}, paying {value}"
    );
    let order_id = shop
        .handle
        .place_order(item_id, quantity, pickup_location_id, Some(value))
        .await?;
    tracing::info!("Order placed successfully! ID: {order_id}");

    log_orders(&shop.ready().await?);

    shop.close().await;
    Ok(())
}

/// Mark an order as collected.
pub async fn collect(config: &DappConfig, order_id: OrderId) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;
    shop.ready().await?;

    let tx = shop.handle.collect_order(order_id).await?;
    tracing::info!("Order {order_id} collected (tx {tx})");

    shop.close().await;
    Ok(())
}
