//! Integration tests for placing and collecting orders.
//!
//! Writes go through the synchronizer; the chain is inspected directly to
//! confirm what the contract recorded.

#![allow(clippy::unwrap_used)]

use shop_agile_core::{ItemId, OrderId, OrderStatus, PickupLocationId, Stock, Wei};
use shop_agile_dapp::ShopContract;
use shop_agile_dapp::contract::revert;
use shop_agile_integration_tests::TestShop;

/// 0.11 ether base fee + 0.67 ether x 2 x 75%.
const TWO_LOAVES_COST: u128 = 1_115_000_000_000_000_000;

// =============================================================================
// Rejected Orders
// =============================================================================

#[tokio::test]
async fn test_invalid_item_changes_nothing() {
    let shop = TestShop::bakery();
    let mut sync = shop.ready().await;
    let before = sync.state().clone();

    let err = sync
        .place_order(ItemId::new(5), 1, PickupLocationId::new(1), None)
        .await
        .unwrap_err();

    assert_eq!(err.revert_reason(), Some(revert::INVALID_ITEM_ID));
    assert!(shop.chain.all_orders().is_empty());
    assert_eq!(shop.chain.contract_balance(), Wei::ZERO);
    assert_eq!(sync.state().items, before.items);
    assert_eq!(sync.state().generation, before.generation);
}

#[tokio::test]
async fn test_zero_quantity_is_rejected() {
    let shop = TestShop::bakery();
    let mut sync = shop.ready().await;

    let err = sync
        .place_order(ItemId::new(1), 0, PickupLocationId::new(1), None)
        .await
        .unwrap_err();

    assert_eq!(err.revert_reason(), Some(revert::ZERO_QUANTITY));
    assert!(shop.chain.all_orders().is_empty());
}

#[tokio::test]
async fn test_underpayment_is_rejected() {
    let shop = TestShop::bakery();
    let mut sync = shop.ready().await;

    let err = sync
        .place_order(
            ItemId::new(1),
            2,
            PickupLocationId::new(1),
            Some(Wei::from_wei(TWO_LOAVES_COST - 1)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.revert_reason(), Some(revert::INSUFFICIENT_PAYMENT));
    assert_eq!(err.user_message(), revert::INSUFFICIENT_PAYMENT);
}

#[tokio::test]
async fn test_insufficient_stock_is_rejected() {
    let shop = TestShop::bakery();
    let mut sync = shop.ready().await;

    let err = sync
        .place_order(ItemId::new(2), 151, PickupLocationId::new(0), None)
        .await
        .unwrap_err();

    assert_eq!(err.revert_reason(), Some(revert::NOT_ENOUGH_STOCK));
    assert_eq!(
        shop.chain.item(ItemId::new(2)).unwrap().stock,
        Stock::Count(150)
    );
}

// =============================================================================
// Successful Orders
// =============================================================================

#[tokio::test]
async fn test_place_order_records_one_new_order() {
    let shop = TestShop::bakery();
    let mut sync = shop.ready().await;

    let quote = sync.quote_order(ItemId::new(1), 2).await.unwrap();
    assert_eq!(quote, Wei::from_wei(TWO_LOAVES_COST));

    let order_id = sync
        .place_order(ItemId::new(1), 2, PickupLocationId::new(1), None)
        .await
        .unwrap();
    sync.settle().await;

    let orders = shop.chain.shop(shop.owner()).list_my_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.id, order_id);
    assert_eq!(order.item_id, ItemId::new(1));
    assert_eq!(order.quantity, 2);
    assert_eq!(order.pickup_location_id, PickupLocationId::new(1));
    assert_eq!(order.status, OrderStatus::Ordered);
    assert_eq!(order.cost, Wei::from_wei(TWO_LOAVES_COST));

    let state = sync.state();
    assert_eq!(state.orders.as_ref().unwrap().entries(), orders.as_slice());
    assert_eq!(
        state.balance,
        shop.fixture
            .starting_balance
            .checked_sub(Wei::from_wei(TWO_LOAVES_COST))
    );
    assert_eq!(state.item_for(order).unwrap().stock, Stock::Count(198));
}

#[tokio::test]
async fn test_bulk_order_keeps_unlimited_stock() {
    let shop = TestShop::bakery();
    let mut sync = shop.ready().await;

    sync.place_order(ItemId::new(0), 500, PickupLocationId::new(3), None)
        .await
        .unwrap();
    sync.settle().await;

    let orders = sync.state().orders.clone().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(
        orders.entries()[0].cost,
        Wei::parse_ether("1875.11").unwrap()
    );
    assert_eq!(
        shop.chain.item(ItemId::new(0)).unwrap().stock,
        Stock::Unlimited
    );
}

#[tokio::test]
async fn test_overpayment_is_kept_by_contract() {
    let shop = TestShop::bakery();
    let mut sync = shop.ready().await;
    let paid = Wei::parse_ether("2").unwrap();

    sync.place_order(ItemId::new(1), 2, PickupLocationId::new(1), Some(paid))
        .await
        .unwrap();

    assert_eq!(shop.chain.contract_balance(), paid);
    assert_eq!(
        shop.chain.all_orders()[0].cost,
        Wei::from_wei(TWO_LOAVES_COST)
    );
}

// =============================================================================
// Collecting Orders
// =============================================================================

#[tokio::test]
async fn test_collect_twice_is_rejected() {
    let shop = TestShop::bakery();
    let mut customer = shop.ready().await;
    let order_id = customer
        .place_order(ItemId::new(1), 2, PickupLocationId::new(1), None)
        .await
        .unwrap();

    // The manager collects from their own session
    let manager = shop.chain.shop(shop.manager());
    manager.collect_order(order_id).await.unwrap();

    let err = manager.collect_order(order_id).await.unwrap_err();
    assert_eq!(err.revert_reason(), Some(revert::ALREADY_COLLECTED));
    assert_eq!(shop.chain.all_orders()[0].status, OrderStatus::Completed);

    customer.refresh_orders();
    customer.settle().await;
    let orders = customer.state().orders.clone().unwrap();
    assert_eq!(orders.entries()[0].status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_collect_unknown_order_is_rejected() {
    let shop = TestShop::bakery();
    let mut sync = shop.ready().await;

    let err = sync.collect_order(OrderId::new(42)).await.unwrap_err();
    assert_eq!(err.revert_reason(), Some(revert::INVALID_ORDER_ID));
}

#[tokio::test]
async fn test_orders_through_event_loop() {
    let shop = TestShop::bakery();
    let (handle, _task) = shop.spawn();
    handle.connect().await.unwrap();
    handle
        .wait_until(shop_agile_dapp::sync::ViewState::is_ready)
        .await
        .unwrap();

    let order_id = handle
        .place_order(ItemId::new(4), 3, PickupLocationId::new(2), None)
        .await
        .unwrap();
    let state = handle
        .wait_until(|state| state.is_ready() && state.orders.as_ref().is_some_and(|o| o.len() == 1))
        .await
        .unwrap();

    let order = &state.orders.as_ref().unwrap().entries()[0];
    assert_eq!(order.id, order_id);
    assert_eq!(state.location_for(order).unwrap().name, "Monginia");
    assert_eq!(state.item_for(order).unwrap().stock, Stock::Count(297));
}
