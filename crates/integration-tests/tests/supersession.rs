//! Integration tests for read supersession.
//!
//! A read issued for one account must never land in the view of another.
//! Reads are held back on the chain and released after the account changed.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use shop_agile_dapp::sync::{Applied, Phase};
use shop_agile_integration_tests::TestShop;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_late_items_of_previous_account_are_discarded() {
    let shop = TestShop::bakery();
    let (a, b) = (shop.owner(), shop.account(2));
    let mut sync = shop.ready().await;
    assert_eq!(sync.state().items.as_ref().unwrap().len(), 5);

    // A's items refresh is in flight when the wallet switches to B
    shop.chain.hold_reads(a);
    sync.refresh_items();
    shop.chain.switch_account(Some(b));
    sync.next_wallet_event().await.unwrap();
    sync.settle().await;

    let generation = sync.state().generation;
    assert_eq!(sync.state().session.unwrap().selected_address, b);
    assert!(sync.state().is_ready());

    shop.chain.release_reads(a);
    let applied = tokio::time::timeout(DELIVERY_TIMEOUT, sync.next_completion())
        .await
        .unwrap();
    assert!(matches!(applied, Some(Applied::Stale(_))));

    let state = sync.state();
    assert_eq!(state.session.unwrap().selected_address, b);
    assert_eq!(state.generation, generation);
    assert_eq!(state.items.as_ref().unwrap().len(), 5);
    assert!(state.is_ready());
}

#[tokio::test]
async fn test_initial_reads_of_previous_account_are_discarded() {
    let shop = TestShop::bakery();
    let (a, b) = (shop.owner(), shop.account(2));
    let mut sync = shop.synchronizer();

    shop.chain.hold_reads(a);
    sync.connect().await.unwrap();
    assert_eq!(sync.state().phase, Phase::Initializing);

    shop.chain.switch_account(Some(b));
    sync.next_wallet_event().await.unwrap();
    sync.settle().await;
    assert!(sync.state().is_ready());

    shop.chain.release_reads(a);
    for _ in 0..4 {
        let applied = tokio::time::timeout(DELIVERY_TIMEOUT, sync.next_completion())
            .await
            .unwrap();
        assert!(matches!(applied, Some(Applied::Stale(_))));
    }

    let state = sync.state();
    assert_eq!(state.session.unwrap().selected_address, b);
    assert_eq!(state.balance, Some(shop.fixture.starting_balance));
    assert!(state.orders.as_ref().unwrap().is_empty());
}

#[tokio::test]
async fn test_late_orders_do_not_leak_across_accounts() {
    let shop = TestShop::bakery();
    let (a, b) = (shop.owner(), shop.account(2));
    let mut sync = shop.ready().await;

    sync.place_order(
        shop_agile_core::ItemId::new(1),
        1,
        shop_agile_core::PickupLocationId::new(0),
        None,
    )
    .await
    .unwrap();
    sync.settle().await;
    assert_eq!(sync.state().orders.as_ref().unwrap().len(), 1);

    shop.chain.hold_reads(a);
    sync.refresh_orders();
    shop.chain.switch_account(Some(b));
    sync.next_wallet_event().await.unwrap();
    sync.settle().await;
    shop.chain.release_reads(a);
    tokio::time::timeout(DELIVERY_TIMEOUT, sync.next_completion())
        .await
        .unwrap();

    // B has no orders; A's order list must not show up
    assert!(sync.state().orders.as_ref().unwrap().is_empty());
}
