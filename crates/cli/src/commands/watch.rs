//! Follow the synchronizer.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=shop_agile_dapp=debug shop-cli watch
//! ```
//!
//! Switching accounts or networks on the node shows up as session resets.

use shop_agile_dapp::DappConfig;
use shop_agile_dapp::sync::ViewState;

use super::{CommandError, ShopSession};

fn log_state(state: &ViewState) {
    tracing::info!(
        phase = ?state.phase,
        generation = state.generation,
        account = ?state.session.map(|session| session.short_address()),
        balance = ?state.balance.map(|balance| balance.to_string()),
        items = state.items.as_ref().map(|items| items.len()),
        orders = state.orders.as_ref().map(|orders| orders.len()),
        error = state.last_error.as_deref(),
        "View state"
    );
}

/// Log every published view state until Ctrl-C.
pub async fn run(config: &DappConfig) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;
    let mut states = shop.handle.subscribe();
    log_state(&states.borrow_and_update());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    tracing::warn!("Synchronizer stopped");
                    break;
                }
                log_state(&states.borrow_and_update());
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    drop(states);
    shop.close().await;
    Ok(())
}
