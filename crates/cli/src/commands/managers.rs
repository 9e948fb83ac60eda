//! Owner commands: manager rights and withdrawals.
//!
//! # Usage
//!
//! ```bash
//! # Grant manager rights (several addresses use a single transaction)
//! shop-cli assign-manager 0x70997970C51812dc3A010C7d01b50e0d17dc79C8
//!
//! # Revoke them
//! shop-cli unassign-manager 0x70997970C51812dc3A010C7d01b50e0d17dc79C8
//!
//! # Move collected payments to the owner
//! shop-cli withdraw
//! ```

use shop_agile_core::Address;
use shop_agile_dapp::DappConfig;

use super::{CommandError, ShopSession};

/// Grant manager rights to `managers`.
pub async fn assign(config: &DappConfig, managers: Vec<Address>) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;

    let tx = match managers.as_slice() {
        [manager] => shop.handle.assign_manager(*manager).await?,
        _ => {
            tracing::info!("Assigning {} managers", managers.len());
            shop.handle.assign_managers(managers).await?
        }
    };
    tracing::info!("Managers assigned (tx {tx})");

    shop.close().await;
    Ok(())
}

/// Revoke manager rights from `manager`.
pub async fn unassign(config: &DappConfig, manager: Address) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;

    let tx = shop.handle.unassign_manager(manager).await?;
    tracing::info!("Manager {manager} unassigned (tx {tx})");

    shop.close().await;
    Ok(())
}

/// Withdraw the contract balance to the owner and show the new balance.
pub async fn withdraw(config: &DappConfig) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;
    shop.ready().await?;

    let tx = shop.handle.withdraw().await?;
    tracing::info!("Withdrawal confirmed (tx {tx})");

    if let Some(balance) = shop.ready().await?.balance {
        tracing::info!("Owner balance: {balance}");
    }

    shop.close().await;
    Ok(())
}
