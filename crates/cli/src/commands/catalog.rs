//! Read-only catalog commands.
//!
//! # Usage
//!
//! ```bash
//! shop-cli items
//! shop-cli locations
//! shop-cli fees
//! shop-cli deployment
//! ```

use shop_agile_core::Snapshot;
use shop_agile_dapp::{DappConfig, ShopContract};

use super::{CommandError, ShopSession, load_artifacts};

/// List the item catalog.
pub async fn items(config: &DappConfig) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;
    let state = shop.ready().await?;

    let Some(items) = state.items.as_ref() else {
        return Err(CommandError::SessionLost("no item snapshot".to_string()));
    };
    tracing::info!(
        "{} items as of {}:",
        items.len(),
        items.fetched_at().format("%H:%M:%S")
    );
    for item in items {
        tracing::info!(
            "  #{} {} - {} (stock: {}){}",
            item.id,
            item.name,
            item.price,
            item.stock,
            if item.can_order(1) { "" } else { " SOLD OUT" }
        );
    }

    shop.close().await;
    Ok(())
}

/// List pickup locations.
pub async fn locations(config: &DappConfig) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;
    let state = shop.ready().await?;

    let locations = state
        .pickup_locations
        .as_ref()
        .map(Snapshot::entries)
        .unwrap_or_default();
    tracing::info!("{} pickup locations:", locations.len());
    for location in locations {
        tracing::info!(
            "  #{} {}, {}, {}, {} ({})",
            location.id,
            location.name,
            location.street_address,
            location.city,
            location.state,
            location.phone
        );
    }

    shop.close().await;
    Ok(())
}

/// Show the fee schedule and the contract owner.
pub async fn fees(config: &DappConfig) -> Result<(), CommandError> {
    let shop = ShopSession::open(config).await?;

    let fees = shop.gateway.fee_schedule().await?;
    let owner = shop.gateway.owner().await?;
    let is_manager = shop.gateway.is_manager(shop.session.selected_address).await?;

    tracing::info!("Base fee: {}", fees.base_fee);
    tracing::info!("Percent fee: {}%", fees.percent_fee);
    tracing::info!("Owner: {owner}");
    tracing::info!(
        "Selected account {} is {}a manager",
        shop.session.short_address(),
        if is_manager { "" } else { "not " }
    );

    shop.close().await;
    Ok(())
}

/// Show the deployment artifacts without contacting the node.
pub async fn deployment(config: &DappConfig) -> Result<(), CommandError> {
    let artifacts = load_artifacts(config).await?;

    tracing::info!("Artifacts: {}", config.artifacts_dir.display());
    tracing::info!("Contract address: {}", artifacts.address);
    tracing::info!("Functions:");
    for name in artifacts.function_names() {
        tracing::info!("  {name}");
    }
    Ok(())
}
