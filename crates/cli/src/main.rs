//! Shop Agile CLI - Operator tools for a deployed `ShopAgileWeb3` contract.
//!
//! # Usage
//!
//! ```bash
//! # Show the catalog and pickup locations
//! shop-cli items
//! shop-cli locations
//!
//! # Order two loaves of bread for pickup at location 1
//! shop-cli place-order --item 1 --quantity 2 --location 1
//!
//! # Mark order 1 as collected (managers only)
//! SHOP_ACCOUNT_INDEX=1 shop-cli collect --order 1
//!
//! # Follow the synchronizer until Ctrl-C
//! shop-cli watch
//! ```
//!
//! # Commands
//!
//! - `items`, `locations`, `orders`, `fees` - Read the contract
//! - `place-order`, `collect` - Customer and manager writes
//! - `assign-manager`, `unassign-manager`, `withdraw` - Owner writes
//! - `watch` - Log every view-state change
//! - `deployment` - Show the loaded deployment artifacts
//!
//! Configuration comes from the environment (see `DappConfig`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shop_agile_core::{Address, ItemId, OrderId, PickupLocationId, Wei};
use shop_agile_dapp::DappConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Shop Agile Web3 operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the item catalog
    Items,
    /// List pickup locations
    Locations,
    /// List orders of the selected account
    Orders,
    /// Show the contract's fee schedule
    Fees,
    /// Place an order
    PlaceOrder {
        /// Item id
        #[arg(short, long)]
        item: u64,

        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u64,

        /// Pickup location id
        #[arg(short, long)]
        location: u64,

        /// Ether to send; defaults to the fee-schedule quote
        #[arg(short, long)]
        value: Option<Wei>,
    },
    /// Mark an order as collected
    Collect {
        /// Order id
        #[arg(short, long)]
        order: u64,
    },
    /// Grant manager rights to one or more accounts
    AssignManager {
        /// Account addresses
        #[arg(required = true)]
        managers: Vec<Address>,
    },
    /// Revoke manager rights
    UnassignManager {
        /// Account address
        manager: Address,
    },
    /// Move the contract balance to the owner
    Withdraw,
    /// Follow the view state until Ctrl-C
    Watch,
    /// Show the deployment artifacts
    Deployment,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &DappConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = DappConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shop_agile_cli=info,shop_agile_dapp=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        // Flush Sentry before exiting
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &DappConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Items => commands::catalog::items(config).await?,
        Commands::Locations => commands::catalog::locations(config).await?,
        Commands::Orders => commands::orders::list(config).await?,
        Commands::Fees => commands::catalog::fees(config).await?,
        Commands::PlaceOrder {
            item,
            quantity,
            location,
            value,
        } => {
            commands::orders::place(
                config,
                ItemId::new(item),
                quantity,
                PickupLocationId::new(location),
                value,
            )
            .await?;
        }
        Commands::Collect { order } => {
            commands::orders::collect(config, OrderId::new(order)).await?;
        }
        Commands::AssignManager { managers } => {
            commands::managers::assign(config, managers).await?;
        }
        Commands::UnassignManager { manager } => {
            commands::managers::unassign(config, manager).await?;
        }
        Commands::Withdraw => commands::managers::withdraw(config).await?,
        Commands::Watch => commands::watch::run(config).await?,
        Commands::Deployment => commands::catalog::deployment(config).await?,
    }
    Ok(())
}
