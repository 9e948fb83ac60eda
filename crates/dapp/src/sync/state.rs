//! Published view state.

use serde::Serialize;
use shop_agile_core::{Item, Order, PickupLocation, Session, Snapshot, Wei};

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No wallet session.
    #[default]
    Disconnected,
    /// A session exists and at least one read is outstanding.
    Initializing,
    /// Every read of the current session has completed.
    Ready,
}

/// The reads that make up a session's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadKind {
    Balance,
    Items,
    PickupLocations,
    Orders,
}

impl ReadKind {
    /// Every read, in the order a full initialization issues them.
    pub const ALL: [Self; 4] = [
        Self::Balance,
        Self::Items,
        Self::PickupLocations,
        Self::Orders,
    ];
}

impl std::fmt::Display for ReadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Balance => write!(f, "balance"),
            Self::Items => write!(f, "items"),
            Self::PickupLocations => write!(f, "pickup_locations"),
            Self::Orders => write!(f, "orders"),
        }
    }
}

/// Per-read loading flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Loading {
    pub balance: bool,
    pub items: bool,
    pub pickup_locations: bool,
    pub orders: bool,
}

impl Loading {
    /// All flags set.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            balance: true,
            items: true,
            pickup_locations: true,
            orders: true,
        }
    }

    /// Whether `kind` is loading.
    #[must_use]
    pub const fn get(&self, kind: ReadKind) -> bool {
        match kind {
            ReadKind::Balance => self.balance,
            ReadKind::Items => self.items,
            ReadKind::PickupLocations => self.pickup_locations,
            ReadKind::Orders => self.orders,
        }
    }

    pub(crate) const fn set(&mut self, kind: ReadKind, loading: bool) {
        match kind {
            ReadKind::Balance => self.balance = loading,
            ReadKind::Items => self.items = loading,
            ReadKind::PickupLocations => self.pickup_locations = loading,
            ReadKind::Orders => self.orders = loading,
        }
    }

    /// Whether any read is outstanding.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.balance || self.items || self.pickup_locations || self.orders
    }
}

/// Everything a presentation layer needs to render the shop.
///
/// Snapshots are replaced wholesale when a read completes and are never
/// patched in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewState {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Connected wallet session, if any.
    pub session: Option<Session>,
    /// Native balance of the selected account.
    pub balance: Option<Wei>,
    /// Item catalog.
    pub items: Option<Snapshot<Item>>,
    /// Pickup locations.
    pub pickup_locations: Option<Snapshot<PickupLocation>>,
    /// Orders of the selected account.
    pub orders: Option<Snapshot<Order>>,
    /// Outstanding reads.
    pub loading: Loading,
    /// User-facing message of the most recent failure.
    pub last_error: Option<String>,
    /// Session generation; bumped on every reset and re-initialization.
    pub generation: u64,
}

impl ViewState {
    /// Whether every read of the session has completed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// The item an order refers to, looked up by id.
    #[must_use]
    pub fn item_for(&self, order: &Order) -> Option<&Item> {
        self.items
            .as_ref()?
            .find(|item| item.id == order.item_id)
    }

    /// The pickup location an order refers to, looked up by id.
    #[must_use]
    pub fn location_for(&self, order: &Order) -> Option<&PickupLocation> {
        self.pickup_locations
            .as_ref()?
            .find(|location| location.id == order.pickup_location_id)
    }

    /// Recompute the phase from the session and loading flags.
    pub(crate) fn update_phase(&mut self) {
        self.phase = match (&self.session, self.loading.any()) {
            (None, _) => Phase::Disconnected,
            (Some(_), true) => Phase::Initializing,
            (Some(_), false) => Phase::Ready,
        };
    }
}
