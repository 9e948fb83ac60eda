//! Newtype IDs for type-safe entity references.
//!
//! The shop contract addresses items, pickup locations and orders by
//! `uint256` ids. Use the `define_id!` macro to create wrappers that prevent
//! passing an order id where an item id is expected.

/// An on-chain id did not fit in 64 bits.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} {value} does not fit in 64 bits")]
pub struct IdOverflowError {
    /// Name of the id type being decoded.
    pub kind: &'static str,
    /// The raw on-chain value, in decimal.
    pub value: String,
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_u64()`, `to_u256()`
/// - `From<u64>`, `Into<u64>` and checked `TryFrom<U256>` implementations
///
/// # Example
///
/// ```rust
/// # use shop_agile_core::define_id;
/// define_id!(ReceiptId);
/// define_id!(BatchId);
///
/// let receipt = ReceiptId::new(1);
/// let batch = BatchId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ReceiptId = batch;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a u64 value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying u64 value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            /// Widen to the contract's `uint256` representation.
            #[must_use]
            pub fn to_u256(&self) -> $crate::U256 {
                $crate::U256::from(self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl TryFrom<$crate::U256> for $name {
            type Error = $crate::IdOverflowError;

            fn try_from(value: $crate::U256) -> ::core::result::Result<Self, Self::Error> {
                u64::try_from(value)
                    .map(Self)
                    .map_err(|_| $crate::IdOverflowError {
                        kind: stringify!($name),
                        value: value.to_string(),
                    })
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }
    };
}

// Item and pickup location ids are positions in the contract's arrays
// (0-based); order ids come from a counter starting at 1.
define_id!(ItemId);
define_id!(PickupLocationId);
define_id!(OrderId);
