//! Solidity bindings for the `ShopAgileWeb3` contract.
//!
//! Records come back from the contract as ABI tuples; the `decode_*`
//! functions map them into the domain types of `shop_agile_core`, turning
//! the stock sentinel and order status codes into enums.

use alloy_primitives::U256;
use alloy_sol_types::sol;
use shop_agile_core::{
    Item, ItemId, Order, OrderId, OrderStatus, PickupLocation, PickupLocationId, Stock, Wei,
};

use crate::error::DappError;

sol! {
    #[sol(all_derives)]
    interface IShopAgileWeb3 {
        struct Item {
            uint256 id;
            string name;
            uint256 price;
            int256 stock;
            string ipfsURI;
        }

        struct PickupLocation {
            uint256 id;
            string name;
            string location;
            string city;
            string state;
            string phone;
        }

        struct Order {
            uint256 id;
            address user;
            uint256 itemId;
            uint256 quantity;
            uint256 pickupLocationId;
            uint256 cost;
            uint8 status;
        }

        event OrderPlaced(uint256 orderId, address user, uint256 itemId, uint256 quantity, uint256 pickupLocationId);
        event OrderCollected(uint256 orderId);
        event ManagerAssigned(address manager);
        event ManagerDeassigned(address manager);

        function owner() external view returns (address);
        function baseFee() external view returns (uint256);
        function percentFee() external view returns (uint256);
        function isManager(address account) external view returns (bool);

        function getAllItems() external view returns (Item[] memory);
        function getAllPickupLocations() external view returns (PickupLocation[] memory);
        function getMyOrders() external view returns (Order[] memory);

        function placeOrder(uint256 itemId, uint256 quantity, uint256 pickupLocationId) external payable;
        function collectOrder(uint256 orderId) external;
        function assignManager(address manager) external;
        function assignManagers(address[] calldata managers) external;
        function unassignManager(address manager) external;
        function withdraw() external;
    }
}

/// Narrow a `uint256` quantity to `u64`.
pub fn decode_quantity(raw: U256) -> Result<u64, DappError> {
    u64::try_from(raw).map_err(|_| DappError::Decode(format!("quantity {raw} does not fit in 64 bits")))
}

/// Map a contract item record.
pub fn decode_item(raw: IShopAgileWeb3::Item) -> Result<Item, DappError> {
    Ok(Item {
        id: ItemId::try_from(raw.id).map_err(|e| DappError::Decode(e.to_string()))?,
        name: raw.name,
        price: Wei::new(raw.price),
        stock: Stock::from_raw(raw.stock).map_err(|e| DappError::Decode(e.to_string()))?,
        ipfs_uri: raw.ipfsURI,
    })
}

/// Map a contract pickup-location record.
pub fn decode_pickup_location(
    raw: IShopAgileWeb3::PickupLocation,
) -> Result<PickupLocation, DappError> {
    Ok(PickupLocation {
        id: PickupLocationId::try_from(raw.id).map_err(|e| DappError::Decode(e.to_string()))?,
        name: raw.name,
        street_address: raw.location,
        city: raw.city,
        state: raw.state,
        phone: raw.phone,
    })
}

/// Map a contract order record.
pub fn decode_order(raw: IShopAgileWeb3::Order) -> Result<Order, DappError> {
    Ok(Order {
        id: OrderId::try_from(raw.id).map_err(|e| DappError::Decode(e.to_string()))?,
        user: raw.user,
        item_id: ItemId::try_from(raw.itemId).map_err(|e| DappError::Decode(e.to_string()))?,
        quantity: decode_quantity(raw.quantity)?,
        pickup_location_id: PickupLocationId::try_from(raw.pickupLocationId)
            .map_err(|e| DappError::Decode(e.to_string()))?,
        cost: Wei::new(raw.cost),
        status: OrderStatus::from_raw(raw.status).map_err(|e| DappError::Decode(e.to_string()))?,
    })
}

/// Map a list of records, failing on the first bad one.
pub fn decode_all<R, T>(
    raw: Vec<R>,
    decode: impl Fn(R) -> Result<T, DappError>,
) -> Result<Vec<T>, DappError> {
    raw.into_iter().map(decode).collect()
}
