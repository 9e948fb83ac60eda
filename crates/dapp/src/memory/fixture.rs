//! Seed data for the in-memory chain.

use alloy_primitives::address;
use shop_agile_core::{
    Address, FeeSchedule, Item, ItemId, NetworkId, PickupLocation, PickupLocationId, Stock, Wei,
};

/// Initial state of an in-memory deployment.
#[derive(Debug, Clone)]
pub struct ShopFixture {
    /// Deployer and owner of the contract.
    pub owner: Address,
    /// Wallet accounts; the first is selected initially.
    pub accounts: Vec<Address>,
    /// Managers besides the owner.
    pub managers: Vec<Address>,
    /// Starting balance of every account.
    pub starting_balance: Wei,
    /// Network the chain reports.
    pub network: NetworkId,
    /// Address the contract is deployed at.
    pub contract_address: Address,
    /// Fee parameters.
    pub fees: FeeSchedule,
    /// Item catalog.
    pub items: Vec<Item>,
    /// Pickup locations.
    pub pickup_locations: Vec<PickupLocation>,
}

/// First five accounts of a default Hardhat node.
const HARDHAT_ACCOUNTS: [Address; 5] = [
    address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
    address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
    address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
    address!("90F79bf6EB2c4f870365E785982E1f101E93b906"),
    address!("15d34AAf54267DB7D7c367839AAf71A00a2C6A65"),
];

/// Address of the first contract deployed by Hardhat account #0.
const FIRST_DEPLOYMENT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

const MILLIETHER: u128 = 1_000_000_000_000_000;

impl ShopFixture {
    /// The bakery catalog the shop is deployed with on a local Hardhat node.
    ///
    /// Account #0 owns the contract and account #1 is a manager. Fees are a
    /// 0.11 ether base plus 75% of the item subtotal.
    #[must_use]
    pub fn bakery() -> Self {
        let items = [
            ("Chocolate Cake", 5_000, Stock::Unlimited, "URL1"),
            ("Bread Loaf", 670, Stock::Count(200), "URL2"),
            ("Vanilla Cupcake", 559, Stock::Count(150), "URL3"),
            ("Strawberry Muffin", 671, Stock::Count(150), "URL4"),
            ("Chocolate Chip Cookie", 223, Stock::Count(300), "URL5"),
        ];
        let locations = [
            (
                "Pastry Palacio",
                "Shop No 10, Tps Vi, Milan Subway, Rizvi Nagar, Sv Road, Near Dhiraj Heritege, Santacruz (west)",
                "Mumbai",
                "Maharastra",
                "+919202727371",
            ),
            (
                "FZ Cakes",
                "13, 3rd Flr, Heena Shopping Arcade, S V Rd, Below Allahbad Bank, Jogeshwari (west)",
                "Mumbai",
                "Maharastra",
                "+917112535346",
            ),
            (
                "Monginia",
                "214a, Fakeer M., Jain Mohammed Chawl, Opp Old Post Office, Dharavi",
                "Mumbai",
                "Maharastra",
                "+917222768894",
            ),
            (
                "Pastry Factory",
                "Da-3/1, Vikas Marg Extn, Shakarpur",
                "Delhi",
                "Delhi",
                "+919222642190",
            ),
            (
                "Yummy Eats",
                "Gate No 7, Opp.mhb Colony, Kharodi",
                "Mumbai",
                "Maharastra",
                "+919402457009",
            ),
        ];

        Self {
            owner: HARDHAT_ACCOUNTS[0],
            accounts: HARDHAT_ACCOUNTS.to_vec(),
            managers: vec![HARDHAT_ACCOUNTS[1]],
            starting_balance: Wei::from_wei(10_000 * 1_000 * MILLIETHER),
            network: NetworkId::HARDHAT,
            contract_address: FIRST_DEPLOYMENT,
            fees: FeeSchedule::new(Wei::from_wei(110 * MILLIETHER), 75),
            items: items
                .into_iter()
                .zip(0..)
                .map(|((name, price_milli, stock, uri), id)| Item {
                    id: ItemId::new(id),
                    name: name.to_string(),
                    price: Wei::from_wei(price_milli * MILLIETHER),
                    stock,
                    ipfs_uri: uri.to_string(),
                })
                .collect(),
            pickup_locations: locations
                .into_iter()
                .zip(0..)
                .map(|((name, street, city, state, phone), id)| PickupLocation {
                    id: PickupLocationId::new(id),
                    name: name.to_string(),
                    street_address: street.to_string(),
                    city: city.to_string(),
                    state: state.to_string(),
                    phone: phone.to_string(),
                })
                .collect(),
        }
    }
}
