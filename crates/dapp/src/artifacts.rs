//! Deployment artifacts written by the Hardhat deploy script.
//!
//! The deploy script drops two files into the frontend's contracts
//! directory: `contract-address.json` mapping the contract name to its
//! address, and the compiled `ShopAgileWeb3.json` artifact holding the ABI.
//! Loading them checks that the deployed ABI offers every function the
//! gateway calls, with matching selectors.

use std::path::{Path, PathBuf};

use alloy_json_abi::JsonAbi;
use alloy_sol_types::SolCall;
use serde::Deserialize;
use shop_agile_core::Address;
use thiserror::Error;
use tracing::{info, instrument};

use crate::contract::abi::IShopAgileWeb3;

/// Name of the contract in the artifacts.
pub const CONTRACT_NAME: &str = "ShopAgileWeb3";

/// File mapping contract names to deployed addresses.
pub const ADDRESS_FILE: &str = "contract-address.json";

/// Errors that can occur when loading deployment artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} has no address for {CONTRACT_NAME}")]
    MissingContract(String),
    #[error("Deployed ABI lacks function {0}")]
    MissingFunction(&'static str),
    #[error("Deployed {function} returns {actual}, expected {expected}")]
    MismatchedOutputs {
        function: &'static str,
        expected: &'static str,
        actual: String,
    },
}

/// Compiled contract artifact (only the fields used here).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    abi: JsonAbi,
}

/// Address and ABI of the deployed shop contract.
#[derive(Debug, Clone)]
pub struct ContractArtifacts {
    /// Deployed contract address.
    pub address: Address,
    /// Contract ABI.
    pub abi: JsonAbi,
}

/// Functions the gateway calls, by name and selector.
const REQUIRED_FUNCTIONS: &[(&str, [u8; 4])] = &[
    ("owner", IShopAgileWeb3::ownerCall::SELECTOR),
    ("baseFee", IShopAgileWeb3::baseFeeCall::SELECTOR),
    ("percentFee", IShopAgileWeb3::percentFeeCall::SELECTOR),
    ("isManager", IShopAgileWeb3::isManagerCall::SELECTOR),
    ("getAllItems", IShopAgileWeb3::getAllItemsCall::SELECTOR),
    (
        "getAllPickupLocations",
        IShopAgileWeb3::getAllPickupLocationsCall::SELECTOR,
    ),
    ("getMyOrders", IShopAgileWeb3::getMyOrdersCall::SELECTOR),
    ("placeOrder", IShopAgileWeb3::placeOrderCall::SELECTOR),
    ("collectOrder", IShopAgileWeb3::collectOrderCall::SELECTOR),
    ("assignManager", IShopAgileWeb3::assignManagerCall::SELECTOR),
    ("assignManagers", IShopAgileWeb3::assignManagersCall::SELECTOR),
    ("unassignManager", IShopAgileWeb3::unassignManagerCall::SELECTOR),
    ("withdraw", IShopAgileWeb3::withdrawCall::SELECTOR),
];

/// Record layouts returned by the list getters, as ABI selector types.
///
/// Selectors only cover inputs, so a contract with reordered struct fields
/// would still pass the selector check and then fail to decode.
const REQUIRED_OUTPUTS: &[(&str, &str)] = &[
    ("getAllItems", "(uint256,string,uint256,int256,string)[]"),
    (
        "getAllPickupLocations",
        "(uint256,string,string,string,string,string)[]",
    ),
    (
        "getMyOrders",
        "(uint256,address,uint256,uint256,uint256,uint256,uint8)[]",
    ),
];

impl ContractArtifacts {
    /// Load and validate the artifacts in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` if either file is missing or malformed, or if
    /// the ABI lacks a function the gateway calls.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub async fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let address_path = dir.join(ADDRESS_FILE);
        let artifact_path = dir.join(format!("{CONTRACT_NAME}.json"));

        let address_json = read_file(&address_path).await?;
        let artifact_json = read_file(&artifact_path).await?;

        let addresses: std::collections::HashMap<String, Address> =
            serde_json::from_str(&address_json).map_err(|source| ArtifactError::Json {
                path: address_path.clone(),
                source,
            })?;
        let artifact: HardhatArtifact =
            serde_json::from_str(&artifact_json).map_err(|source| ArtifactError::Json {
                path: artifact_path,
                source,
            })?;

        let address = *addresses
            .get(CONTRACT_NAME)
            .ok_or_else(|| ArtifactError::MissingContract(address_path.display().to_string()))?;

        let artifacts = Self {
            address,
            abi: artifact.abi,
        };
        artifacts.validate()?;

        info!(address = %artifacts.address, "Loaded contract artifacts");
        Ok(artifacts)
    }

    /// Check that every function the gateway calls exists in the ABI and
    /// that the list getters return the record layouts the decoder expects.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::MissingFunction` naming the first missing
    /// function, or `ArtifactError::MismatchedOutputs` for a getter whose
    /// return type differs.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        for (name, selector) in REQUIRED_FUNCTIONS {
            let present = self
                .abi
                .function(name)
                .is_some_and(|overloads| overloads.iter().any(|f| f.selector().0 == *selector));
            if !present {
                return Err(ArtifactError::MissingFunction(*name));
            }
        }

        for (name, expected) in REQUIRED_OUTPUTS {
            let Some(function) = self.abi.function(name).and_then(|overloads| overloads.first())
            else {
                return Err(ArtifactError::MissingFunction(*name));
            };
            let actual = function
                .outputs
                .iter()
                .map(|param| param.selector_type().into_owned())
                .collect::<Vec<_>>()
                .join(",");
            if actual != *expected {
                return Err(ArtifactError::MismatchedOutputs {
                    function: *name,
                    expected: *expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Names of all functions in the ABI, sorted.
    #[must_use]
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.abi.functions().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

async fn read_file(path: &Path) -> Result<String, ArtifactError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })
}
