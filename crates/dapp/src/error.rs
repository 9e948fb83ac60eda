//! Error taxonomy for wallet, RPC and contract operations.
//!
//! Every error ends only the operation that produced it. The synchronizer
//! turns them into a recorded message instead of tearing the session down,
//! except while a session is still being set up.

use shop_agile_core::NetworkId;
use thiserror::Error;

/// Errors that can occur when talking to the wallet or the contract.
#[derive(Debug, Error)]
pub enum DappError {
    /// No wallet could be reached.
    #[error("Wallet not detected")]
    WalletUnavailable,

    /// The wallet is present but exposes no account.
    #[error("Wallet exposes no accounts")]
    NoAccounts,

    /// The wallet is on a different network than the deployment.
    #[error("Wrong network: expected {required_name} ({required}), wallet is on {actual}")]
    NetworkMismatch {
        /// Network the contract is deployed on.
        required: NetworkId,
        /// Human-readable name of the required network.
        required_name: String,
        /// Network the wallet reported.
        actual: NetworkId,
    },

    /// The contract rejected the call; carries the revert reason verbatim.
    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    /// HTTP request to the node failed.
    #[error("RPC transport error: {0}")]
    RpcTransport(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error that is not a revert.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node.
        message: String,
    },

    /// ABI encoding or decoding failed.
    #[error("ABI error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value read from chain could not be mapped to a domain type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The operation needs a connected wallet session.
    #[error("Not connected to a wallet")]
    NotConnected,

    /// The synchronizer task is no longer running.
    #[error("Synchronizer stopped")]
    SynchronizerStopped,
}

impl DappError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::WalletUnavailable => {
                "Wallet not detected. Please install the Metamask browser extension.".to_string()
            }
            Self::NoAccounts => "Please unlock your wallet and select an account.".to_string(),
            Self::NetworkMismatch { required_name, .. } => {
                format!("Please connect Metamask to {required_name}")
            }
            Self::TransactionReverted(reason) => reason.clone(),
            Self::NotConnected => "Please connect your wallet first.".to_string(),
            Self::RpcTransport(_) | Self::Rpc { .. } | Self::SynchronizerStopped => {
                "Something went wrong, please try again.".to_string()
            }
            Self::Abi(_) | Self::Parse(_) | Self::Decode(_) => {
                "Unexpected response from the shop contract.".to_string()
            }
        }
    }

    /// Returns `true` if the error came from the contract rejecting the call.
    #[must_use]
    pub const fn is_revert(&self) -> bool {
        matches!(self, Self::TransactionReverted(_))
    }

    /// Revert reason, if this is a revert.
    #[must_use]
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::TransactionReverted(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_display() {
        let err = DappError::TransactionReverted("Invalid itemId.".to_string());
        assert_eq!(err.to_string(), "Transaction reverted: Invalid itemId.");
        assert_eq!(err.user_message(), "Invalid itemId.");
        assert_eq!(err.revert_reason(), Some("Invalid itemId."));
        assert!(err.is_revert());
    }

    #[test]
    fn test_network_mismatch_names_network() {
        let err = DappError::NetworkMismatch {
            required: NetworkId::HARDHAT,
            required_name: "Hardhat localhost".to_string(),
            actual: NetworkId::new(1),
        };
        assert_eq!(err.user_message(), "Please connect Metamask to Hardhat localhost");
        assert!(err.to_string().contains("31337"));
    }

    #[test]
    fn test_rpc_error_is_generic_for_users() {
        let err = DappError::Rpc {
            code: -32000,
            message: "header not found".to_string(),
        };
        assert_eq!(err.user_message(), "Something went wrong, please try again.");
        assert!(!err.is_revert());
    }
}
