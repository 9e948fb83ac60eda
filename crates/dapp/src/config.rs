//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOP_RPC_URL` - JSON-RPC endpoint of the node (default: <http://127.0.0.1:8545>)
//! - `SHOP_ARTIFACTS_DIR` - Directory holding `contract-address.json` and
//!   `ShopAgileWeb3.json` (default: frontend/src/contracts)
//! - `SHOP_NETWORK_ID` - Network the contract is deployed on (default: 31337)
//! - `SHOP_NETWORK_NAME` - Name shown when the wallet is on the wrong network
//!   (default: Hardhat localhost)
//! - `SHOP_ACCOUNT_INDEX` - Which node account acts as the wallet (default: 0)
//! - `SHOP_POLL_INTERVAL_MS` - Wallet and receipt polling interval (default: 1000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use shop_agile_core::NetworkId;
use thiserror::Error;
use url::Url;

use crate::wallet::NetworkRequirement;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
const DEFAULT_ARTIFACTS_DIR: &str = "frontend/src/contracts";
const DEFAULT_NETWORK_NAME: &str = "Hardhat localhost";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// dApp client configuration.
///
/// Implements `Debug` manually to redact the node URL, which may carry an
/// API key.
#[derive(Clone)]
pub struct DappConfig {
    /// JSON-RPC endpoint of the node
    pub rpc_url: SecretString,
    /// Directory holding the deployment artifacts
    pub artifacts_dir: PathBuf,
    /// Network the contract is deployed on
    pub network: NetworkRequirement,
    /// Index of the node account used as the wallet
    pub account_index: usize,
    /// Interval for wallet and receipt polling
    pub poll_interval: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for DappConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DappConfig")
            .field("rpc_url", &"[REDACTED]")
            .field("artifacts_dir", &self.artifacts_dir)
            .field("network", &self.network)
            .field("account_index", &self.account_index)
            .field("poll_interval", &self.poll_interval)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl DappConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let rpc_url = env.get_or_default("SHOP_RPC_URL", DEFAULT_RPC_URL);
        validate_rpc_url(&rpc_url, "SHOP_RPC_URL")?;

        let network_id = env
            .get_or_default("SHOP_NETWORK_ID", &NetworkId::HARDHAT.to_string())
            .parse::<NetworkId>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_NETWORK_ID".to_string(), e.to_string()))?;
        let network_name = env.get_or_default("SHOP_NETWORK_NAME", DEFAULT_NETWORK_NAME);

        let account_index = env
            .get_or_default("SHOP_ACCOUNT_INDEX", "0")
            .parse::<usize>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOP_ACCOUNT_INDEX".to_string(), e.to_string())
            })?;

        let poll_ms = env
            .get_or_default("SHOP_POLL_INTERVAL_MS", &DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOP_POLL_INTERVAL_MS".to_string(), e.to_string())
            })?;
        if poll_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_POLL_INTERVAL_MS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            rpc_url: SecretString::from(rpc_url),
            artifacts_dir: PathBuf::from(env.get_or_default("SHOP_ARTIFACTS_DIR", DEFAULT_ARTIFACTS_DIR)),
            network: NetworkRequirement::new(network_id, network_name),
            account_index,
            poll_interval: Duration::from_millis(poll_ms),
            sentry_dsn: env.get_optional("SENTRY_DSN"),
        })
    }

    /// Host of the configured node, safe to log.
    #[must_use]
    pub fn rpc_host(&self) -> Option<String> {
        Url::parse(self.rpc_url.expose_secret())
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; empty values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Validate that the node URL is an absolute http(s) URL.
fn validate_rpc_url(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{other}', expected http or https"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<DappConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DappConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.rpc_url.expose_secret(), DEFAULT_RPC_URL);
        assert_eq!(config.artifacts_dir, PathBuf::from("frontend/src/contracts"));
        assert_eq!(config.network.id, NetworkId::HARDHAT);
        assert_eq!(config.network.name, "Hardhat localhost");
        assert_eq!(config.account_index, 0);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SHOP_RPC_URL", "https://node.example.org/v1/key"),
            ("SHOP_NETWORK_ID", "0x13881"),
            ("SHOP_NETWORK_NAME", "Polygon Mumbai"),
            ("SHOP_ACCOUNT_INDEX", "1"),
            ("SHOP_POLL_INTERVAL_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.network.id, NetworkId::new(80001));
        assert_eq!(config.network.name, "Polygon Mumbai");
        assert_eq!(config.account_index, 1);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.rpc_host().as_deref(), Some("node.example.org"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = load(&[("SHOP_RPC_URL", "ws://127.0.0.1:8545")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SHOP_RPC_URL"));
    }

    #[test]
    fn test_rejects_bad_account_index() {
        let err = load(&[("SHOP_ACCOUNT_INDEX", "first")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SHOP_ACCOUNT_INDEX"));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        assert!(load(&[("SHOP_POLL_INTERVAL_MS", "0")]).is_err());
    }

    #[test]
    fn test_debug_redacts_rpc_url() {
        let config = load(&[("SHOP_RPC_URL", "https://node.example.org/v1/secret-key")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
