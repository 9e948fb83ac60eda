//! Ethereum JSON-RPC client.
//!
//! A thin `reqwest` transport shared by the wallet provider and the contract
//! gateway. Node errors that carry a revert payload are turned into
//! [`DappError::TransactionReverted`] here, so callers never parse node
//! messages themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::hex;
use alloy_sol_types::{Revert, SolError};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::DappError;

/// Per-request HTTP timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause before retrying a request the node never received.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Parameters for methods that take none.
pub const NO_PARAMS: [u8; 0] = [];

/// Marker the Hardhat node puts in front of a revert reason.
const HARDHAT_REASON_PREFIX: &str = "reverted with reason string '";

/// Marker geth-style nodes put in front of a revert reason.
const EXECUTION_REVERTED_PREFIX: &str = "execution reverted: ";

/// JSON-RPC client for an Ethereum node.
///
/// Cheap to clone; clones share the HTTP connection pool and request id
/// counter.
#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<RpcClientInner>,
}

struct RpcClientInner {
    client: reqwest::Client,
    /// Node URL (may embed an API key)
    url: SecretString,
    next_id: AtomicU64,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    error: Option<RpcErrorObject>,
}

/// Error object of a JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    /// JSON-RPC error code.
    pub code: i64,
    /// Error message.
    pub message: String,
    /// Optional payload; for reverts this holds the ABI-encoded reason.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    /// Extract the contract's revert reason, if this error is a revert.
    ///
    /// Looks at, in order: an ABI-encoded `Error(string)` in `data`, the same
    /// nested under `data.data`, and the reason quoted in the node message.
    #[must_use]
    pub fn revert_reason(&self) -> Option<String> {
        let payload = match &self.data {
            Some(serde_json::Value::String(hex)) => Some(hex.as_str()),
            Some(serde_json::Value::Object(object)) => {
                object.get("data").and_then(serde_json::Value::as_str)
            }
            _ => None,
        };

        payload
            .and_then(decode_revert_payload)
            .or_else(|| reason_from_message(&self.message))
    }
}

impl From<RpcErrorObject> for DappError {
    fn from(error: RpcErrorObject) -> Self {
        match error.revert_reason() {
            Some(reason) => Self::TransactionReverted(reason),
            None => Self::Rpc {
                code: error.code,
                message: error.message,
            },
        }
    }
}

/// Decode a hex `Error(string)` revert payload.
fn decode_revert_payload(payload: &str) -> Option<String> {
    let bytes = hex::decode(payload).ok()?;
    Revert::abi_decode(&bytes).ok().map(|revert| revert.reason)
}

/// Pull the revert reason out of a node error message.
fn reason_from_message(message: &str) -> Option<String> {
    if let Some(start) = message.find(HARDHAT_REASON_PREFIX) {
        let rest = message.get(start + HARDHAT_REASON_PREFIX.len()..)?;
        let end = rest.rfind('\'')?;
        return rest.get(..end).map(str::to_owned);
    }

    message
        .find(EXECUTION_REVERTED_PREFIX)
        .and_then(|start| message.get(start + EXECUTION_REVERTED_PREFIX.len()..))
        .map(|reason| reason.trim().to_owned())
        .filter(|reason| !reason.is_empty())
}

impl RpcClient {
    /// Create a client for the node at `url`.
    ///
    /// # Errors
    ///
    /// Returns `DappError::RpcTransport` if the HTTP client cannot be built.
    pub fn new(url: SecretString) -> Result<Self, DappError> {
        Self::with_timeout(url, REQUEST_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `DappError::RpcTransport` if the HTTP client cannot be built.
    pub fn with_timeout(url: SecretString, timeout: Duration) -> Result<Self, DappError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(RpcClientInner {
                client,
                url,
                next_id: AtomicU64::new(1),
            }),
        })
    }

    /// Call a JSON-RPC method.
    ///
    /// A request that failed to connect is retried once after a short pause.
    /// Node errors and timeouts are returned as they are.
    ///
    /// # Errors
    ///
    /// Returns `DappError::TransactionReverted` if the node reports a revert,
    /// `DappError::Rpc` for other node errors, `DappError::RpcTransport` on
    /// network failures and `DappError::Parse` if the result does not
    /// deserialize into `T`.
    #[instrument(skip_all, fields(method = %method))]
    pub async fn request<P, T>(&self, method: &str, params: P) -> Result<T, DappError>
    where
        P: Serialize + Send + Sync,
        T: DeserializeOwned,
    {
        match self.send(method, &params).await {
            Err(DappError::RpcTransport(e)) if e.is_connect() => {
                warn!(error = %e, "Node unreachable, retrying once");
                tokio::time::sleep(RETRY_DELAY).await;
                self.send(method, &params).await
            }
            result => result,
        }
    }

    async fn send<P, T>(&self, method: &str, params: &P) -> Result<T, DappError>
    where
        P: Serialize + Send + Sync,
        T: DeserializeOwned,
    {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response: RpcResponse = self
            .inner
            .client
            .post(self.inner.url.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(error.into());
        }

        Ok(serde_json::from_value(response.result)?)
    }
}
