//! JSON-RPC access to the target chain.
//!
//! The [`ChainClient`] trait is the seam the dispatcher works against; the
//! [`HttpChainClient`] talks JSON-RPC 2.0 over HTTP to a node. Every call is
//! bounded by the configured timeout, and a timeout is reported distinctly
//! from a node-side rejection.

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Network facts and broadcast, as the transaction engine needs them.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Next nonce for `address`, counting pending transactions.
    async fn pending_nonce(&self, address: Address) -> ClientResult<u64>;

    /// The node's suggested gas price in wei.
    async fn suggested_gas_price(&self) -> ClientResult<U256>;

    /// The chain id transactions must commit to. Fetched per operation,
    /// never cached, so it always reflects the current target network.
    async fn chain_id(&self) -> ClientResult<u64>;

    /// Submits a signed transaction; returns the node-reported hash.
    async fn broadcast(&self, raw_tx: &[u8]) -> ClientResult<B256>;

    /// Executes a read-only contract call at the latest block.
    async fn call(&self, to: Address, data: Bytes) -> ClientResult<Bytes>;
}

/// HTTP JSON-RPC implementation of [`ChainClient`].
pub struct HttpChainClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    timeout_secs: u64,
}

impl HttpChainClient {
    /// Creates a client for the node at `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Rpc(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
            timeout_secs,
        })
    }

    async fn rpc(&self, method: &str, params: Value) -> ClientResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        tracing::debug!(method, id, "rpc request");

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(self.timeout_secs)
                } else {
                    ClientError::Rpc(format!("{method} request failed: {e}"))
                }
            })?;

        let status = response.status();
        let value: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::InvalidResponse(format!("{method}: body is not JSON: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(ClientError::Rpc(format!("{method}: HTTP {status}: {value}")));
        }
        if let Some(err) = value.get("error") {
            return Err(ClientError::Rpc(format!("{method}: {err}")));
        }

        value
            .get("result")
            .cloned()
            .ok_or_else(|| ClientError::InvalidResponse(format!("{method}: missing result")))
    }

    async fn rpc_quantity(&self, method: &str, params: Value) -> ClientResult<U256> {
        let result = self.rpc(method, params).await?;
        let text = result.as_str().ok_or_else(|| {
            ClientError::InvalidResponse(format!("{method}: result is not a string"))
        })?;
        parse_quantity(text)
            .ok_or_else(|| ClientError::InvalidResponse(format!("{method}: bad quantity {text}")))
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn pending_nonce(&self, address: Address) -> ClientResult<u64> {
        let quantity = self
            .rpc_quantity(
                "eth_getTransactionCount",
                json!([format!("{address:#x}"), "pending"]),
            )
            .await?;
        quantity
            .try_into()
            .map_err(|_| ClientError::InvalidResponse("nonce exceeds u64".into()))
    }

    async fn suggested_gas_price(&self) -> ClientResult<U256> {
        self.rpc_quantity("eth_gasPrice", json!([])).await
    }

    async fn chain_id(&self) -> ClientResult<u64> {
        let quantity = self.rpc_quantity("eth_chainId", json!([])).await?;
        quantity
            .try_into()
            .map_err(|_| ClientError::InvalidResponse("chain id exceeds u64".into()))
    }

    async fn broadcast(&self, raw_tx: &[u8]) -> ClientResult<B256> {
        let result = self
            .rpc(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(raw_tx))]),
            )
            .await?;

        let text = result.as_str().ok_or_else(|| {
            ClientError::InvalidResponse("eth_sendRawTransaction: result is not a string".into())
        })?;
        parse_hash(text).ok_or_else(|| {
            ClientError::InvalidResponse(format!("eth_sendRawTransaction: bad hash {text}"))
        })
    }

    async fn call(&self, to: Address, data: Bytes) -> ClientResult<Bytes> {
        let result = self
            .rpc(
                "eth_call",
                json!([
                    {
                        "to": format!("{to:#x}"),
                        "data": format!("0x{}", hex::encode(&data)),
                    },
                    "latest",
                ]),
            )
            .await?;

        let text = result
            .as_str()
            .ok_or_else(|| ClientError::InvalidResponse("eth_call: result is not a string".into()))?;
        let stripped = text.strip_prefix("0x").ok_or_else(|| {
            ClientError::InvalidResponse(format!("eth_call: missing 0x prefix in {text}"))
        })?;
        let bytes = hex::decode(stripped)
            .map_err(|e| ClientError::InvalidResponse(format!("eth_call: bad hex: {e}")))?;
        Ok(Bytes::from(bytes))
    }
}

impl std::fmt::Debug for HttpChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChainClient")
            .field("url", &self.url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Parses a 0x-prefixed hex quantity (`0x0`, `0x1a4`, ...).
fn parse_quantity(text: &str) -> Option<U256> {
    let stripped = text.strip_prefix("0x")?;
    if stripped.is_empty() {
        return None;
    }
    U256::from_str_radix(stripped, 16).ok()
}

/// Parses a 0x-prefixed 32-byte hash.
fn parse_hash(text: &str) -> Option<B256> {
    let stripped = text.strip_prefix("0x")?;
    if stripped.len() != 64 {
        return None;
    }
    let bytes = hex::decode(stripped).ok()?;
    Some(B256::from_slice(&bytes))
}
