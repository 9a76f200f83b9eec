use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use dashmap::DashMap;
use tokio::sync::Mutex;

use chain_client::ChainClient;
use eth_core::transaction::{build_token_call, build_transfer, UnsignedTx};
use eth_core::{codec, erc20, signer, EthError, KeyMaterial};

use crate::error::GatewayError;

/// Orchestrates one transfer end to end: key resolution, network facts,
/// build, sign, the encode/decode integrity check, broadcast.
///
/// Requests from the same sender serialize on a per-address lock held from
/// nonce fetch through broadcast, so concurrent transfers cannot race each
/// other to the same pending nonce. Different senders proceed in parallel.
pub struct Dispatcher {
    client: Arc<dyn ChainClient>,
    operator: KeyMaterial,
    token: Address,
    transfer_amount: U256,
    token_gas_limit: u64,
    sender_locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn ChainClient>,
        operator: KeyMaterial,
        token: Address,
        transfer_amount: U256,
        token_gas_limit: u64,
    ) -> Self {
        Self {
            client,
            operator,
            token,
            transfer_amount,
            token_gas_limit,
            sender_locks: DashMap::new(),
        }
    }

    /// The configured operator address.
    pub fn operator_address(&self) -> Address {
        self.operator.address()
    }

    /// Sends the configured amount of native coin to `to`, signed with the
    /// caller-supplied key if present, the operator key otherwise.
    pub async fn send_coin(
        &self,
        to: &str,
        raw_key: Option<&str>,
    ) -> Result<B256, GatewayError> {
        let key = KeyMaterial::resolve(raw_key, &self.operator)?;
        let amount = self.transfer_amount;
        self.dispatch(key, |nonce, gas_price| {
            build_transfer(nonce, to, amount, gas_price)
        })
        .await
    }

    /// Sends the configured amount of the token to `to` via an ERC-20
    /// `transfer` call against the configured contract.
    pub async fn send_token(
        &self,
        to: &str,
        raw_key: Option<&str>,
    ) -> Result<B256, GatewayError> {
        let key = KeyMaterial::resolve(raw_key, &self.operator)?;
        let token = self.token;
        let amount = self.transfer_amount;
        let gas_limit = self.token_gas_limit;
        self.dispatch(key, move |nonce, gas_price| {
            build_token_call(nonce, token, to, amount, gas_price, gas_limit)
        })
        .await
    }

    /// Looks up the token symbol, first checking that the contract's `name()`
    /// matches what the caller asked about.
    pub async fn token_symbol(&self, token_name: &str) -> Result<String, GatewayError> {
        let ret = self
            .client
            .call(self.token, Bytes::from(erc20::name_calldata()?))
            .await?;
        let name = erc20::decode_string_return(&ret)?;

        if name != token_name {
            return Err(GatewayError::TokenNameMismatch {
                expected: token_name.to_string(),
                actual: name,
            });
        }

        let ret = self
            .client
            .call(self.token, Bytes::from(erc20::symbol_calldata()?))
            .await?;
        Ok(erc20::decode_string_return(&ret)?)
    }

    /// Reads the token balance of `address`.
    pub async fn token_balance(&self, address: &str) -> Result<U256, GatewayError> {
        let owner = eth_core::address::parse_address(address)?;
        let ret = self
            .client
            .call(self.token, Bytes::from(erc20::balance_of_calldata(owner)?))
            .await?;
        Ok(erc20::decode_balance(&ret)?)
    }

    fn sender_lock(&self, sender: Address) -> Arc<Mutex<()>> {
        self.sender_locks.entry(sender).or_default().value().clone()
    }

    /// The common pipeline. All-or-nothing: any failing stage returns before
    /// broadcast, and nothing is retried.
    async fn dispatch<F>(&self, key: KeyMaterial, build: F) -> Result<B256, GatewayError>
    where
        F: FnOnce(u64, U256) -> Result<UnsignedTx, EthError>,
    {
        let sender = key.address();
        let lock = self.sender_lock(sender);
        let _guard = lock.lock().await;

        let nonce = self.client.pending_nonce(sender).await?;
        let gas_price = self.client.suggested_gas_price().await?;
        let chain_id = self.client.chain_id().await?;

        let tx = build(nonce, gas_price)?;
        let signed = signer::sign(&tx, &key, chain_id)?;

        // Wire-format fidelity check: only bytes that decode back to the
        // exact signed transaction are allowed out.
        let encoded = codec::encode(&signed);
        let decoded = codec::decode(&encoded)?;
        if decoded != signed {
            return Err(EthError::MalformedEncoding(
                "encoder and decoder disagree on the signed transaction".into(),
            )
            .into());
        }

        let local_hash = signer::tx_hash(&signed);
        let node_hash = self.client.broadcast(&encoded).await?;
        if node_hash != local_hash {
            tracing::warn!(
                %node_hash,
                %local_hash,
                "node reported a different hash for the broadcast transaction"
            );
        }

        tracing::info!(tx_hash = %local_hash, sender = %sender, nonce, "transaction sent");
        Ok(local_hash)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("operator", &self.operator.address())
            .field("token", &self.token)
            .field("transfer_amount", &self.transfer_amount)
            .field("token_gas_limit", &self.token_gas_limit)
            .finish_non_exhaustive()
    }
}
