use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

use crate::address::parse_address;
use crate::erc20;
use crate::error::EthError;

/// Protocol-mandated gas for a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Conservative fixed bound for an ERC-20 `transfer` call. Not estimated;
/// deployments tune it through configuration.
pub const DEFAULT_TOKEN_GAS_LIMIT: u64 = 200_000;

/// An unsigned legacy transaction.
///
/// `data` is empty for native-coin transfers and carries the ABI calldata
/// for contract calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// A signed legacy transaction: the nine fields of the canonical
/// `[nonce, gasPrice, gasLimit, to, value, data, v, r, s]` list.
///
/// Created once by the signer and immutable afterwards; `v` folds the chain
/// id per EIP-155.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct SignedTx {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl SignedTx {
    /// The transaction fields without the signature, as they were signed.
    pub fn unsigned(&self) -> UnsignedTx {
        UnsignedTx {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
        }
    }
}

/// Builds an unsigned native-coin transfer.
///
/// Gas is the protocol minimum for a plain transfer; the payload stays empty.
pub fn build_transfer(
    nonce: u64,
    to: &str,
    value: U256,
    gas_price: U256,
) -> Result<UnsignedTx, EthError> {
    let to = parse_address(to)?;

    Ok(UnsignedTx {
        nonce,
        gas_price,
        gas_limit: TRANSFER_GAS_LIMIT,
        to,
        value,
        data: Bytes::new(),
    })
}

/// Builds an unsigned ERC-20 `transfer` call against `token`.
///
/// The native value is zero; the amount travels in the calldata. `gas_limit`
/// is the configured fixed bound for token calls.
pub fn build_token_call(
    nonce: u64,
    token: Address,
    to: &str,
    amount: U256,
    gas_price: U256,
    gas_limit: u64,
) -> Result<UnsignedTx, EthError> {
    let recipient = parse_address(to)?;
    let calldata = erc20::transfer_calldata(recipient, amount)?;

    Ok(UnsignedTx {
        nonce,
        gas_price,
        gas_limit,
        to: token,
        value: U256::ZERO,
        data: Bytes::from(calldata),
    })
}
