//! Minimal ABI encoding for EVM function calls.
//!
//! Just enough to build ERC-20 calldata and decode the return values of the
//! view functions this service reads; no full ABI parser.

use alloy_primitives::{Address, U256};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Computes the 4-byte function selector of a canonical signature string.
///
/// Keccak-256 over the exact ASCII bytes, first four bytes of the digest.
/// Pure and deterministic; e.g. `transfer(address,uint256)` -> `0xa9059cbb`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[..4]);
    sel
}

/// Left-pads big-endian bytes with zeros to a full 32-byte ABI word.
pub fn pad_left(value: &[u8]) -> Result<[u8; 32], EthError> {
    if value.len() > 32 {
        return Err(EthError::ValueTooLarge(value.len()));
    }

    let mut word = [0u8; 32];
    word[32 - value.len()..].copy_from_slice(value);
    Ok(word)
}

/// A single static call parameter.
#[derive(Debug, Clone)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer, big-endian.
    Uint256(U256),
}

impl AbiParam {
    fn to_word(&self) -> Result<[u8; 32], EthError> {
        match self {
            AbiParam::Address(addr) => pad_left(addr.as_slice()),
            AbiParam::Uint256(value) => Ok(value.to_be_bytes::<32>()),
        }
    }
}

/// Encodes a call as `selector || word(params[0]) || word(params[1]) || ...`.
pub fn encode_call(selector: [u8; 4], params: &[AbiParam]) -> Result<Vec<u8>, EthError> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);
    for param in params {
        data.extend_from_slice(&param.to_word()?);
    }
    Ok(data)
}

/// Decodes a single uint256 return value.
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    if data.len() < 32 {
        return Err(EthError::MalformedEncoding(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        )));
    }
    Ok(U256::from_be_slice(&data[..32]))
}

/// Decodes a single dynamic `string` return value.
///
/// Layout: a 32-byte offset to the string head, a 32-byte length, then the
/// UTF-8 bytes right-padded to a word boundary.
pub fn decode_string(data: &[u8]) -> Result<String, EthError> {
    let offset = word_as_usize(data, 0, "string offset")?;
    let len = word_as_usize(data, offset, "string length")?;

    let start = offset + 32;
    let end = start
        .checked_add(len)
        .ok_or_else(|| EthError::MalformedEncoding("string length overflow".into()))?;
    if end > data.len() {
        return Err(EthError::MalformedEncoding(format!(
            "string of {len} bytes exceeds return data of {} bytes",
            data.len()
        )));
    }

    String::from_utf8(data[start..end].to_vec())
        .map_err(|e| EthError::MalformedEncoding(format!("string is not UTF-8: {e}")))
}

/// Reads one 32-byte word at `pos` as a usize-sized quantity.
fn word_as_usize(data: &[u8], pos: usize, what: &str) -> Result<usize, EthError> {
    let end = pos
        .checked_add(32)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            EthError::MalformedEncoding(format!("truncated return data reading {what}"))
        })?;

    let word = U256::from_be_slice(&data[pos..end]);
    if word > U256::from(usize::MAX) {
        return Err(EthError::MalformedEncoding(format!("{what} out of range")));
    }
    Ok(word.to::<usize>())
}
