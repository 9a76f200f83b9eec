use alloy_primitives::Address;
use k256::ecdsa::VerifyingKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Parses and validates a 0x-prefixed recipient address string.
///
/// Requires the `0x` prefix and exactly 40 hex characters. An all-lowercase
/// or all-uppercase address is accepted as-is; a mixed-case address must
/// carry a valid EIP-55 checksum.
pub fn parse_address(address: &str) -> Result<Address, EthError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidRecipient("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidRecipient(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|e| EthError::InvalidRecipient(format!("invalid hex: {e}")))?;

    let mut raw = [0u8; 20];
    raw.copy_from_slice(&bytes);
    let parsed = Address::from(raw);

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());

    if !is_all_lower && !is_all_upper {
        let checksummed = checksum_address(&parsed);
        if checksummed[2..] != *hex_part {
            return Err(EthError::InvalidRecipient(format!(
                "EIP-55 checksum mismatch in {address}"
            )));
        }
    }

    Ok(parsed)
}

/// Renders an address in EIP-55 mixed-case checksum form.
///
/// A hex digit is uppercased when the corresponding nibble of the Keccak-256
/// hash of the lowercase hex address is 8 or higher.
pub fn checksum_address(address: &Address) -> String {
    let hex_lower = hex::encode(address.as_slice());
    let hash = Keccak256::digest(hex_lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");

    for (i, c) in hex_lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Derives the address belonging to a secp256k1 public key.
///
/// Keccak-256 of the 64-byte uncompressed key (without the 0x04 prefix);
/// the last 20 bytes are the address.
pub fn address_from_pubkey(pubkey: &VerifyingKey) -> Address {
    let encoded = pubkey.to_encoded_point(false);
    let hash = Keccak256::digest(&encoded.as_bytes()[1..]);

    let mut raw = [0u8; 20];
    raw.copy_from_slice(&hash[12..]);
    Address::from(raw)
}
