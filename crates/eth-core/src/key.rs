use alloy_primitives::Address;
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

use crate::address::address_from_pubkey;
use crate::error::EthError;

/// A secp256k1 signing key paired with its derived address.
///
/// The address is computed from the key at construction time and cannot be
/// set independently, so the two never disagree. Key material lives only as
/// long as the value itself; no persistence, no logging.
#[derive(Clone)]
pub struct KeyMaterial {
    signing: SigningKey,
    address: Address,
}

impl KeyMaterial {
    /// Builds key material from a raw 32-byte scalar.
    ///
    /// Rejects zero and out-of-range scalars (k256 enforces the curve order).
    pub fn from_bytes(raw: &[u8; 32]) -> Result<Self, EthError> {
        let mut buf = *raw;
        let signing = SigningKey::from_bytes((&buf).into())
            .map_err(|e| EthError::InvalidKey(e.to_string()));
        buf.zeroize();

        let signing = signing?;
        let address = address_from_pubkey(signing.verifying_key());
        Ok(Self { signing, address })
    }

    /// Builds key material from a hex-encoded private scalar.
    ///
    /// A `0x` prefix is tolerated; exactly 64 hex digits are required.
    pub fn from_hex(raw: &str) -> Result<Self, EthError> {
        let hex_part = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);

        if hex_part.len() != 64 {
            return Err(EthError::InvalidKey(format!(
                "expected 64 hex characters, got {}",
                hex_part.len()
            )));
        }

        let mut bytes = hex::decode(hex_part)
            .map_err(|e| EthError::InvalidKey(format!("invalid hex: {e}")))?;

        let mut raw32 = [0u8; 32];
        raw32.copy_from_slice(&bytes);
        bytes.zeroize();

        let result = Self::from_bytes(&raw32);
        raw32.zeroize();
        result
    }

    /// Resolves the key to sign with for one request.
    ///
    /// A present, non-empty `raw_key_hex` wins; otherwise the configured
    /// operator key is used. An empty string counts as absent, matching the
    /// request surface where a blank header means "use the operator key".
    pub fn resolve(
        raw_key_hex: Option<&str>,
        fallback: &KeyMaterial,
    ) -> Result<KeyMaterial, EthError> {
        match raw_key_hex {
            Some(raw) if !raw.is_empty() => Self::from_hex(raw),
            _ => Ok(fallback.clone()),
        }
    }

    /// The address derived from this key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The underlying secp256k1 signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }
}

// Never expose the scalar through Debug output.
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
