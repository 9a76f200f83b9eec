//! Encrypted-at-rest container for the operator's private key.
//!
//! The keystore is a small JSON file: an Argon2id salt plus an AES-256-GCM
//! blob (12-byte nonce prepended to ciphertext and tag). It is unlocked once
//! at process startup with an operator-supplied passphrase; a wrong
//! passphrase is fatal. The decrypted scalar is handed out in a zeroizing
//! buffer and the derived AES key never outlives the call.

pub mod error;

use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::{Zeroize, Zeroizing};

pub use error::KeystoreError;

/// Current keystore file version.
pub const KEYSTORE_VERSION: u32 = 1;

/// AES-256-GCM nonce size in bytes.
const NONCE_SIZE: usize = 12;

/// Argon2id salt size in bytes.
const SALT_SIZE: usize = 16;

/// On-disk keystore document.
///
/// `address` records which account the blob belongs to; it is informational
/// only and plays no part in decryption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    pub address: String,
    pub kdf: KdfSection,
    pub cipher: CipherSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfSection {
    /// Hex-encoded 16-byte Argon2id salt.
    pub salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherSection {
    /// Hex-encoded `nonce (12 bytes) || ciphertext + tag`.
    pub blob: String,
}

impl KeystoreFile {
    /// Encrypts a 32-byte private scalar under a passphrase.
    pub fn seal(
        key: &[u8; 32],
        passphrase: &str,
        address: String,
    ) -> Result<Self, KeystoreError> {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);

        let mut aes_key = derive_key(passphrase.as_bytes(), &salt)?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&aes_key));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, key.as_slice())
            .map_err(|e| KeystoreError::Malformed(format!("encryption failed: {e}")));
        aes_key.zeroize();

        let ciphertext = ciphertext?;
        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok(Self {
            version: KEYSTORE_VERSION,
            address,
            kdf: KdfSection {
                salt: hex::encode(salt),
            },
            cipher: CipherSection {
                blob: hex::encode(blob),
            },
        })
    }

    /// Decrypts the private scalar with the given passphrase.
    ///
    /// Returns the 32 key bytes in a buffer that zeroes itself on drop.
    pub fn unlock(&self, passphrase: &str) -> Result<Zeroizing<[u8; 32]>, KeystoreError> {
        if self.version != KEYSTORE_VERSION {
            return Err(KeystoreError::Malformed(format!(
                "unsupported version {}",
                self.version
            )));
        }

        let salt: [u8; SALT_SIZE] = hex::decode(&self.kdf.salt)
            .map_err(|e| KeystoreError::Malformed(format!("salt is not hex: {e}")))?
            .as_slice()
            .try_into()
            .map_err(|_| KeystoreError::Malformed("salt must be 16 bytes".into()))?;

        let blob = hex::decode(&self.cipher.blob)
            .map_err(|e| KeystoreError::Malformed(format!("blob is not hex: {e}")))?;
        if blob.len() < NONCE_SIZE {
            return Err(KeystoreError::Malformed(format!(
                "blob too short: {} bytes",
                blob.len()
            )));
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);

        let mut aes_key = derive_key(passphrase.as_bytes(), &salt)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&aes_key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| KeystoreError::DecryptFailed(e.to_string()));
        aes_key.zeroize();

        let mut plaintext = plaintext?;
        if plaintext.len() != 32 {
            let len = plaintext.len();
            plaintext.zeroize();
            return Err(KeystoreError::Malformed(format!(
                "expected a 32-byte key, got {len} bytes"
            )));
        }

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&plaintext);
        plaintext.zeroize();
        Ok(key)
    }

    /// Parses a keystore document from JSON.
    pub fn from_json(json: &str) -> Result<Self, KeystoreError> {
        serde_json::from_str(json)
            .map_err(|e| KeystoreError::Malformed(format!("invalid JSON: {e}")))
    }

    /// Serializes the keystore document to pretty JSON.
    pub fn to_json(&self) -> Result<String, KeystoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KeystoreError::Malformed(format!("serialization failed: {e}")))
    }

    /// Reads and parses a keystore file from disk.
    pub fn load(path: &Path) -> Result<Self, KeystoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Writes the keystore document to disk.
    pub fn save(&self, path: &Path) -> Result<(), KeystoreError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Argon2id, 64 MiB, 3 iterations, 4 lanes, 32-byte output.
fn derive_key(passphrase: &[u8], salt: &[u8; SALT_SIZE]) -> Result<[u8; 32], KeystoreError> {
    let params = Params::new(65536, 3, 4, Some(32))
        .map_err(|e| KeystoreError::KdfFailed(format!("invalid argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase, salt, &mut output)
        .map_err(|e| KeystoreError::KdfFailed(format!("argon2 hash failed: {e}")))?;
    Ok(output)
}
