use thiserror::Error;

/// Keystore errors.
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// Wrong passphrase or tampered ciphertext. Fatal at startup.
    #[error("keystore decrypt failed: {0}")]
    DecryptFailed(String),

    #[error("malformed keystore: {0}")]
    Malformed(String),

    #[error("key derivation failed: {0}")]
    KdfFailed(String),

    #[error("keystore io error: {0}")]
    Io(#[from] std::io::Error),
}
