//! Transaction construction and signing engine for the transfer gateway.
//!
//! This crate provides:
//! - Address parsing, validation, and derivation from secp256k1 public keys
//!   (with EIP-55 checksums)
//! - Key resolution (caller-supplied hex key or configured operator key)
//! - Minimal ABI encoding for ERC-20 calls (selector + 32-byte words)
//! - Legacy transaction building for native and token transfers
//! - EIP-155 replay-protected signing and sender recovery
//! - Canonical RLP encoding with a strict inverse decoder
//!
//! Everything here is synchronous CPU-bound computation; network access is
//! the `chain-client` crate's job.

pub mod abi;
pub mod address;
pub mod codec;
pub mod erc20;
pub mod error;
pub mod key;
pub mod signer;
pub mod transaction;

pub use error::EthError;
pub use key::KeyMaterial;
pub use transaction::{SignedTx, UnsignedTx};
