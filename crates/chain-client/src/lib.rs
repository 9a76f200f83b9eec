//! ChainClient collaborator: network facts (nonce, gas price, chain id),
//! read-only contract calls, and signed-transaction broadcast over JSON-RPC.

pub mod client;
pub mod error;

pub use client::{ChainClient, HttpChainClient};
pub use error::{ClientError, ClientResult};
