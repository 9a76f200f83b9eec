//! HTTP gateway for token and native-coin transfers.
//!
//! Thin controller layer over the `eth-core` engine: axum routes mirror the
//! service surface (`/v1/token/*`, `/v1/coin/*`), the dispatcher orchestrates
//! key resolution, chain queries, signing, the encode/decode integrity check,
//! and broadcast.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod routes;
