use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::Deserialize;
use thiserror::Error;

use eth_core::address::parse_address;
use eth_core::transaction::DEFAULT_TOKEN_GAS_LIMIT;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Gateway configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub chain: ChainConfig,
    pub keystore: KeystoreConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the target node.
    pub rpc_url: String,
    /// Address of the ERC-20 token contract this gateway serves.
    pub token_address: String,
    /// Deadline for each individual RPC call.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeystoreConfig {
    /// Path to the operator keystore JSON file.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    /// Amount moved per transfer request, in wei, as a decimal string.
    #[serde(default = "default_amount_wei")]
    pub amount_wei: String,
    /// Fixed gas bound for token calls. Not estimated; tune per deployment.
    #[serde(default = "default_token_gas_limit")]
    pub token_gas_limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".into()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_amount_wei() -> String {
    "700000000000000000".into()
}

fn default_token_gas_limit() -> u64 {
    DEFAULT_TOKEN_GAS_LIMIT
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            amount_wei: default_amount_wei(),
            token_gas_limit: default_token_gas_limit(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.token_address()?;
        self.transfer_amount()?;
        if self.chain.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "chain.request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The validated token contract address.
    pub fn token_address(&self) -> Result<Address, ConfigError> {
        parse_address(&self.chain.token_address).map_err(|e| {
            ConfigError::Invalid(format!("chain.token_address: {e}"))
        })
    }

    /// The per-request transfer amount in wei.
    pub fn transfer_amount(&self) -> Result<U256, ConfigError> {
        U256::from_str(&self.transfer.amount_wei).map_err(|e| {
            ConfigError::Invalid(format!("transfer.amount_wei: {e}"))
        })
    }
}
