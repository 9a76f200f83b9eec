use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::{Zeroize, Zeroizing};

use chain_client::HttpChainClient;
use eth_core::address::checksum_address;
use eth_core::KeyMaterial;
use keystore::KeystoreFile;

use gateway::config::Config;
use gateway::dispatcher::Dispatcher;
use gateway::handlers::AppState;
use gateway::routes;

/// Environment variable checked for the keystore passphrase before falling
/// back to an interactive prompt.
const PASSPHRASE_ENV_VAR: &str = "GATEWAY_KEYSTORE_PASSPHRASE";

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "HTTP gateway for ERC-20 token and native-coin transfers")]
#[command(version)]
struct Cli {
    /// TOML file to use for configuration
    #[arg(long, default_value = "config/gateway.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Seal a hex-encoded private key into a new keystore file
    InitKeystore {
        /// The private key as 64 hex characters (0x prefix optional)
        #[arg(long)]
        key: String,
        /// Where to write the keystore JSON
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::InitKeystore { key, out }) = cli.command {
        return init_keystore(&key, &out);
    }

    let config = Config::load(&cli.config)?;
    init_tracing(&config.log.level);

    tracing::info!(
        bind = %config.server.bind,
        rpc_url = %config.chain.rpc_url,
        token = %config.chain.token_address,
        "configuration loaded"
    );

    // Unlock the operator key once; a wrong passphrase is fatal here, before
    // the listener ever opens.
    let keystore = KeystoreFile::load(&config.keystore.path)?;
    let passphrase = read_passphrase()?;
    let key_bytes = keystore.unlock(&passphrase)?;
    let operator = KeyMaterial::from_bytes(&key_bytes)?;
    tracing::info!(
        operator = %checksum_address(&operator.address()),
        "keystore unlocked"
    );

    let client = HttpChainClient::new(
        config.chain.rpc_url.clone(),
        config.chain.request_timeout_secs,
    )?;

    let dispatcher = Dispatcher::new(
        Arc::new(client),
        operator,
        config.token_address()?,
        config.transfer_amount()?,
        config.transfer.token_gas_limit,
    );

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
    };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "gateway={level},chain_client={level}"
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn read_passphrase() -> std::io::Result<Zeroizing<String>> {
    if let Ok(passphrase) = std::env::var(PASSPHRASE_ENV_VAR) {
        return Ok(Zeroizing::new(passphrase));
    }

    print!("Keystore passphrase: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let passphrase = Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string());
    Ok(passphrase)
}

/// Validates a raw key, seals it under a passphrase, and writes the keystore
/// JSON. The recorded address is derived from the key itself.
fn init_keystore(key_hex: &str, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let material = KeyMaterial::from_hex(key_hex)?;
    let address = checksum_address(&material.address());

    let passphrase = read_passphrase()?;

    let mut raw = material.signing_key().to_bytes();
    let mut key32 = [0u8; 32];
    key32.copy_from_slice(&raw);
    raw.as_mut_slice().zeroize();

    let sealed = KeystoreFile::seal(&key32, &passphrase, address.clone());
    key32.zeroize();

    sealed?.save(out)?;
    println!("keystore for {address} written to {}", out.display());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
