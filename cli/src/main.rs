// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # keylink
//!
//! Entry point for the `keylink` binary. Parses arguments, initializes
//! logging, and drives the linking flow against a software wallet.
//!
//! - `seed-did`  : print the seed-derived application DID
//! - `link`      : connect, sign, link, provision, disconnect
//! - `provision` : provision a document for an existing controller
//! - `version`   : print build version information
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod cli;
mod logging;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;

use keylink_protocol::config::{KeylinkConfig, SolanaNetwork};
use keylink_protocol::crypto::keys::Ed25519Keypair;
use keylink_protocol::document::{
    random_family, DeterministicDocumentDescriptor, DocumentProvisioner, DocumentStore,
    HttpDocumentStore, SledDocumentStore,
};
use keylink_protocol::identity::{FixedSeed, SeedIdentityAuthenticator};
use keylink_protocol::wallet::{
    LinkProof, LocalWallet, MessageSigningBridge, WalletAuthProvider, WalletHandle,
    WalletSessionManager,
};

use cli::{Commands, KeylinkCli, StoreArgs};
use logging::DEFAULT_LOG_FILTER;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = KeylinkCli::parse();
    logging::init_logging(DEFAULT_LOG_FILTER, cli.log_format);

    match cli.command {
        Commands::SeedDid(args) => seed_did(args).await,
        Commands::Link(args) => link(args).await,
        Commands::Provision(args) => provision(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Output of `keylink link`.
#[derive(Debug, Serialize)]
struct LinkSummary {
    network: String,
    chain_id: String,
    ledger_rpc_url: String,
    account: String,
    controller: String,
    seed_did: String,
    message: String,
    signature: String,
    link_proof: LinkProof,
    family: String,
    document: DeterministicDocumentDescriptor,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Runtime configuration for `network`, with `--store-url` applied.
fn build_config(network: SolanaNetwork, store: &StoreArgs) -> KeylinkConfig {
    let mut config = KeylinkConfig {
        network,
        ..KeylinkConfig::default()
    };
    if let Some(url) = &store.store_url {
        config.document_store_url = url.clone();
    }
    config
}

/// Open the document store selected by the flags.
fn open_store(args: &StoreArgs, config: &KeylinkConfig) -> Result<Arc<dyn DocumentStore>> {
    if args.remote || args.store_url.is_some() {
        let url = &config.document_store_url;
        tracing::info!(url = %url, "using remote document store");
        return Ok(Arc::new(HttpDocumentStore::new(url)));
    }

    let path = args.data_dir.join("documents");
    std::fs::create_dir_all(&path)
        .with_context(|| format!("failed to create data directory: {}", path.display()))?;
    let store = SledDocumentStore::open(&path)
        .with_context(|| format!("failed to open document store at {}", path.display()))?;
    tracing::info!(path = %path.display(), "using local document store");
    Ok(Arc::new(store))
}

async fn seed_did(args: cli::SeedDidArgs) -> Result<()> {
    let seed = match args.seed_hex.as_deref() {
        Some(hex_seed) => FixedSeed::from_hex(hex_seed)
            .ok_or_else(|| anyhow!("--seed-hex must be 64 hex characters"))?,
        None => FixedSeed::deployment(),
    };

    let identity = SeedIdentityAuthenticator::default()
        .authenticate(&seed)
        .await
        .context("seed identity authentication failed")?;

    print_json(&serde_json::json!({ "did": identity.derived_identifier() }))
}

async fn link(args: cli::LinkArgs) -> Result<()> {
    let config = build_config(args.network, &args.store);

    let keypair = match args.wallet_key.as_deref() {
        Some(key) => Ed25519Keypair::from_hex(key).context("invalid --wallet-key")?,
        None => Ed25519Keypair::generate(),
    };
    let wallet = Arc::new(LocalWallet::new(keypair));
    let mut session = WalletSessionManager::new(WalletHandle::Present(wallet));

    // --- Wallet session ---
    session.connect().await.context("wallet connection failed")?;

    // --- Signing ---
    let signed = MessageSigningBridge::new(&session)
        .sign(&args.message)
        .await
        .context("message signing failed")?;

    // --- Wallet-rooted credential ---
    let credential = WalletAuthProvider::new(&session, config.network)
        .build_credential()
        .context("could not build wallet credential")?;

    // --- Application identity ---
    let identity = SeedIdentityAuthenticator::default()
        .authenticate(&FixedSeed::deployment())
        .await
        .context("seed identity authentication failed")?;

    let link_proof = credential
        .create_link(identity.derived_identifier())
        .await
        .context("link signing failed")?;

    // --- Document ---
    let family = args.family.unwrap_or_else(random_family);
    let provisioner = DocumentProvisioner::new(open_store(&args.store, &config)?);
    let document = provisioner
        .provision_for_session(&session, config.network, &family)
        .await
        .context("document provisioning failed")?;

    session.disconnect().await.context("wallet disconnect failed")?;

    tracing::info!(
        account = %credential.account_id(),
        document = %document.document_id,
        family = %family,
        "link complete"
    );

    print_json(&LinkSummary {
        network: config.network.to_string(),
        chain_id: config.network.chain_id(),
        ledger_rpc_url: config.ledger_rpc_url,
        account: credential.account_id().to_string(),
        controller: credential.controller().to_string(),
        seed_did: identity.derived_identifier().to_string(),
        message: args.message,
        signature: signed.signature().to_hex(),
        link_proof,
        family,
        document,
    })
}

async fn provision(args: cli::ProvisionArgs) -> Result<()> {
    let config = build_config(SolanaNetwork::default(), &args.store);
    let provisioner = DocumentProvisioner::new(open_store(&args.store, &config)?);
    let document = provisioner
        .provision(&args.controller, &args.family)
        .await
        .context("document provisioning failed")?;
    print_json(&document)
}

fn print_version() {
    println!("keylink {}", env!("CARGO_PKG_VERSION"));
    println!("rustc   {}", option_env!("RUSTC_VERSION").unwrap_or("unknown"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use keylink_protocol::config::DEFAULT_DOCUMENT_STORE_URL;
    use std::path::PathBuf;

    fn store_args(remote: bool, store_url: Option<&str>, data_dir: PathBuf) -> StoreArgs {
        StoreArgs {
            remote,
            store_url: store_url.map(str::to_string),
            data_dir,
        }
    }

    #[tokio::test]
    async fn local_store_is_created_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = store_args(false, None, dir.path().join("nested"));
        let config = build_config(SolanaNetwork::Mainnet, &args);
        let store = open_store(&args, &config).unwrap();
        assert_eq!(store.name(), "sled");
        assert!(dir.path().join("nested").join("documents").is_dir());
    }

    #[test]
    fn remote_flag_uses_configured_node() {
        let args = store_args(true, None, PathBuf::from("unused"));
        let config = build_config(SolanaNetwork::Mainnet, &args);
        assert_eq!(config.document_store_url, DEFAULT_DOCUMENT_STORE_URL);
        assert_eq!(open_store(&args, &config).unwrap().name(), "http");
    }

    #[test]
    fn store_url_overrides_configured_node() {
        let args = store_args(false, Some("http://node.example:7007"), PathBuf::from("unused"));
        let config = build_config(SolanaNetwork::Devnet, &args);
        assert_eq!(config.document_store_url, "http://node.example:7007");
        assert_eq!(config.network, SolanaNetwork::Devnet);
        assert_eq!(open_store(&args, &config).unwrap().name(), "http");
    }
}
