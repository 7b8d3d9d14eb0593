//! # CLI Interface
//!
//! `clap` derive definitions for the `keylink` binary: `seed-did`, `link`,
//! `provision` and `version`.

use clap::{Args, Parser, Subcommand};
use keylink_protocol::config::{SolanaNetwork, LINK_MESSAGE_PREFIX};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Link a wallet to a decentralized identity and provision its document.
#[derive(Parser, Debug)]
#[command(
    name = "keylink",
    about = "Wallet-rooted identity linking",
    version,
    propagate_version = true
)]
pub struct KeylinkCli {
    /// Log format on stderr.
    #[arg(
        long,
        global = true,
        env = "KEYLINK_LOG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value = "pretty"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate the seed-derived application identity and print its DID.
    SeedDid(SeedDidArgs),
    /// Run the whole flow with a software wallet: connect, sign, link,
    /// provision, disconnect.
    Link(LinkArgs),
    /// Provision the document of an existing `did:pkh` controller.
    Provision(ProvisionArgs),
    /// Print version information and exit.
    Version,
}

/// Where documents are created.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Use a remote document-store node instead of the local sled store.
    #[arg(long)]
    pub remote: bool,

    /// Base URL of the remote node. Implies `--remote`; defaults to the
    /// local node at `http://localhost:7007`.
    #[arg(long, env = "KEYLINK_STORE_URL")]
    pub store_url: Option<String>,

    /// Directory of the local sled document store.
    #[arg(long, short = 'd', env = "KEYLINK_DATA_DIR", default_value = ".keylink")]
    pub data_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct SeedDidArgs {
    /// Hex-encoded 32-byte seed. Defaults to the deployment seed.
    #[arg(long)]
    pub seed_hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Solana cluster the wallet identity is scoped to.
    #[arg(long, env = "KEYLINK_NETWORK", default_value = "mainnet")]
    pub network: SolanaNetwork,

    /// Hex-encoded Ed25519 secret key of the software wallet. A fresh key is
    /// generated when omitted.
    #[arg(long, env = "KEYLINK_WALLET_KEY")]
    pub wallet_key: Option<String>,

    /// Message to sign after connecting.
    #[arg(long, default_value = LINK_MESSAGE_PREFIX)]
    pub message: String,

    /// Document family tag. A random one is generated (and printed) when
    /// omitted; pass it back on later runs to find the same document.
    #[arg(long)]
    pub family: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Controller DID, `did:pkh:<namespace>:<reference>:<address>`.
    #[arg(long)]
    pub controller: String,

    /// Document family tag.
    #[arg(long)]
    pub family: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        KeylinkCli::command().debug_assert();
    }

    #[test]
    fn link_defaults() {
        let cli = KeylinkCli::try_parse_from(["keylink", "link"]).unwrap();
        let Commands::Link(args) = cli.command else {
            panic!("expected link");
        };
        assert_eq!(args.network, SolanaNetwork::Mainnet);
        assert_eq!(args.message, LINK_MESSAGE_PREFIX);
        assert!(args.family.is_none());
        assert!(!args.store.remote);
        assert!(args.store.store_url.is_none());
    }

    #[test]
    fn remote_flag_needs_no_url() {
        let cli = KeylinkCli::try_parse_from(["keylink", "link", "--remote"]).unwrap();
        let Commands::Link(args) = cli.command else {
            panic!("expected link");
        };
        assert!(args.store.remote);
        assert!(args.store.store_url.is_none());
    }

    #[test]
    fn provision_requires_controller_and_family() {
        assert!(KeylinkCli::try_parse_from(["keylink", "provision"]).is_err());
        let cli = KeylinkCli::try_parse_from([
            "keylink",
            "provision",
            "--controller",
            "did:pkh:solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ:11111111111111111111111111111111",
            "--family",
            "abc",
            "--store-url",
            "http://localhost:7007",
        ])
        .unwrap();
        let Commands::Provision(args) = cli.command else {
            panic!("expected provision");
        };
        assert_eq!(args.family, "abc");
        assert_eq!(args.store.store_url.as_deref(), Some("http://localhost:7007"));
    }

    #[test]
    fn log_format_is_global() {
        let cli =
            KeylinkCli::try_parse_from(["keylink", "seed-did", "--log-format", "JSON"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(KeylinkCli::try_parse_from(["keylink", "version", "--log-format", "yaml"]).is_err());
    }

    #[test]
    fn network_flag_parses() {
        let cli = KeylinkCli::try_parse_from(["keylink", "link", "--network", "devnet"]).unwrap();
        let Commands::Link(args) = cli.command else {
            panic!("expected link");
        };
        assert_eq!(args.network, SolanaNetwork::Devnet);
    }
}
