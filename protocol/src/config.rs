//! # Protocol Configuration & Constants
//!
//! Every fixed input that feeds an identifier lives here. Chain references
//! end up inside `did:pkh` controllers, the deployment seed ends up inside
//! the application `did:key`, and the multicodec tags end up inside document
//! addresses. Changing any of them silently re-addresses everything that
//! was derived from them, so treat edits here as breaking changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Chain Identifiers
// ---------------------------------------------------------------------------

/// CAIP-2 namespace for Solana chains.
pub const SOLANA_NAMESPACE: &str = "solana";

/// CAIP-2 reference for Solana mainnet-beta (truncated genesis hash).
pub const SOLANA_MAINNET_CHAIN_REF: &str = "4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ";

/// CAIP-2 reference for Solana devnet.
pub const SOLANA_DEVNET_CHAIN_REF: &str = "8E9rvCKLFQia2Y35HXjjpWzj8weVo44K";

/// CAIP-2 reference for Solana testnet.
pub const SOLANA_TESTNET_CHAIN_REF: &str = "4uhcVJyU9pJkvQyS88uRDiswHXSCkY3z";

// ---------------------------------------------------------------------------
// Deployment Seed
// ---------------------------------------------------------------------------

/// The application identity seed baked into this deployment.
///
/// The `did:key` derived from it is what consumers pin. Replacing these bytes
/// produces a different identity with no migration path.
pub const DEPLOYMENT_SEED: [u8; 32] = [
    69, 90, 79, 1, 19, 168, 234, 177, 16, 163, 37, 8, 233, 244, 36, 102, 130, 190, 102, 10, 239,
    51, 191, 199, 40, 13, 2, 63, 94, 119, 183, 225,
];

/// Seed length in bytes. Ed25519 secret keys are 32 bytes.
pub const SEED_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Default document-store node (a local node on its standard port).
pub const DEFAULT_DOCUMENT_STORE_URL: &str = "http://localhost:7007";

/// Default Solana JSON-RPC endpoint. Only used for display; the core never
/// talks to the ledger.
pub const DEFAULT_LEDGER_RPC_URL: &str = "https://solana-api.projectserum.com";

/// Path of the stream-creation endpoint on a document-store node.
pub const DOCUMENT_STORE_STREAMS_PATH: &str = "/api/v0/streams";

// ---------------------------------------------------------------------------
// Encoding Parameters
// ---------------------------------------------------------------------------

/// Multicodec prefix for an Ed25519 public key (`ed25519-pub`, varint 0xed).
pub const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Multibase prefix for base58btc.
pub const MULTIBASE_BASE58BTC: char = 'z';

/// Leading tag byte of every document id (varint `0xce 0x01`).
pub const DOCUMENT_ID_CODEC: [u8; 2] = [0xce, 0x01];

/// Stream type tag for tile documents.
pub const TILE_STREAM_TYPE: u8 = 0x00;

/// Length of generated family tags (lowercase base-36 characters).
pub const FAMILY_TAG_LENGTH: usize = 3;

/// Prefix of the account-link message signed by the wallet.
pub const LINK_MESSAGE_PREFIX: &str = "Link this account to your identity.";

/// Version of the link proof format.
pub const LINK_PROOF_VERSION: u8 = 2;

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// The Solana cluster a wallet-rooted identity is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolanaNetwork {
    #[default]
    Mainnet,
    Devnet,
    Testnet,
}

impl SolanaNetwork {
    /// The CAIP-2 chain reference used verbatim in controllers and
    /// credentials.
    pub fn chain_reference(&self) -> &'static str {
        match self {
            SolanaNetwork::Mainnet => SOLANA_MAINNET_CHAIN_REF,
            SolanaNetwork::Devnet => SOLANA_DEVNET_CHAIN_REF,
            SolanaNetwork::Testnet => SOLANA_TESTNET_CHAIN_REF,
        }
    }

    /// Full CAIP-2 chain id, e.g. `solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ`.
    pub fn chain_id(&self) -> String {
        format!("{}:{}", SOLANA_NAMESPACE, self.chain_reference())
    }
}

impl fmt::Display for SolanaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolanaNetwork::Mainnet => "mainnet",
            SolanaNetwork::Devnet => "devnet",
            SolanaNetwork::Testnet => "testnet",
        };
        f.write_str(name)
    }
}

impl FromStr for SolanaNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(SolanaNetwork::Mainnet),
            "devnet" => Ok(SolanaNetwork::Devnet),
            "testnet" => Ok(SolanaNetwork::Testnet),
            other => Err(format!("unknown solana network: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Runtime settings for a client of the protocol. Everything here has a
/// sensible default; the CLI overrides fields from flags and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeylinkConfig {
    /// Cluster the wallet identity is scoped to.
    pub network: SolanaNetwork,
    /// Base URL of the document-store node.
    pub document_store_url: String,
    /// Ledger RPC endpoint.
    pub ledger_rpc_url: String,
}

impl Default for KeylinkConfig {
    fn default() -> Self {
        Self {
            network: SolanaNetwork::Mainnet,
            document_store_url: DEFAULT_DOCUMENT_STORE_URL.to_string(),
            ledger_rpc_url: DEFAULT_LEDGER_RPC_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_references_are_distinct() {
        assert_ne!(SOLANA_MAINNET_CHAIN_REF, SOLANA_DEVNET_CHAIN_REF);
        assert_ne!(SOLANA_MAINNET_CHAIN_REF, SOLANA_TESTNET_CHAIN_REF);
        assert_ne!(SOLANA_DEVNET_CHAIN_REF, SOLANA_TESTNET_CHAIN_REF);
    }

    #[test]
    fn chain_references_fit_caip2() {
        for network in [
            SolanaNetwork::Mainnet,
            SolanaNetwork::Devnet,
            SolanaNetwork::Testnet,
        ] {
            let reference = network.chain_reference();
            assert_eq!(reference.len(), 32);
            assert!(reference.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn chain_id_format() {
        assert_eq!(
            SolanaNetwork::Mainnet.chain_id(),
            "solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ"
        );
    }

    #[test]
    fn network_parse_and_display() {
        assert_eq!("devnet".parse::<SolanaNetwork>(), Ok(SolanaNetwork::Devnet));
        assert_eq!(
            "Mainnet-Beta".parse::<SolanaNetwork>(),
            Ok(SolanaNetwork::Mainnet)
        );
        assert!("localnet".parse::<SolanaNetwork>().is_err());
        assert_eq!(SolanaNetwork::Testnet.to_string(), "testnet");
    }

    #[test]
    fn deployment_seed_is_not_trivial() {
        assert_eq!(DEPLOYMENT_SEED.len(), SEED_LENGTH);
        assert!(DEPLOYMENT_SEED.iter().any(|b| *b != 0));
    }

    #[test]
    fn default_config_points_at_local_store() {
        let config = KeylinkConfig::default();
        assert_eq!(config.network, SolanaNetwork::Mainnet);
        assert_eq!(config.document_store_url, "http://localhost:7007");
    }
}
