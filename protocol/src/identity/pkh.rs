//! # `did:pkh` Chain-Scoped Controllers
//!
//! A wallet account becomes a DID by prefixing its CAIP-10 account id with
//! `did:pkh:`:
//!
//! ```text
//! did:pkh:<namespace>:<reference>:<address>
//! did:pkh:solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ:<base58 public key>
//! ```
//!
//! These strings are document controllers, so parsing is strict. A malformed
//! controller would address a document nobody can ever write to.
//!
//! Character sets follow CAIP-2 (`namespace`, `reference`) and CAIP-10
//! (`address`). For the `solana` namespace the address must additionally be
//! a base58 Ed25519 public key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{SolanaNetwork, SOLANA_NAMESPACE};
use crate::crypto::keys::PublicKey;

/// DID method name.
pub const PKH_DID_METHOD: &str = "pkh";

/// Errors produced while parsing a controller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("controller is empty")]
    Empty,

    #[error("expected 'did:pkh:<namespace>:<reference>:<address>', got '{0}'")]
    Shape(String),

    #[error("invalid chain namespace '{0}'")]
    Namespace(String),

    #[error("invalid chain reference '{0}'")]
    Reference(String),

    #[error("invalid account address '{0}'")]
    Address(String),
}

fn valid_namespace(s: &str) -> bool {
    (3..=8).contains(&s.len())
        && s.bytes()
            .all(|b| b == b'-' || b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn valid_reference(s: &str) -> bool {
    (1..=32).contains(&s.len())
        && s.bytes()
            .all(|b| b == b'-' || b == b'_' || b.is_ascii_alphanumeric())
}

fn valid_address(s: &str) -> bool {
    (1..=128).contains(&s.len())
        && s.bytes()
            .all(|b| matches!(b, b'-' | b'.' | b'%') || b.is_ascii_alphanumeric())
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A CAIP-10 account id: `<namespace>:<reference>:<address>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId {
    pub namespace: String,
    pub reference: String,
    pub address: String,
}

impl AccountId {
    /// Account id of a Solana public key on `network`.
    pub fn solana(network: SolanaNetwork, public_key: &PublicKey) -> Self {
        Self {
            namespace: SOLANA_NAMESPACE.to_string(),
            reference: network.chain_reference().to_string(),
            address: public_key.to_base58(),
        }
    }

    /// CAIP-2 chain id of the account.
    pub fn chain_id(&self) -> String {
        format!("{}:{}", self.namespace, self.reference)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.reference, self.address)
    }
}

// ---------------------------------------------------------------------------
// ChainScopedController
// ---------------------------------------------------------------------------

/// A `did:pkh` DID naming a wallet account on a specific chain.
///
/// Only two ways in: [`ChainScopedController::solana`] from a bound wallet
/// key, or parsing. Both guarantee a well-formed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainScopedController {
    account: AccountId,
}

impl ChainScopedController {
    pub fn solana(network: SolanaNetwork, public_key: &PublicKey) -> Self {
        Self {
            account: AccountId::solana(network, public_key),
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn namespace(&self) -> &str {
        &self.account.namespace
    }

    pub fn reference(&self) -> &str {
        &self.account.reference
    }

    pub fn address(&self) -> &str {
        &self.account.address
    }

    /// The Solana public key, if this controller lives in the `solana`
    /// namespace.
    pub fn solana_public_key(&self) -> Option<PublicKey> {
        if self.account.namespace != SOLANA_NAMESPACE {
            return None;
        }
        PublicKey::from_base58(&self.account.address).ok()
    }

    pub fn to_did_string(&self) -> String {
        format!("did:{}:{}", PKH_DID_METHOD, self.account)
    }

    /// Parse and validate a `did:pkh` controller.
    pub fn parse(s: &str) -> Result<Self, ControllerError> {
        if s.trim().is_empty() {
            return Err(ControllerError::Empty);
        }
        let parts: Vec<&str> = s.split(':').collect();
        let [did, method, namespace, reference, address] = parts.as_slice() else {
            return Err(ControllerError::Shape(s.to_string()));
        };
        if *did != "did" || *method != PKH_DID_METHOD {
            return Err(ControllerError::Shape(s.to_string()));
        }
        if !valid_namespace(namespace) {
            return Err(ControllerError::Namespace(namespace.to_string()));
        }
        if !valid_reference(reference) {
            return Err(ControllerError::Reference(reference.to_string()));
        }
        if !valid_address(address) {
            return Err(ControllerError::Address(address.to_string()));
        }
        if *namespace == SOLANA_NAMESPACE && PublicKey::from_base58(address).is_err() {
            return Err(ControllerError::Address(address.to_string()));
        }

        Ok(Self {
            account: AccountId {
                namespace: namespace.to_string(),
                reference: reference.to_string(),
                address: address.to_string(),
            },
        })
    }
}

impl fmt::Display for ChainScopedController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_did_string())
    }
}

impl FromStr for ChainScopedController {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChainScopedController {
    type Error = ControllerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChainScopedController> for String {
    fn from(controller: ChainScopedController) -> Self {
        controller.to_did_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SOLANA_MAINNET_CHAIN_REF;
    use crate::crypto::Ed25519Keypair;

    fn wallet_key() -> PublicKey {
        Ed25519Keypair::from_seed(&[11u8; 32]).public_key()
    }

    #[test]
    fn solana_controller_format() {
        let pk = wallet_key();
        let controller = ChainScopedController::solana(SolanaNetwork::Mainnet, &pk);
        assert_eq!(
            controller.to_string(),
            format!("did:pkh:solana:{}:{}", SOLANA_MAINNET_CHAIN_REF, pk.to_base58())
        );
        assert_eq!(controller.solana_public_key(), Some(pk));
        assert_eq!(
            controller.account().chain_id(),
            SolanaNetwork::Mainnet.chain_id()
        );
    }

    #[test]
    fn parse_roundtrip() {
        let controller = ChainScopedController::solana(SolanaNetwork::Devnet, &wallet_key());
        let parsed: ChainScopedController = controller.to_string().parse().unwrap();
        assert_eq!(parsed, controller);
    }

    #[test]
    fn non_solana_namespaces_accepted() {
        let c = ChainScopedController::parse(
            "did:pkh:eip155:1:0xb9c5714089478a327f09197987f16f9e5d936e8a",
        )
        .unwrap();
        assert_eq!(c.namespace(), "eip155");
        assert_eq!(c.reference(), "1");
        assert!(c.solana_public_key().is_none());
    }

    #[test]
    fn empty_rejected() {
        assert_eq!(ChainScopedController::parse(""), Err(ControllerError::Empty));
        assert_eq!(
            ChainScopedController::parse("   "),
            Err(ControllerError::Empty)
        );
    }

    #[test]
    fn wrong_shape_rejected() {
        for bad in [
            "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK",
            "did:pkh:solana:ref",
            "pkh:solana:ref:addr:extra",
            "did:pkh:solana:ref:addr:extra",
        ] {
            assert!(
                matches!(
                    ChainScopedController::parse(bad),
                    Err(ControllerError::Shape(_))
                ),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn bad_components_rejected() {
        let addr = wallet_key().to_base58();
        assert!(matches!(
            ChainScopedController::parse(&format!("did:pkh:SOL:ref:{addr}")),
            Err(ControllerError::Namespace(_))
        ));
        assert!(matches!(
            ChainScopedController::parse(&format!(
                "did:pkh:solana:{}:{addr}",
                "x".repeat(33)
            )),
            Err(ControllerError::Reference(_))
        ));
        assert!(matches!(
            ChainScopedController::parse("did:pkh:solana:ref:not/base58"),
            Err(ControllerError::Address(_))
        ));
        // Well-formed CAIP-10, but not a 32-byte key.
        assert!(matches!(
            ChainScopedController::parse("did:pkh:solana:ref:abc"),
            Err(ControllerError::Address(_))
        ));
    }

    #[test]
    fn serde_as_string() {
        let controller = ChainScopedController::solana(SolanaNetwork::Mainnet, &wallet_key());
        let json = serde_json::to_string(&controller).unwrap();
        assert_eq!(json, format!("\"{}\"", controller));
        let back: ChainScopedController = serde_json::from_str(&json).unwrap();
        assert_eq!(back, controller);
        assert!(serde_json::from_str::<ChainScopedController>("\"did:pkh:x\"").is_err());
    }
}
