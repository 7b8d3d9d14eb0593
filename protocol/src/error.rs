//! Error taxonomy for the linking flow.
//!
//! Every component returns a [`KeylinkError`]. Collaborator-level errors
//! (wallet, resolver, document store) have their own enums and are folded
//! into one of these variants at the component boundary, so callers can
//! classify any failure without knowing which collaborator produced it.
//! Nothing in this crate retries; every variant is terminal for the call
//! that produced it.

use thiserror::Error;

/// Errors that can occur while linking a wallet to an identity.
#[derive(Debug, Error)]
pub enum KeylinkError {
    /// No wallet provider was injected.
    #[error("no wallet provider available")]
    WalletUnavailable,

    /// The wallet (or its user) declined the connection request.
    #[error("wallet connection rejected: {0}")]
    ConnectionRejected(String),

    /// The wallet failed to disconnect. The session is still considered
    /// connected.
    #[error("wallet disconnect failed: {0}")]
    DisconnectFailed(String),

    /// A signature was requested without a connected session.
    #[error("wallet is not connected")]
    NotConnected,

    /// A credential or controller was requested without a connected session.
    #[error("wallet not connected: connect before building a credential")]
    WalletNotConnected,

    /// The wallet declined or failed to sign.
    #[error("signing rejected: {0}")]
    SigningRejected(String),

    /// The controller string is not a well-formed `did:pkh` identifier.
    #[error("invalid controller: {0}")]
    InvalidController(String),

    /// The document family tag is empty.
    #[error("invalid document family: {0}")]
    InvalidFamily(String),

    /// The document store could not be reached or refused the request.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),

    /// The identity resolver did not accept the authentication handshake.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
}

impl KeylinkError {
    /// True for caller-programming errors that are raised before any I/O.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            KeylinkError::NotConnected
                | KeylinkError::WalletNotConnected
                | KeylinkError::InvalidController(_)
                | KeylinkError::InvalidFamily(_)
        )
    }
}

/// Shorthand result type for the linking flow.
pub type Result<T> = std::result::Result<T, KeylinkError>;
