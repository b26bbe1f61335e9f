//! Error types for the discovery protocol.

use disco_common::crypto::CryptoError;
use disco_common::serializer::ReaderError;
use thiserror::Error;

/// Error type for discovery protocol operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// A value was constructed in violation of one of its invariants.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A received record is structurally malformed.
    #[error("Decode error: {0}")]
    Decode(#[from] ReaderError),

    /// Public key bytes rejected by the key capability.
    #[error("Invalid node key: {0}")]
    InvalidKey(#[from] CryptoError),

    /// Invalid URL format.
    #[error("Invalid enode URL: {0}")]
    InvalidUrl(String),

    /// Hex decoding error.
    #[error("Hex decode error: {0}")]
    HexError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
