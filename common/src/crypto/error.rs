use thiserror::Error;

/// Errors that can occur during cryptographic operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Public key bytes have the wrong length
    #[error("Invalid public key length: {len} bytes, expected: {expected} bytes")]
    InvalidPublicKeyLength { len: usize, expected: usize },

    /// Public key bytes are not a point on the curve
    #[error("Public key is not a valid secp256k1 point")]
    InvalidPublicKey,

    /// Hash has invalid length
    #[error("Invalid hash length: {len} bytes, expected: {expected} bytes")]
    InvalidHashLength { len: usize, expected: usize },

    /// Hex decode error
    #[error("Failed to decode hex: {0}")]
    DecodeError(String),
}
