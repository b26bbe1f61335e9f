//! secp256k1 node keys.
//!
//! Node identities on the wire are the 64 byte uncompressed public key
//! coordinates (without the `0x04` SEC1 prefix).

use std::fmt;
use std::str::FromStr;

use libsecp256k1::{PublicKeyFormat, SecretKey};
use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};

use super::{keccak256, CryptoError, Hash};

/// Size of a raw public key on the wire.
pub const PUBLIC_KEY_SIZE: usize = 64;

/// A validated secp256k1 public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    /// Parse a raw 64 byte public key, checking that it lies on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidPublicKeyLength {
                len: bytes.len(),
                expected: PUBLIC_KEY_SIZE,
            });
        }

        let key = libsecp256k1::PublicKey::parse_slice(bytes, Some(PublicKeyFormat::Raw))
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self::from_point(&key))
    }

    /// Public half of a freshly generated key pair.
    pub fn random() -> Self {
        let secret = SecretKey::random(&mut rand::rngs::OsRng);
        Self::from_point(&libsecp256k1::PublicKey::from_secret_key(&secret))
    }

    fn from_point(key: &libsecp256k1::PublicKey) -> Self {
        let full = key.serialize();
        let mut raw = [0u8; PUBLIC_KEY_SIZE];
        raw.copy_from_slice(&full[1..]);
        Self(raw)
    }

    /// Raw 64 byte representation.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Keccak-256 of the raw key, used as the node ID in distance
    /// computations.
    pub fn node_id(&self) -> Hash {
        keccak256(&self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| CryptoError::DecodeError(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for PublicKey {
    fn deserialize<D: serde::Deserializer<'a>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        PublicKey::from_str(&hex).map_err(SerdeError::custom)
    }
}
