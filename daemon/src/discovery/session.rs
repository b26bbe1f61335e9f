//! Session key bundles.
//!
//! A successful handshake yields three symmetric keys: one per traffic
//! direction and one for the handshake authentication response. The bundle is
//! read-only once built; re-keying replaces it.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::{DiscoveryError, DiscoveryResult};
use super::node::NodeId;

/// Size of each session key (AES-128-GCM).
pub const SESSION_KEY_SIZE: usize = 16;

const KEY_AGREEMENT_INFO: &[u8] = b"discovery v5 key agreement";

/// Local role in the handshake that produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Recipient,
}

/// Direction of a message relative to the local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

/// The three keys of an established session.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    initiator_key: [u8; SESSION_KEY_SIZE],
    recipient_key: [u8; SESSION_KEY_SIZE],
    auth_resp_key: [u8; SESSION_KEY_SIZE],
}

fn to_key(bytes: &[u8], name: &str) -> DiscoveryResult<[u8; SESSION_KEY_SIZE]> {
    <[u8; SESSION_KEY_SIZE]>::try_from(bytes).map_err(|_| {
        DiscoveryError::Validation(format!(
            "{} must be {} bytes, got {}",
            name,
            SESSION_KEY_SIZE,
            bytes.len()
        ))
    })
}

impl SessionKey {
    /// Build a bundle from three keys.
    ///
    /// Fails unless every key has the session key size and all three differ.
    pub fn new(initiator_key: &[u8], recipient_key: &[u8], auth_resp_key: &[u8]) -> DiscoveryResult<Self> {
        let session = Self {
            initiator_key: to_key(initiator_key, "initiatorKey")?,
            recipient_key: to_key(recipient_key, "recipientKey")?,
            auth_resp_key: to_key(auth_resp_key, "authRespKey")?,
        };

        if session.initiator_key == session.recipient_key
            || session.initiator_key == session.auth_resp_key
            || session.recipient_key == session.auth_resp_key
        {
            return Err(DiscoveryError::Validation(
                "session keys must be distinct".to_string(),
            ));
        }

        Ok(session)
    }

    /// Derive the bundle from an ECDH shared secret.
    ///
    /// Both sides pass the ids in handshake order, so they end up with the
    /// same bundle.
    pub fn derive(
        secret: &[u8],
        id_nonce: &[u8],
        initiator_id: &NodeId,
        recipient_id: &NodeId,
    ) -> DiscoveryResult<Self> {
        let mut info = Vec::with_capacity(KEY_AGREEMENT_INFO.len() + 64);
        info.extend_from_slice(KEY_AGREEMENT_INFO);
        info.extend_from_slice(initiator_id.as_bytes());
        info.extend_from_slice(recipient_id.as_bytes());

        let hkdf = Hkdf::<Sha256>::new(Some(id_nonce), secret);
        let mut okm = [0u8; SESSION_KEY_SIZE * 3];
        hkdf.expand(&info, &mut okm)
            .map_err(|e| DiscoveryError::Validation(format!("key derivation failed: {}", e)))?;

        let result = Self::new(
            &okm[..SESSION_KEY_SIZE],
            &okm[SESSION_KEY_SIZE..SESSION_KEY_SIZE * 2],
            &okm[SESSION_KEY_SIZE * 2..],
        );
        okm.zeroize();
        result
    }

    pub fn initiator_key(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.initiator_key
    }

    pub fn recipient_key(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.recipient_key
    }

    pub fn auth_resp_key(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.auth_resp_key
    }

    /// Key protecting a message in `direction` when the local node had `role`.
    ///
    /// The initiator writes with the initiator key and reads with the
    /// recipient key; the recipient does the opposite.
    pub fn key_for(&self, role: Role, direction: Direction) -> &[u8; SESSION_KEY_SIZE] {
        match (role, direction) {
            (Role::Initiator, Direction::Outbound) | (Role::Recipient, Direction::Inbound) => {
                &self.initiator_key
            }
            (Role::Initiator, Direction::Inbound) | (Role::Recipient, Direction::Outbound) => {
                &self.recipient_key
            }
        }
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("initiator_key", &"<redacted>")
            .field("recipient_key", &"<redacted>")
            .field("auth_resp_key", &"<redacted>")
            .finish()
    }
}
