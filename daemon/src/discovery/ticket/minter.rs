//! Self-verifying ticket payloads.
//!
//! A ticket carries everything the issuer needs to judge a redemption, so the
//! issuer keeps no per-requester memory between issuing and redeeming:
//!
//! ```text
//! issued_at (u64 BE) || wait_time (u32 BE) || mac (20 bytes)
//! ```
//!
//! The MAC binds both numbers to the topic and the requester's node id.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use disco_common::time::TimestampMillis;

use crate::discovery::error::{DiscoveryError, DiscoveryResult};
use crate::discovery::node::NodeId;
use crate::discovery::topic::Topic;

/// Size of a ticket on the wire.
pub const TICKET_SIZE: usize = 32;

const ISSUED_AT_SIZE: usize = 8;
const WAIT_TIME_SIZE: usize = 4;
const HEADER_SIZE: usize = ISSUED_AT_SIZE + WAIT_TIME_SIZE;
const MAC_SIZE: usize = TICKET_SIZE - HEADER_SIZE;

const TICKET_DOMAIN: &[u8] = b"disco-topic-ticket";

type HmacSha256 = Hmac<Sha256>;

/// A ticket's bytes, as produced by a minter.
pub type Ticket = [u8; TICKET_SIZE];

/// The state a ticket carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketContext {
    pub topic: Topic,
    pub requester: NodeId,
    pub issued_at: TimestampMillis,
    pub wait_time: u32,
}

impl TicketContext {
    /// Earliest time the ticket may be redeemed.
    pub fn redeemable_at(&self) -> TimestampMillis {
        self.issued_at.saturating_add(self.wait_time as u64)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("ticket must be {TICKET_SIZE} bytes, got {0}")]
    Malformed(usize),

    #[error("ticket authentication failed")]
    BadMac,
}

/// Turns ticket state into opaque bytes and back.
pub trait TicketMinter: Send + Sync {
    fn mint(&self, context: &TicketContext) -> Ticket;

    /// Check `ticket` was minted by us for this topic and requester.
    fn verify(&self, ticket: &[u8], topic: &Topic, requester: &NodeId) -> Result<TicketContext, TicketError>;
}

/// Minter authenticating tickets with HMAC-SHA256 under a node-local secret.
#[derive(Clone)]
pub struct HmacTicketMinter {
    mac: HmacSha256,
}

impl HmacTicketMinter {
    pub fn new(secret: &[u8]) -> DiscoveryResult<Self> {
        if secret.is_empty() {
            return Err(DiscoveryError::ConfigError(
                "ticket secret must not be empty".to_string(),
            ));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| DiscoveryError::ConfigError(format!("invalid ticket secret: {}", e)))?;
        Ok(Self { mac })
    }

    /// Minter with a fresh random secret.
    ///
    /// Tickets minted before a restart are invalid afterwards.
    pub fn random() -> DiscoveryResult<Self> {
        let secret = disco_common::crypto::random::secure_random_bytes::<32>();
        Self::new(&secret)
    }

    fn compute(&self, header: &[u8], topic: &Topic, requester: &NodeId) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(TICKET_DOMAIN);
        mac.update(header);
        mac.update(requester.as_bytes());
        mac.update(topic.as_bytes());
        mac
    }
}

impl TicketMinter for HmacTicketMinter {
    fn mint(&self, context: &TicketContext) -> Ticket {
        let mut ticket = [0u8; TICKET_SIZE];
        ticket[..ISSUED_AT_SIZE].copy_from_slice(&context.issued_at.to_be_bytes());
        ticket[ISSUED_AT_SIZE..HEADER_SIZE].copy_from_slice(&context.wait_time.to_be_bytes());

        let tag = self
            .compute(&ticket[..HEADER_SIZE], &context.topic, &context.requester)
            .finalize()
            .into_bytes();
        ticket[HEADER_SIZE..].copy_from_slice(&tag[..MAC_SIZE]);
        ticket
    }

    fn verify(&self, ticket: &[u8], topic: &Topic, requester: &NodeId) -> Result<TicketContext, TicketError> {
        if ticket.len() != TICKET_SIZE {
            return Err(TicketError::Malformed(ticket.len()));
        }

        let (header, tag) = ticket.split_at(HEADER_SIZE);
        self.compute(header, topic, requester)
            .verify_truncated_left(tag)
            .map_err(|_| TicketError::BadMac)?;

        let mut issued_at = [0u8; ISSUED_AT_SIZE];
        issued_at.copy_from_slice(&header[..ISSUED_AT_SIZE]);
        let mut wait_time = [0u8; WAIT_TIME_SIZE];
        wait_time.copy_from_slice(&header[ISSUED_AT_SIZE..]);

        Ok(TicketContext {
            topic: topic.clone(),
            requester: requester.clone(),
            issued_at: u64::from_be_bytes(issued_at),
            wait_time: u32::from_be_bytes(wait_time),
        })
    }
}
