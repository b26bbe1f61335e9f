//! Issuer side of ticket admission.
//!
//! Registration requests are answered with a ticket. Redeeming a valid ticket
//! after its wait time admits the requester into the topic registry; any
//! other redemption is answered with a fresh ticket.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use log::{debug, trace};
use thiserror::Error;

use disco_common::time::TimestampMillis;

use super::message::TicketMessage;
use super::minter::{HmacTicketMinter, TicketContext, TicketError, TicketMinter};
use super::policy::{LinearBackoff, WaitTimePolicy};
use crate::discovery::config::TicketConfig;
use crate::discovery::error::{DiscoveryError, DiscoveryResult};
use crate::discovery::node::Node;
use crate::discovery::registry::{MemoryTopicRegistry, RegistryError, TopicRegistry};
use crate::discovery::topic::Topic;

/// Why a redemption did not admit the requester.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("ticket redeemed {remaining}ms too early")]
    TooEarly { remaining: u64 },

    #[error("ticket expired")]
    Expired,

    #[error("invalid ticket: {0}")]
    Invalid(#[from] TicketError),

    #[error("ticket already used")]
    AlreadyUsed,

    #[error("topic registry is full")]
    RegistryFull,
}

/// Outcome of a ticket redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// The requester was not admitted and must retry with `fresh`.
    Rejected {
        reason: RejectReason,
        fresh: TicketMessage,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

struct IssuerState<P, R> {
    policy: P,
    registry: R,
}

/// Admission gate in front of a topic registry.
///
/// The only memory kept between issuing and redeeming a ticket is the wait
/// time pressure per topic: everything needed to judge a redemption travels
/// inside the ticket.
pub struct TicketIssuer<M = HmacTicketMinter, P = LinearBackoff, R = MemoryTopicRegistry> {
    minter: M,
    ticket_lifetime: u64,
    // policy and registry are updated together
    state: Mutex<IssuerState<P, R>>,
}

impl TicketIssuer {
    /// Build the default issuer from its configuration.
    pub fn from_config(config: &TicketConfig) -> DiscoveryResult<Self> {
        config.validate()?;

        let minter = match config.get_ticket_secret()? {
            Some(secret) => HmacTicketMinter::new(&secret)?,
            None => HmacTicketMinter::random()?,
        };
        let max_topics = NonZeroUsize::new(config.max_topics).ok_or_else(|| {
            DiscoveryError::ConfigError("max-topics must be greater than 0".to_string())
        })?;
        let policy = LinearBackoff::new(config.base_wait, config.spacing, max_topics);
        let registry = MemoryTopicRegistry::new(
            config.topic_capacity,
            config.max_topics,
            config.ad_lifetime,
        );

        Ok(Self::new(minter, policy, registry, config.ticket_lifetime))
    }
}

impl<M, P, R> TicketIssuer<M, P, R>
where
    M: TicketMinter,
    P: WaitTimePolicy,
    R: TopicRegistry,
{
    /// A ticket is honoured for `ticket_lifetime` ms once its wait is over.
    ///
    /// `registry` must keep advertisements for at least `ticket_lifetime`:
    /// single use is checked against the live advertisement, so a ticket that
    /// outlives the advertisement it admitted could be redeemed again.
    /// [`TicketConfig::validate`] enforces this for [`TicketIssuer::from_config`].
    pub fn new(minter: M, policy: P, registry: R, ticket_lifetime: u64) -> Self {
        Self {
            minter,
            ticket_lifetime,
            state: Mutex::new(IssuerState { policy, registry }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, IssuerState<P, R>> {
        // the state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Answer a registration request for `topic` with a ticket.
    pub fn request(
        &self,
        topic: &Topic,
        requester: &Node,
        request_id: &[u8],
        now: TimestampMillis,
    ) -> TicketMessage {
        let mut state = self.lock_state();
        self.issue(&mut state, topic, requester, request_id, now, 0)
    }

    /// Redeem a ticket previously issued for `topic` to `requester`.
    pub fn redeem(
        &self,
        topic: &Topic,
        requester: &Node,
        request_id: &[u8],
        ticket: &[u8],
        now: TimestampMillis,
    ) -> Admission {
        let mut state = self.lock_state();

        let context = match self.minter.verify(ticket, topic, &requester.id()) {
            Ok(context) => context,
            Err(e) => return self.reject(&mut state, e.into(), topic, requester, request_id, now, 0),
        };

        let redeemable_at = context.redeemable_at();
        if now < redeemable_at {
            let remaining = redeemable_at - now;
            return self.reject(
                &mut state,
                RejectReason::TooEarly { remaining },
                topic,
                requester,
                request_id,
                now,
                remaining,
            );
        }

        // an ad admitted at redeemable_at must outlive this window
        if now >= redeemable_at.saturating_add(self.ticket_lifetime) {
            return self.reject(&mut state, RejectReason::Expired, topic, requester, request_id, now, 0);
        }

        match state.registry.admit(topic, requester, context.issued_at, now) {
            Ok(()) => {
                if log::log_enabled!(log::Level::Debug) {
                    debug!("Admitted {} for topic {}", requester.id(), topic);
                }
                Admission::Admitted
            }
            Err(RegistryError::AlreadyUsed) => {
                self.reject(&mut state, RejectReason::AlreadyUsed, topic, requester, request_id, now, 0)
            }
            Err(RegistryError::Full) => {
                let wait = state.registry.wait_for_space(topic, now);
                self.reject(&mut state, RejectReason::RegistryFull, topic, requester, request_id, now, wait)
            }
        }
    }

    /// Live advertisers for `topic`.
    pub fn lookup(&self, topic: &Topic, now: TimestampMillis) -> Vec<Node> {
        self.lock_state().registry.lookup(topic, now)
    }

    /// Drop expired advertisements.
    pub fn purge(&self, now: TimestampMillis) {
        self.lock_state().registry.purge(now);
    }

    /// Number of stored advertisements.
    pub fn registry_len(&self) -> usize {
        self.lock_state().registry.len()
    }

    #[allow(clippy::too_many_arguments)]
    fn reject(
        &self,
        state: &mut IssuerState<P, R>,
        reason: RejectReason,
        topic: &Topic,
        requester: &Node,
        request_id: &[u8],
        now: TimestampMillis,
        min_wait: u64,
    ) -> Admission {
        if log::log_enabled!(log::Level::Debug) {
            debug!("Rejected ticket of {} for topic {}: {}", requester.id(), topic, reason);
        }
        let fresh = self.issue(state, topic, requester, request_id, now, min_wait);
        Admission::Rejected { reason, fresh }
    }

    fn issue(
        &self,
        state: &mut IssuerState<P, R>,
        topic: &Topic,
        requester: &Node,
        request_id: &[u8],
        now: TimestampMillis,
        min_wait: u64,
    ) -> TicketMessage {
        let wait = state.policy.next_wait_time(topic, now).max(min_wait);
        let wait_time = u32::try_from(wait).unwrap_or(u32::MAX);

        let ticket = self.minter.mint(&TicketContext {
            topic: topic.clone(),
            requester: requester.id(),
            issued_at: now,
            wait_time,
        });

        if log::log_enabled!(log::Level::Trace) {
            trace!(
                "Issued ticket to {} for topic {} with wait time {}ms",
                requester.id(),
                topic,
                wait_time
            );
        }

        TicketMessage::new(request_id.to_vec(), ticket.to_vec(), wait_time as u64)
    }
}
