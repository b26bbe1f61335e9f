//! Configuration for topic ticket admission.

use serde::{Deserialize, Serialize};

use super::error::{DiscoveryError, DiscoveryResult};
use crate::config::{
    DEFAULT_AD_LIFETIME_MILLIS, DEFAULT_MAX_TOPICS, DEFAULT_TICKET_BASE_WAIT_MILLIS,
    DEFAULT_TICKET_LIFETIME_MILLIS, DEFAULT_TICKET_SPACING_MILLIS, DEFAULT_TOPIC_CAPACITY,
    TICKET_SECRET_SIZE,
};

const fn default_ticket_base_wait() -> u64 {
    DEFAULT_TICKET_BASE_WAIT_MILLIS
}

const fn default_ticket_spacing() -> u64 {
    DEFAULT_TICKET_SPACING_MILLIS
}

const fn default_ticket_lifetime() -> u64 {
    DEFAULT_TICKET_LIFETIME_MILLIS
}

const fn default_topic_capacity() -> usize {
    DEFAULT_TOPIC_CAPACITY
}

const fn default_ad_lifetime() -> u64 {
    DEFAULT_AD_LIFETIME_MILLIS
}

const fn default_max_topics() -> usize {
    DEFAULT_MAX_TOPICS
}

/// Configuration for the ticket issuer and the topic registry behind it.
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Minimum wait time of a ticket, in milliseconds.
    #[clap(name = "ticket-base-wait", long, default_value_t = default_ticket_base_wait())]
    #[serde(default = "default_ticket_base_wait")]
    pub base_wait: u64,

    /// Extra wait added per outstanding ticket on a topic, in milliseconds.
    #[clap(name = "ticket-spacing", long, default_value_t = default_ticket_spacing())]
    #[serde(default = "default_ticket_spacing")]
    pub spacing: u64,

    /// How long a ticket stays redeemable once its wait time has elapsed,
    /// in milliseconds.
    #[clap(name = "ticket-lifetime", long, default_value_t = default_ticket_lifetime())]
    #[serde(default = "default_ticket_lifetime")]
    pub ticket_lifetime: u64,

    /// Maximum number of advertisements per topic.
    #[clap(name = "topic-capacity", long, default_value_t = default_topic_capacity())]
    #[serde(default = "default_topic_capacity")]
    pub topic_capacity: usize,

    /// Lifetime of an admitted advertisement, in milliseconds.
    ///
    /// Must not be shorter than the ticket lifetime, otherwise a ticket could
    /// outlive the advertisement it admitted and be redeemed twice.
    #[clap(name = "ad-lifetime", long, default_value_t = default_ad_lifetime())]
    #[serde(default = "default_ad_lifetime")]
    pub ad_lifetime: u64,

    /// Maximum number of topics tracked at once.
    #[clap(name = "max-topics", long, default_value_t = default_max_topics())]
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,

    /// Secret used to authenticate tickets (hex format, 32 bytes).
    ///
    /// If not provided, a new secret is generated on startup and tickets
    /// issued before a restart are no longer honored.
    #[clap(name = "ticket-secret", long, env = "TICKET_SECRET")]
    #[serde(default)]
    pub ticket_secret: Option<String>,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            base_wait: DEFAULT_TICKET_BASE_WAIT_MILLIS,
            spacing: DEFAULT_TICKET_SPACING_MILLIS,
            ticket_lifetime: DEFAULT_TICKET_LIFETIME_MILLIS,
            topic_capacity: DEFAULT_TOPIC_CAPACITY,
            ad_lifetime: DEFAULT_AD_LIFETIME_MILLIS,
            max_topics: DEFAULT_MAX_TOPICS,
            ticket_secret: None,
        }
    }
}

impl TicketConfig {
    /// Check the values are usable together.
    pub fn validate(&self) -> DiscoveryResult<()> {
        if self.topic_capacity == 0 {
            return Err(DiscoveryError::ConfigError(
                "topic-capacity must be greater than 0".to_string(),
            ));
        }
        if self.max_topics == 0 {
            return Err(DiscoveryError::ConfigError(
                "max-topics must be greater than 0".to_string(),
            ));
        }
        if self.ad_lifetime < self.ticket_lifetime {
            return Err(DiscoveryError::ConfigError(format!(
                "ad-lifetime ({}) must not be shorter than ticket-lifetime ({})",
                self.ad_lifetime, self.ticket_lifetime
            )));
        }
        self.get_ticket_secret()?;
        Ok(())
    }

    /// Decode the configured ticket secret, if any.
    pub fn get_ticket_secret(&self) -> DiscoveryResult<Option<[u8; TICKET_SECRET_SIZE]>> {
        let Some(secret) = self.ticket_secret.as_deref() else {
            return Ok(None);
        };

        let bytes = hex::decode(secret.strip_prefix("0x").unwrap_or(secret))
            .map_err(|e| DiscoveryError::HexError(format!("Invalid ticket secret: {}", e)))?;
        let secret = <[u8; TICKET_SECRET_SIZE]>::try_from(bytes.as_slice()).map_err(|_| {
            DiscoveryError::ConfigError(format!(
                "ticket-secret must be {} bytes, got {}",
                TICKET_SECRET_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Some(secret))
    }
}
