//! Topic registry: the bounded table of advertisements admitted through
//! tickets.

use std::collections::HashMap;

use log::{debug, trace};
use thiserror::Error;

use disco_common::time::TimestampMillis;

use super::node::{Node, NodeId};
use super::topic::Topic;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no space left for topic")]
    Full,

    #[error("ticket was already used for this advertisement")]
    AlreadyUsed,
}

/// Admission and lookup of (topic, node) advertisements.
pub trait TopicRegistry: Send {
    /// Admit `node` under `topic` on the strength of a ticket issued at
    /// `ticket_issued_at`.
    ///
    /// A ticket admits at most once: presenting a ticket no newer than the
    /// one behind the node's current advertisement fails with
    /// [`RegistryError::AlreadyUsed`].
    fn admit(
        &mut self,
        topic: &Topic,
        node: &Node,
        ticket_issued_at: TimestampMillis,
        now: TimestampMillis,
    ) -> Result<(), RegistryError>;

    /// Live advertisers for `topic`, oldest first.
    fn lookup(&self, topic: &Topic, now: TimestampMillis) -> Vec<Node>;

    fn contains(&self, topic: &Topic, node_id: &NodeId, now: TimestampMillis) -> bool;

    /// Milliseconds until `topic` can take a new advertisement.
    fn wait_for_space(&self, topic: &Topic, now: TimestampMillis) -> u64;

    /// Drop expired advertisements.
    fn purge(&mut self, now: TimestampMillis);

    /// Number of stored advertisements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct Advertisement {
    node: Node,
    node_id: NodeId,
    admitted_at: TimestampMillis,
    ticket_issued_at: TimestampMillis,
}

/// In-memory registry with a per-topic capacity and a fixed ad lifetime.
#[derive(Debug)]
pub struct MemoryTopicRegistry {
    topics: HashMap<Topic, Vec<Advertisement>>,
    capacity: usize,
    max_topics: usize,
    ad_lifetime: u64,
}

impl MemoryTopicRegistry {
    pub fn new(capacity: usize, max_topics: usize, ad_lifetime: u64) -> Self {
        Self {
            topics: HashMap::new(),
            capacity,
            max_topics,
            ad_lifetime,
        }
    }

    fn is_live(&self, ad: &Advertisement, now: TimestampMillis) -> bool {
        ad.admitted_at.saturating_add(self.ad_lifetime) > now
    }

    fn live_ads<'a>(&'a self, topic: &Topic, now: TimestampMillis) -> impl Iterator<Item = &'a Advertisement> + 'a {
        self.topics
            .get(topic)
            .into_iter()
            .flatten()
            .filter(move |ad| self.is_live(ad, now))
    }

    fn purge_topic(&mut self, topic: &Topic, now: TimestampMillis) {
        let ad_lifetime = self.ad_lifetime;
        if let Some(ads) = self.topics.get_mut(topic) {
            ads.retain(|ad| ad.admitted_at.saturating_add(ad_lifetime) > now);
            if ads.is_empty() {
                self.topics.remove(topic);
            }
        }
    }
}

impl TopicRegistry for MemoryTopicRegistry {
    fn admit(
        &mut self,
        topic: &Topic,
        node: &Node,
        ticket_issued_at: TimestampMillis,
        now: TimestampMillis,
    ) -> Result<(), RegistryError> {
        self.purge_topic(topic, now);

        let node_id = node.id();
        if let Some(ad) = self
            .topics
            .get_mut(topic)
            .and_then(|ads| ads.iter_mut().find(|ad| ad.node_id == node_id))
        {
            if ticket_issued_at <= ad.ticket_issued_at {
                return Err(RegistryError::AlreadyUsed);
            }

            if log::log_enabled!(log::Level::Trace) {
                trace!("Refreshing advertisement of {} for topic {}", node_id, topic);
            }
            ad.node = node.clone();
            ad.admitted_at = now;
            ad.ticket_issued_at = ticket_issued_at;
            return Ok(());
        }

        if !self.topics.contains_key(topic) && self.topics.len() >= self.max_topics {
            self.purge(now);
            if self.topics.len() >= self.max_topics {
                if log::log_enabled!(log::Level::Debug) {
                    debug!("Registry tracks {} topics, rejecting new topic {}", self.topics.len(), topic);
                }
                return Err(RegistryError::Full);
            }
        }

        let ads = self.topics.entry(topic.clone()).or_default();
        if ads.len() >= self.capacity {
            return Err(RegistryError::Full);
        }

        ads.push(Advertisement {
            node: node.clone(),
            node_id,
            admitted_at: now,
            ticket_issued_at,
        });
        Ok(())
    }

    fn lookup(&self, topic: &Topic, now: TimestampMillis) -> Vec<Node> {
        self.live_ads(topic, now).map(|ad| ad.node.clone()).collect()
    }

    fn contains(&self, topic: &Topic, node_id: &NodeId, now: TimestampMillis) -> bool {
        self.live_ads(topic, now).any(|ad| &ad.node_id == node_id)
    }

    fn wait_for_space(&self, topic: &Topic, now: TimestampMillis) -> u64 {
        let live: Vec<&Advertisement> = self.live_ads(topic, now).collect();
        if live.len() < self.capacity {
            return 0;
        }

        live.iter()
            .map(|ad| ad.admitted_at.saturating_add(self.ad_lifetime).saturating_sub(now))
            .min()
            .unwrap_or(0)
    }

    fn purge(&mut self, now: TimestampMillis) {
        let ad_lifetime = self.ad_lifetime;
        self.topics.retain(|_, ads| {
            ads.retain(|ad| ad.admitted_at.saturating_add(ad_lifetime) > now);
            !ads.is_empty()
        });
    }

    fn len(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::endpoint::Endpoint;
    use disco_common::crypto::PublicKey;
    use std::net::{IpAddr, Ipv4Addr};

    fn node(last_octet: u8) -> Node {
        let endpoint = Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)), 30303, None).unwrap();
        Node::new(endpoint, PublicKey::random())
    }

    fn topic() -> Topic {
        Topic::new("a1b2").unwrap()
    }

    #[test]
    fn test_admit_and_lookup() {
        let mut registry = MemoryTopicRegistry::new(4, 10, 1_000);
        let (a, b) = (node(1), node(2));

        registry.admit(&topic(), &a, 0, 10).unwrap();
        registry.admit(&topic(), &b, 5, 20).unwrap();

        assert_eq!(registry.lookup(&topic(), 30), vec![a.clone(), b.clone()]);
        assert!(registry.contains(&topic(), &a.id(), 30));
        assert!(!registry.contains(&Topic::new("ff").unwrap(), &a.id(), 30));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ads_expire() {
        let mut registry = MemoryTopicRegistry::new(4, 10, 1_000);
        let a = node(1);
        registry.admit(&topic(), &a, 0, 0).unwrap();

        assert!(registry.contains(&topic(), &a.id(), 999));
        assert!(!registry.contains(&topic(), &a.id(), 1_000));
        assert!(registry.lookup(&topic(), 1_000).is_empty());

        registry.purge(1_000);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ticket_used_once() {
        let mut registry = MemoryTopicRegistry::new(4, 10, 1_000);
        let a = node(1);

        registry.admit(&topic(), &a, 100, 600).unwrap();
        assert_eq!(registry.admit(&topic(), &a, 100, 700), Err(RegistryError::AlreadyUsed));
        assert_eq!(registry.admit(&topic(), &a, 50, 700), Err(RegistryError::AlreadyUsed));

        // a newer ticket refreshes the advertisement
        registry.admit(&topic(), &a, 200, 800).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&topic(), &a.id(), 1_700));
    }

    #[test]
    fn test_capacity_and_wait_for_space() {
        let mut registry = MemoryTopicRegistry::new(2, 10, 1_000);
        assert_eq!(registry.wait_for_space(&topic(), 0), 0);

        registry.admit(&topic(), &node(1), 0, 0).unwrap();
        registry.admit(&topic(), &node(2), 0, 300).unwrap();
        assert_eq!(registry.admit(&topic(), &node(3), 0, 400), Err(RegistryError::Full));
        assert_eq!(registry.wait_for_space(&topic(), 400), 600);

        // first ad expired, a slot opened
        assert_eq!(registry.wait_for_space(&topic(), 1_000), 0);
        registry.admit(&topic(), &node(3), 0, 1_000).unwrap();
    }

    #[test]
    fn test_max_topics() {
        let mut registry = MemoryTopicRegistry::new(2, 1, 1_000);
        registry.admit(&topic(), &node(1), 0, 0).unwrap();

        let other = Topic::new("ff").unwrap();
        assert_eq!(registry.admit(&other, &node(2), 0, 10), Err(RegistryError::Full));
        registry.admit(&other, &node(2), 0, 1_000).unwrap();
        assert_eq!(registry.lookup(&other, 1_000).len(), 1);
    }
}
