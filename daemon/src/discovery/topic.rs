//! Topics nodes advertise themselves under.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};

use super::error::{DiscoveryError, DiscoveryResult};

/// An opaque interest label, canonically written as hex.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Topic(Vec<u8>);

impl Topic {
    /// Parse a topic from its hex form, with or without a `0x` prefix.
    pub fn new(content: &str) -> DiscoveryResult<Self> {
        let hex_str = content.strip_prefix("0x").unwrap_or(content);
        let bytes = hex::decode(hex_str).map_err(|e| {
            DiscoveryError::Validation(format!("Topic '{}' is not valid hex: {}", content, e))
        })?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Canonical hex content, without prefix.
    pub fn content(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content())
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topic({})", self.content())
    }
}

impl FromStr for Topic {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Topic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.content())
    }
}

impl<'a> Deserialize<'a> for Topic {
    fn deserialize<D: serde::Deserializer<'a>>(deserializer: D) -> Result<Self, D::Error> {
        let content = String::deserialize(deserializer)?;
        Topic::new(&content).map_err(SerdeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_from_hex() {
        let topic = Topic::new("a1b2").unwrap();
        assert_eq!(topic.as_bytes(), &[0xa1, 0xb2]);
        assert_eq!(topic.content(), "a1b2");
        assert_eq!(Topic::new("0xA1B2").unwrap(), topic);
        assert_eq!(topic.to_string(), "a1b2");
    }

    #[test]
    fn test_topic_rejects_non_hex() {
        for content in ["xyz", "a1b", "0xzz"] {
            assert!(matches!(Topic::new(content), Err(DiscoveryError::Validation(_))));
        }
    }

    #[test]
    fn test_empty_topic() {
        let topic: Topic = "".parse().unwrap();
        assert!(topic.as_bytes().is_empty());
    }

    #[test]
    fn test_topic_serde() {
        let topic = Topic::from_bytes(vec![0xde, 0xad]);
        let json = serde_json::to_string(&topic).unwrap();
        assert_eq!(json, "\"dead\"");
        assert_eq!(serde_json::from_str::<Topic>(&json).unwrap(), topic);
        assert!(serde_json::from_str::<Topic>("\"nothex\"").is_err());
    }
}
