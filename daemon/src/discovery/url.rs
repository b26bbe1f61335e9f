//! enode:// URL parser for discovery nodes.
//!
//! Format: `enode://<public_key_hex>@<ip>:<tcp_port>[?discport=<udp_port>]`
//!
//! A TCP port of 0 means the node does not accept TCP connections. When
//! `discport` is missing the UDP port equals the TCP port.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use disco_common::crypto::{PublicKey, PUBLIC_KEY_SIZE};

use super::endpoint::Endpoint;
use super::error::{DiscoveryError, DiscoveryResult};
use super::node::Node;

/// URL scheme for discovery nodes.
pub const ENODE_URL_SCHEME: &str = "enode://";

const DISCPORT_PARAM: &str = "discport=";

impl Node {
    /// Parse an enode:// URL string.
    pub fn parse_url(s: &str) -> DiscoveryResult<Self> {
        let rest = s.strip_prefix(ENODE_URL_SCHEME).ok_or_else(|| {
            DiscoveryError::InvalidUrl(format!(
                "URL must start with '{}', got: {}",
                ENODE_URL_SCHEME, s
            ))
        })?;

        let (key_hex, location) = rest.split_once('@').ok_or_else(|| {
            DiscoveryError::InvalidUrl(format!(
                "URL must contain '@' separator between node key and address: {}",
                s
            ))
        })?;

        if key_hex.len() != PUBLIC_KEY_SIZE * 2 {
            return Err(DiscoveryError::InvalidUrl(format!(
                "Node key must be {} hex characters, got {} characters",
                PUBLIC_KEY_SIZE * 2,
                key_hex.len()
            )));
        }
        let key_bytes = hex::decode(key_hex)
            .map_err(|e| DiscoveryError::HexError(format!("Invalid node key hex: {}", e)))?;
        let node_id = PublicKey::from_bytes(&key_bytes)?;

        let (address_str, query) = match location.split_once('?') {
            Some((address, query)) => (address, Some(query)),
            None => (location, None),
        };

        let address: SocketAddr = address_str.parse().map_err(|e| {
            DiscoveryError::InvalidUrl(format!("Invalid socket address '{}': {}", address_str, e))
        })?;

        let tcp_port = match address.port() {
            0 => None,
            port => Some(port),
        };

        let udp_port = match query {
            Some(query) => {
                let value = query.strip_prefix(DISCPORT_PARAM).ok_or_else(|| {
                    DiscoveryError::InvalidUrl(format!("Unknown query parameter: {}", query))
                })?;
                value.parse::<u16>().map_err(|e| {
                    DiscoveryError::InvalidUrl(format!("Invalid discport '{}': {}", value, e))
                })?
            }
            None => address.port(),
        };

        let endpoint = Endpoint::new(address.ip(), udp_port, tcp_port)?;
        Ok(Node::new(endpoint, node_id))
    }

    pub(super) fn fmt_url(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tcp_port = self.endpoint.tcp_port().unwrap_or(0);
        let address = SocketAddr::new(self.endpoint.address(), tcp_port);
        write!(f, "{}{}@{}", ENODE_URL_SCHEME, self.node_id.to_hex(), address)?;
        if self.endpoint.udp_port() != tcp_port {
            write!(f, "?{}{}", DISCPORT_PARAM, self.endpoint.udp_port())?;
        }
        Ok(())
    }
}

impl FromStr for Node {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_url(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disco_common::crypto::PublicKey;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    fn sample_key() -> PublicKey {
        PublicKey::random()
    }

    #[test]
    fn test_parse_valid_ipv4() {
        let key = sample_key();
        let url = format!("enode://{}@192.168.1.1:30303", key.to_hex());

        let node = Node::parse_url(&url).unwrap();
        assert_eq!(node.node_id, key);
        assert_eq!(node.endpoint.address(), IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(node.endpoint.udp_port(), 30303);
        assert_eq!(node.endpoint.tcp_port(), Some(30303));
    }

    #[test]
    fn test_parse_valid_ipv6_with_discport() {
        let key = sample_key();
        let url = format!("enode://{}@[::1]:30303?discport=30301", key.to_hex());

        let node = Node::parse_url(&url).unwrap();
        assert_eq!(node.endpoint.address(), IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(node.endpoint.udp_port(), 30301);
        assert_eq!(node.endpoint.tcp_port(), Some(30303));
    }

    #[test]
    fn test_parse_udp_only() {
        let key = sample_key();
        let url = format!("enode://{}@10.0.0.1:0?discport=9000", key.to_hex());

        let node = Node::parse_url(&url).unwrap();
        assert_eq!(node.endpoint.udp_port(), 9000);
        assert_eq!(node.endpoint.tcp_port(), None);
    }

    #[test]
    fn test_parse_missing_scheme() {
        let result = Node::parse_url("1a2b3c@127.0.0.1:30303");
        assert!(matches!(result, Err(DiscoveryError::InvalidUrl(msg)) if msg.contains("enode://")));
    }

    #[test]
    fn test_parse_missing_separator() {
        let url = format!("enode://{}127.0.0.1:30303", sample_key().to_hex());
        assert!(matches!(Node::parse_url(&url), Err(DiscoveryError::InvalidUrl(msg)) if msg.contains('@')));
    }

    #[test]
    fn test_parse_invalid_key() {
        let short = "enode://1a2b3c@127.0.0.1:30303";
        assert!(matches!(Node::parse_url(short), Err(DiscoveryError::InvalidUrl(_))));

        let not_hex = format!("enode://{}@127.0.0.1:30303", "g".repeat(128));
        assert!(matches!(Node::parse_url(&not_hex), Err(DiscoveryError::HexError(_))));

        let off_curve = format!("enode://{}@127.0.0.1:30303", "00".repeat(64));
        assert!(matches!(Node::parse_url(&off_curve), Err(DiscoveryError::InvalidKey(_))));
    }

    #[test]
    fn test_parse_invalid_ports() {
        let key = sample_key().to_hex();
        for url in [
            format!("enode://{}@not-an-address", key),
            format!("enode://{}@127.0.0.1:30303?discport=abc", key),
            format!("enode://{}@127.0.0.1:30303?port=1", key),
        ] {
            assert!(matches!(Node::parse_url(&url), Err(DiscoveryError::InvalidUrl(_))));
        }

        // no usable UDP port at all
        let url = format!("enode://{}@127.0.0.1:0", key);
        assert!(matches!(Node::parse_url(&url), Err(DiscoveryError::Validation(_))));
    }

    #[test]
    fn test_display_roundtrip() {
        let key = sample_key();
        for (udp, tcp) in [(30303, Some(30303)), (30301, Some(30303)), (9000, None)] {
            let endpoint = Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), udp, tcp).unwrap();
            let node = Node::new(endpoint, key.clone());

            let url = node.to_string();
            assert!(url.starts_with(ENODE_URL_SCHEME));
            assert_eq!(url.parse::<Node>().unwrap(), node);
        }
    }

    #[test]
    fn test_display_omits_equal_discport() {
        let key = sample_key();
        let endpoint = Endpoint::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 30303, Some(30303)).unwrap();
        let url = Node::new(endpoint, key.clone()).to_string();
        assert_eq!(url, format!("enode://{}@127.0.0.1:30303", key.to_hex()));
    }
}
