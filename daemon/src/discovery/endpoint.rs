//! Network endpoint records.
//!
//! Wire layout, inline in the enclosing list:
//!
//! ```text
//! ip-bytes (4 or 16), udp-port (int), tcp-port (int, 0 = unknown, may be missing)
//! ```

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use disco_common::serializer::{Reader, ReaderError, Serializer, Writer};

use super::error::{DiscoveryError, DiscoveryResult};

/// Default devp2p port, substituted when a peer advertises UDP port 0.
pub const DEFAULT_PORT: u16 = 30303;

/// Lowest valid port.
pub const MIN_PORT: i64 = 1;

/// Highest valid port.
pub const MAX_PORT: i64 = u16::MAX as i64;

/// Check that `port` lies in `[MIN_PORT, MAX_PORT]`.
///
/// Shared by explicit construction and by decoding.
pub fn validate_port(port: i64, name: &str) -> DiscoveryResult<u16> {
    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        return Err(DiscoveryError::Validation(format!(
            "{} should be between {} and {}, got {}",
            name, MIN_PORT, MAX_PORT, port
        )));
    }
    Ok(port as u16)
}

/// A reachable network location of a peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    address: IpAddr,
    udp_port: u16,
    tcp_port: Option<u16>,
}

impl Endpoint {
    /// Create a new endpoint.
    ///
    /// IPv4-mapped IPv6 addresses are stored as plain IPv4.
    pub fn new(address: IpAddr, udp_port: u16, tcp_port: Option<u16>) -> DiscoveryResult<Self> {
        let udp_port = validate_port(udp_port as i64, "udpPort")?;
        let tcp_port = match tcp_port {
            Some(port) => Some(validate_port(port as i64, "tcpPort")?),
            None => None,
        };

        Ok(Self {
            address: address.to_canonical(),
            udp_port,
            tcp_port,
        })
    }

    /// Create an endpoint from a textual address and unchecked port values.
    pub fn from_raw(address: &str, udp_port: i64, tcp_port: Option<i64>) -> DiscoveryResult<Self> {
        let address: IpAddr = address
            .parse()
            .map_err(|e| DiscoveryError::Validation(format!("Invalid address '{}': {}", address, e)))?;
        let udp_port = validate_port(udp_port, "udpPort")?;
        let tcp_port = tcp_port
            .map(|port| validate_port(port, "tcpPort"))
            .transpose()?;
        Self::new(address, udp_port, tcp_port)
    }

    /// Create an endpoint from the UDP socket address a packet came from.
    pub fn from_socket_addr(address: SocketAddr, tcp_port: Option<u16>) -> DiscoveryResult<Self> {
        Self::new(address.ip(), address.port(), tcp_port)
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn udp_port(&self) -> u16 {
        self.udp_port
    }

    pub fn tcp_port(&self) -> Option<u16> {
        self.tcp_port
    }

    /// UDP socket address of the endpoint.
    pub fn udp_socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.udp_port)
    }

    /// TCP socket address of the endpoint, if the TCP port is known.
    pub fn tcp_socket_address(&self) -> Option<SocketAddr> {
        self.tcp_port
            .map(|port| SocketAddr::new(self.address, port))
    }

    fn ip_len(&self) -> usize {
        match self.address {
            IpAddr::V4(_) => 4,
            IpAddr::V6(_) => 16,
        }
    }

    fn read_address(reader: &mut Reader) -> Result<IpAddr, ReaderError> {
        let bytes = reader.read_value()?;
        if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
            return Ok(IpAddr::from(octets));
        }
        if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
            return Ok(IpAddr::from(octets).to_canonical());
        }
        Err(ReaderError::InvalidAddress(bytes.len()))
    }
}

impl Serializer for Endpoint {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let address = Self::read_address(reader)?;

        // Port 0 is seen in the wild from misconfigured peers
        let udp_port = match reader.read_u16()? {
            0 => DEFAULT_PORT,
            port => port,
        };

        // Some implementations omit the TCP port or send 0 for it
        let tcp_port = if reader.is_complete() {
            None
        } else {
            match reader.read_u16()? {
                0 => None,
                port => Some(port),
            }
        };

        Self::new(address, udp_port, tcp_port).map_err(|_| ReaderError::InvalidValue)
    }

    fn write(&self, writer: &mut Writer) {
        match self.address {
            IpAddr::V4(ip) => writer.write_value(&ip.octets()),
            IpAddr::V6(ip) => writer.write_value(&ip.octets()),
        }
        writer.write_u16(self.udp_port);
        writer.write_u16(self.tcp_port.unwrap_or(0));
    }

    // rough over-estimate, assuming maximum size encoding for the port numbers
    fn size(&self) -> usize {
        1 + self.ip_len() + 2 * (1 + 2)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tcp_port {
            Some(tcp) => write!(f, "{} (tcp {})", self.udp_socket_address(), tcp),
            None => write!(f, "{}", self.udp_socket_address()),
        }
    }
}
