//! Discovery protocol records and topic admission control.
//!
//! This module implements the parts of an Ethereum-style (discv4/discv5)
//! discovery node that work on already received or about to be sent bytes:
//!
//! - **Endpoint and node records**: RLP encoding of peer addresses and
//!   identities, tolerant of the zero ports and missing TCP port seen from
//!   older peers
//! - **Session keys**: the key bundle a handshake yields
//! - **Topics and tickets**: admission control for topic advertisements
//!
//! ## Wire Records
//!
//! | Record | Fields |
//! |--------|--------|
//! | Endpoint | ip (4 or 16 bytes), udp port, tcp port (0 or missing = none) |
//! | Node | endpoint fields, public key (64 bytes) |
//! | TicketMessage | request id, ticket, wait time (ms) |
//!
//! ## Node URL Format
//!
//! ```text
//! enode://<public_key_hex>@<ip>:<tcp_port>?discport=<udp_port>
//! ```
//!
//! ## Constants
//!
//! - Default UDP port: 30303
//! - Session key size: 16 bytes
//! - Ticket size: 32 bytes

pub mod config;
pub mod endpoint;
pub mod error;
pub mod node;
pub mod registry;
pub mod session;
pub mod ticket;
pub mod topic;
pub mod url;

pub use config::TicketConfig;
pub use endpoint::{Endpoint, DEFAULT_PORT};
pub use error::{DiscoveryError, DiscoveryResult};
pub use node::{Node, NodeId};
pub use registry::{MemoryTopicRegistry, RegistryError, TopicRegistry};
pub use session::{Direction, Role, SessionKey};
pub use ticket::{Admission, RejectReason, TicketIssuer, TicketMessage, TicketScheduler};
pub use topic::Topic;
pub use url::ENODE_URL_SCHEME;
