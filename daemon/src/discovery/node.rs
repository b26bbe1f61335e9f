//! Peer identity records.

use std::fmt;

use disco_common::crypto::{Hash, PublicKey, PUBLIC_KEY_SIZE};
use disco_common::serializer::{Reader, ReaderError, Serializer, Writer};

use super::endpoint::Endpoint;

/// Node ID type: keccak-256 of the raw public key.
pub type NodeId = Hash;

/// A peer: where to reach it and the key it signs with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub endpoint: Endpoint,
    pub node_id: PublicKey,
}

impl Node {
    pub fn new(endpoint: Endpoint, node_id: PublicKey) -> Self {
        Self { endpoint, node_id }
    }

    /// The 32-byte node ID used for XOR distances.
    pub fn id(&self) -> NodeId {
        self.node_id.node_id()
    }
}

impl Serializer for Node {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let endpoint = Endpoint::read(reader)?;
        let node_id = PublicKey::from_bytes(reader.read_value()?)?;
        Ok(Self { endpoint, node_id })
    }

    fn write(&self, writer: &mut Writer) {
        self.endpoint.write(writer);
        writer.write_value(self.node_id.as_bytes());
    }

    fn size(&self) -> usize {
        1 + self.endpoint.size() + 3 + PUBLIC_KEY_SIZE
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_url(f)
    }
}
