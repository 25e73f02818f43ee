use bitcoin::secp256k1::{ecdsa::Signature, PublicKey};
use lightning::ln::msgs::{self, DecodeError, SocketAddress};
use lightning::routing::gossip::NodeAlias;
use lightning::types::features::NodeFeatures;
use lightning::util::ser::{Readable, Writeable};

use super::node_id_to_pubkey;
use crate::prelude::*;

/// Metadata a node publishes about itself
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeAnnouncement {
    /// Signature by `node_id`
    pub signature: Signature,
    /// Node feature bits
    pub features: NodeFeatures,
    /// Strictly increasing per node
    pub timestamp: u32,
    /// The announcing node
    pub node_id: PublicKey,
    /// Display color
    pub rgb_color: [u8; 3],
    /// Display name, zero padded
    pub alias: NodeAlias,
    /// Addresses the node accepts connections on
    pub addresses: Vec<SocketAddress>,
    /// The address list from the first unknown descriptor on
    pub excess_address_data: Vec<u8>,
    /// Trailing fields this implementation does not understand
    pub excess_data: Vec<u8>,
}

impl NodeAnnouncement {
    pub(crate) fn read(mut reader: &[u8]) -> Result<Self, DecodeError> {
        let msg: msgs::NodeAnnouncement = Readable::read(&mut reader)?;
        let contents = msg.contents;
        Ok(NodeAnnouncement {
            signature: msg.signature,
            features: contents.features,
            timestamp: contents.timestamp,
            node_id: node_id_to_pubkey(&contents.node_id)?,
            rgb_color: contents.rgb,
            alias: contents.alias,
            addresses: contents.addresses,
            excess_address_data: contents.excess_address_data,
            excess_data: contents.excess_data,
        })
    }

    /// The signed portion of the message
    pub fn contents(&self) -> msgs::UnsignedNodeAnnouncement {
        msgs::UnsignedNodeAnnouncement {
            features: self.features.clone(),
            timestamp: self.timestamp,
            node_id: self.node_id.into(),
            rgb: self.rgb_color,
            alias: self.alias,
            addresses: self.addresses.clone(),
            excess_address_data: self.excess_address_data.clone(),
            excess_data: self.excess_data.clone(),
        }
    }

    /// The wire message
    pub fn to_msg(&self) -> msgs::NodeAnnouncement {
        msgs::NodeAnnouncement { signature: self.signature, contents: self.contents() }
    }

    /// The bytes covered by the signature
    pub fn signed_data(&self) -> Vec<u8> {
        self.contents().encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_utils::fixtures::*;
    use crate::util::test_utils::expect_node_announcement;

    #[test]
    fn unknown_address_test() {
        let mut ann = expect_node_announcement(NODE_ANN_039CC9);
        ann.excess_address_data = vec![0x09, 0xaa, 0xbb];
        let bytes = ann.to_msg().encode();
        let decoded = NodeAnnouncement::read(&bytes).unwrap();
        assert_eq!(decoded.addresses, ann.addresses);
        assert_eq!(decoded.excess_address_data, vec![0x09, 0xaa, 0xbb]);
        assert!(decoded.excess_data.is_empty());
        assert!(NodeAnnouncement::read(&bytes[..bytes.len() - 10]).is_err());
    }

    #[test]
    fn alias_test() {
        let ann = expect_node_announcement(NODE_ANN_039CC9);
        assert_eq!(ann.alias.to_string(), "yalls.org");
        assert_eq!(ann.addresses[0].to_string(), "34.200.252.146:9735");
    }
}
