mod channel;
mod node;

pub use channel::*;
pub use node::*;

use core::fmt;

use bitcoin::secp256k1::PublicKey;
use lightning::ln::msgs::DecodeError;
use lightning::routing::gossip::NodeId;
use lightning::util::ser::{Readable, Writeable};

use crate::error::{wire_error, WireError, WireErrorCode::EncodingError};
use crate::prelude::*;

/// Wire type of channel_announcement
pub const CHANNEL_ANNOUNCEMENT_TYPE: u16 = 256;
/// Wire type of node_announcement
pub const NODE_ANNOUNCEMENT_TYPE: u16 = 257;
/// Wire type of channel_update
pub const CHANNEL_UPDATE_TYPE: u16 = 258;

/// Which endpoint of a channel a channel_update comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Sent by `node_id_1`
    Node1 = 0,
    /// Sent by `node_id_2`
    Node2 = 1,
}

impl Direction {
    /// Both directions, in replay order
    pub const ALL: [Direction; 2] = [Direction::Node1, Direction::Node2];

    /// The `channel_flags` bit value
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A decoded gossip message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GossipMessage {
    /// Type 256
    ChannelAnnouncement(ChannelAnnouncement),
    /// Type 258
    ChannelUpdate(ChannelUpdate),
    /// Type 257
    NodeAnnouncement(NodeAnnouncement),
}

impl GossipMessage {
    /// Decode a message, including its two-byte type prefix
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut reader = bytes;
        let message_type: u16 = Readable::read(&mut reader)
            .map_err(|e| wire_error(EncodingError, format!("no message type: {}", e)))?;
        let msg = match message_type {
            CHANNEL_ANNOUNCEMENT_TYPE => ChannelAnnouncement::read(reader).map(Self::from),
            NODE_ANNOUNCEMENT_TYPE => NodeAnnouncement::read(reader).map(Self::from),
            CHANNEL_UPDATE_TYPE => ChannelUpdate::read(reader).map(Self::from),
            t => return Err(wire_error(EncodingError, format!("unexpected message type {}", t))),
        };
        msg.map_err(|e| {
            wire_error(EncodingError, format!("malformed message of type {}: {}", message_type, e))
        })
    }

    /// Encode to wire bytes, including the type prefix
    pub fn encode(&self) -> Vec<u8> {
        let mut w = self.message_type().encode();
        w.extend(match self {
            GossipMessage::ChannelAnnouncement(m) => m.to_msg().encode(),
            GossipMessage::ChannelUpdate(m) => m.encode(),
            GossipMessage::NodeAnnouncement(m) => m.to_msg().encode(),
        });
        w
    }

    /// The wire type
    pub fn message_type(&self) -> u16 {
        match self {
            GossipMessage::ChannelAnnouncement(_) => CHANNEL_ANNOUNCEMENT_TYPE,
            GossipMessage::ChannelUpdate(_) => CHANNEL_UPDATE_TYPE,
            GossipMessage::NodeAnnouncement(_) => NODE_ANNOUNCEMENT_TYPE,
        }
    }

    /// The bytes the message signatures commit to
    pub fn signed_data(&self) -> Vec<u8> {
        match self {
            GossipMessage::ChannelAnnouncement(m) => m.signed_data(),
            GossipMessage::ChannelUpdate(m) => m.signed_data(),
            GossipMessage::NodeAnnouncement(m) => m.signed_data(),
        }
    }

    /// A short human readable name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            GossipMessage::ChannelAnnouncement(_) => "channel_announcement",
            GossipMessage::ChannelUpdate(_) => "channel_update",
            GossipMessage::NodeAnnouncement(_) => "node_announcement",
        }
    }
}

/// Gossip carries node ids as raw bytes; reject those that are not curve points
pub(crate) fn node_id_to_pubkey(node_id: &NodeId) -> Result<PublicKey, DecodeError> {
    node_id.as_pubkey().map_err(|_| DecodeError::InvalidValue)
}

impl fmt::Display for GossipMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GossipMessage::ChannelAnnouncement(m) => {
                write!(f, "channel_announcement {}", m.short_channel_id)
            }
            GossipMessage::ChannelUpdate(m) => write!(
                f,
                "channel_update {}/{} ts {}",
                m.short_channel_id,
                m.direction(),
                m.timestamp
            ),
            GossipMessage::NodeAnnouncement(m) =>
                write!(f, "node_announcement {} ts {}", m.node_id, m.timestamp),
        }
    }
}

impl From<ChannelAnnouncement> for GossipMessage {
    fn from(m: ChannelAnnouncement) -> Self {
        GossipMessage::ChannelAnnouncement(m)
    }
}

impl From<ChannelUpdate> for GossipMessage {
    fn from(m: ChannelUpdate) -> Self {
        GossipMessage::ChannelUpdate(m)
    }
}

impl From<NodeAnnouncement> for GossipMessage {
    fn from(m: NodeAnnouncement) -> Self {
        GossipMessage::NodeAnnouncement(m)
    }
}
