use core::fmt;

use bitcoin::secp256k1::PublicKey;

use crate::msgs::{ChannelAnnouncement, ChannelUpdate, Direction, NodeAnnouncement};
use crate::prelude::*;
use crate::scid::ShortChannelId;

/// An in-memory store
pub mod memory;

pub use memory::MemoryGossipStore;

#[derive(Clone, Debug, PartialEq)]
/// Error returned by a gossip store
pub enum Error {
    /// Store is temporarily unavailable, might work later
    Unavailable(String),
    /// Inconsistent state, needed resource is missing
    NotFound(String),
    /// Inconsistent state, resource already present
    AlreadyExists(String),
    /// Non-recoverable internal error
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Unavailable(s) => write!(f, "unavailable: {}", s),
            Error::NotFound(s) => write!(f, "not found: {}", s),
            Error::AlreadyExists(s) => write!(f, "already exists: {}", s),
            Error::Internal(s) => write!(f, "internal: {}", s),
        }
    }
}

impl std::error::Error for Error {}

/// Keyed storage for gossip messages.
///
/// The filter uses two instances: the durable gossip store, holding
/// validated messages, and the pending store, holding unvalidated messages
/// that wait for their channel.
///
/// Updates and node announcements are upserted only if strictly newer than
/// what is held for the same key.  Implementations must make the
/// compare-and-replace atomic.
pub trait GossipStore: SendSync {
    /// Insert or replace a channel announcement
    fn put_channel_announcement(&self, msg: &ChannelAnnouncement) -> Result<(), Error>;

    /// Store a channel update if it is newer than the one held for its
    /// channel and direction.  Returns whether it was stored.
    fn put_channel_update(&self, msg: &ChannelUpdate) -> Result<bool, Error>;

    /// Store a node announcement if it is newer than the one held for its
    /// node.  Returns whether it was stored.
    fn put_node_announcement(&self, msg: &NodeAnnouncement) -> Result<bool, Error>;

    /// Look up a channel announcement
    fn find_channel_announcement(
        &self,
        scid: &ShortChannelId,
    ) -> Result<Option<ChannelAnnouncement>, Error>;

    /// Look up the update for one direction of a channel
    fn find_channel_update(
        &self,
        scid: &ShortChannelId,
        direction: Direction,
    ) -> Result<Option<ChannelUpdate>, Error>;

    /// Look up a node announcement
    fn find_node_announcement(&self, node_id: &PublicKey)
        -> Result<Option<NodeAnnouncement>, Error>;

    /// The channels announced with `node_id` as an endpoint
    fn find_channels_for_node(&self, node_id: &PublicKey) -> Result<Vec<ShortChannelId>, Error>;

    /// Remove and return the update for one direction of a channel
    fn take_channel_update(
        &self,
        scid: &ShortChannelId,
        direction: Direction,
    ) -> Result<Option<ChannelUpdate>, Error>;

    /// Remove and return a node announcement
    fn take_node_announcement(&self, node_id: &PublicKey)
        -> Result<Option<NodeAnnouncement>, Error>;

    /// All channel announcements, ordered by short channel id
    fn channel_announcements(&self) -> Result<Vec<ChannelAnnouncement>, Error>;

    /// All channel updates, ordered by short channel id and direction
    fn channel_updates(&self) -> Result<Vec<ChannelUpdate>, Error>;

    /// All node announcements, ordered by node id
    fn node_announcements(&self) -> Result<Vec<NodeAnnouncement>, Error>;

    /// Number of channel announcements
    fn channel_announcement_count(&self) -> Result<usize, Error>;

    /// Number of channel updates
    fn channel_update_count(&self) -> Result<usize, Error>;

    /// Number of node announcements
    fn node_announcement_count(&self) -> Result<usize, Error>;
}
