use log::*;

use crate::msgs::{ChannelAnnouncement, Direction, GossipMessage};
use crate::prelude::*;
use crate::store::{self, GossipStore};
use crate::Arc;

/// Holds channel updates and node announcements until their channel is
/// announced, then hands them back for processing.
///
/// Messages here are unvalidated.  At most one message is held per key, and
/// a newer one replaces an older one.
pub struct PendingResolver {
    store: Arc<dyn GossipStore>,
}

impl PendingResolver {
    /// Create a resolver backed by `store`
    pub fn new(store: Arc<dyn GossipStore>) -> Self {
        PendingResolver { store }
    }

    /// The backing store
    pub fn store(&self) -> &Arc<dyn GossipStore> {
        &self.store
    }

    /// Hold a message until its channel is announced.
    ///
    /// Returns false if the message was discarded because the held message
    /// for the same key is at least as new.  Channel announcements are never
    /// deferred.
    pub fn defer(&self, msg: GossipMessage) -> Result<bool, store::Error> {
        let stored = match &msg {
            GossipMessage::ChannelUpdate(m) => self.store.put_channel_update(m)?,
            GossipMessage::NodeAnnouncement(m) => self.store.put_node_announcement(m)?,
            GossipMessage::ChannelAnnouncement(m) => {
                return Err(store::Error::Internal(format!(
                    "cannot defer channel_announcement {}",
                    m.short_channel_id
                )))
            }
        };
        if stored {
            debug!("deferred {}", msg);
        } else {
            debug!("discarded {}, superseded by pending", msg);
        }
        Ok(stored)
    }

    /// Remove and return the messages unblocked by `announcement`: its
    /// updates in direction 0 then 1, then the announcements of node 1
    /// then node 2.
    pub fn resolve(
        &self,
        announcement: &ChannelAnnouncement,
    ) -> Result<Vec<GossipMessage>, store::Error> {
        let scid = &announcement.short_channel_id;
        let mut resolved = Vec::new();
        for direction in Direction::ALL {
            if let Some(update) = self.store.take_channel_update(scid, direction)? {
                resolved.push(GossipMessage::ChannelUpdate(update));
            }
        }
        for node_id in [&announcement.node_id_1, &announcement.node_id_2] {
            if let Some(node_ann) = self.store.take_node_announcement(node_id)? {
                resolved.push(GossipMessage::NodeAnnouncement(node_ann));
            }
        }
        if !resolved.is_empty() {
            debug!("{} unblocked {} pending messages", scid, resolved.len());
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scid::ShortChannelId;
    use crate::store::MemoryGossipStore;
    use crate::util::test_utils::TestChannel;
    use test_log::test;

    fn setup() -> (Arc<MemoryGossipStore>, PendingResolver, TestChannel) {
        let store = Arc::new(MemoryGossipStore::new("pending"));
        let resolver = PendingResolver::new(store.clone());
        let channel = TestChannel::new(ShortChannelId::new(500, 2, 1).unwrap(), 3);
        (store, resolver, channel)
    }

    #[test]
    fn latest_wins_test() {
        let (store, resolver, channel) = setup();
        let older = channel.update(Direction::Node1, 100, 1);
        let newer = channel.update(Direction::Node1, 200, 2);

        assert!(resolver.defer(newer.clone().into()).unwrap());
        assert!(!resolver.defer(older.clone().into()).unwrap());
        assert!(!resolver.defer(newer.clone().into()).unwrap());
        assert_eq!(store.channel_updates().unwrap(), vec![newer.clone()]);

        let (store, resolver, _) = setup();
        assert!(resolver.defer(older.into()).unwrap());
        assert!(resolver.defer(newer.clone().into()).unwrap());
        assert_eq!(store.channel_updates().unwrap(), vec![newer]);
    }

    #[test]
    fn resolve_order_test() {
        let (store, resolver, channel) = setup();
        let node_2 = channel.node_announcement(Direction::Node2, 10, "two");
        let node_1 = channel.node_announcement(Direction::Node1, 10, "one");
        let update_1 = channel.update(Direction::Node2, 10, 1);
        let update_0 = channel.update(Direction::Node1, 10, 1);
        let arrivals: [GossipMessage; 4] =
            [node_2.clone().into(), node_1.clone().into(), update_1.clone().into(), update_0.clone().into()];
        for msg in arrivals {
            assert!(resolver.defer(msg).unwrap());
        }

        let resolved = resolver.resolve(&channel.announcement).unwrap();
        let expected: Vec<GossipMessage> =
            vec![update_0.into(), update_1.into(), node_1.into(), node_2.into()];
        assert_eq!(resolved, expected);
        assert_eq!(store.channel_update_count().unwrap(), 0);
        assert_eq!(store.node_announcement_count().unwrap(), 0);
        assert!(resolver.resolve(&channel.announcement).unwrap().is_empty());
    }

    #[test]
    fn resolve_other_channel_test() {
        let (store, resolver, channel) = setup();
        let other = TestChannel::new(ShortChannelId::new(501, 0, 0).unwrap(), 4);
        assert!(resolver.defer(channel.update(Direction::Node1, 10, 1).into()).unwrap());
        assert!(resolver.resolve(&other.announcement).unwrap().is_empty());
        assert_eq!(store.channel_update_count().unwrap(), 1);
    }

    #[test]
    fn defer_announcement_test() {
        let (_, resolver, channel) = setup();
        assert!(resolver.defer(channel.announcement.clone().into()).is_err());
    }
}
