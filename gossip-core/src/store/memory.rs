use bitcoin::secp256k1::PublicKey;
use log::*;

use super::{Error, GossipStore};
use crate::msgs::{ChannelAnnouncement, ChannelUpdate, Direction, NodeAnnouncement};
use crate::prelude::*;
use crate::scid::ShortChannelId;

#[derive(Default)]
struct State {
    channel_announcements: OrderedMap<ShortChannelId, ChannelAnnouncement>,
    channel_updates: OrderedMap<(ShortChannelId, Direction), ChannelUpdate>,
    node_announcements: OrderedMap<PublicKey, NodeAnnouncement>,
    // endpoint -> announced channels
    node_channels: OrderedMap<PublicKey, OrderedSet<ShortChannelId>>,
}

impl State {
    fn index_channel(&mut self, node_id: &PublicKey, scid: ShortChannelId) {
        self.node_channels.entry(*node_id).or_default().insert(scid);
    }

    fn unindex_channel(&mut self, node_id: &PublicKey, scid: &ShortChannelId) {
        if let Some(channels) = self.node_channels.get_mut(node_id) {
            channels.remove(scid);
            if channels.is_empty() {
                self.node_channels.remove(node_id);
            }
        }
    }
}

/// A [`GossipStore`] held in memory, behind a single lock
pub struct MemoryGossipStore {
    name: &'static str,
    state: Mutex<State>,
}

impl MemoryGossipStore {
    /// Create an empty store.  The name only shows up in logs.
    pub fn new(name: &'static str) -> Self {
        MemoryGossipStore { name, state: Mutex::new(State::default()) }
    }

    fn state(&self) -> Result<MutexGuard<State>, Error> {
        self.state.lock().map_err(|_| Error::Internal(format!("{} store lock poisoned", self.name)))
    }
}

impl SendSync for MemoryGossipStore {}

impl GossipStore for MemoryGossipStore {
    fn put_channel_announcement(&self, msg: &ChannelAnnouncement) -> Result<(), Error> {
        let mut state = self.state()?;
        let scid = msg.short_channel_id;
        if let Some(old) = state.channel_announcements.insert(scid, msg.clone()) {
            state.unindex_channel(&old.node_id_1, &scid);
            state.unindex_channel(&old.node_id_2, &scid);
        }
        state.index_channel(&msg.node_id_1, scid);
        state.index_channel(&msg.node_id_2, scid);
        trace!("{}: {} {}", self.name, short_function!(), scid);
        Ok(())
    }

    fn put_channel_update(&self, msg: &ChannelUpdate) -> Result<bool, Error> {
        let mut state = self.state()?;
        let key = (msg.short_channel_id, msg.direction());
        match state.channel_updates.get(&key) {
            Some(existing) if existing.timestamp >= msg.timestamp => Ok(false),
            _ => {
                state.channel_updates.insert(key, msg.clone());
                trace!("{}: {} {}/{}", self.name, short_function!(), key.0, key.1);
                Ok(true)
            }
        }
    }

    fn put_node_announcement(&self, msg: &NodeAnnouncement) -> Result<bool, Error> {
        let mut state = self.state()?;
        match state.node_announcements.get(&msg.node_id) {
            Some(existing) if existing.timestamp >= msg.timestamp => Ok(false),
            _ => {
                state.node_announcements.insert(msg.node_id, msg.clone());
                trace!("{}: {} {}", self.name, short_function!(), msg.node_id);
                Ok(true)
            }
        }
    }

    fn find_channel_announcement(
        &self,
        scid: &ShortChannelId,
    ) -> Result<Option<ChannelAnnouncement>, Error> {
        Ok(self.state()?.channel_announcements.get(scid).cloned())
    }

    fn find_channel_update(
        &self,
        scid: &ShortChannelId,
        direction: Direction,
    ) -> Result<Option<ChannelUpdate>, Error> {
        Ok(self.state()?.channel_updates.get(&(*scid, direction)).cloned())
    }

    fn find_node_announcement(
        &self,
        node_id: &PublicKey,
    ) -> Result<Option<NodeAnnouncement>, Error> {
        Ok(self.state()?.node_announcements.get(node_id).cloned())
    }

    fn find_channels_for_node(&self, node_id: &PublicKey) -> Result<Vec<ShortChannelId>, Error> {
        let state = self.state()?;
        Ok(state
            .node_channels
            .get(node_id)
            .map(|channels| channels.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn take_channel_update(
        &self,
        scid: &ShortChannelId,
        direction: Direction,
    ) -> Result<Option<ChannelUpdate>, Error> {
        Ok(self.state()?.channel_updates.remove(&(*scid, direction)))
    }

    fn take_node_announcement(
        &self,
        node_id: &PublicKey,
    ) -> Result<Option<NodeAnnouncement>, Error> {
        Ok(self.state()?.node_announcements.remove(node_id))
    }

    fn channel_announcements(&self) -> Result<Vec<ChannelAnnouncement>, Error> {
        Ok(self.state()?.channel_announcements.values().cloned().collect())
    }

    fn channel_updates(&self) -> Result<Vec<ChannelUpdate>, Error> {
        Ok(self.state()?.channel_updates.values().cloned().collect())
    }

    fn node_announcements(&self) -> Result<Vec<NodeAnnouncement>, Error> {
        Ok(self.state()?.node_announcements.values().cloned().collect())
    }

    fn channel_announcement_count(&self) -> Result<usize, Error> {
        Ok(self.state()?.channel_announcements.len())
    }

    fn channel_update_count(&self) -> Result<usize, Error> {
        Ok(self.state()?.channel_updates.len())
    }

    fn node_announcement_count(&self) -> Result<usize, Error> {
        Ok(self.state()?.node_announcements.len())
    }
}
