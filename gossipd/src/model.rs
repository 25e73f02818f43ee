use std::collections::BTreeMap;

use lightning_gossip::filter::GossipEvent;
use lightning_gossip::msgs::{ChannelAnnouncement, ChannelUpdate, NodeAnnouncement};
use lightning_gossip::store::{self, GossipStore};
use serde::{Deserialize, Serialize};

/// Outcome of a replay
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SummaryModel {
    /// Lines that were not hex
    pub not_hex: usize,
    /// Committed messages by kind
    pub committed: BTreeMap<String, usize>,
    /// Rejections by error code
    pub rejected: BTreeMap<String, usize>,
    /// Stored channel announcements
    pub channels: usize,
    /// Stored channel updates
    pub channel_updates: usize,
    /// Stored node announcements
    pub nodes: usize,
    /// Channel updates still waiting for their channel
    pub pending_channel_updates: usize,
    /// Node announcements still waiting for a channel
    pub pending_node_announcements: usize,
}

impl SummaryModel {
    /// Count an event
    pub fn record(&mut self, event: &GossipEvent) {
        match event {
            GossipEvent::Message(msg) =>
                *self.committed.entry(msg.kind().to_string()).or_default() += 1,
            GossipEvent::Error { error, .. } =>
                *self.rejected.entry(error.code.to_string()).or_default() += 1,
            GossipEvent::Flushed => {}
        }
    }

    /// Take the final store sizes
    pub fn set_counts(
        &mut self,
        gossip_store: &dyn GossipStore,
        pending_store: &dyn GossipStore,
    ) -> Result<(), store::Error> {
        self.channels = gossip_store.channel_announcement_count()?;
        self.channel_updates = gossip_store.channel_update_count()?;
        self.nodes = gossip_store.node_announcement_count()?;
        self.pending_channel_updates = pending_store.channel_update_count()?;
        self.pending_node_announcements = pending_store.node_announcement_count()?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UpdateModel {
    pub direction: u8,
    pub timestamp: u32,
    pub disabled: bool,
    pub cltv_expiry_delta: u16,
    pub htlc_minimum_msat: u64,
    pub htlc_maximum_msat: Option<u64>,
    pub fee_base_msat: u32,
    pub fee_proportional_millionths: u32,
}

impl From<&ChannelUpdate> for UpdateModel {
    fn from(update: &ChannelUpdate) -> Self {
        Self {
            direction: update.direction().as_u8(),
            timestamp: update.timestamp,
            disabled: update.is_disabled(),
            cltv_expiry_delta: update.cltv_expiry_delta,
            htlc_minimum_msat: update.htlc_minimum_msat,
            htlc_maximum_msat: update.htlc_maximum_msat,
            fee_base_msat: update.fee_base_msat,
            fee_proportional_millionths: update.fee_proportional_millionths,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelModel {
    pub short_channel_id: String,
    pub node_id_1: String,
    pub node_id_2: String,
    pub updates: Vec<UpdateModel>,
}

impl ChannelModel {
    fn new(ann: &ChannelAnnouncement, updates: Vec<UpdateModel>) -> Self {
        Self {
            short_channel_id: ann.short_channel_id.to_string(),
            node_id_1: ann.node_id_1.to_string(),
            node_id_2: ann.node_id_2.to_string(),
            updates,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeModel {
    pub node_id: String,
    pub alias: String,
    pub rgb_color: String,
    pub timestamp: u32,
    pub addresses: Vec<String>,
}

impl From<&NodeAnnouncement> for NodeModel {
    fn from(ann: &NodeAnnouncement) -> Self {
        Self {
            node_id: ann.node_id.to_string(),
            alias: ann.alias.to_string(),
            rgb_color: hex::encode(ann.rgb_color),
            timestamp: ann.timestamp,
            addresses: ann.addresses.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// The validated graph
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GraphModel {
    pub channels: Vec<ChannelModel>,
    pub nodes: Vec<NodeModel>,
}

impl GraphModel {
    /// Snapshot a gossip store
    pub fn from_store(store: &dyn GossipStore) -> Result<Self, store::Error> {
        let mut updates: BTreeMap<_, Vec<UpdateModel>> = BTreeMap::new();
        for update in store.channel_updates()? {
            updates.entry(update.short_channel_id).or_default().push((&update).into());
        }
        let channels = store
            .channel_announcements()?
            .iter()
            .map(|ann| {
                ChannelModel::new(ann, updates.remove(&ann.short_channel_id).unwrap_or_default())
            })
            .collect();
        let nodes = store.node_announcements()?.iter().map(NodeModel::from).collect();
        Ok(Self { channels, nodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightning_gossip::error::{wire_error, WireErrorCode};
    use lightning_gossip::store::MemoryGossipStore;
    use lightning_gossip::util::test_utils::fixtures::*;
    use lightning_gossip::util::test_utils::{
        decode_hex, expect_channel_announcement, expect_channel_update, expect_node_announcement,
    };
    use test_log::test;

    #[test]
    fn summary_record_test() {
        let mut summary = SummaryModel::default();
        summary.record(&GossipEvent::Message(decode_hex(CHAN_ANN_1288457)));
        summary.record(&GossipEvent::Message(decode_hex(CHAN_UPD_1288457_DIR1)));
        summary.record(&GossipEvent::Message(decode_hex(CHAN_UPD_1288457_DIR0)));
        summary.record(&GossipEvent::Error {
            error: wire_error(WireErrorCode::ChanBadScript, "script 1 mismatch"),
            message: None,
        });
        summary.record(&GossipEvent::Flushed);
        assert_eq!(summary.committed["channel_announcement"], 1);
        assert_eq!(summary.committed["channel_update"], 2);
        assert_eq!(summary.rejected["chan_bad_script"], 1);
        assert_eq!(summary.rejected.len(), 1);
    }

    #[test]
    fn graph_test() {
        let store = MemoryGossipStore::new("test");
        let ann = expect_channel_announcement(CHAN_ANN_1288457);
        let update = expect_channel_update(CHAN_UPD_1288457_DIR0);
        let node = expect_node_announcement(NODE_ANN_039CC9);
        store.put_channel_announcement(&ann).unwrap();
        store.put_channel_announcement(&expect_channel_announcement(CHAN_ANN_1288462)).unwrap();
        store.put_channel_update(&update).unwrap();
        store.put_node_announcement(&node).unwrap();

        let graph = GraphModel::from_store(&store).unwrap();
        assert_eq!(graph.channels.len(), 2);
        let channel = &graph.channels[0];
        assert_eq!(channel.short_channel_id, "1288457x3x0");
        assert_eq!(channel.updates, vec![UpdateModel::from(&update)]);
        assert!(channel.updates[0].disabled);
        assert!(graph.channels[1].updates.is_empty());

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].alias, "yalls.org");
        assert_eq!(graph.nodes[0].rgb_color, "f8e71c");
        assert_eq!(graph.nodes[0].addresses, vec!["34.200.252.146:9735".to_string()]);

        let json = serde_json::to_string(&graph).unwrap();
        let parsed: GraphModel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, graph);
    }
}
