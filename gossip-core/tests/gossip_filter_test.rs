use std::time::Duration;

use lightning_gossip::error::{GossipError, WireErrorCode};
use lightning_gossip::filter::{GossipEvent, GossipFilter};
use lightning_gossip::msgs::{Direction, GossipMessage};
use lightning_gossip::scid::ShortChannelId;
use lightning_gossip::store::{self, GossipStore, MemoryGossipStore};
use lightning_gossip::util::test_utils::fixtures::*;
use lightning_gossip::util::test_utils::*;
use lightning_gossip::Arc;
use test_log::test;
use tokio::sync::mpsc::UnboundedReceiver;

struct Harness {
    chain: Arc<MockChainClient>,
    gossip: Arc<dyn GossipStore>,
    pending: Arc<MemoryGossipStore>,
    filter: Arc<GossipFilter>,
    events: UnboundedReceiver<GossipEvent>,
}

impl Harness {
    fn with_store(gossip: Arc<dyn GossipStore>) -> Self {
        let chain = Arc::new(MockChainClient::new());
        let pending = Arc::new(MemoryGossipStore::new("pending"));
        let filter = Arc::new(GossipFilter::new(chain.clone(), gossip.clone(), pending.clone()));
        let events = filter.subscribe();
        Harness { chain, gossip, pending, filter, events }
    }

    fn unfunded() -> Self {
        Harness::with_store(Arc::new(MemoryGossipStore::new("gossip")))
    }

    fn funded() -> Self {
        let harness = Harness::unfunded();
        harness.chain.fund_fixture_channels();
        harness
    }

    fn drain_events(&mut self) -> Vec<GossipEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    async fn submit_hex(&mut self, fixtures: &[&str]) -> Vec<GossipEvent> {
        for fixture in fixtures {
            self.filter.enqueue_raw(&hex::decode(fixture).unwrap());
        }
        self.filter.flush().await.unwrap();
        self.drain_events()
    }

    async fn submit(&mut self, msgs: Vec<GossipMessage>) -> Vec<GossipEvent> {
        for msg in msgs {
            self.filter.enqueue(msg);
        }
        self.filter.flush().await.unwrap();
        self.drain_events()
    }

    fn gossip_counts(&self) -> (usize, usize, usize) {
        counts(&*self.gossip)
    }

    fn pending_counts(&self) -> (usize, usize, usize) {
        counts(&*self.pending)
    }
}

fn counts(store: &dyn GossipStore) -> (usize, usize, usize) {
    (
        store.channel_announcement_count().unwrap(),
        store.channel_update_count().unwrap(),
        store.node_announcement_count().unwrap(),
    )
}

fn committed(events: &[GossipEvent]) -> Vec<GossipMessage> {
    events
        .iter()
        .filter_map(|e| match e {
            GossipEvent::Message(m) => Some(m.clone()),
            _ => None,
        })
        .collect()
}

fn error_codes(events: &[GossipEvent]) -> Vec<WireErrorCode> {
    events
        .iter()
        .filter_map(|e| match e {
            GossipEvent::Error { error, .. } => Some(error.code),
            _ => None,
        })
        .collect()
}

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let first = rest.remove(i);
        for mut perm in permutations(&rest) {
            perm.insert(0, first.clone());
            result.push(perm);
        }
    }
    result
}

#[test]
fn permutations_test() {
    let perms = permutations(&[1, 2, 3]);
    assert_eq!(perms.len(), 6);
    assert_eq!(perms[0], vec![1, 2, 3]);
    assert_eq!(perms[5], vec![3, 2, 1]);
}

#[tokio::test]
async fn all_valid_gossip_test() {
    let mut harness = Harness::funded();
    let events = harness.submit_hex(&VALID_GOSSIP).await;
    assert_eq!(harness.gossip_counts(), (3, 5, 4));
    assert_eq!(harness.pending_counts(), (0, 0, 0));
    assert_eq!(committed(&events).len(), 12);
    assert!(error_codes(&events).is_empty());
    assert_eq!(events.last(), Some(&GossipEvent::Flushed));
}

#[tokio::test]
async fn channel_announcement_test() {
    let mut harness = Harness::funded();
    let ann = expect_channel_announcement(CHAN_ANN_1288457);
    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    assert_eq!(events, vec![GossipEvent::Message(ann.clone().into()), GossipEvent::Flushed]);
    let scid: ShortChannelId = "1288457x3x0".parse().unwrap();
    assert_eq!(harness.gossip.find_channel_announcement(&scid).unwrap(), Some(ann));
}

#[tokio::test]
async fn node_announcement_waits_for_channel_test() {
    let mut harness = Harness::funded();
    let events = harness.submit_hex(&[NODE_ANN_039CC9]).await;
    assert_eq!(events, vec![GossipEvent::Flushed]);
    assert_eq!(harness.pending_counts(), (0, 0, 1));
    assert_eq!(harness.gossip_counts(), (0, 0, 0));

    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    let expected = vec![decode_hex(CHAN_ANN_1288457), decode_hex(NODE_ANN_039CC9)];
    assert_eq!(committed(&events), expected);
    assert_eq!(harness.pending_counts(), (0, 0, 0));
    assert_eq!(harness.gossip_counts(), (1, 0, 1));
}

#[tokio::test]
async fn channel_update_waits_for_channel_test() {
    let mut harness = Harness::funded();
    harness.submit_hex(&[CHAN_UPD_1288457_DIR1]).await;
    assert_eq!(harness.pending_counts(), (0, 1, 0));
    assert_eq!(harness.gossip_counts(), (0, 0, 0));

    harness.submit_hex(&[CHAN_ANN_1288457]).await;
    assert_eq!(harness.pending_counts(), (0, 0, 0));
    let scid: ShortChannelId = "1288457x3x0".parse().unwrap();
    let update = harness.gossip.find_channel_update(&scid, Direction::Node2).unwrap().unwrap();
    assert_eq!(update.timestamp, 1525140553);
    assert_eq!(update.cltv_expiry_delta, 144);
    assert_eq!(update.fee_base_msat, 1000);
    assert_eq!(update.fee_proportional_millionths, 1);
    assert_eq!(update.htlc_minimum_msat, 1000);
    assert!(!update.is_disabled());
}

#[tokio::test]
async fn replay_order_test() {
    let mut harness = Harness::funded();
    harness
        .submit_hex(&[NODE_ANN_039CC9, CHAN_UPD_1288457_DIR1, NODE_ANN_036B96, CHAN_UPD_1288457_DIR0])
        .await;
    assert_eq!(harness.pending_counts(), (0, 2, 2));

    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    let expected: Vec<GossipMessage> = [
        CHAN_ANN_1288457,
        CHAN_UPD_1288457_DIR0,
        CHAN_UPD_1288457_DIR1,
        NODE_ANN_036B96,
        NODE_ANN_039CC9,
    ]
    .iter()
    .map(|h| decode_hex(h))
    .collect();
    assert_eq!(committed(&events), expected);
}

#[tokio::test]
async fn bad_announcement_signature_test() {
    let ann = expect_channel_announcement(CHAN_ANN_1288457);
    for index in 0..4 {
        let mut harness = Harness::funded();
        harness.submit_hex(&[CHAN_UPD_1288457_DIR1]).await;
        let bad = corrupt_announcement_signature(&ann, index);
        let events = harness.submit(vec![bad.into()]).await;
        assert_eq!(error_codes(&events), vec![WireErrorCode::ChanAnnSigFailed]);
        assert_eq!(harness.gossip_counts(), (0, 0, 0));
        // the update keeps waiting
        assert_eq!(harness.pending_counts(), (0, 1, 0));
    }
}

#[tokio::test]
async fn bad_update_signature_test() {
    let mut harness = Harness::funded();
    let events = harness.submit_hex(&[CHAN_ANN_1288457, CHAN_UPD_1288457_DIR0_BAD_SIG]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::ChanUpdSigFailed]);
    assert_eq!(harness.gossip_counts(), (1, 0, 0));
}

#[tokio::test]
async fn bad_node_signature_test() {
    let mut harness = Harness::funded();
    let events = harness.submit_hex(&[CHAN_ANN_1288457, NODE_ANN_039CC9_BAD_SIG]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::NodeAnnSigFailed]);
    assert_eq!(harness.gossip_counts(), (1, 0, 0));
}

#[tokio::test]
async fn bad_node_signature_replayed_test() {
    let mut harness = Harness::funded();
    harness.submit_hex(&[NODE_ANN_039CC9_BAD_SIG]).await;
    assert_eq!(harness.pending_counts(), (0, 0, 1));
    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::NodeAnnSigFailed]);
    assert_eq!(harness.gossip_counts(), (1, 0, 0));
    assert_eq!(harness.pending_counts(), (0, 0, 0));
}

#[tokio::test]
async fn undecodable_test() {
    let mut harness = Harness::funded();
    let events = harness.submit_hex(&[CHAN_ANN_1288457_BAD_KEY, CHAN_ANN_1288462]).await;
    match &events[0] {
        GossipEvent::Error { error, message } => {
            assert_eq!(error.code, WireErrorCode::EncodingError);
            assert_eq!(message, &None);
        }
        e => panic!("unexpected {:?}", e),
    }
    assert_eq!(harness.gossip_counts(), (1, 0, 0));
}

#[tokio::test]
async fn missing_block_hash_test() {
    let mut harness = Harness::unfunded();
    let scid_2: ShortChannelId = "1288462x3x0".parse().unwrap();
    harness.chain.fund_channel(&scid_2, script_from_hex(FUNDING_SCRIPT_1288462));

    let events = harness.submit_hex(&[CHAN_ANN_1288462, CHAN_ANN_1288457]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::ChanBadBlockHash]);
    // earlier data is untouched
    assert_eq!(harness.gossip_counts(), (1, 0, 0));
    assert!(harness.gossip.find_channel_announcement(&scid_2).unwrap().is_some());
}

#[tokio::test]
async fn chain_failure_test() {
    let scid: ShortChannelId = "1288457x3x0".parse().unwrap();

    let mut harness = Harness::unfunded();
    harness.chain.add_block_hash(scid.block_height());
    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::ChanBadBlock]);

    let mut harness = Harness::unfunded();
    let hash = harness.chain.add_block_hash(scid.block_height());
    harness.chain.add_block(hash, make_block(scid.block_height(), 2));
    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::ChanAnnBadTx]);

    let mut harness = Harness::unfunded();
    let outpoint = harness.chain.fund_channel(&scid, script_from_hex(FUNDING_SCRIPT_1288457));
    harness.chain.spend_utxo(&outpoint);
    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::ChanUtxoSpent]);

    let mut harness = Harness::unfunded();
    harness.chain.fund_channel(&scid, script_from_hex(FUNDING_SCRIPT_1288470));
    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::ChanBadScript]);
    assert_eq!(harness.gossip_counts(), (0, 0, 0));
}

#[tokio::test]
async fn duplicate_announcement_test() {
    let mut harness = Harness::funded();
    let events = harness.submit_hex(&[CHAN_ANN_1288457, CHAN_ANN_1288457]).await;
    assert_eq!(committed(&events).len(), 2);
    assert_eq!(harness.gossip_counts(), (1, 0, 0));
}

#[tokio::test]
async fn update_latest_wins_test() {
    let scid = ShortChannelId::new(700_000, 12, 1).unwrap();

    // committed, newer first
    let mut harness = Harness::unfunded();
    let channel = TestChannel::funded(&harness.chain, scid, 7);
    let older = channel.update(Direction::Node1, 1000, 10);
    let newer = channel.update(Direction::Node1, 2000, 20);
    let events = harness
        .submit(vec![channel.announcement.clone().into(), newer.clone().into(), older.clone().into()])
        .await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::Outdated]);
    assert_eq!(harness.gossip.channel_updates().unwrap(), vec![newer.clone()]);

    // committed, older first
    let mut harness = Harness::unfunded();
    harness.chain.fund_channel(&scid, channel.funding_script());
    let events = harness
        .submit(vec![channel.announcement.clone().into(), older.clone().into(), newer.clone().into()])
        .await;
    assert!(error_codes(&events).is_empty());
    assert_eq!(harness.gossip.channel_updates().unwrap(), vec![newer.clone()]);

    // pending, both orders
    for updates in [[older.clone(), newer.clone()], [newer.clone(), older.clone()]] {
        let mut harness = Harness::unfunded();
        harness.chain.fund_channel(&scid, channel.funding_script());
        harness.submit(updates.iter().cloned().map(Into::into).collect()).await;
        assert_eq!(harness.pending.channel_updates().unwrap().len(), 1);
        let events = harness.submit(vec![channel.announcement.clone().into()]).await;
        assert!(error_codes(&events).is_empty());
        assert_eq!(harness.gossip.channel_updates().unwrap(), vec![newer.clone()]);
        assert_eq!(harness.pending_counts(), (0, 0, 0));
    }
}

#[tokio::test]
async fn node_latest_wins_test() {
    let scid = ShortChannelId::new(700_001, 3, 0).unwrap();
    let mut harness = Harness::unfunded();
    let channel = TestChannel::funded(&harness.chain, scid, 8);
    let older = channel.node_announcement(Direction::Node2, 50, "old");
    let newer = channel.node_announcement(Direction::Node2, 60, "new");

    // the stale pending message is discarded without an event
    let events = harness.submit(vec![newer.clone().into(), older.clone().into()]).await;
    assert_eq!(events, vec![GossipEvent::Flushed]);
    assert_eq!(harness.pending.node_announcements().unwrap(), vec![newer.clone()]);

    harness.submit(vec![channel.announcement.clone().into()]).await;
    let events = harness.submit(vec![older.into()]).await;
    assert_eq!(error_codes(&events), vec![WireErrorCode::Outdated]);
    let stored = harness.gossip.find_node_announcement(&newer.node_id).unwrap().unwrap();
    assert_eq!(stored.alias.to_string(), "new");
}

#[tokio::test]
async fn permutation_invariance_test() {
    let fixtures = &VALID_GOSSIP[..5];

    let mut reference = Harness::funded();
    reference.submit_hex(fixtures).await;
    let expected_channels = reference.gossip.channel_announcements().unwrap();
    let expected_updates = reference.gossip.channel_updates().unwrap();
    let expected_nodes = reference.gossip.node_announcements().unwrap();
    assert_eq!(reference.gossip_counts(), (1, 2, 2));

    let orders = permutations(fixtures);
    assert_eq!(orders.len(), 120);
    for order in orders {
        let mut harness = Harness::funded();
        let events = harness.submit_hex(&order).await;
        assert!(error_codes(&events).is_empty());
        assert_eq!(harness.gossip.channel_announcements().unwrap(), expected_channels);
        assert_eq!(harness.gossip.channel_updates().unwrap(), expected_updates);
        assert_eq!(harness.gossip.node_announcements().unwrap(), expected_nodes);
        assert_eq!(harness.pending_counts(), (0, 0, 0));
    }
}

#[tokio::test]
async fn worker_test() {
    let mut harness = Harness::funded();
    let handle = harness.filter.start();
    for fixture in VALID_GOSSIP {
        harness.filter.enqueue_raw(&hex::decode(fixture).unwrap());
    }

    let mut committed_count = 0;
    while committed_count < VALID_GOSSIP.len() {
        let event = tokio::time::timeout(Duration::from_secs(10), harness.events.recv())
            .await
            .expect("timed out waiting for events")
            .expect("event channel closed");
        match event {
            GossipEvent::Message(_) => committed_count += 1,
            GossipEvent::Flushed => {}
            GossipEvent::Error { error, .. } => panic!("unexpected error {}", error),
        }
    }

    harness.filter.stop();
    handle.await.unwrap().unwrap();
    assert_eq!(harness.gossip_counts(), (3, 5, 4));
    assert_eq!(harness.filter.queue_len(), 0);
}

#[tokio::test]
async fn store_failure_test() {
    let store = Arc::new(FailingGossipStore::new());
    let mut harness = Harness::with_store(store.clone());
    harness.chain.fund_fixture_channels();
    store.set_failing(true);

    harness.filter.enqueue_raw(&hex::decode(CHAN_ANN_1288457).unwrap());
    harness.filter.enqueue_raw(&hex::decode(CHAN_ANN_1288462).unwrap());
    let err = harness.filter.flush().await.unwrap_err();
    assert_eq!(err, GossipError::Store(store::Error::Unavailable("disk full".to_string())));
    // failures are not events
    assert!(harness.drain_events().is_empty());
    // the interrupted message is kept
    assert_eq!(harness.filter.queue_len(), 2);

    store.set_failing(false);
    harness.filter.flush().await.unwrap();
    assert_eq!(committed(&harness.drain_events()).len(), 2);
    assert_eq!(harness.filter.queue_len(), 0);

    store.set_failing(true);

    // the worker surfaces the failure through its handle
    let handle = harness.filter.start();
    harness.filter.enqueue_raw(&hex::decode(CHAN_ANN_1288470).unwrap());
    let err = handle.await.unwrap().unwrap_err();
    assert!(matches!(err, GossipError::Store(_)));
}

#[tokio::test]
async fn store_failure_keeps_replays_test() {
    let store = Arc::new(FailingGossipStore::new());
    let mut harness = Harness::with_store(store.clone());
    harness.chain.fund_fixture_channels();
    store.set_write_failing(StoreWrite::PutChannelUpdate, true);

    let events =
        harness.submit_hex(&[CHAN_UPD_1288457_DIR0, CHAN_UPD_1288457_DIR1, NODE_ANN_039CC9]).await;
    assert_eq!(events, vec![GossipEvent::Flushed]);
    assert_eq!(harness.pending_counts(), (0, 2, 1));

    harness.filter.enqueue_raw(&hex::decode(CHAN_ANN_1288457).unwrap());
    assert!(harness.filter.flush().await.is_err());
    assert_eq!(committed(&harness.drain_events()).len(), 1);
    // taken out of the pending store, but still held in the queue
    assert_eq!(harness.pending_counts(), (0, 0, 0));
    assert_eq!(harness.filter.queue_len(), 3);

    store.set_write_failing(StoreWrite::PutChannelUpdate, false);
    let events = harness.submit(vec![]).await;
    let expected: Vec<GossipMessage> = [CHAN_UPD_1288457_DIR0, CHAN_UPD_1288457_DIR1, NODE_ANN_039CC9]
        .iter()
        .map(|fixture| decode_hex(fixture))
        .collect();
    assert_eq!(committed(&events), expected);
    assert_eq!(harness.gossip_counts(), (1, 2, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_drains_before_stop_test() {
    let harness = Harness::unfunded();
    let scid = ShortChannelId::new(800_000, 1, 0).unwrap();
    let channel = TestChannel::funded(&harness.chain, scid, 9);
    let handle = harness.filter.start();
    harness.filter.enqueue(channel.announcement.clone().into());
    for timestamp in 1..=50 {
        harness.filter.enqueue(channel.update(Direction::Node1, timestamp, timestamp).into());
    }
    harness.filter.stop();
    handle.await.unwrap().unwrap();

    assert_eq!(harness.filter.queue_len(), 0);
    let stored = harness.gossip.find_channel_update(&scid, Direction::Node1).unwrap().unwrap();
    assert_eq!(stored.timestamp, 50);
}

#[tokio::test]
async fn dropped_subscriber_test() {
    let mut harness = Harness::funded();
    let extra = harness.filter.subscribe();
    drop(extra);
    let events = harness.submit_hex(&[CHAN_ANN_1288457]).await;
    assert_eq!(committed(&events).len(), 1);
}
