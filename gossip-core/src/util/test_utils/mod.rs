use async_trait::async_trait;
use bitcoin::absolute::LockTime;
use bitcoin::block::{self, Header};
use bitcoin::constants::ChainHash;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{ecdsa::Signature, All, PublicKey, Secp256k1, SecretKey};
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, Block, BlockHash, CompactTarget, Network, OutPoint, ScriptBuf, Transaction,
    TxIn, TxMerkleNode, TxOut,
};
use lightning::ln::msgs::SocketAddress;
use lightning::routing::gossip::NodeAlias;
use lightning::types::features::{ChannelFeatures, NodeFeatures};

use crate::chain::{self, ChainClient};
use crate::msgs::{
    ChannelAnnouncement, ChannelUpdate, Direction, GossipMessage, NodeAnnouncement,
};
use crate::prelude::*;
use crate::scid::ShortChannelId;
use crate::store::{self, GossipStore, MemoryGossipStore};
use crate::util::crypto_utils::{funding_script_pubkey, sign_gossip};

/// Captured testnet gossip
pub mod fixtures;

/// Decode a hex fixture
pub fn decode_hex(hex_str: &str) -> GossipMessage {
    GossipMessage::decode(&hex::decode(hex_str).unwrap()).unwrap()
}

/// Decode a hex fixture that must be a channel_announcement
pub fn expect_channel_announcement(hex_str: &str) -> ChannelAnnouncement {
    match decode_hex(hex_str) {
        GossipMessage::ChannelAnnouncement(m) => m,
        m => panic!("expected channel_announcement, got {}", m),
    }
}

/// Decode a hex fixture that must be a channel_update
pub fn expect_channel_update(hex_str: &str) -> ChannelUpdate {
    match decode_hex(hex_str) {
        GossipMessage::ChannelUpdate(m) => m,
        m => panic!("expected channel_update, got {}", m),
    }
}

/// Decode a hex fixture that must be a node_announcement
pub fn expect_node_announcement(hex_str: &str) -> NodeAnnouncement {
    match decode_hex(hex_str) {
        GossipMessage::NodeAnnouncement(m) => m,
        m => panic!("expected node_announcement, got {}", m),
    }
}

/// Parse a compressed public key
pub fn pubkey_from_hex(hex_str: &str) -> PublicKey {
    PublicKey::from_slice(&hex::decode(hex_str).unwrap()).unwrap()
}

/// Parse a script
pub fn script_from_hex(hex_str: &str) -> ScriptBuf {
    ScriptBuf::from_hex(hex_str).unwrap()
}

/// Flip one bit of one of the four signatures of an announcement.
/// `index` counts node_signature_1, node_signature_2, bitcoin_signature_1,
/// bitcoin_signature_2.
pub fn corrupt_announcement_signature(
    ann: &ChannelAnnouncement,
    index: usize,
) -> ChannelAnnouncement {
    let mut bad = ann.clone();
    let sig = match index {
        0 => &mut bad.node_signature_1,
        1 => &mut bad.node_signature_2,
        2 => &mut bad.bitcoin_signature_1,
        3 => &mut bad.bitcoin_signature_2,
        _ => panic!("no signature {}", index),
    };
    *sig = corrupt_signature(sig);
    bad
}

/// Flip the lowest bit of a signature
pub fn corrupt_signature(sig: &Signature) -> Signature {
    let mut bytes = sig.serialize_compact();
    bytes[63] ^= 1;
    Signature::from_compact(&bytes).unwrap()
}

/// A block of `num_txs` distinct transactions.  Transactions are unique
/// across heights, so every funding outpoint is distinct.
pub fn make_block(height: u32, num_txs: u32) -> Block {
    let txdata = (0..num_txs)
        .map(|i| Transaction {
            version: Version::TWO,
            lock_time: LockTime::from_consensus(height),
            input: vec![TxIn::default()],
            output: vec![TxOut {
                value: Amount::from_sat(i as u64 + 1),
                script_pubkey: ScriptBuf::new(),
            }],
        })
        .collect();
    let header = Header {
        version: block::Version::ONE,
        prev_blockhash: BlockHash::all_zeros(),
        merkle_root: TxMerkleNode::all_zeros(),
        time: 0,
        bits: CompactTarget::from_consensus(0x207fffff),
        nonce: 0,
    };
    Block { header, txdata }
}

#[derive(Default)]
struct ChainState {
    block_hashes: Map<u32, BlockHash>,
    blocks: Map<BlockHash, Block>,
    utxos: Map<OutPoint, TxOut>,
}

/// A [`ChainClient`] method
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChainCall {
    /// `get_block_hash`
    BlockHash,
    /// `get_block`
    Block,
    /// `get_utxo`
    Utxo,
}

impl ChainCall {
    /// Every method
    pub const ALL: [ChainCall; 3] = [ChainCall::BlockHash, ChainCall::Block, ChainCall::Utxo];
}

/// A scripted chain source
pub struct MockChainClient {
    state: Mutex<ChainState>,
    failing: Mutex<OrderedSet<ChainCall>>,
}

impl MockChainClient {
    /// An empty chain
    pub fn new() -> Self {
        MockChainClient {
            state: Mutex::new(ChainState::default()),
            failing: Mutex::new(OrderedSet::new()),
        }
    }

    /// Make every lookup fail with a backend error
    pub fn set_failing(&self, failing: bool) {
        for call in ChainCall::ALL {
            self.set_call_failing(call, failing);
        }
    }

    /// Make one kind of lookup fail with a backend error
    pub fn set_call_failing(&self, call: ChainCall, failing: bool) {
        let mut calls = self.failing.lock().unwrap();
        if failing {
            calls.insert(call);
        } else {
            calls.remove(&call);
        }
    }

    /// Register a block hash for `height`
    pub fn add_block_hash(&self, height: u32) -> BlockHash {
        let hash = BlockHash::hash(&height.to_be_bytes());
        self.state.lock().unwrap().block_hashes.insert(height, hash);
        hash
    }

    /// Register a block under `hash`
    pub fn add_block(&self, hash: BlockHash, block: Block) {
        self.state.lock().unwrap().blocks.insert(hash, block);
    }

    /// Register an unspent output
    pub fn add_utxo(&self, outpoint: OutPoint, script_pubkey: ScriptBuf) {
        let txout = TxOut { value: Amount::from_sat(1_000_000), script_pubkey };
        self.state.lock().unwrap().utxos.insert(outpoint, txout);
    }

    /// Spend an output
    pub fn spend_utxo(&self, outpoint: &OutPoint) {
        self.state.lock().unwrap().utxos.remove(outpoint);
    }

    /// Make `scid` point to an unspent output paying to `script_pubkey`.
    /// Returns the funding outpoint.
    pub fn fund_channel(&self, scid: &ShortChannelId, script_pubkey: ScriptBuf) -> OutPoint {
        let height = scid.block_height();
        let hash = self.add_block_hash(height);
        // keep transactions of channels funded earlier in the same block
        let existing = self.state.lock().unwrap().blocks.get(&hash).map_or(0, |b| b.txdata.len());
        let block = make_block(height, (scid.tx_index() + 1).max(existing as u32));
        let outpoint = scid.outpoint(block.txdata[scid.tx_index() as usize].compute_txid());
        self.add_block(hash, block);
        self.add_utxo(outpoint, script_pubkey);
        outpoint
    }

    /// Fund the three channels of [`fixtures`], returning their outpoints
    pub fn fund_fixture_channels(&self) -> Vec<OutPoint> {
        [
            ("1288457x3x0", fixtures::FUNDING_SCRIPT_1288457),
            ("1288462x3x0", fixtures::FUNDING_SCRIPT_1288462),
            ("1288470x4x0", fixtures::FUNDING_SCRIPT_1288470),
        ]
        .into_iter()
        .map(|(scid, script)| self.fund_channel(&scid.parse().unwrap(), script_from_hex(script)))
        .collect()
    }

    fn check_failing(&self, call: ChainCall) -> Result<(), chain::Error> {
        if self.failing.lock().unwrap().contains(&call) {
            return Err(chain::Error::Unavailable(format!("mock {:?} failure", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_block_hash(&self, height: u32) -> Result<Option<BlockHash>, chain::Error> {
        self.check_failing(ChainCall::BlockHash)?;
        Ok(self.state.lock().unwrap().block_hashes.get(&height).cloned())
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, chain::Error> {
        self.check_failing(ChainCall::Block)?;
        Ok(self.state.lock().unwrap().blocks.get(hash).cloned())
    }

    async fn get_utxo(&self, outpoint: &OutPoint) -> Result<Option<TxOut>, chain::Error> {
        self.check_failing(ChainCall::Utxo)?;
        Ok(self.state.lock().unwrap().utxos.get(outpoint).cloned())
    }
}

impl SendSync for MockChainClient {}

/// A [`GossipStore`] write
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreWrite {
    /// `put_channel_announcement`
    PutChannelAnnouncement,
    /// `put_channel_update`
    PutChannelUpdate,
    /// `put_node_announcement`
    PutNodeAnnouncement,
    /// `take_channel_update` and `take_node_announcement`
    Take,
}

impl StoreWrite {
    /// Every write
    pub const ALL: [StoreWrite; 4] = [
        StoreWrite::PutChannelAnnouncement,
        StoreWrite::PutChannelUpdate,
        StoreWrite::PutNodeAnnouncement,
        StoreWrite::Take,
    ];
}

/// A memory store whose writes can be made to fail
pub struct FailingGossipStore {
    inner: MemoryGossipStore,
    failing: Mutex<OrderedSet<StoreWrite>>,
}

impl FailingGossipStore {
    /// A working store
    pub fn new() -> Self {
        FailingGossipStore {
            inner: MemoryGossipStore::new("failing"),
            failing: Mutex::new(OrderedSet::new()),
        }
    }

    /// Make every write fail
    pub fn set_failing(&self, failing: bool) {
        for write in StoreWrite::ALL {
            self.set_write_failing(write, failing);
        }
    }

    /// Make one kind of write fail
    pub fn set_write_failing(&self, write: StoreWrite, failing: bool) {
        let mut writes = self.failing.lock().unwrap();
        if failing {
            writes.insert(write);
        } else {
            writes.remove(&write);
        }
    }

    fn check_failing(&self, write: StoreWrite) -> Result<(), store::Error> {
        if self.failing.lock().unwrap().contains(&write) {
            return Err(store::Error::Unavailable("disk full".to_string()));
        }
        Ok(())
    }
}

impl SendSync for FailingGossipStore {}

impl GossipStore for FailingGossipStore {
    fn put_channel_announcement(&self, msg: &ChannelAnnouncement) -> Result<(), store::Error> {
        self.check_failing(StoreWrite::PutChannelAnnouncement)?;
        self.inner.put_channel_announcement(msg)
    }

    fn put_channel_update(&self, msg: &ChannelUpdate) -> Result<bool, store::Error> {
        self.check_failing(StoreWrite::PutChannelUpdate)?;
        self.inner.put_channel_update(msg)
    }

    fn put_node_announcement(&self, msg: &NodeAnnouncement) -> Result<bool, store::Error> {
        self.check_failing(StoreWrite::PutNodeAnnouncement)?;
        self.inner.put_node_announcement(msg)
    }

    fn find_channel_announcement(
        &self,
        scid: &ShortChannelId,
    ) -> Result<Option<ChannelAnnouncement>, store::Error> {
        self.inner.find_channel_announcement(scid)
    }

    fn find_channel_update(
        &self,
        scid: &ShortChannelId,
        direction: Direction,
    ) -> Result<Option<ChannelUpdate>, store::Error> {
        self.inner.find_channel_update(scid, direction)
    }

    fn find_node_announcement(
        &self,
        node_id: &PublicKey,
    ) -> Result<Option<NodeAnnouncement>, store::Error> {
        self.inner.find_node_announcement(node_id)
    }

    fn find_channels_for_node(
        &self,
        node_id: &PublicKey,
    ) -> Result<Vec<ShortChannelId>, store::Error> {
        self.inner.find_channels_for_node(node_id)
    }

    fn take_channel_update(
        &self,
        scid: &ShortChannelId,
        direction: Direction,
    ) -> Result<Option<ChannelUpdate>, store::Error> {
        self.check_failing(StoreWrite::Take)?;
        self.inner.take_channel_update(scid, direction)
    }

    fn take_node_announcement(
        &self,
        node_id: &PublicKey,
    ) -> Result<Option<NodeAnnouncement>, store::Error> {
        self.check_failing(StoreWrite::Take)?;
        self.inner.take_node_announcement(node_id)
    }

    fn channel_announcements(&self) -> Result<Vec<ChannelAnnouncement>, store::Error> {
        self.inner.channel_announcements()
    }

    fn channel_updates(&self) -> Result<Vec<ChannelUpdate>, store::Error> {
        self.inner.channel_updates()
    }

    fn node_announcements(&self) -> Result<Vec<NodeAnnouncement>, store::Error> {
        self.inner.node_announcements()
    }

    fn channel_announcement_count(&self) -> Result<usize, store::Error> {
        self.inner.channel_announcement_count()
    }

    fn channel_update_count(&self) -> Result<usize, store::Error> {
        self.inner.channel_update_count()
    }

    fn node_announcement_count(&self) -> Result<usize, store::Error> {
        self.inner.node_announcement_count()
    }
}

fn placeholder_signature() -> Signature {
    Signature::from_compact(&[1u8; 64]).unwrap()
}

fn secret(byte: u8) -> SecretKey {
    SecretKey::from_slice(&[byte; 32]).unwrap()
}

/// A synthetic channel whose keys are known, so that any update or node
/// announcement for it can be signed.
pub struct TestChannel {
    secp_ctx: Secp256k1<All>,
    /// Secrets of node_id_1 and node_id_2
    pub node_secrets: [SecretKey; 2],
    /// Secrets of bitcoin_key_1 and bitcoin_key_2
    pub bitcoin_secrets: [SecretKey; 2],
    /// The signed announcement
    pub announcement: ChannelAnnouncement,
}

impl TestChannel {
    /// Build and sign an announcement for `scid`.  `seed` selects the keys;
    /// channels built with the same seed share their endpoints.
    pub fn new(scid: ShortChannelId, seed: u8) -> Self {
        assert!(seed < 60, "seed out of range");
        let secp_ctx = Secp256k1::new();
        let mut node_secrets = [secret(seed * 4 + 1), secret(seed * 4 + 2)];
        node_secrets.sort_by_key(|s| PublicKey::from_secret_key(&secp_ctx, s).serialize());
        let bitcoin_secrets = [secret(seed * 4 + 3), secret(seed * 4 + 4)];
        let pubkey = |s: &SecretKey| PublicKey::from_secret_key(&secp_ctx, s);
        let mut announcement = ChannelAnnouncement {
            node_signature_1: placeholder_signature(),
            node_signature_2: placeholder_signature(),
            bitcoin_signature_1: placeholder_signature(),
            bitcoin_signature_2: placeholder_signature(),
            features: ChannelFeatures::empty(),
            chain_hash: ChainHash::using_genesis_block(Network::Regtest),
            short_channel_id: scid,
            node_id_1: pubkey(&node_secrets[0]),
            node_id_2: pubkey(&node_secrets[1]),
            bitcoin_key_1: pubkey(&bitcoin_secrets[0]),
            bitcoin_key_2: pubkey(&bitcoin_secrets[1]),
            excess_data: vec![],
        };
        let data = announcement.signed_data();
        announcement.node_signature_1 = sign_gossip(&secp_ctx, &data, &node_secrets[0]);
        announcement.node_signature_2 = sign_gossip(&secp_ctx, &data, &node_secrets[1]);
        announcement.bitcoin_signature_1 = sign_gossip(&secp_ctx, &data, &bitcoin_secrets[0]);
        announcement.bitcoin_signature_2 = sign_gossip(&secp_ctx, &data, &bitcoin_secrets[1]);
        TestChannel { secp_ctx, node_secrets, bitcoin_secrets, announcement }
    }

    /// Build the channel and fund it on `chain`
    pub fn funded(chain: &MockChainClient, scid: ShortChannelId, seed: u8) -> Self {
        let channel = TestChannel::new(scid, seed);
        chain.fund_channel(&scid, channel.funding_script());
        channel
    }

    /// The expected funding output script
    pub fn funding_script(&self) -> ScriptBuf {
        funding_script_pubkey(&self.announcement.bitcoin_key_1, &self.announcement.bitcoin_key_2)
    }

    /// The short channel id
    pub fn scid(&self) -> ShortChannelId {
        self.announcement.short_channel_id
    }

    /// The node id at one end
    pub fn node_id(&self, direction: Direction) -> PublicKey {
        *self.announcement.node_id(direction)
    }

    /// A signed update from the `direction` endpoint
    pub fn update(&self, direction: Direction, timestamp: u32, fee_base_msat: u32) -> ChannelUpdate {
        let mut update = ChannelUpdate {
            signature: placeholder_signature(),
            chain_hash: self.announcement.chain_hash,
            short_channel_id: self.scid(),
            timestamp,
            message_flags: 0,
            channel_flags: direction.as_u8(),
            cltv_expiry_delta: 144,
            htlc_minimum_msat: 1000,
            fee_base_msat,
            fee_proportional_millionths: 1,
            htlc_maximum_msat: None,
            excess_data: vec![],
        };
        update.signature = sign_gossip(
            &self.secp_ctx,
            &update.signed_data(),
            &self.node_secrets[direction as usize],
        );
        update
    }

    /// A signed node announcement for the `direction` endpoint
    pub fn node_announcement(
        &self,
        direction: Direction,
        timestamp: u32,
        alias: &str,
    ) -> NodeAnnouncement {
        let mut alias_bytes = [0u8; 32];
        alias_bytes[..alias.len()].copy_from_slice(alias.as_bytes());
        let mut ann = NodeAnnouncement {
            signature: placeholder_signature(),
            features: NodeFeatures::empty(),
            timestamp,
            node_id: self.node_id(direction),
            rgb_color: [1, 2, 3],
            alias: NodeAlias(alias_bytes),
            addresses: vec![SocketAddress::TcpIpV4 { addr: [127, 0, 0, 1], port: 9735 }],
            excess_address_data: vec![],
            excess_data: vec![],
        };
        ann.signature =
            sign_gossip(&self.secp_ctx, &ann.signed_data(), &self.node_secrets[direction as usize]);
        ann
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::crypto_utils::verify_gossip_signature;

    #[test]
    fn test_channel_test() {
        let scid = ShortChannelId::new(100, 1, 0).unwrap();
        let channel = TestChannel::new(scid, 1);
        let ann = &channel.announcement;
        assert!(ann.node_id_1.serialize() < ann.node_id_2.serialize());
        let secp_ctx = Secp256k1::verification_only();
        let data = ann.signed_data();
        assert!(verify_gossip_signature(&secp_ctx, &data, &ann.node_signature_1, &ann.node_id_1));
        assert!(verify_gossip_signature(&secp_ctx, &data, &ann.bitcoin_signature_2, &ann.bitcoin_key_2));

        let update = channel.update(Direction::Node2, 10, 5);
        assert_eq!(update.direction(), Direction::Node2);
        assert!(verify_gossip_signature(
            &secp_ctx,
            &update.signed_data(),
            &update.signature,
            &ann.node_id_2
        ));
    }

    #[test]
    fn make_block_test() {
        let block = make_block(7, 3);
        assert_eq!(block.txdata.len(), 3);
        assert_ne!(block.txdata[0].compute_txid(), block.txdata[1].compute_txid());
        let other = make_block(8, 3);
        assert_ne!(block.txdata[2].compute_txid(), other.txdata[2].compute_txid());
    }

    #[tokio::test]
    async fn fund_fixture_channels_test() {
        let chain = MockChainClient::new();
        let outpoints = chain.fund_fixture_channels();
        let distinct: OrderedSet<_> = outpoints.iter().collect();
        assert_eq!(distinct.len(), 3);
        for (outpoint, script) in outpoints.iter().zip([
            fixtures::FUNDING_SCRIPT_1288457,
            fixtures::FUNDING_SCRIPT_1288462,
            fixtures::FUNDING_SCRIPT_1288470,
        ]) {
            let utxo = chain.get_utxo(outpoint).await.unwrap().unwrap();
            assert_eq!(utxo.script_pubkey, script_from_hex(script));
        }
    }

    #[tokio::test]
    async fn fund_same_block_test() {
        let chain = MockChainClient::new();
        let high = chain.fund_channel(&ShortChannelId::new(500, 4, 0).unwrap(), ScriptBuf::new());
        let low = chain.fund_channel(&ShortChannelId::new(500, 1, 0).unwrap(), ScriptBuf::new());
        let hash = chain.get_block_hash(500).await.unwrap().unwrap();
        let block = chain.get_block(&hash).await.unwrap().unwrap();
        assert_eq!(block.txdata.len(), 5);
        assert_eq!(block.txdata[4].compute_txid(), high.txid);
        assert_eq!(block.txdata[1].compute_txid(), low.txid);
    }
}
