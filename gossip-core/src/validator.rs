use bitcoin::secp256k1::{ecdsa::Signature, PublicKey, Secp256k1, VerifyOnly};
use tracing::*;

use crate::chain::ChainClient;
use crate::error::{WireError, WireErrorCode::*};
use crate::msgs::{ChannelAnnouncement, ChannelUpdate, NodeAnnouncement};
use crate::prelude::*;
use crate::util::crypto_utils::{funding_script_pubkey, verify_gossip_signature};
use crate::wire_err;
use crate::Arc;

/// Checks gossip messages against their signatures and the chain.
///
/// Chain lookups that fail are logged and classified as not found.
pub struct GossipValidator {
    chain_client: Arc<dyn ChainClient>,
    secp_ctx: Secp256k1<VerifyOnly>,
}

impl GossipValidator {
    /// Create a validator that consults `chain_client`
    pub fn new(chain_client: Arc<dyn ChainClient>) -> Self {
        GossipValidator { chain_client, secp_ctx: Secp256k1::verification_only() }
    }

    /// Check that the announced funding output exists, is unspent, pays
    /// to the 2-of-2 of the announced bitcoin keys, and that all four
    /// signatures are valid.
    ///
    /// The chain steps run in order, so the first missing link determines
    /// the error code.
    #[instrument(skip_all, fields(scid = %msg.short_channel_id))]
    pub async fn validate_channel_announcement(
        &self,
        msg: &ChannelAnnouncement,
    ) -> Result<(), WireError> {
        let scid = &msg.short_channel_id;

        let block_hash = match self.chain_client.get_block_hash(scid.block_height()).await {
            Ok(Some(hash)) => hash,
            Ok(None) => wire_err!(ChanBadBlockHash, "no block at height {}", scid.block_height()),
            Err(e) => {
                warn!("get_block_hash {}: {}", scid.block_height(), e);
                wire_err!(ChanBadBlockHash, "no block at height {}", scid.block_height())
            }
        };

        let block = match self.chain_client.get_block(&block_hash).await {
            Ok(Some(block)) => block,
            Ok(None) => wire_err!(ChanBadBlock, "block {} not found", block_hash),
            Err(e) => {
                warn!("get_block {}: {}", block_hash, e);
                wire_err!(ChanBadBlock, "block {} not found", block_hash)
            }
        };

        let tx = match block.txdata.get(scid.tx_index() as usize) {
            Some(tx) => tx,
            None => wire_err!(
                ChanAnnBadTx,
                "block {} has {} transactions, no index {}",
                block_hash,
                block.txdata.len(),
                scid.tx_index()
            ),
        };
        let outpoint = scid.outpoint(tx.compute_txid());

        let utxo = match self.chain_client.get_utxo(&outpoint).await {
            Ok(Some(txout)) => txout,
            Ok(None) => wire_err!(ChanUtxoSpent, "{} is not unspent", outpoint),
            Err(e) => {
                warn!("get_utxo {}: {}", outpoint, e);
                wire_err!(ChanUtxoSpent, "{} is not unspent", outpoint)
            }
        };

        let expected_script = funding_script_pubkey(&msg.bitcoin_key_1, &msg.bitcoin_key_2);
        if utxo.script_pubkey != expected_script {
            wire_err!(
                ChanBadScript,
                "{} pays to {}, expected {}",
                outpoint,
                utxo.script_pubkey,
                expected_script
            );
        }

        let signed_data = msg.signed_data();
        let checks: [(&Signature, &PublicKey, &str); 4] = [
            (&msg.node_signature_1, &msg.node_id_1, "node_signature_1"),
            (&msg.node_signature_2, &msg.node_id_2, "node_signature_2"),
            (&msg.bitcoin_signature_1, &msg.bitcoin_key_1, "bitcoin_signature_1"),
            (&msg.bitcoin_signature_2, &msg.bitcoin_key_2, "bitcoin_signature_2"),
        ];
        for (sig, pubkey, name) in checks {
            if !verify_gossip_signature(&self.secp_ctx, &signed_data, sig, pubkey) {
                wire_err!(ChanAnnSigFailed, "{} does not verify with {}", name, pubkey);
            }
        }

        debug!("channel_announcement {} valid", scid);
        Ok(())
    }

    /// Check a channel update against the announcement of its channel and
    /// the update currently stored for the same direction, if any.
    pub fn validate_channel_update(
        &self,
        msg: &ChannelUpdate,
        announcement: &ChannelAnnouncement,
        existing: Option<&ChannelUpdate>,
    ) -> Result<(), WireError> {
        if let Some(existing) = existing {
            if msg.timestamp <= existing.timestamp {
                wire_err!(
                    Outdated,
                    "channel_update {}/{} timestamp {} is not newer than {}",
                    msg.short_channel_id,
                    msg.direction(),
                    msg.timestamp,
                    existing.timestamp
                );
            }
        }
        let node_id = announcement.node_id(msg.direction());
        if !verify_gossip_signature(&self.secp_ctx, &msg.signed_data(), &msg.signature, node_id) {
            wire_err!(
                ChanUpdSigFailed,
                "channel_update {}/{} does not verify with {}",
                msg.short_channel_id,
                msg.direction(),
                node_id
            );
        }
        Ok(())
    }

    /// Check a node announcement's signature and that it is newer than the
    /// stored one, if any
    pub fn validate_node_announcement(
        &self,
        msg: &NodeAnnouncement,
        existing: Option<&NodeAnnouncement>,
    ) -> Result<(), WireError> {
        if let Some(existing) = existing {
            if msg.timestamp <= existing.timestamp {
                wire_err!(
                    Outdated,
                    "node_announcement {} timestamp {} is not newer than {}",
                    msg.node_id,
                    msg.timestamp,
                    existing.timestamp
                );
            }
        }
        if !verify_gossip_signature(&self.secp_ctx, &msg.signed_data(), &msg.signature, &msg.node_id)
        {
            wire_err!(NodeAnnSigFailed, "node_announcement {} does not verify", msg.node_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_utils::fixtures::*;
    use crate::util::test_utils::*;
    use test_log::test;

    fn setup() -> (Arc<MockChainClient>, GossipValidator) {
        let chain = Arc::new(MockChainClient::new());
        let validator = GossipValidator::new(chain.clone());
        (chain, validator)
    }

    #[tokio::test]
    async fn valid_announcement_test() {
        let (chain, validator) = setup();
        chain.fund_fixture_channels();
        for fixture in [CHAN_ANN_1288457, CHAN_ANN_1288462, CHAN_ANN_1288470] {
            let ann = expect_channel_announcement(fixture);
            validator.validate_channel_announcement(&ann).await.unwrap();
        }
    }

    #[tokio::test]
    async fn chain_failure_codes_test() {
        let (chain, validator) = setup();
        let ann = expect_channel_announcement(CHAN_ANN_1288457);
        let scid = ann.short_channel_id;
        let code = |r: Result<(), WireError>| r.unwrap_err().code;

        assert_eq!(code(validator.validate_channel_announcement(&ann).await), ChanBadBlockHash);

        let block_hash = chain.add_block_hash(scid.block_height());
        assert_eq!(code(validator.validate_channel_announcement(&ann).await), ChanBadBlock);

        // a block too short for the claimed index
        chain.add_block(block_hash, make_block(scid.block_height(), scid.tx_index()));
        assert_eq!(code(validator.validate_channel_announcement(&ann).await), ChanAnnBadTx);

        let block = make_block(scid.block_height(), scid.tx_index() + 1);
        let txid = block.txdata[scid.tx_index() as usize].compute_txid();
        chain.add_block(block_hash, block);
        assert_eq!(code(validator.validate_channel_announcement(&ann).await), ChanUtxoSpent);

        chain.add_utxo(scid.outpoint(txid), script_from_hex(FUNDING_SCRIPT_1288462));
        assert_eq!(code(validator.validate_channel_announcement(&ann).await), ChanBadScript);

        chain.add_utxo(scid.outpoint(txid), script_from_hex(FUNDING_SCRIPT_1288457));
        validator.validate_channel_announcement(&ann).await.unwrap();
    }

    #[tokio::test]
    async fn backend_error_is_not_found_test() {
        let (chain, validator) = setup();
        chain.fund_fixture_channels();
        chain.set_failing(true);
        let ann = expect_channel_announcement(CHAN_ANN_1288457);
        let err = validator.validate_channel_announcement(&ann).await.unwrap_err();
        assert_eq!(err.code, ChanBadBlockHash);
    }

    #[tokio::test]
    async fn backend_error_per_lookup_test() {
        let (chain, validator) = setup();
        chain.fund_fixture_channels();
        let ann = expect_channel_announcement(CHAN_ANN_1288457);
        let code = |r: Result<(), WireError>| r.unwrap_err().code;

        chain.set_call_failing(ChainCall::Block, true);
        assert_eq!(code(validator.validate_channel_announcement(&ann).await), ChanBadBlock);

        chain.set_call_failing(ChainCall::Block, false);
        chain.set_call_failing(ChainCall::Utxo, true);
        assert_eq!(code(validator.validate_channel_announcement(&ann).await), ChanUtxoSpent);

        chain.set_call_failing(ChainCall::Utxo, false);
        validator.validate_channel_announcement(&ann).await.unwrap();
    }

    #[tokio::test]
    async fn announcement_signature_test() {
        let (chain, validator) = setup();
        chain.fund_fixture_channels();
        let ann = expect_channel_announcement(CHAN_ANN_1288457);
        for index in 0..4 {
            let bad = corrupt_announcement_signature(&ann, index);
            let err = validator.validate_channel_announcement(&bad).await.unwrap_err();
            assert_eq!(err.code, ChanAnnSigFailed, "signature {}", index);
        }
    }

    #[test]
    fn channel_update_test() {
        let (_, validator) = setup();
        let ann = expect_channel_announcement(CHAN_ANN_1288457);
        let upd = expect_channel_update(CHAN_UPD_1288457_DIR0);
        validator.validate_channel_update(&upd, &ann, None).unwrap();

        let bad = expect_channel_update(CHAN_UPD_1288457_DIR0_BAD_SIG);
        let err = validator.validate_channel_update(&bad, &ann, None).unwrap_err();
        assert_eq!(err.code, ChanUpdSigFailed);

        // signed by the other endpoint
        let mut flipped = upd.clone();
        flipped.channel_flags ^= 1;
        let err = validator.validate_channel_update(&flipped, &ann, None).unwrap_err();
        assert_eq!(err.code, ChanUpdSigFailed);

        let err = validator.validate_channel_update(&upd, &ann, Some(&upd)).unwrap_err();
        assert_eq!(err.code, Outdated);
    }

    #[test]
    fn node_announcement_test() {
        let (_, validator) = setup();
        let ann = expect_node_announcement(NODE_ANN_039CC9);
        validator.validate_node_announcement(&ann, None).unwrap();

        let bad = expect_node_announcement(NODE_ANN_039CC9_BAD_SIG);
        let err = validator.validate_node_announcement(&bad, None).unwrap_err();
        assert_eq!(err.code, NodeAnnSigFailed);

        let mut newer = ann.clone();
        newer.timestamp += 1;
        let err = validator.validate_node_announcement(&ann, Some(&newer)).unwrap_err();
        assert_eq!(err.code, Outdated);
    }
}
