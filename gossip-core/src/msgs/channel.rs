use bitcoin::constants::ChainHash;
use bitcoin::secp256k1::{ecdsa::Signature, PublicKey};
use lightning::io;
use lightning::ln::msgs::{self, DecodeError};
use lightning::types::features::ChannelFeatures;
use lightning::util::ser::{Readable, Writeable, Writer};

use super::{node_id_to_pubkey, Direction};
use crate::prelude::*;
use crate::scid::ShortChannelId;

/// `message_flags` bit signalling that `htlc_maximum_msat` is present
pub const MFLAG_HTLC_MAXIMUM: u8 = 1;
/// `channel_flags` bit holding the direction
pub const CFLAG_DIRECTION: u8 = 1;
/// `channel_flags` bit marking the channel disabled
pub const CFLAG_DISABLED: u8 = 2;

/// A claim that a channel was funded on chain, signed by both endpoints
/// and both funding keys.
///
/// Decoded from [`msgs::ChannelAnnouncement`], with all four keys checked
/// to be valid curve points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelAnnouncement {
    /// Signature by `node_id_1`
    pub node_signature_1: Signature,
    /// Signature by `node_id_2`
    pub node_signature_2: Signature,
    /// Signature by `bitcoin_key_1`
    pub bitcoin_signature_1: Signature,
    /// Signature by `bitcoin_key_2`
    pub bitcoin_signature_2: Signature,
    /// Channel feature bits
    pub features: ChannelFeatures,
    /// The chain the channel is funded on
    pub chain_hash: ChainHash,
    /// Location of the funding output
    pub short_channel_id: ShortChannelId,
    /// The lesser of the two endpoint node ids
    pub node_id_1: PublicKey,
    /// The greater of the two endpoint node ids
    pub node_id_2: PublicKey,
    /// Funding key of `node_id_1`
    pub bitcoin_key_1: PublicKey,
    /// Funding key of `node_id_2`
    pub bitcoin_key_2: PublicKey,
    /// Trailing fields this implementation does not understand
    pub excess_data: Vec<u8>,
}

impl ChannelAnnouncement {
    pub(crate) fn read(mut reader: &[u8]) -> Result<Self, DecodeError> {
        let msg: msgs::ChannelAnnouncement = Readable::read(&mut reader)?;
        let contents = msg.contents;
        Ok(ChannelAnnouncement {
            node_signature_1: msg.node_signature_1,
            node_signature_2: msg.node_signature_2,
            bitcoin_signature_1: msg.bitcoin_signature_1,
            bitcoin_signature_2: msg.bitcoin_signature_2,
            features: contents.features,
            chain_hash: contents.chain_hash,
            short_channel_id: ShortChannelId::from_u64(contents.short_channel_id),
            node_id_1: node_id_to_pubkey(&contents.node_id_1)?,
            node_id_2: node_id_to_pubkey(&contents.node_id_2)?,
            bitcoin_key_1: node_id_to_pubkey(&contents.bitcoin_key_1)?,
            bitcoin_key_2: node_id_to_pubkey(&contents.bitcoin_key_2)?,
            excess_data: contents.excess_data,
        })
    }

    /// The signed portion of the message
    pub fn contents(&self) -> msgs::UnsignedChannelAnnouncement {
        msgs::UnsignedChannelAnnouncement {
            features: self.features.clone(),
            chain_hash: self.chain_hash,
            short_channel_id: self.short_channel_id.to_u64(),
            node_id_1: self.node_id_1.into(),
            node_id_2: self.node_id_2.into(),
            bitcoin_key_1: self.bitcoin_key_1.into(),
            bitcoin_key_2: self.bitcoin_key_2.into(),
            excess_data: self.excess_data.clone(),
        }
    }

    /// The wire message
    pub fn to_msg(&self) -> msgs::ChannelAnnouncement {
        msgs::ChannelAnnouncement {
            node_signature_1: self.node_signature_1,
            node_signature_2: self.node_signature_2,
            bitcoin_signature_1: self.bitcoin_signature_1,
            bitcoin_signature_2: self.bitcoin_signature_2,
            contents: self.contents(),
        }
    }

    /// The bytes covered by the four signatures
    pub fn signed_data(&self) -> Vec<u8> {
        self.contents().encode()
    }

    /// The node that originates updates in the given direction
    pub fn node_id(&self, direction: Direction) -> &PublicKey {
        match direction {
            Direction::Node1 => &self.node_id_1,
            Direction::Node2 => &self.node_id_2,
        }
    }
}

/// Routing policy for one direction of a channel.
///
/// Unlike [`msgs::UnsignedChannelUpdate`], `htlc_maximum_msat` is optional,
/// so that updates predating its introduction keep their signed bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelUpdate {
    /// Signature by the originating endpoint
    pub signature: Signature,
    /// The chain the channel is funded on
    pub chain_hash: ChainHash,
    /// The channel being updated
    pub short_channel_id: ShortChannelId,
    /// Strictly increasing per direction
    pub timestamp: u32,
    /// See [`MFLAG_HTLC_MAXIMUM`]
    pub message_flags: u8,
    /// See [`CFLAG_DIRECTION`] and [`CFLAG_DISABLED`]
    pub channel_flags: u8,
    /// Blocks to subtract from incoming HTLC expiry
    pub cltv_expiry_delta: u16,
    /// Smallest HTLC accepted, in millisatoshi
    pub htlc_minimum_msat: u64,
    /// Fixed forwarding fee, in millisatoshi
    pub fee_base_msat: u32,
    /// Proportional forwarding fee
    pub fee_proportional_millionths: u32,
    /// Present iff [`MFLAG_HTLC_MAXIMUM`] is set in `message_flags`
    pub htlc_maximum_msat: Option<u64>,
    /// Trailing fields this implementation does not understand
    pub excess_data: Vec<u8>,
}

impl ChannelUpdate {
    pub(crate) fn read(mut reader: &[u8]) -> Result<Self, DecodeError> {
        let signature: Signature = Readable::read(&mut reader)?;
        let chain_hash: ChainHash = Readable::read(&mut reader)?;
        let short_channel_id: u64 = Readable::read(&mut reader)?;
        let timestamp: u32 = Readable::read(&mut reader)?;
        let message_flags: u8 = Readable::read(&mut reader)?;
        let channel_flags: u8 = Readable::read(&mut reader)?;
        let cltv_expiry_delta: u16 = Readable::read(&mut reader)?;
        let htlc_minimum_msat: u64 = Readable::read(&mut reader)?;
        let fee_base_msat: u32 = Readable::read(&mut reader)?;
        let fee_proportional_millionths: u32 = Readable::read(&mut reader)?;
        let htlc_maximum_msat = if message_flags & MFLAG_HTLC_MAXIMUM != 0 {
            Some(Readable::read(&mut reader)?)
        } else {
            None
        };
        Ok(ChannelUpdate {
            signature,
            chain_hash,
            short_channel_id: ShortChannelId::from_u64(short_channel_id),
            timestamp,
            message_flags,
            channel_flags,
            cltv_expiry_delta,
            htlc_minimum_msat,
            fee_base_msat,
            fee_proportional_millionths,
            htlc_maximum_msat,
            excess_data: reader.to_vec(),
        })
    }

    /// The bytes covered by the signature
    pub fn signed_data(&self) -> Vec<u8> {
        UnsignedChannelUpdate(self).encode()
    }

    /// Which endpoint sent this update
    pub fn direction(&self) -> Direction {
        if self.channel_flags & CFLAG_DIRECTION == 0 {
            Direction::Node1
        } else {
            Direction::Node2
        }
    }

    /// Whether the sender disabled the channel
    pub fn is_disabled(&self) -> bool {
        self.channel_flags & CFLAG_DISABLED != 0
    }
}

/// Everything after the signature
struct UnsignedChannelUpdate<'a>(&'a ChannelUpdate);

impl Writeable for UnsignedChannelUpdate<'_> {
    fn write<W: Writer>(&self, w: &mut W) -> Result<(), io::Error> {
        let msg = self.0;
        msg.chain_hash.write(w)?;
        msg.short_channel_id.to_u64().write(w)?;
        msg.timestamp.write(w)?;
        msg.message_flags.write(w)?;
        msg.channel_flags.write(w)?;
        msg.cltv_expiry_delta.write(w)?;
        msg.htlc_minimum_msat.write(w)?;
        msg.fee_base_msat.write(w)?;
        msg.fee_proportional_millionths.write(w)?;
        if let Some(max) = msg.htlc_maximum_msat {
            max.write(w)?;
        }
        w.write_all(&msg.excess_data)
    }
}

impl Writeable for ChannelUpdate {
    fn write<W: Writer>(&self, w: &mut W) -> Result<(), io::Error> {
        self.signature.write(w)?;
        UnsignedChannelUpdate(self).write(w)
    }
}
