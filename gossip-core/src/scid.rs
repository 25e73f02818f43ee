use core::fmt;
use core::str::FromStr;

use bitcoin::OutPoint;
use lightning::util::scid_utils::{self, ShortChannelIdError};

use crate::error::{wire_error, WireError, WireErrorCode::EncodingError};
use crate::prelude::*;

/// Locates a channel's funding output on chain: block height, transaction
/// index within the block and output index within the transaction.
///
/// Packs into a u64 as 24 bits of height, 24 bits of transaction index and
/// 16 bits of output index.  Ordering follows the packed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShortChannelId(u64);

impl ShortChannelId {
    /// Construct from parts, rejecting heights or indices that overflow 24 bits
    pub fn new(block_height: u32, tx_index: u32, output_index: u16) -> Result<Self, WireError> {
        let packed =
            scid_utils::scid_from_parts(block_height as u64, tx_index as u64, output_index as u64)
                .map_err(|e| {
                    let what = match e {
                        ShortChannelIdError::BlockOverflow => "block height",
                        ShortChannelIdError::TxIndexOverflow => "tx index",
                        ShortChannelIdError::VoutIndexOverflow => "output index",
                    };
                    wire_error(
                        EncodingError,
                        format!("{} out of range in {}x{}x{}", what, block_height, tx_index, output_index),
                    )
                })?;
        Ok(ShortChannelId(packed))
    }

    /// From the wire representation
    pub fn from_u64(v: u64) -> Self {
        ShortChannelId(v)
    }

    /// The wire representation
    pub fn to_u64(&self) -> u64 {
        self.0
    }

    /// The height of the block holding the funding transaction
    pub fn block_height(&self) -> u32 {
        scid_utils::block_from_scid(self.0)
    }

    /// The position of the funding transaction in its block
    pub fn tx_index(&self) -> u32 {
        scid_utils::tx_index_from_scid(self.0)
    }

    /// The funding output's index in its transaction
    pub fn output_index(&self) -> u16 {
        scid_utils::vout_from_scid(self.0)
    }

    /// The funding outpoint, given the funding transaction id
    pub fn outpoint(&self, txid: bitcoin::Txid) -> OutPoint {
        OutPoint { txid, vout: self.output_index() as u32 }
    }
}

impl fmt::Display for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}x{}", self.block_height(), self.tx_index(), self.output_index())
    }
}

impl FromStr for ShortChannelId {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || wire_error(EncodingError, format!("invalid short channel id {:?}", s));
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 3 {
            return Err(bad());
        }
        let block_height = parts[0].parse::<u32>().map_err(|_| bad())?;
        let tx_index = parts[1].parse::<u32>().map_err(|_| bad())?;
        let output_index = parts[2].parse::<u16>().map_err(|_| bad())?;
        ShortChannelId::new(block_height, tx_index, output_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_test() {
        let scid = ShortChannelId::new(1288457, 3, 0).unwrap();
        let packed = 1288457u64 << 40 | 3 << 16;
        assert_eq!(scid.to_u64(), packed);
        assert_eq!(ShortChannelId::from_u64(packed), scid);
        assert_eq!(scid.to_string(), "1288457x3x0");
    }

    #[test]
    fn parse_test() {
        let scid: ShortChannelId = "1288470x4x1".parse().unwrap();
        assert_eq!((scid.block_height(), scid.tx_index(), scid.output_index()), (1288470, 4, 1));
        assert!("1288470x4".parse::<ShortChannelId>().is_err());
        assert!("ax4x1".parse::<ShortChannelId>().is_err());
        assert!("1x2x70000".parse::<ShortChannelId>().is_err());
        let err = "16777216x0x0".parse::<ShortChannelId>().unwrap_err();
        assert_eq!(err.code, EncodingError);
    }

    #[test]
    fn bounds_test() {
        let max = ShortChannelId::new(0xff_ffff, 0xff_ffff, u16::MAX).unwrap();
        assert_eq!(max.to_u64(), u64::MAX);
        assert!(ShortChannelId::new(1 << 24, 0, 0).is_err());
        let err = ShortChannelId::new(0, 1 << 24, 0).unwrap_err();
        assert!(err.message.starts_with("tx index"));
    }

    #[test]
    fn order_test() {
        let a = ShortChannelId::new(10, 500, 3).unwrap();
        let b = ShortChannelId::new(11, 0, 0).unwrap();
        assert!(a < b);
        assert!(a.to_u64() < b.to_u64());
    }
}
