use core::fmt;

use async_trait::async_trait;
use bitcoin::{Block, BlockHash, OutPoint, TxOut};

use crate::prelude::*;

/// Chain source errors
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The backend could not be reached
    Unavailable(String),
    /// The backend returned something unusable
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Unavailable(s) => write!(f, "chain source unavailable: {}", s),
            Error::Internal(s) => write!(f, "chain source error: {}", s),
        }
    }
}

impl std::error::Error for Error {}

/// Lookups against the blockchain, used to check channel funding claims.
///
/// Implementations own their timeout and retry policy.  Every call must
/// eventually resolve, since the filter processes one message at a time.
#[async_trait]
pub trait ChainClient: SendSync {
    /// The hash of the block at `height` in the best chain, or None
    async fn get_block_hash(&self, height: u32) -> Result<Option<BlockHash>, Error>;

    /// The full block, or None if unknown
    async fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, Error>;

    /// The output if it is currently unspent, or None if spent or never existed
    async fn get_utxo(&self, outpoint: &OutPoint) -> Result<Option<TxOut>, Error>;
}
