use core::fmt;

use crate::prelude::*;
use crate::store;

use WireErrorCode::*;

/// Why a gossip message was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireErrorCode {
    /// The chain source could not resolve the block height to a hash
    ChanBadBlockHash,
    /// The chain source could not resolve the block hash to a block
    ChanBadBlock,
    /// The block has no transaction at the claimed index
    ChanAnnBadTx,
    /// The claimed funding output is not a live UTXO
    ChanUtxoSpent,
    /// The funding output script is not the 2-of-2 of the announced keys
    ChanBadScript,
    /// One of the four channel_announcement signatures is invalid
    ChanAnnSigFailed,
    /// The channel_update signature is invalid
    ChanUpdSigFailed,
    /// The node_announcement signature is invalid
    NodeAnnSigFailed,
    /// A field is malformed or out of range
    EncodingError,
    /// The message is not newer than the version already stored
    Outdated,
}

impl WireErrorCode {
    /// A stable name for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ChanBadBlockHash => "chan_bad_block_hash",
            ChanBadBlock => "chan_bad_block",
            ChanAnnBadTx => "chan_ann_bad_tx",
            ChanUtxoSpent => "chan_utxo_spent",
            ChanBadScript => "chan_bad_script",
            ChanAnnSigFailed => "chan_ann_sig_failed",
            ChanUpdSigFailed => "chan_upd_sig_failed",
            NodeAnnSigFailed => "node_ann_sig_failed",
            EncodingError => "encoding_error",
            Outdated => "outdated",
        }
    }
}

impl fmt::Display for WireErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected gossip message.  Never fatal to the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct WireError {
    /// The failure code
    pub code: WireErrorCode,
    /// Context for the operator
    pub message: String,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for WireError {}

/// Construct a [`WireError`]
pub fn wire_error(code: WireErrorCode, msg: impl Into<String>) -> WireError {
    WireError { code, message: msg.into() }
}

/// Return a [`WireError`] from the current function
#[doc(hidden)]
#[macro_export]
macro_rules! wire_err {
	($code:expr, $($arg:tt)*) => (
        return Err($crate::error::wire_error($code, format!($($arg)*)))
    )
}

/// A failure that stops the pipeline, because a collaborator is unusable
#[derive(Clone, Debug, PartialEq)]
pub enum GossipError {
    /// The gossip or pending store failed
    Store(store::Error),
    /// The filter worker is gone
    Shutdown,
}

impl fmt::Display for GossipError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GossipError::Store(e) => write!(f, "store failure: {}", e),
            GossipError::Shutdown => f.write_str("gossip filter shut down"),
        }
    }
}

impl std::error::Error for GossipError {}

impl From<store::Error> for GossipError {
    fn from(e: store::Error) -> Self {
        GossipError::Store(e)
    }
}
