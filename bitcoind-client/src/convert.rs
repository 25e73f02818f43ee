use std::convert::{TryFrom, TryInto};
use std::io::{Error, ErrorKind};
use std::str::FromStr;

use lightning_gossip::bitcoin::consensus::encode;
use lightning_gossip::bitcoin::{Amount, Block, BlockHash, ScriptBuf, TxOut};
use serde::Deserialize;

pub struct JsonResponse(pub serde_json::Value);

fn invalid_data(msg: &str) -> Error {
    Error::new(ErrorKind::InvalidData, msg)
}

fn parse_block_hash(s: &str) -> std::io::Result<BlockHash> {
    BlockHash::from_str(s).map_err(|_| invalid_data("invalid block hash"))
}

/// The parts of `getblockchaininfo` we use
#[derive(Debug)]
pub struct BlockchainInfo {
    /// Height of the best block
    pub latest_height: usize,
    /// Hash of the best block
    pub latest_blockhash: BlockHash,
}

impl TryFrom<JsonResponse> for BlockchainInfo {
    type Error = std::io::Error;
    fn try_from(item: JsonResponse) -> std::io::Result<Self> {
        let height = item.0["blocks"].as_u64().ok_or_else(|| invalid_data("missing blocks"))?;
        let hash = item.0["bestblockhash"]
            .as_str()
            .ok_or_else(|| invalid_data("missing bestblockhash"))?;
        Ok(Self { latest_height: height as usize, latest_blockhash: parse_block_hash(hash)? })
    }
}

impl TryInto<Option<BlockHash>> for JsonResponse {
    type Error = std::io::Error;

    fn try_into(self) -> Result<Option<BlockHash>, Self::Error> {
        match self.0.as_str() {
            None => Ok(None),
            Some(s) => Ok(Some(parse_block_hash(s)?)),
        }
    }
}

/// Converts a JSON value into a block. Assumes the block is hex-encoded in a JSON string.
impl TryInto<Block> for JsonResponse {
    type Error = std::io::Error;

    fn try_into(self) -> std::io::Result<Block> {
        let hex_data = self.0.as_str().ok_or_else(|| invalid_data("expected JSON string"))?;
        let block_data = hex::decode(hex_data).map_err(|_| invalid_data("invalid hex data"))?;
        encode::deserialize(&block_data).map_err(|_| invalid_data("invalid block data"))
    }
}

#[derive(Deserialize)]
struct ScriptPubKeyResponse {
    hex: String,
}

/// Response data from `gettxout`, null if the output is spent or unknown
#[derive(Deserialize)]
struct GetTxOutResponse {
    value: f64,
    #[serde(rename = "scriptPubKey")]
    script_pubkey: ScriptPubKeyResponse,
}

impl TryFrom<GetTxOutResponse> for TxOut {
    type Error = std::io::Error;

    fn try_from(response: GetTxOutResponse) -> std::io::Result<Self> {
        let value = Amount::from_btc(response.value).map_err(|_| invalid_data("invalid value"))?;
        let script_pubkey = ScriptBuf::from_hex(&response.script_pubkey.hex)
            .map_err(|_| invalid_data("invalid scriptPubKey"))?;
        Ok(TxOut { value, script_pubkey })
    }
}

impl TryInto<Option<TxOut>> for JsonResponse {
    type Error = std::io::Error;

    fn try_into(self) -> std::io::Result<Option<TxOut>> {
        if self.0.is_null() {
            return Ok(None);
        }
        let response: GetTxOutResponse =
            serde_json::from_value(self.0).map_err(|_| invalid_data("invalid txout response"))?;
        Ok(Some(response.try_into()?))
    }
}
