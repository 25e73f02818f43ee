use std::convert::TryInto;
use std::sync::Arc;

use async_trait::async_trait;
use jsonrpc_async::error::Error::Rpc;
use jsonrpc_async::simple_http::SimpleHttpTransport;
use jsonrpc_async::Client;
use lightning_gossip::bitcoin::{Block, BlockHash, OutPoint, TxOut};
use lightning_gossip::chain::{self, ChainClient};
use lightning_gossip::SendSync;
use log::{self, debug, error};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use url::Url;

use crate::convert::{BlockchainInfo, JsonResponse};
use crate::Error;

// bitcoind RPC error codes
const RPC_INVALID_ADDRESS_OR_KEY: i32 = -5;
const RPC_INVALID_PARAMETER: i32 = -8;

/// Async client for RPC to bitcoin core daemon
#[derive(Clone, Debug)]
pub struct BitcoindClient {
    rpc: Arc<Mutex<Client>>,
    url: Url,
}

/// BitcoindClient Error
pub type BitcoindClientResult<T> = Result<T, Error>;

impl BitcoindClient {
    /// Create a new BitcoindClient.  Credentials are taken from the URL.
    pub async fn new(url: Url) -> BitcoindClientResult<Self> {
        let mut endpoint = url.clone();
        let user = url.username().to_string();
        let pass = url.password().map(|p| p.to_string());
        let _ = endpoint.set_username("");
        let _ = endpoint.set_password(None);
        let mut builder = SimpleHttpTransport::builder()
            .url(endpoint.as_str())
            .await
            .map_err(|e| Error::JsonRpc(e.into()))?;
        if !user.is_empty() {
            builder = builder.auth(user, pass);
        }
        let rpc = Client::with_transport(builder.build());
        Ok(Self { rpc: Arc::new(Mutex::new(rpc)), url: endpoint })
    }

    /// Make a getblockchaininfo RPC call
    pub async fn get_blockchain_info(&self) -> BitcoindClientResult<BlockchainInfo> {
        self.call_into("getblockchaininfo", &[]).await
    }

    async fn call<T: for<'a> serde::de::Deserialize<'a>>(
        &self,
        cmd: &str,
        args: &[serde_json::Value],
    ) -> Result<T, Error> {
        let rpc = self.rpc.lock().await;
        let v_args: Vec<_> = args
            .iter()
            .map(serde_json::value::to_raw_value)
            .collect::<std::result::Result<_, serde_json::Error>>()?;
        let req = rpc.build_request(cmd, &v_args[..]);
        log::trace!("JSON-RPC request: {} {}", cmd, serde_json::Value::from(args));

        let resp = rpc.send_request(req).await.map_err(Error::from);
        if let Err(ref err) = resp {
            error!("{}: {}: {}", cmd, self.url, err);
        }
        Ok(resp?.result()?)
    }

    async fn call_into<T>(&self, cmd: &str, args: &[serde_json::Value]) -> Result<T, Error>
    where
        JsonResponse: TryInto<T, Error = std::io::Error>,
    {
        let value: Value = self.call(cmd, args).await?;
        Ok(JsonResponse(value).try_into()?)
    }
}

// Maps the given bitcoind error codes to None
fn not_found_as_none<T>(result: Result<T, Error>, codes: &[i32]) -> Result<Option<T>, Error> {
    match result {
        Ok(r) => Ok(Some(r)),
        Err(Error::JsonRpc(Rpc(ref rpce))) if codes.contains(&rpce.code) => {
            debug!("not found: {} {}", rpce.code, rpce.message);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl SendSync for BitcoindClient {}

#[async_trait]
impl ChainClient for BitcoindClient {
    async fn get_block_hash(&self, height: u32) -> Result<Option<BlockHash>, chain::Error> {
        let result: Result<Option<BlockHash>, Error> =
            self.call_into("getblockhash", &[json!(height)]).await;
        Ok(not_found_as_none(result, &[RPC_INVALID_PARAMETER])?.flatten())
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>, chain::Error> {
        let result = self.call_into("getblock", &[json!(hash.to_string()), json!(0)]).await;
        Ok(not_found_as_none(result, &[RPC_INVALID_ADDRESS_OR_KEY, RPC_INVALID_PARAMETER])?)
    }

    async fn get_utxo(&self, outpoint: &OutPoint) -> Result<Option<TxOut>, chain::Error> {
        // mempool spends are not considered
        let args = [json!(outpoint.txid.to_string()), json!(outpoint.vout), json!(false)];
        Ok(self.call_into("gettxout", &args).await?)
    }
}
