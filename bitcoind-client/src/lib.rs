#![crate_name = "bitcoind_client"]

//! A bitcoind RPC chain source for gossip validation.

#![forbid(unsafe_code)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]

/// Bitcoind RPC client
pub mod bitcoind_client;
mod convert;

pub use self::bitcoind_client::BitcoindClient;
pub use self::convert::BlockchainInfo;
use core::fmt;
use lightning_gossip::bitcoin::Network;
use lightning_gossip::chain;
use log::info;
use std::env;
use std::fmt::{Display, Formatter};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use url::Url;

/// RPC errors
#[derive(Debug)]
pub enum Error {
    /// JSON RPC Error
    JsonRpc(jsonrpc_async::error::Error),
    /// JSON Error
    Json(serde_json::error::Error),
    /// IO Error
    Io(std::io::Error),
    /// Credentials could not be determined
    Auth(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::JsonRpc(e) => write!(f, "JSON-RPC: {}", e),
            Error::Json(e) => write!(f, "JSON: {}", e),
            Error::Io(e) => write!(f, "IO: {}", e),
            Error::Auth(s) => write!(f, "auth: {}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<jsonrpc_async::error::Error> for Error {
    fn from(e: jsonrpc_async::error::Error) -> Error {
        Error::JsonRpc(e)
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(e: serde_json::error::Error) -> Error {
        Error::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<Error> for chain::Error {
    fn from(e: Error) -> chain::Error {
        match e {
            Error::JsonRpc(jsonrpc_async::error::Error::Transport(_)) | Error::Auth(_) =>
                chain::Error::Unavailable(e.to_string()),
            _ => chain::Error::Internal(e.to_string()),
        }
    }
}

fn bitcoin_network_path(base_path: PathBuf, network: Network) -> PathBuf {
    match network {
        Network::Bitcoin => base_path,
        Network::Testnet => base_path.join("testnet3"),
        Network::Signet => base_path.join("signet"),
        Network::Regtest => base_path.join("regtest"),
        _ => base_path.join(network.to_string()),
    }
}

fn bitcoin_rpc_cookie(network: Network) -> Result<(String, String), Error> {
    let home = env::var("HOME")
        .map_err(|_| Error::Auth("cannot get cookie file if HOME is not set".to_string()))?;
    let bitcoin_path = Path::new(&home).join(".bitcoin");
    let cookie_path = bitcoin_network_path(bitcoin_path, network).join("cookie");
    info!("auth to bitcoind via cookie {}", cookie_path.to_string_lossy());
    let cookie_contents = read_to_string(cookie_path)?;
    parse_cookie(&cookie_contents)
}

fn parse_cookie(contents: &str) -> Result<(String, String), Error> {
    let mut iter = contents.trim_end().splitn(2, ':');
    match (iter.next(), iter.next()) {
        (Some(user), Some(pass)) => Ok((user.to_string(), pass.to_string())),
        _ => Err(Error::Auth("malformed cookie file".to_string())),
    }
}

/// Construct a client from an RPC URL and a network.
///
/// If the URL carries no credentials, they are read from the bitcoind
/// cookie file for `network`.
pub async fn bitcoind_client_from_url(
    mut url: Url,
    network: Network,
) -> Result<BitcoindClient, Error> {
    if url.username().is_empty() {
        let (user, pass) = bitcoin_rpc_cookie(network)?;
        url.set_username(&user).map_err(|_| Error::Auth("cannot set user".to_string()))?;
        url.set_password(Some(&pass)).map_err(|_| Error::Auth("cannot set pass".to_string()))?;
    }
    BitcoindClient::new(url).await
}
