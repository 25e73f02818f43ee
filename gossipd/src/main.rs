use std::sync::Arc;

use anyhow::{anyhow, Result};
use bitcoind_client::bitcoind_client_from_url;
use clap::Parser;
use gossipd::config::GossipdArgs;
use gossipd::model::GraphModel;
use gossipd::replay::replay;
use gossipd::util::{read_lines, setup_logging};
use lightning_gossip::filter::GossipFilter;
use lightning_gossip::store::{GossipStore, MemoryGossipStore};
use log::*;

#[tokio::main]
async fn main() -> Result<()> {
    let args = GossipdArgs::parse();
    setup_logging("gossipd", &args.log_level)?;

    let rpc = args.rpc.ok_or_else(|| anyhow!("no bitcoind RPC URL for {}", args.network))?;
    info!("using bitcoind at {} for {}", rpc.host_str().unwrap_or_default(), args.network);
    let chain_client = Arc::new(bitcoind_client_from_url(rpc, args.network).await?);
    let info = chain_client.get_blockchain_info().await?;
    info!("bitcoind tip {} at height {}", info.latest_blockhash, info.latest_height);

    let gossip_store: Arc<dyn GossipStore> = Arc::new(MemoryGossipStore::new("gossip"));
    let pending_store: Arc<dyn GossipStore> = Arc::new(MemoryGossipStore::new("pending"));
    let filter = GossipFilter::new(chain_client, gossip_store, pending_store);

    let lines = read_lines(&args.input)?;
    let summary = replay(&filter, &lines).await?;
    info!("summary: {}", serde_json::to_string(&summary)?);

    if args.dump_json {
        let graph = GraphModel::from_store(filter.gossip_store().as_ref())?;
        println!("{}", serde_json::to_string_pretty(&graph)?);
    }
    Ok(())
}
