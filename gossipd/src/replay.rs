use anyhow::Result;
use lightning_gossip::filter::GossipFilter;
use log::*;

use crate::model::SummaryModel;

/// Feed hex-encoded messages through `filter`, drain it and summarize.
///
/// Lines that are not hex are counted and skipped.  Messages still
/// waiting for their channel at the end stay in the pending store.
pub async fn replay(filter: &GossipFilter, lines: &[String]) -> Result<SummaryModel> {
    let mut events = filter.subscribe();
    let mut summary = SummaryModel::default();
    for (index, line) in lines.iter().enumerate() {
        match hex::decode(line) {
            Ok(bytes) => filter.enqueue_raw(&bytes),
            Err(e) => {
                warn!("line {}: not hex: {}", index + 1, e);
                summary.not_hex += 1;
            }
        }
    }
    info!("replaying {} messages", filter.queue_len());
    filter.flush().await?;
    while let Ok(event) = events.try_recv() {
        summary.record(&event);
    }
    summary.set_counts(filter.gossip_store().as_ref(), filter.pending_store().as_ref())?;
    Ok(summary)
}
