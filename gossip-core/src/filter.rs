use alloc::collections::VecDeque;
use core::sync::atomic::{AtomicBool, Ordering};

use log::*;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::chain::ChainClient;
use crate::error::{wire_error, GossipError, WireError, WireErrorCode};
use crate::msgs::{ChannelAnnouncement, ChannelUpdate, GossipMessage, NodeAnnouncement};
use crate::pending::PendingResolver;
use crate::prelude::*;
use crate::store::GossipStore;
use crate::validator::GossipValidator;
use crate::Arc;

/// Something observable that happened in the filter
#[derive(Clone, Debug, PartialEq)]
pub enum GossipEvent {
    /// A message was validated and committed to the gossip store
    Message(GossipMessage),
    /// The queue drained
    Flushed,
    /// A message was rejected.  `message` is None if it could not be decoded.
    Error {
        /// Why it was rejected
        error: WireError,
        /// The rejected message
        message: Option<GossipMessage>,
    },
}

enum Outcome {
    Committed,
    Deferred,
}

/// Validates and orders inbound gossip.
///
/// Messages are queued by [`GossipFilter::enqueue`] and processed strictly
/// one at a time by [`GossipFilter::flush`], so the final content of the
/// gossip store does not depend on arrival order.  Channel updates and node
/// announcements that arrive before their channel are held in the pending
/// store and replayed right after the channel commits, before the next queued
/// message.
pub struct GossipFilter {
    gossip_store: Arc<dyn GossipStore>,
    pending: PendingResolver,
    validator: GossipValidator,
    queue: Mutex<VecDeque<GossipMessage>>,
    // held for the duration of a flush
    processing: tokio::sync::Mutex<()>,
    notify: Notify,
    shutdown: AtomicBool,
    subscribers: Mutex<Vec<UnboundedSender<GossipEvent>>>,
}

impl GossipFilter {
    /// Create a filter.  `pending_store` must be a separate instance from
    /// `gossip_store`.
    pub fn new(
        chain_client: Arc<dyn ChainClient>,
        gossip_store: Arc<dyn GossipStore>,
        pending_store: Arc<dyn GossipStore>,
    ) -> Self {
        GossipFilter {
            gossip_store,
            pending: PendingResolver::new(pending_store),
            validator: GossipValidator::new(chain_client),
            queue: Mutex::new(VecDeque::new()),
            processing: tokio::sync::Mutex::new(()),
            notify: Notify::new(),
            shutdown: AtomicBool::new(false),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// The store of validated messages
    pub fn gossip_store(&self) -> &Arc<dyn GossipStore> {
        &self.gossip_store
    }

    /// The store of messages waiting for their channel
    pub fn pending_store(&self) -> &Arc<dyn GossipStore> {
        self.pending.store()
    }

    /// Receive events from now on.  Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> UnboundedReceiver<GossipEvent> {
        let (sender, receiver) = unbounded_channel();
        self.subscribers.lock().unwrap().push(sender);
        receiver
    }

    /// Queue a message for processing
    pub fn enqueue(&self, msg: GossipMessage) {
        trace!("enqueue {}", msg);
        self.queue.lock().unwrap().push_back(msg);
        self.notify.notify_one();
    }

    /// Decode and queue a message.  A message that does not decode is
    /// reported as an error event right away.
    pub fn enqueue_raw(&self, bytes: &[u8]) {
        match GossipMessage::decode(bytes) {
            Ok(msg) => self.enqueue(msg),
            Err(error) => {
                warn!("rejecting undecodable gossip {}: {}", log_bytes!(bytes), error);
                self.emit(GossipEvent::Error { error, message: None });
            }
        }
    }

    /// Number of queued messages
    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Process queued messages until the queue is empty, then emit
    /// [`GossipEvent::Flushed`].
    ///
    /// A store failure stops processing and is returned.  Messages not yet
    /// committed at that point, including replays taken from the pending
    /// store, go back to the front of the queue in their original order.
    pub async fn flush(&self) -> Result<(), GossipError> {
        let _guard = self.processing.lock().await;
        loop {
            let next = self.queue.lock().unwrap().pop_front();
            let Some(msg) = next else { break };
            let mut work = VecDeque::from([msg]);
            while let Some(msg) = work.pop_front() {
                match self.process(msg).await {
                    Ok(replays) => {
                        // replays run before anything else
                        for replay in replays.into_iter().rev() {
                            work.push_front(replay);
                        }
                    }
                    Err(Stopped { error, unprocessed }) => {
                        error!("gossip filter stopped: {}", error);
                        if let Some(msg) = unprocessed {
                            work.push_front(msg);
                        }
                        debug!("requeueing {} messages", work.len());
                        let mut queue = self.queue.lock().unwrap();
                        for msg in work.into_iter().rev() {
                            queue.push_front(msg);
                        }
                        return Err(error);
                    }
                }
            }
        }
        self.emit(GossipEvent::Flushed);
        Ok(())
    }

    /// Spawn a worker that flushes whenever messages are queued.
    ///
    /// The worker exits after [`GossipFilter::stop`] once the queue is
    /// drained, or with the error of a failed flush.
    pub fn start(self: &Arc<Self>) -> JoinHandle<Result<(), GossipError>> {
        let filter = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                filter.notify.notified().await;
                filter.flush().await?;
                // messages queued during the last flush share its wakeup
                while filter.shutdown.load(Ordering::SeqCst) {
                    if filter.queue_len() == 0 {
                        info!("gossip filter worker stopped");
                        return Ok(());
                    }
                    filter.flush().await?;
                }
            }
        })
    }

    /// Ask the worker to exit once the queue drains
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    // Returns the pending messages unblocked by this one
    async fn process(&self, msg: GossipMessage) -> Result<Vec<GossipMessage>, Stopped> {
        let result = match &msg {
            GossipMessage::ChannelAnnouncement(ann) => self.process_channel_announcement(ann).await,
            GossipMessage::ChannelUpdate(update) => self.process_channel_update(update),
            GossipMessage::NodeAnnouncement(ann) => self.process_node_announcement(ann),
        };
        match result {
            Ok(Outcome::Committed) => {
                info!("committed {}", msg);
                let unblocked = match &msg {
                    GossipMessage::ChannelAnnouncement(ann) => Some(ann.clone()),
                    _ => None,
                };
                self.emit(GossipEvent::Message(msg));
                match unblocked {
                    Some(ann) => self
                        .pending
                        .resolve(&ann)
                        .map_err(|e| Stopped { error: e.into(), unprocessed: None }),
                    None => Ok(Vec::new()),
                }
            }
            Ok(Outcome::Deferred) => Ok(Vec::new()),
            Err(ProcessError::Rejected(error)) => {
                warn!("rejected {}: {}", msg, error);
                self.emit(GossipEvent::Error { error, message: Some(msg) });
                Ok(Vec::new())
            }
            Err(ProcessError::Fatal(error)) => Err(Stopped { error, unprocessed: Some(msg) }),
        }
    }

    async fn process_channel_announcement(
        &self,
        ann: &ChannelAnnouncement,
    ) -> Result<Outcome, ProcessError> {
        self.validator.validate_channel_announcement(ann).await?;
        self.gossip_store.put_channel_announcement(ann)?;
        Ok(Outcome::Committed)
    }

    fn process_channel_update(&self, update: &ChannelUpdate) -> Result<Outcome, ProcessError> {
        let scid = &update.short_channel_id;
        let ann = match self.gossip_store.find_channel_announcement(scid)? {
            Some(ann) => ann,
            None => {
                self.pending.defer(update.clone().into())?;
                return Ok(Outcome::Deferred);
            }
        };
        let existing = self.gossip_store.find_channel_update(scid, update.direction())?;
        self.validator.validate_channel_update(update, &ann, existing.as_ref())?;
        if !self.gossip_store.put_channel_update(update)? {
            return Err(outdated(format!("channel_update {}/{}", scid, update.direction())));
        }
        Ok(Outcome::Committed)
    }

    fn process_node_announcement(&self, ann: &NodeAnnouncement) -> Result<Outcome, ProcessError> {
        if self.gossip_store.find_channels_for_node(&ann.node_id)?.is_empty() {
            debug!("node {} has no announced channel", ann.node_id);
            self.pending.defer(ann.clone().into())?;
            return Ok(Outcome::Deferred);
        }
        let existing = self.gossip_store.find_node_announcement(&ann.node_id)?;
        self.validator.validate_node_announcement(ann, existing.as_ref())?;
        if !self.gossip_store.put_node_announcement(ann)? {
            return Err(outdated(format!("node_announcement {}", ann.node_id)));
        }
        Ok(Outcome::Committed)
    }

    fn emit(&self, event: GossipEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|s| s.send(event.clone()).is_ok());
    }
}

// A fatal error, and the message it interrupted if that was not committed
struct Stopped {
    error: GossipError,
    unprocessed: Option<GossipMessage>,
}

enum ProcessError {
    Rejected(WireError),
    Fatal(GossipError),
}

impl From<WireError> for ProcessError {
    fn from(e: WireError) -> Self {
        ProcessError::Rejected(e)
    }
}

impl From<crate::store::Error> for ProcessError {
    fn from(e: crate::store::Error) -> Self {
        ProcessError::Fatal(e.into())
    }
}

fn outdated(what: String) -> ProcessError {
    ProcessError::Rejected(wire_error(WireErrorCode::Outdated, format!("{} is not newer", what)))
}
