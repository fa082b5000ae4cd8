//! Feed synchronization by polling
//!
//! [`FeedSync::refresh`] pulls the whole ordered feed and overlays deltas the
//! dispatcher has not landed yet. [`FeedSync::spawn`] repeats that on a timer
//! and publishes each result on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use feed_core::{Message, MessageRepository};
use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use super::dispatch::DeltaDispatcher;
use super::error::ServiceResult;

/// Default polling period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

#[derive(Clone)]
pub struct FeedSync {
    repo: Arc<dyn MessageRepository>,
    dispatcher: Option<DeltaDispatcher>,
}

impl FeedSync {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self {
            repo,
            dispatcher: None,
        }
    }

    /// Overlay this dispatcher's pending deltas on every refresh
    pub fn with_dispatcher(mut self, dispatcher: DeltaDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Full feed, ascending by `created_at` then id
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ServiceResult<Vec<Message>> {
        let mut messages = self.repo.list().await?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        // Overlay after the read so a delta is never counted twice
        if let Some(dispatcher) = &self.dispatcher {
            for message in &mut messages {
                dispatcher.overlay(message);
            }
        }

        debug!(count = messages.len(), "Feed refreshed");
        Ok(messages)
    }

    /// Refresh now and then once per `interval` until shut down
    pub fn spawn(self, interval: Duration) -> FeedSyncHandle {
        let (snapshots, _) = watch::channel(None);
        let snapshots = Arc::new(snapshots);
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(poll(
            self.clone(),
            interval.max(Duration::from_millis(1)),
            Arc::clone(&snapshots),
            stop_rx,
        ));

        FeedSyncHandle {
            sync: self,
            snapshots,
            stop: Arc::new(Mutex::new(Some((stop_tx, task)))),
        }
    }
}

async fn poll(
    sync: FeedSync,
    interval: Duration,
    snapshots: Arc<watch::Sender<Option<FeedSnapshot>>>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => match sync.refresh().await {
                Ok(messages) => {
                    let snapshot = publish(&snapshots, messages);
                    debug!(initial = snapshot.initial, "Feed snapshot published");
                }
                Err(e) => warn!(error = %e, "Feed refresh failed, keeping previous snapshot"),
            },
        }
    }
    debug!("Feed polling stopped");
}

fn publish(
    snapshots: &watch::Sender<Option<FeedSnapshot>>,
    messages: Vec<Message>,
) -> FeedSnapshot {
    let mut snapshot = FeedSnapshot {
        messages,
        initial: false,
        fetched_at: Utc::now(),
    };
    snapshots.send_modify(|slot| {
        snapshot.initial = slot.is_none();
        *slot = Some(snapshot.clone());
    });
    snapshot
}

/// One published working set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub messages: Vec<Message>,
    /// True only for the first snapshot a handle publishes
    pub initial: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Control side of a running [`FeedSync`] loop
#[derive(Clone)]
pub struct FeedSyncHandle {
    sync: FeedSync,
    snapshots: Arc<watch::Sender<Option<FeedSnapshot>>>,
    stop: Arc<Mutex<Option<(oneshot::Sender<()>, JoinHandle<()>)>>>,
}

impl FeedSyncHandle {
    pub fn subscribe(&self) -> watch::Receiver<Option<FeedSnapshot>> {
        self.snapshots.subscribe()
    }

    pub fn latest(&self) -> Option<FeedSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Refresh outside the timer and publish the result
    pub async fn refresh_now(&self) -> ServiceResult<FeedSnapshot> {
        let messages = self.sync.refresh().await?;
        Ok(publish(&self.snapshots, messages))
    }

    /// Stop polling. The last snapshot stays readable.
    pub async fn shutdown(&self) {
        let stop = self.stop.lock().take();
        if let Some((stop_tx, task)) = stop {
            let _ = stop_tx.send(());
            if let Err(e) = task.await {
                warn!(error = %e, "Feed polling task ended abnormally");
            }
        }
    }
}

impl std::fmt::Debug for FeedSyncHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSyncHandle")
            .field("running", &self.stop.lock().is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Day grouping
// ============================================================================

/// Messages sharing one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub messages: Vec<&'a Message>,
}

/// Group consecutive messages by day, keeping their order
pub fn group_by_day(messages: &[Message]) -> Vec<DayGroup<'_>> {
    let mut groups: Vec<DayGroup<'_>> = Vec::new();
    for message in messages {
        let date = message.day();
        match groups.last_mut() {
            Some(group) if group.date == date => group.messages.push(message),
            _ => groups.push(DayGroup {
                date,
                messages: vec![message],
            }),
        }
    }
    groups
}
