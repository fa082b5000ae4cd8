//! Counter delta dispatch
//!
//! Reaction deltas are handed to a background worker that applies them to
//! the store in submission order. Callers never wait for the store: failures
//! are retried with backoff and, once attempts run out, logged and dropped.
//! Until a delta is applied or dropped it is reported by
//! [`DeltaDispatcher::pending`] so a feed refresh can overlay it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use feed_common::FeedConfig;
use feed_core::{CounterDelta, DomainError, Message, MessageId, MessageRepository, RepoResult};
use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

// ============================================================================
// Retry policy
// ============================================================================

/// Bounded exponential backoff with jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Add up to 50% random extra delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FeedConfig) -> Self {
        Self {
            max_attempts: config.delta_max_attempts.max(1),
            base_delay: config.retry_base(),
            ..Self::default()
        }
    }

    /// Single attempt, no retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Delay before retrying after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_delay
            .saturating_mul(1 << exponent)
            .min(self.max_delay);

        if !self.jitter || delay.is_zero() {
            return delay;
        }

        let spread = (delay.as_millis() / 2) as u64;
        let extra = rand::thread_rng().gen_range(0..=spread);
        delay + Duration::from_millis(extra)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Only infrastructure errors are retried; a missing message or a
    /// rejected argument is returned immediately.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> RepoResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RepoResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts || !is_retryable(&e) => return Err(e),
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Store request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn is_retryable(err: &DomainError) -> bool {
    err.is_infrastructure()
}

// ============================================================================
// Pending accounting
// ============================================================================

/// Deltas not yet applied or dropped for one message.
///
/// `queued` has not reached the store. `writing` is inside a store call and
/// may already be committed, so it is never overlaid.
#[derive(Debug, Default)]
struct PendingEntry {
    queued: CounterDelta,
    writing: CounterDelta,
    in_flight: usize,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Queued,
    Writing,
}

type PendingMap = DashMap<MessageId, PendingEntry>;

fn track(pending: &PendingMap, id: MessageId, delta: &CounterDelta) {
    let mut entry = pending.entry(id).or_default();
    entry.queued.merge(delta);
    entry.in_flight += 1;
}

fn start_write(pending: &PendingMap, id: MessageId, delta: &CounterDelta) {
    if let Some(mut entry) = pending.get_mut(&id) {
        entry.queued.unmerge(delta);
        entry.writing.merge(delta);
    }
}

/// A failed attempt did not commit; the delta waits for the next one.
fn write_failed(pending: &PendingMap, id: MessageId, delta: &CounterDelta) {
    if let Some(mut entry) = pending.get_mut(&id) {
        entry.writing.unmerge(delta);
        entry.queued.merge(delta);
    }
}

fn settle(pending: &PendingMap, id: MessageId, delta: &CounterDelta, stage: Stage) {
    let drained = match pending.get_mut(&id) {
        Some(mut entry) => {
            match stage {
                Stage::Queued => entry.queued.unmerge(delta),
                Stage::Writing => entry.writing.unmerge(delta),
            }
            entry.in_flight = entry.in_flight.saturating_sub(1);
            entry.in_flight == 0
        }
        None => false,
    };
    // The shard guard above is released before removing
    if drained {
        pending.remove_if(&id, |_, entry| entry.in_flight == 0);
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

enum Command {
    Apply {
        message_id: MessageId,
        delta: CounterDelta,
    },
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Fire-and-forget queue of counter deltas.
///
/// Cloning is cheap; every clone feeds the same worker.
#[derive(Clone)]
pub struct DeltaDispatcher {
    tx: mpsc::UnboundedSender<Command>,
    pending: Arc<PendingMap>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl DeltaDispatcher {
    /// Start the background worker. Must be called inside a tokio runtime.
    pub fn spawn(repo: Arc<dyn MessageRepository>, policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(PendingMap::new());

        let worker = Worker {
            repo,
            policy,
            pending: Arc::clone(&pending),
        };
        let handle = tokio::spawn(worker.run(rx));

        Self {
            tx,
            pending,
            worker: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Queue a delta. Never blocks and never fails.
    pub fn submit(&self, message_id: MessageId, delta: CounterDelta) {
        if delta.is_empty() {
            return;
        }

        track(&self.pending, message_id, &delta);
        if self.tx.send(Command::Apply { message_id, delta }).is_err() {
            settle(&self.pending, message_id, &delta, Stage::Queued);
            warn!(message_id = %message_id, "Dispatcher stopped, counter delta dropped");
        }
    }

    /// Net delta that has not reached the store yet.
    ///
    /// A delta whose store call is running is left out: the caller cannot
    /// tell whether its own read already includes it.
    pub fn pending(&self, message_id: MessageId) -> Option<CounterDelta> {
        self.pending
            .get(&message_id)
            .map(|entry| entry.queued)
            .filter(|queued| !queued.is_empty())
    }

    /// Number of deltas not yet applied or dropped
    pub fn pending_count(&self) -> usize {
        self.pending.iter().map(|entry| entry.in_flight).sum()
    }

    /// Show a message as `server + pending`.
    ///
    /// `message` must be read from the store before this call. A delta can
    /// then only be counted twice if it was queued at overlay time, and a
    /// queued delta has not been sent yet. The worst case is a stale count.
    pub fn overlay(&self, message: &mut Message) {
        if let Some(net) = self.pending(message.id) {
            message.apply_delta(&net);
        }
    }

    /// Wait until every delta submitted before this call is applied or dropped
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Drain the queue and stop the worker. Later submissions are dropped.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Delta dispatcher worker ended abnormally");
            }
        }
    }
}

impl std::fmt::Debug for DeltaDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaDispatcher")
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

struct Worker {
    repo: Arc<dyn MessageRepository>,
    policy: RetryPolicy,
    pending: Arc<PendingMap>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Apply { message_id, delta } => {
                    self.apply(message_id, &delta).await;
                }
                Command::Flush(done) => {
                    let _ = done.send(());
                }
                Command::Shutdown => break,
            }
        }
        debug!("Delta dispatcher stopped");
    }

    #[instrument(skip(self, delta), fields(message_id = %message_id))]
    async fn apply(&self, message_id: MessageId, delta: &CounterDelta) {
        let repo = &self.repo;
        let pending = self.pending.as_ref();
        let outcome = self
            .policy
            .run(move || async move {
                start_write(pending, message_id, delta);
                let result = repo.apply_delta(message_id, delta).await;
                if result.is_err() {
                    write_failed(pending, message_id, delta);
                }
                result
            })
            .await;

        match outcome {
            Ok(message) => {
                settle(pending, message_id, delta, Stage::Writing);
                debug!(views = message.views, "Counter delta applied");
            }
            Err(e) => {
                settle(pending, message_id, delta, Stage::Queued);
                warn!(error = %e, "Counter delta dropped");
            }
        }
    }
}
