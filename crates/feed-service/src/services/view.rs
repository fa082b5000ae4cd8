//! Idempotent view registration

use std::sync::Arc;

use feed_core::{CounterDelta, MessageId, MessageRepository};
use tracing::{info, instrument, warn};

use super::dispatch::RetryPolicy;
use super::error::ServiceResult;
use super::viewer::ViewerState;

/// What happened when a view was registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    /// The store counted this view
    Registered { views: u64 },
    /// This viewer already saw the message; nothing was sent
    AlreadyViewed,
    /// The store request failed; a later call will try again
    Dropped,
}

impl ViewOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }
}

/// Counts at most one view per viewer per message
pub struct ViewTracker {
    repo: Arc<dyn MessageRepository>,
    policy: RetryPolicy,
}

impl ViewTracker {
    pub fn new(repo: Arc<dyn MessageRepository>, policy: RetryPolicy) -> Self {
        Self { repo, policy }
    }

    /// Register a view unless the viewer's marker is already set.
    ///
    /// The marker is written only after the store acknowledges the increment.
    /// A missing message is an error; any other store failure ends in
    /// `Dropped` once retries run out.
    #[instrument(skip(self, viewer), fields(viewer = %viewer.viewer(), message_id = %message_id))]
    pub async fn register_view(
        &self,
        viewer: &ViewerState,
        message_id: MessageId,
    ) -> ServiceResult<ViewOutcome> {
        if viewer.has_viewed(message_id).await? {
            return Ok(ViewOutcome::AlreadyViewed);
        }

        let repo = &self.repo;
        let delta = &CounterDelta::view();
        let message = match self
            .policy
            .run(move || repo.apply_delta(message_id, delta))
            .await
        {
            Ok(message) => message,
            Err(e) if e.is_not_found() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "View increment dropped");
                return Ok(ViewOutcome::Dropped);
            }
        };

        if let Err(e) = viewer.mark_viewed(message_id).await {
            warn!(error = %e, "View counted but marker not stored");
        }

        info!(views = message.views, "View registered");
        Ok(ViewOutcome::Registered {
            views: message.views,
        })
    }
}
