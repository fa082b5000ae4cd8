//! Viewer-local state and the viewer-facing use cases
//!
//! [`ViewerState`] gives typed access to what one viewer has done (viewed
//! markers, the active reaction per message) over an injected
//! [`ViewerStorage`]. [`ViewerService`] drives the feed, reaction toggles and
//! view registration for the HTTP layer.

use std::sync::Arc;

use feed_core::{DomainError, MessageId, ReactionKind, ViewerId, ViewerStorage};
use tracing::{debug, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::feed::group_by_day;
use super::reaction::ReactionController;
use crate::dto::{
    FeedDayResponse, FeedItemResponse, FeedResponse, ReactionToggleResponse, ViewResponse,
};

const VIEWED_MARKER: &str = "true";

/// Typed accessors over one viewer's key/value storage
#[derive(Clone)]
pub struct ViewerState {
    storage: Arc<dyn ViewerStorage>,
    viewer: ViewerId,
}

impl ViewerState {
    pub fn new(storage: Arc<dyn ViewerStorage>, viewer: ViewerId) -> Self {
        Self { storage, viewer }
    }

    pub fn viewer(&self) -> &ViewerId {
        &self.viewer
    }

    fn viewed_key(&self, message_id: MessageId) -> String {
        format!("viewer:{}:viewed:{message_id}", self.viewer)
    }

    fn reaction_key(&self, message_id: MessageId) -> String {
        format!("viewer:{}:reaction:{message_id}", self.viewer)
    }

    pub async fn has_viewed(&self, message_id: MessageId) -> ServiceResult<bool> {
        let value = self.storage.get(&self.viewed_key(message_id)).await?;
        Ok(value.as_deref() == Some(VIEWED_MARKER))
    }

    pub async fn mark_viewed(&self, message_id: MessageId) -> ServiceResult<()> {
        self.storage
            .set(&self.viewed_key(message_id), VIEWED_MARKER)
            .await?;
        debug!(viewer = %self.viewer, message_id = %message_id, "Marked viewed");
        Ok(())
    }

    /// Active reaction. A stored value that no longer parses counts as none.
    pub async fn reaction(&self, message_id: MessageId) -> ServiceResult<Option<ReactionKind>> {
        let Some(raw) = self.storage.get(&self.reaction_key(message_id)).await? else {
            return Ok(None);
        };

        match raw.parse::<ReactionKind>() {
            Ok(kind) => Ok(Some(kind)),
            Err(_) => {
                warn!(
                    viewer = %self.viewer,
                    message_id = %message_id,
                    value = %raw,
                    "Ignoring unparseable stored reaction"
                );
                Ok(None)
            }
        }
    }

    /// Persist the active reaction; `None` clears it
    pub async fn set_reaction(
        &self,
        message_id: MessageId,
        kind: Option<ReactionKind>,
    ) -> ServiceResult<()> {
        let key = self.reaction_key(message_id);
        match kind {
            Some(kind) => self.storage.set(&key, kind.as_str()).await?,
            None => self.storage.remove(&key).await?,
        }
        debug!(viewer = %self.viewer, message_id = %message_id, reaction = ?kind, "Stored reaction");
        Ok(())
    }
}

impl std::fmt::Debug for ViewerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerState")
            .field("viewer", &self.viewer)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Viewer service
// ============================================================================

/// Viewer-facing use cases: feed, reaction toggle, view registration
pub struct ViewerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ViewerService<'a> {
    /// Create a new ViewerService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Current feed as this viewer sees it, grouped by day
    #[instrument(skip(self), fields(viewer = %viewer))]
    pub async fn feed(&self, viewer: ViewerId) -> ServiceResult<FeedResponse> {
        let snapshot = self.ctx.feed().refresh_now().await?;
        let state = self.ctx.viewer_state(viewer);

        let mut days = Vec::new();
        for group in group_by_day(&snapshot.messages) {
            let mut items = Vec::with_capacity(group.messages.len());
            for message in group.messages {
                let my_reaction = state.reaction(message.id).await?;
                let viewed = state.has_viewed(message.id).await?;
                items.push(FeedItemResponse::new(message, my_reaction, viewed));
            }
            days.push(FeedDayResponse {
                date: group.date,
                messages: items,
            });
        }

        Ok(FeedResponse {
            days,
            fetched_at: snapshot.fetched_at,
        })
    }

    /// Toggle `kind` on a message for this viewer. Toggles for the same
    /// viewer and message run one at a time.
    #[instrument(skip(self), fields(viewer = %viewer, message_id = %message_id))]
    pub async fn toggle_reaction(
        &self,
        viewer: ViewerId,
        message_id: MessageId,
        kind: ReactionKind,
    ) -> ServiceResult<ReactionToggleResponse> {
        let _guard = self.ctx.reaction_locks().acquire(&viewer, message_id).await;

        let mut message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;
        self.ctx.dispatcher().overlay(&mut message);

        let mut controller = ReactionController::load(
            self.ctx.viewer_state(viewer),
            self.ctx.dispatcher().clone(),
            &message,
        )
        .await?;
        controller.toggle(kind).await?;

        Ok(ReactionToggleResponse {
            message_id,
            my_reaction: controller.state().current(),
            reactions: controller.counts(),
        })
    }

    /// Register a view of a message by this viewer
    #[instrument(skip(self), fields(viewer = %viewer, message_id = %message_id))]
    pub async fn register_view(
        &self,
        viewer: ViewerId,
        message_id: MessageId,
    ) -> ServiceResult<ViewResponse> {
        let outcome = self
            .ctx
            .view_tracker()
            .register_view(&self.ctx.viewer_state(viewer), message_id)
            .await?;
        Ok(ViewResponse::from_outcome(message_id, outcome))
    }
}
