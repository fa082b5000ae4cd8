//! Per-viewer reaction controller
//!
//! One controller owns the reaction state of a single (viewer, message) pair.
//! Toggles take `&mut self`, so they never interleave on one controller.

use feed_core::{
    Message, MessageId, ReactionCounts, ReactionKind, ReactionState, ReactionTransition,
};
use tracing::{info, instrument};

use super::dispatch::DeltaDispatcher;
use super::error::ServiceResult;
use super::viewer::ViewerState;

pub struct ReactionController {
    viewer: ViewerState,
    dispatcher: DeltaDispatcher,
    message_id: MessageId,
    state: ReactionState,
    counts: ReactionCounts,
}

impl ReactionController {
    /// Recover the viewer's reaction on `message` from storage
    pub async fn load(
        viewer: ViewerState,
        dispatcher: DeltaDispatcher,
        message: &Message,
    ) -> ServiceResult<Self> {
        let stored = viewer.reaction(message.id).await?;
        Ok(Self {
            viewer,
            dispatcher,
            message_id: message.id,
            state: ReactionState::from_stored(stored),
            counts: message.reactions,
        })
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn state(&self) -> ReactionState {
        self.state
    }

    /// Locally displayed counts, including optimistic changes
    pub fn counts(&self) -> ReactionCounts {
        self.counts
    }

    /// Press `kind`.
    ///
    /// The viewer marker is persisted first; if that fails nothing changes.
    /// Then the local counts move and the delta is queued for the store
    /// without waiting for it.
    #[instrument(skip(self), fields(viewer = %self.viewer.viewer(), message_id = %self.message_id))]
    pub async fn toggle(&mut self, kind: ReactionKind) -> ServiceResult<ReactionTransition> {
        let transition = self.state.toggle(kind);

        self.viewer
            .set_reaction(self.message_id, transition.next.current())
            .await?;

        self.state = transition.next;
        self.counts.apply(&transition.delta);
        self.dispatcher.submit(self.message_id, transition.delta);

        info!(reaction = ?self.state.current(), "Reaction toggled");
        Ok(transition)
    }
}
