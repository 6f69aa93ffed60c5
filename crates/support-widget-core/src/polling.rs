use std::time::Duration;

use tracing::debug;

use crate::transcript::RenderOutcome;
use crate::types::ConversationId;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Arms and cancels the host's recurring timer. A scheduled timer delivers
/// ticks for `conversation_id` every `period` until its handle is cancelled;
/// the first tick fires one period after scheduling.
pub trait PollScheduler {
    type Handle;

    fn schedule(&mut self, conversation_id: &ConversationId, period: Duration) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// Result of one fetch + render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Rendered(RenderOutcome),
    /// The result belonged to a conversation that is no longer active.
    Ignored,
    /// Logged and dropped; the next tick retries.
    TransientFailure,
    /// The remote reported the conversation missing and the session was reset.
    ConversationGone,
}

struct ActivePoll<H> {
    conversation_id: ConversationId,
    handle: H,
}

/// Owns the one timer handle. It is only reachable through `start`/`stop`,
/// so at most one timer is ever live.
pub struct PollingEngine<P: PollScheduler> {
    scheduler: P,
    period: Duration,
    active: Option<ActivePoll<P::Handle>>,
}

impl<P: PollScheduler> PollingEngine<P> {
    #[must_use]
    pub fn new(scheduler: P, period: Duration) -> Self {
        Self {
            scheduler,
            period: period.max(MIN_POLL_INTERVAL),
            active: None,
        }
    }

    /// Stops any running timer, then arms a new one for `conversation_id`.
    /// The caller runs the immediate first pass.
    pub fn start(&mut self, conversation_id: ConversationId) {
        self.stop();
        let handle = self.scheduler.schedule(&conversation_id, self.period);
        debug!(
            conversation_id = %conversation_id,
            period_ms = self.period.as_millis() as u64,
            "support widget polling started"
        );
        self.active = Some(ActivePoll {
            conversation_id,
            handle,
        });
    }

    /// Returns whether a timer was cancelled.
    pub fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        self.scheduler.cancel(active.handle);
        debug!(
            conversation_id = %active.conversation_id,
            "support widget polling stopped"
        );
        true
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn is_polling(&self, conversation_id: &ConversationId) -> bool {
        self.active_conversation() == Some(conversation_id)
    }

    #[must_use]
    pub fn active_conversation(&self) -> Option<&ConversationId> {
        self.active.as_ref().map(|active| &active.conversation_id)
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub fn scheduler(&self) -> &P {
        &self.scheduler
    }
}

impl<P: PollScheduler> Drop for PollingEngine<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
