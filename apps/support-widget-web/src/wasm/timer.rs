use std::time::Duration;

use gloo_timers::callback::Interval;
use support_widget_core::PollScheduler;

use super::*;

/// `setInterval`-backed poll timer. Ticks are handed to the mounted
/// controller, which drops them if the conversation is no longer active.
pub(super) struct IntervalPollScheduler;

impl PollScheduler for IntervalPollScheduler {
    type Handle = Interval;

    fn schedule(&mut self, conversation_id: &ConversationId, period: Duration) -> Interval {
        let conversation_id = conversation_id.clone();
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        Interval::new(millis, move || poll_tick(conversation_id.clone()))
    }

    fn cancel(&mut self, handle: Interval) {
        let _ = handle.cancel();
    }
}
