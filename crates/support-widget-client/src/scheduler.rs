use std::time::Duration;

use support_widget_core::{ConversationId, PollScheduler};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Poll timer backed by a spawned tokio interval task. Ticks are delivered on
/// the channel returned by [`TokioPollScheduler::channel`]; the receiver runs
/// the actual fetch so the widget stays on one task.
#[derive(Debug, Clone)]
pub struct TokioPollScheduler {
    ticks: mpsc::UnboundedSender<ConversationId>,
}

impl TokioPollScheduler {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ConversationId>) {
        let (ticks, receiver) = mpsc::unbounded_channel();
        (Self { ticks }, receiver)
    }
}

impl PollScheduler for TokioPollScheduler {
    type Handle = JoinHandle<()>;

    /// Must be called from within a tokio runtime.
    fn schedule(&mut self, conversation_id: &ConversationId, period: Duration) -> JoinHandle<()> {
        let ticks = self.ticks.clone();
        let conversation_id = conversation_id.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(conversation_id.clone()).is_err() {
                    break;
                }
            }
        })
    }

    fn cancel(&mut self, handle: JoinHandle<()>) {
        handle.abort();
    }
}
