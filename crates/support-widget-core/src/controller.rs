use std::cell::RefCell;

use tracing::debug;

use crate::gateway::SupportGateway;
use crate::intake::{IntakeForm, IntakeOutcome};
use crate::polling::{PollOutcome, PollScheduler};
use crate::reply::ReplyOutcome;
use crate::session_store::SessionStore;
use crate::types::ConversationId;
use crate::widget::{SupportWidget, WidgetState, WidgetView};

/// Drives a [`SupportWidget`] through its network round trips.
///
/// Every flow is split into a synchronous begin, the awaited gateway call and
/// a synchronous finish. The widget borrow is released before each await, so
/// timer ticks and user input arriving mid-request see a consistent widget and
/// late results are filtered by the widget itself.
pub struct SupportWidgetController<S, P, V, G>
where
    S: SessionStore,
    P: PollScheduler,
    V: WidgetView,
    G: SupportGateway,
{
    widget: RefCell<SupportWidget<S, P, V>>,
    gateway: G,
}

impl<S, P, V, G> SupportWidgetController<S, P, V, G>
where
    S: SessionStore,
    P: PollScheduler,
    V: WidgetView,
    G: SupportGateway,
{
    pub fn new(widget: SupportWidget<S, P, V>, gateway: G) -> Self {
        Self {
            widget: RefCell::new(widget),
            gateway,
        }
    }

    #[must_use]
    pub fn state(&self) -> WidgetState {
        self.widget.borrow().state().clone()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn with_widget<R>(&self, read: impl FnOnce(&SupportWidget<S, P, V>) -> R) -> R {
        read(&*self.widget.borrow())
    }

    pub fn with_widget_mut<R>(&self, update: impl FnOnce(&mut SupportWidget<S, P, V>) -> R) -> R {
        update(&mut *self.widget.borrow_mut())
    }

    /// Returns the first poll pass when the toggle entered a chat.
    pub async fn toggle(&self) -> Option<PollOutcome> {
        let refresh = self.widget.borrow_mut().toggle();
        match refresh {
            Some(conversation_id) => Some(self.refresh(&conversation_id).await),
            None => None,
        }
    }

    pub async fn open(&self) -> Option<PollOutcome> {
        let refresh = self.widget.borrow_mut().open();
        match refresh {
            Some(conversation_id) => Some(self.refresh(&conversation_id).await),
            None => None,
        }
    }

    pub fn close(&self) {
        self.widget.borrow_mut().close();
    }

    /// One poll pass: fetch the history and hand it to the widget. Also the
    /// entry point for timer ticks.
    pub async fn refresh(&self, conversation_id: &ConversationId) -> PollOutcome {
        if !self.widget.borrow().should_poll(conversation_id) {
            debug!(conversation_id = %conversation_id, "skipping poll for inactive conversation");
            return PollOutcome::Ignored;
        }
        let result = self.gateway.fetch_history(conversation_id).await;
        self.widget
            .borrow_mut()
            .apply_history(conversation_id, result)
    }

    pub async fn submit_intake(&self, form: &IntakeForm) -> IntakeOutcome {
        let begun = self.widget.borrow_mut().begin_intake(form);
        let pending = match begun {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };

        let created = self.gateway.create_ticket(&pending.record).await;
        let (outcome, refresh) = self.widget.borrow_mut().finish_intake(&pending, created);
        if let Some(conversation_id) = refresh {
            self.refresh(&conversation_id).await;
        }
        outcome
    }

    pub async fn submit_reply(&self, conversation_id: &ConversationId, text: &str) -> ReplyOutcome {
        let begun = self.widget.borrow_mut().begin_reply(conversation_id, text);
        let pending = match begun {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };

        let sent = self
            .gateway
            .send_reply(&pending.conversation_id, &pending.content)
            .await;
        match sent {
            Ok(()) => {
                self.widget.borrow_mut().reply_sent(&pending);
                self.refresh(&pending.conversation_id).await;
                self.widget.borrow_mut().finish_reply(&pending);
                ReplyOutcome::Sent
            }
            Err(error) => {
                self.widget.borrow_mut().reply_failed(&pending, &error);
                ReplyOutcome::Failed(error)
            }
        }
    }
}
