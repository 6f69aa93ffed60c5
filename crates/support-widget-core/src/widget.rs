use std::time::Duration;

use tracing::{debug, info, warn};

use crate::gateway::{GatewayError, HistoryError};
use crate::intake::{
    IntakeController, IntakeForm, IntakeOutcome, IntakeSurface, PendingIntake,
    show_submission_failure,
};
use crate::polling::{PollOutcome, PollScheduler, PollingEngine};
use crate::reply::{PendingReply, ReplyController, ReplyOutcome, ReplySurface};
use crate::session_store::SessionStore;
use crate::transcript::{TranscriptRenderer, TranscriptSurface};
use crate::types::{ConversationId, Message};

/// Everything the widget can show. Hosts implement this once per surface
/// (DOM, terminal); none of these calls may re-enter the widget.
pub trait WidgetView: TranscriptSurface + IntakeSurface + ReplySurface {
    fn show_closed(&mut self);
    fn show_intake_form(&mut self);
    fn show_chat(&mut self, conversation_id: &ConversationId);
    fn focus_toggle(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Closed,
    FormEntry,
    ChatActive(ConversationId),
}

impl WidgetState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::FormEntry => "form_entry",
            Self::ChatActive(_) => "chat_active",
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    #[must_use]
    pub fn conversation_id(&self) -> Option<&ConversationId> {
        match self {
            Self::ChatActive(conversation_id) => Some(conversation_id),
            _ => None,
        }
    }
}

/// The widget lifecycle. Every transition and its side effects (timer,
/// storage, bindings, view) live in this type; the async round trips are
/// driven from [`crate::controller::SupportWidgetController`].
pub struct SupportWidget<S, P, V>
where
    S: SessionStore,
    P: PollScheduler,
    V: WidgetView,
{
    store: S,
    poller: PollingEngine<P>,
    view: V,
    renderer: TranscriptRenderer,
    intake: IntakeController,
    reply: ReplyController,
    state: WidgetState,
}

impl<S, P, V> SupportWidget<S, P, V>
where
    S: SessionStore,
    P: PollScheduler,
    V: WidgetView,
{
    pub fn new(store: S, scheduler: P, view: V, poll_interval: Duration) -> Self {
        Self {
            store,
            poller: PollingEngine::new(scheduler, poll_interval),
            view,
            renderer: TranscriptRenderer::new(),
            intake: IntakeController::default(),
            reply: ReplyController::default(),
            state: WidgetState::Closed,
        }
    }

    #[must_use]
    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn poller(&self) -> &PollingEngine<P> {
        &self.poller
    }

    #[must_use]
    pub fn renderer(&self) -> &TranscriptRenderer {
        &self.renderer
    }

    #[must_use]
    pub fn reply_controller(&self) -> &ReplyController {
        &self.reply
    }

    /// Opens when closed, closes otherwise. Returns the conversation whose
    /// history should be fetched right away.
    pub fn toggle(&mut self) -> Option<ConversationId> {
        if self.state.is_open() {
            self.close();
            None
        } else {
            self.open()
        }
    }

    pub fn open(&mut self) -> Option<ConversationId> {
        if self.state.is_open() {
            return None;
        }
        match self.load_stored_conversation() {
            Some(conversation_id) => {
                self.enter_chat(conversation_id.clone());
                Some(conversation_id)
            }
            None => {
                self.enter_form();
                None
            }
        }
    }

    pub fn close(&mut self) {
        if !self.state.is_open() {
            return;
        }
        self.poller.stop();
        self.reply.unbind(&mut self.view);
        self.state = WidgetState::Closed;
        self.view.show_closed();
        self.view.focus_toggle();
        info!("support widget closed");
    }

    pub fn begin_intake(&mut self, form: &IntakeForm) -> Result<PendingIntake, IntakeOutcome> {
        if self.state != WidgetState::FormEntry {
            return Err(IntakeOutcome::NotAccepting);
        }
        self.intake.begin(form, &mut self.view)
    }

    /// Applies the ticket creation result for `pending`. The returned id, when
    /// present, needs an immediate history fetch.
    ///
    /// Only the current submission is applied. A result that lands after the
    /// widget was closed is still saved so the next open resumes it; one that
    /// lands while another chat is active is dropped.
    pub fn finish_intake(
        &mut self,
        pending: &PendingIntake,
        result: Result<ConversationId, GatewayError>,
    ) -> (IntakeOutcome, Option<ConversationId>) {
        if !self.intake.settle(pending, &mut self.view) {
            match &result {
                Ok(conversation_id) => warn!(
                    conversation_id = %conversation_id,
                    state = self.state.as_str(),
                    "dropping ticket from superseded submission"
                ),
                Err(error) => debug!(
                    error = %error,
                    "ignoring failure of superseded submission"
                ),
            }
            return (IntakeOutcome::Superseded, None);
        }
        if let WidgetState::ChatActive(active) = &self.state {
            warn!(
                active = %active,
                result = ?result,
                "dropping ticket result while another conversation is active"
            );
            return (IntakeOutcome::Superseded, None);
        }

        match result {
            Ok(conversation_id) => {
                if let Err(error) = self.store.persist_conversation_id(&conversation_id) {
                    warn!(
                        conversation_id = %conversation_id,
                        error = %error,
                        "failed to persist support conversation id"
                    );
                }
                info!(conversation_id = %conversation_id, "support ticket created");

                if self.state == WidgetState::FormEntry {
                    self.enter_chat(conversation_id.clone());
                    (
                        IntakeOutcome::Created(conversation_id.clone()),
                        Some(conversation_id),
                    )
                } else {
                    (IntakeOutcome::Created(conversation_id), None)
                }
            }
            Err(error) => {
                warn!(error = %error, "support ticket creation failed");
                if self.state == WidgetState::FormEntry {
                    show_submission_failure(&error, &mut self.view);
                }
                (IntakeOutcome::Failed(error), None)
            }
        }
    }

    pub fn begin_reply(
        &mut self,
        conversation_id: &ConversationId,
        text: &str,
    ) -> Result<PendingReply, ReplyOutcome> {
        if self.state.conversation_id() != Some(conversation_id) {
            if text.trim().is_empty() {
                return Err(ReplyOutcome::Empty);
            }
            return Err(ReplyOutcome::NotBound);
        }
        self.reply.begin(conversation_id, text, &mut self.view)
    }

    pub fn reply_sent(&mut self, pending: &PendingReply) {
        self.reply.sent(pending, &mut self.view);
    }

    pub fn finish_reply(&mut self, pending: &PendingReply) {
        self.reply.finish(pending, &mut self.view);
    }

    pub fn reply_failed(&mut self, pending: &PendingReply, error: &GatewayError) {
        warn!(
            conversation_id = %pending.conversation_id,
            error = %error,
            "support reply failed"
        );
        self.reply.fail(pending, &mut self.view);
    }

    #[must_use]
    pub fn should_poll(&self, conversation_id: &ConversationId) -> bool {
        self.state.conversation_id() == Some(conversation_id)
            && self.poller.is_polling(conversation_id)
    }

    /// Feeds one history fetch result into the widget.
    pub fn apply_history(
        &mut self,
        conversation_id: &ConversationId,
        result: Result<Vec<Message>, HistoryError>,
    ) -> PollOutcome {
        if self.state.conversation_id() != Some(conversation_id) {
            debug!(
                conversation_id = %conversation_id,
                state = self.state.as_str(),
                "ignoring history for inactive conversation"
            );
            return PollOutcome::Ignored;
        }

        match result {
            Ok(messages) => PollOutcome::Rendered(self.renderer.render(&messages, &mut self.view)),
            Err(HistoryError::NotFound) => {
                self.conversation_gone(conversation_id);
                PollOutcome::ConversationGone
            }
            Err(HistoryError::Failure(error)) => {
                warn!(
                    conversation_id = %conversation_id,
                    error = %error,
                    "support poll tick dropped"
                );
                PollOutcome::TransientFailure
            }
        }
    }

    fn conversation_gone(&mut self, conversation_id: &ConversationId) {
        self.poller.stop();
        if let Err(error) = self.store.clear_conversation_id() {
            warn!(error = %error, "failed to clear support conversation id");
        }
        info!(
            conversation_id = %conversation_id,
            "support conversation no longer exists; returning to intake form"
        );
        self.enter_form();
    }

    fn enter_chat(&mut self, conversation_id: ConversationId) {
        self.state = WidgetState::ChatActive(conversation_id.clone());
        self.renderer.reset();
        self.view.show_chat(&conversation_id);
        self.poller.start(conversation_id.clone());
        self.reply.bind(&conversation_id, &mut self.view);
        info!(conversation_id = %conversation_id, "support chat active");
    }

    fn enter_form(&mut self) {
        self.poller.stop();
        self.reply.unbind(&mut self.view);
        self.renderer.reset();
        self.intake.reset(&mut self.view);
        self.state = WidgetState::FormEntry;
        self.view.show_intake_form();
        debug!("support intake form shown");
    }

    fn load_stored_conversation(&self) -> Option<ConversationId> {
        match self.store.load_conversation_id() {
            Ok(conversation_id) => conversation_id,
            Err(error) => {
                warn!(error = %error, "failed to load support conversation id");
                None
            }
        }
    }
}
