use tracing::debug;

use crate::gateway::GatewayError;
use crate::types::ConversationId;

pub const SEND_FAILURE_NOTICE: &str = "Failed to send message. Please try again.";

/// Display hooks owned by the reply composer.
pub trait ReplySurface {
    /// Attach the send action and the submit-on-Enter handler for
    /// `conversation_id`. Called only after `unbind_reply_actions`.
    fn bind_reply_actions(&mut self, conversation_id: &ConversationId);
    fn unbind_reply_actions(&mut self);
    fn set_reply_enabled(&mut self, enabled: bool);
    fn clear_reply_input(&mut self);
    fn focus_reply_input(&mut self);
    /// Blocking notice; a failed send is never swallowed.
    fn notify_send_failure(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Blank after trimming; silently ignored.
    Empty,
    /// No conversation is bound, or the caller's binding is stale.
    NotBound,
    Busy,
    Sent,
    Failed(GatewayError),
}

/// A reply on its way to the service, tied to the binding it was sent from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub conversation_id: ConversationId,
    pub content: String,
    binding: u64,
}

/// Holds the single live binding of the send controls.
#[derive(Debug, Default)]
pub struct ReplyController {
    bound: Option<ConversationId>,
    bindings_made: u64,
    /// Binding generation of the send in flight, if any.
    in_flight: Option<u64>,
}

impl ReplyController {
    /// Attaches the controls to `conversation_id` with the input enabled,
    /// whatever a previous binding left behind.
    pub fn bind<V>(&mut self, conversation_id: &ConversationId, surface: &mut V)
    where
        V: ReplySurface + ?Sized,
    {
        self.unbind(surface);
        surface.bind_reply_actions(conversation_id);
        surface.set_reply_enabled(true);
        self.bound = Some(conversation_id.clone());
        self.bindings_made = self.bindings_made.saturating_add(1);
        debug!(conversation_id = %conversation_id, "reply actions bound");
    }

    /// Drops the binding. A send still in flight becomes stale and its
    /// completion will not touch the controls.
    pub fn unbind<V>(&mut self, surface: &mut V)
    where
        V: ReplySurface + ?Sized,
    {
        if self.bound.take().is_some() {
            surface.unbind_reply_actions();
        }
        self.in_flight = None;
    }

    /// Checks the text and binding, then disables the input.
    pub fn begin<V>(
        &mut self,
        conversation_id: &ConversationId,
        text: &str,
        surface: &mut V,
    ) -> Result<PendingReply, ReplyOutcome>
    where
        V: ReplySurface + ?Sized,
    {
        let content = text.trim();
        if content.is_empty() {
            return Err(ReplyOutcome::Empty);
        }
        let Some(bound) = self.bound.clone() else {
            return Err(ReplyOutcome::NotBound);
        };
        if &bound != conversation_id {
            debug!(
                bound = %bound,
                requested = %conversation_id,
                "reply refused for stale binding"
            );
            return Err(ReplyOutcome::NotBound);
        }
        if self.in_flight.is_some() {
            return Err(ReplyOutcome::Busy);
        }

        self.in_flight = Some(self.bindings_made);
        surface.set_reply_enabled(false);
        Ok(PendingReply {
            conversation_id: bound,
            content: content.to_string(),
            binding: self.bindings_made,
        })
    }

    /// Whether `pending` is the send the current binding is waiting on.
    #[must_use]
    pub fn is_current(&self, pending: &PendingReply) -> bool {
        self.in_flight == Some(pending.binding) && self.bound.is_some()
    }

    pub fn sent<V>(&mut self, pending: &PendingReply, surface: &mut V)
    where
        V: ReplySurface + ?Sized,
    {
        if self.is_current(pending) {
            surface.clear_reply_input();
        }
    }

    /// Re-enables and focuses the input once the send (and its refresh) is
    /// done. Stale sends leave the controls to the binding that replaced them.
    pub fn finish<V>(&mut self, pending: &PendingReply, surface: &mut V)
    where
        V: ReplySurface + ?Sized,
    {
        if !self.is_current(pending) {
            debug!(
                conversation_id = %pending.conversation_id,
                "stale reply completion ignored"
            );
            return;
        }
        self.in_flight = None;
        surface.set_reply_enabled(true);
        surface.focus_reply_input();
    }

    /// The notice is shown even for stale sends; a failed send is never
    /// swallowed.
    pub fn fail<V>(&mut self, pending: &PendingReply, surface: &mut V)
    where
        V: ReplySurface + ?Sized,
    {
        surface.notify_send_failure(SEND_FAILURE_NOTICE);
        self.finish(pending, surface);
    }

    #[must_use]
    pub fn bound_conversation(&self) -> Option<&ConversationId> {
        self.bound.as_ref()
    }

    #[must_use]
    pub fn bindings_made(&self) -> u64 {
        self.bindings_made
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        bound: Vec<ConversationId>,
        live_bindings: i32,
        enabled: Vec<bool>,
        cleared: usize,
        focused: usize,
        notices: Vec<String>,
    }

    impl ReplySurface for RecordingSurface {
        fn bind_reply_actions(&mut self, conversation_id: &ConversationId) {
            self.bound.push(conversation_id.clone());
            self.live_bindings += 1;
        }

        fn unbind_reply_actions(&mut self) {
            self.live_bindings -= 1;
        }

        fn set_reply_enabled(&mut self, enabled: bool) {
            self.enabled.push(enabled);
        }

        fn clear_reply_input(&mut self) {
            self.cleared += 1;
        }

        fn focus_reply_input(&mut self) {
            self.focused += 1;
        }

        fn notify_send_failure(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    #[test]
    fn rebinding_replaces_previous_binding() {
        let mut controller = ReplyController::default();
        let mut surface = RecordingSurface::default();

        for id in ["T1", "T1", "T2"] {
            controller.bind(&ConversationId::new(id), &mut surface);
        }

        assert_eq!(surface.live_bindings, 1);
        assert_eq!(
            controller.bound_conversation(),
            Some(&ConversationId::new("T2"))
        );
        assert_eq!(controller.bindings_made(), 3);
    }

    #[test]
    fn blank_text_is_ignored_without_touching_the_input() {
        let mut controller = ReplyController::default();
        let mut surface = RecordingSurface::default();
        let id = ConversationId::new("T1");
        controller.bind(&id, &mut surface);

        assert_eq!(
            controller.begin(&id, "   \n", &mut surface),
            Err(ReplyOutcome::Empty)
        );
        assert_eq!(surface.enabled, vec![true]);
    }

    #[test]
    fn stale_binding_cannot_send() {
        let mut controller = ReplyController::default();
        let mut surface = RecordingSurface::default();
        controller.bind(&ConversationId::new("T1"), &mut surface);
        controller.bind(&ConversationId::new("T2"), &mut surface);

        assert_eq!(
            controller.begin(&ConversationId::new("T1"), "hello", &mut surface),
            Err(ReplyOutcome::NotBound)
        );
    }

    #[test]
    fn successful_send_clears_then_reenables() {
        let mut controller = ReplyController::default();
        let mut surface = RecordingSurface::default();
        let id = ConversationId::new("T1");
        controller.bind(&id, &mut surface);

        let pending = controller
            .begin(&id, "  my card was charged twice  ", &mut surface)
            .expect("valid reply");
        assert_eq!(pending.conversation_id, id);
        assert_eq!(pending.content, "my card was charged twice");
        assert_eq!(
            controller.begin(&id, "again", &mut surface),
            Err(ReplyOutcome::Busy)
        );

        controller.sent(&pending, &mut surface);
        controller.finish(&pending, &mut surface);

        assert_eq!(surface.enabled, vec![true, false, true]);
        assert_eq!(surface.cleared, 1);
        assert_eq!(surface.focused, 1);
    }

    #[test]
    fn failed_send_keeps_text_and_notifies() {
        let mut controller = ReplyController::default();
        let mut surface = RecordingSurface::default();
        let id = ConversationId::new("T1");
        controller.bind(&id, &mut surface);
        let pending = controller.begin(&id, "hello", &mut surface).expect("valid");

        controller.fail(&pending, &mut surface);

        assert_eq!(surface.cleared, 0);
        assert_eq!(surface.notices, vec![SEND_FAILURE_NOTICE]);
        assert_eq!(surface.enabled, vec![true, false, true]);
        assert_eq!(surface.focused, 1);
    }

    #[test]
    fn rebinding_during_a_send_leaves_the_input_usable() {
        let mut controller = ReplyController::default();
        let mut surface = RecordingSurface::default();
        let id = ConversationId::new("T1");
        controller.bind(&id, &mut surface);
        let stale = controller.begin(&id, "first", &mut surface).expect("valid");

        controller.unbind(&mut surface);
        controller.bind(&id, &mut surface);
        assert_eq!(surface.enabled.last(), Some(&true));

        let current = controller.begin(&id, "second", &mut surface).expect("not busy");
        controller.sent(&stale, &mut surface);
        controller.finish(&stale, &mut surface);
        assert_eq!(surface.cleared, 0);
        assert_eq!(surface.enabled.last(), Some(&false));
        assert_eq!(
            controller.begin(&id, "third", &mut surface),
            Err(ReplyOutcome::Busy)
        );

        controller.fail(&current, &mut surface);
        assert_eq!(surface.notices, vec![SEND_FAILURE_NOTICE]);
        assert_eq!(surface.enabled.last(), Some(&true));
        assert_eq!(surface.focused, 1);
    }
}
