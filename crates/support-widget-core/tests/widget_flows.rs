use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::executor::block_on;
use support_widget_core::{
    ConversationId, GatewayError, HistoryError, IntakeForm, IntakeOutcome, IntakeSurface,
    MemorySessionStore, Message, PollOutcome, PollScheduler, ReplyOutcome, ReplySurface,
    SessionStore, SupportGateway, SupportWidget, SupportWidgetController, TicketIntakeRecord,
    TranscriptSurface, WidgetState, WidgetView,
};

#[derive(Debug, Default)]
struct Timers {
    next: u64,
    live: BTreeSet<u64>,
}

#[derive(Debug, Clone, Default)]
struct SharedScheduler(Rc<RefCell<Timers>>);

impl SharedScheduler {
    fn live(&self) -> usize {
        self.0.borrow().live.len()
    }
}

impl PollScheduler for SharedScheduler {
    type Handle = u64;

    fn schedule(&mut self, _conversation_id: &ConversationId, _period: Duration) -> u64 {
        let mut timers = self.0.borrow_mut();
        timers.next += 1;
        let handle = timers.next;
        timers.live.insert(handle);
        handle
    }

    fn cancel(&mut self, handle: u64) {
        self.0.borrow_mut().live.remove(&handle);
    }
}

#[derive(Debug, Default)]
struct Screen {
    transcript: String,
    transcript_writes: usize,
    intake_error: Option<String>,
    live_bindings: i32,
    bound_to: Option<ConversationId>,
    page: &'static str,
}

impl TranscriptSurface for Screen {
    fn replace_transcript(&mut self, markup: &str, _messages: &[Message]) {
        self.transcript = markup.to_string();
        self.transcript_writes += 1;
    }

    fn scroll_transcript_to_latest(&mut self) {}
}

impl IntakeSurface for Screen {
    fn show_intake_error(&mut self, message: &str) {
        self.intake_error = Some(message.to_string());
    }

    fn clear_intake_error(&mut self) {
        self.intake_error = None;
    }

    fn set_intake_submitting(&mut self, _submitting: bool) {}
}

impl ReplySurface for Screen {
    fn bind_reply_actions(&mut self, conversation_id: &ConversationId) {
        self.live_bindings += 1;
        self.bound_to = Some(conversation_id.clone());
    }

    fn unbind_reply_actions(&mut self) {
        self.live_bindings -= 1;
        self.bound_to = None;
    }

    fn set_reply_enabled(&mut self, _enabled: bool) {}

    fn clear_reply_input(&mut self) {}

    fn focus_reply_input(&mut self) {}

    fn notify_send_failure(&mut self, _message: &str) {}
}

impl WidgetView for Screen {
    fn show_closed(&mut self) {
        self.page = "closed";
    }

    fn show_intake_form(&mut self) {
        self.page = "form";
    }

    fn show_chat(&mut self, _conversation_id: &ConversationId) {
        self.page = "chat";
        self.transcript.clear();
    }

    fn focus_toggle(&mut self) {}
}

/// In-memory ticket service keyed by conversation id.
#[derive(Debug, Default)]
struct FakeService {
    next_ticket: RefCell<VecDeque<String>>,
    tickets: RefCell<Vec<(ConversationId, Vec<Message>)>>,
    requests: RefCell<usize>,
}

impl FakeService {
    fn issuing(ticket_id: &str) -> Self {
        let service = Self::default();
        service
            .next_ticket
            .borrow_mut()
            .push_back(ticket_id.to_string());
        service
    }

    fn purge(&self, conversation_id: &ConversationId) {
        self.tickets
            .borrow_mut()
            .retain(|(id, _)| id != conversation_id);
    }

    fn post_admin(&self, conversation_id: &ConversationId, content: &str) {
        for (id, messages) in self.tickets.borrow_mut().iter_mut() {
            if id == conversation_id {
                messages.push(Message::admin(content));
            }
        }
    }
}

#[async_trait(?Send)]
impl SupportGateway for FakeService {
    async fn create_ticket(
        &self,
        _record: &TicketIntakeRecord,
    ) -> Result<ConversationId, GatewayError> {
        *self.requests.borrow_mut() += 1;
        let Some(raw) = self.next_ticket.borrow_mut().pop_front() else {
            return Err(GatewayError::Rejected {
                message: "Database error".to_string(),
            });
        };
        let id = ConversationId::new(raw);
        self.tickets
            .borrow_mut()
            .push((id.clone(), Vec::new()));
        Ok(id)
    }

    async fn fetch_history(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, HistoryError> {
        *self.requests.borrow_mut() += 1;
        self.tickets
            .borrow()
            .iter()
            .find(|(id, _)| id == conversation_id)
            .map(|(_, messages)| messages.clone())
            .ok_or(HistoryError::NotFound)
    }

    async fn send_reply(
        &self,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<(), GatewayError> {
        *self.requests.borrow_mut() += 1;
        for (id, messages) in self.tickets.borrow_mut().iter_mut() {
            if id == conversation_id {
                messages.push(Message::user(content));
                return Ok(());
            }
        }
        Err(GatewayError::Http {
            status: 404,
            body: "ticket not found".to_string(),
        })
    }
}

type Controller =
    SupportWidgetController<Rc<MemorySessionStore>, SharedScheduler, Screen, FakeService>;

fn mount(store: Rc<MemorySessionStore>, service: FakeService) -> (Controller, SharedScheduler) {
    let scheduler = SharedScheduler::default();
    let widget = SupportWidget::new(
        store,
        scheduler.clone(),
        Screen::default(),
        Duration::from_secs(3),
    );
    (SupportWidgetController::new(widget, service), scheduler)
}

fn form(account: &str) -> IntakeForm {
    IntakeForm {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        account: account.to_string(),
        description: "Transfer stuck <pending>".to_string(),
    }
}

#[test]
fn created_ticket_survives_a_reload() {
    let store = Rc::new(MemorySessionStore::default());
    let (controller, scheduler) = mount(store.clone(), FakeService::issuing("abc123"));

    assert_eq!(block_on(controller.toggle()), None);
    let outcome = block_on(controller.submit_intake(&form("")));

    let id = ConversationId::new("abc123");
    assert_eq!(outcome, IntakeOutcome::Created(id.clone()));
    assert_eq!(controller.state(), WidgetState::ChatActive(id.clone()));
    assert_eq!(store.load_conversation_id(), Ok(Some(id.clone())));
    assert_eq!(scheduler.live(), 1);
    controller.with_widget(|widget| {
        assert_eq!(widget.view().page, "chat");
        assert_eq!(widget.view().transcript, "");
        assert_eq!(widget.view().transcript_writes, 1);
    });
    drop(controller);
    assert_eq!(scheduler.live(), 0);

    let service = FakeService::default();
    service
        .tickets
        .borrow_mut()
        .push((id.clone(), vec![Message::admin("We are looking into it")]));
    let (reloaded, _) = mount(store, service);
    block_on(reloaded.toggle());

    assert_eq!(reloaded.state(), WidgetState::ChatActive(id));
    reloaded.with_widget(|widget| {
        assert_eq!(widget.view().page, "chat");
        assert!(widget.view().transcript.contains("We are looking into it"));
    });
}

#[test]
fn purged_conversation_falls_back_to_a_fresh_form() {
    let store = Rc::new(MemorySessionStore::default());
    let (controller, scheduler) = mount(store.clone(), FakeService::issuing("abc123"));
    block_on(controller.open());
    block_on(controller.submit_intake(&form("1234567890")));
    let id = ConversationId::new("abc123");

    controller.gateway().purge(&id);
    let outcome = block_on(controller.refresh(&id));

    assert_eq!(outcome, PollOutcome::ConversationGone);
    assert_eq!(controller.state(), WidgetState::FormEntry);
    assert_eq!(store.load_conversation_id(), Ok(None));
    assert_eq!(scheduler.live(), 0);
    controller.with_widget(|widget| {
        assert_eq!(widget.view().page, "form");
        assert_eq!(widget.view().live_bindings, 0);
    });
}

#[test]
fn malformed_account_is_rejected_before_any_request() {
    let (controller, _) = mount(
        Rc::new(MemorySessionStore::default()),
        FakeService::issuing("abc123"),
    );
    block_on(controller.open());

    let outcome = block_on(controller.submit_intake(&form("12345")));

    assert!(matches!(outcome, IntakeOutcome::Invalid(_)));
    assert_eq!(*controller.gateway().requests.borrow(), 0);
    controller.with_widget(|widget| {
        assert_eq!(
            widget.view().intake_error.as_deref(),
            Some("Account number must be 10 digits.")
        );
    });
}

#[test]
fn polling_picks_up_agent_replies_and_skips_identical_history() {
    let store = Rc::new(MemorySessionStore::with_conversation(ConversationId::new("abc123")));
    let service = FakeService::default();
    let id = ConversationId::new("abc123");
    service
        .tickets
        .borrow_mut()
        .push((id.clone(), vec![Message::user("hello")]));
    let (controller, _) = mount(store, service);

    block_on(controller.open());
    block_on(controller.refresh(&id));
    block_on(controller.refresh(&id));
    controller.with_widget(|widget| assert_eq!(widget.view().transcript_writes, 1));

    controller.gateway().post_admin(&id, "<b>Hi</b>, how can I help?");
    block_on(controller.refresh(&id));

    controller.with_widget(|widget| {
        assert_eq!(widget.view().transcript_writes, 2);
        assert!(
            widget
                .view()
                .transcript
                .ends_with("<div class=\"msg admin\">&lt;b&gt;Hi&lt;/b&gt;, how can I help?</div>")
        );
    });
}

#[test]
fn reopening_many_times_keeps_one_binding_and_one_timer() {
    let id = ConversationId::new("abc123");
    let store = Rc::new(MemorySessionStore::with_conversation(id.clone()));
    let service = FakeService::default();
    service.tickets.borrow_mut().push((id.clone(), Vec::new()));
    let (controller, scheduler) = mount(store, service);

    for cycle in 1..=25 {
        block_on(controller.toggle());
        assert_eq!(scheduler.live(), 1, "cycle {cycle} open");
        controller.with_widget(|widget| {
            assert_eq!(widget.view().live_bindings, 1, "cycle {cycle} open");
        });
        block_on(controller.toggle());
        assert_eq!(scheduler.live(), 0, "cycle {cycle} closed");
    }

    block_on(controller.open());
    let outcome = block_on(controller.submit_reply(&id, "still there?"));
    assert_eq!(outcome, ReplyOutcome::Sent);
    let sent = controller
        .gateway()
        .tickets
        .borrow()
        .iter()
        .find(|(ticket, _)| ticket == &id)
        .map(|(_, messages)| {
            messages
                .iter()
                .filter(|message| message.content == "still there?")
                .count()
        });
    assert_eq!(sent, Some(1));
    controller.with_widget(|widget| {
        assert_eq!(widget.reply_controller().bindings_made(), 26);
        assert_eq!(widget.view().live_bindings, 1);
        assert_eq!(widget.view().bound_to.as_ref(), Some(&id));
    });
}

#[test]
fn reply_after_close_is_refused() {
    let id = ConversationId::new("abc123");
    let store = Rc::new(MemorySessionStore::with_conversation(id.clone()));
    let service = FakeService::default();
    service.tickets.borrow_mut().push((id.clone(), Vec::new()));
    let (controller, _) = mount(store, service);

    block_on(controller.open());
    controller.close();

    assert_eq!(
        block_on(controller.submit_reply(&id, "hello?")),
        ReplyOutcome::NotBound
    );
    assert_eq!(*controller.gateway().requests.borrow(), 1);
}
