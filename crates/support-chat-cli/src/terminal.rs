use std::io::Write;

use support_widget_core::intake::SUBMIT_LABEL_BUSY;
use support_widget_core::{
    ConversationId, IntakeSurface, Message, ReplySurface, SenderType, TranscriptSurface,
    WidgetView,
};

pub const TOGGLE_LABEL: &str = "Support";

/// Line-oriented rendering of the widget. Write errors are dropped; a closed
/// stdout ends the session through stdin anyway.
pub struct TerminalView<W: Write> {
    out: W,
    printed: Vec<Message>,
    bound: Option<ConversationId>,
    reply_enabled: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: Vec::new(),
            bound: None,
            reply_enabled: false,
        }
    }

    /// Conversation the send action is currently attached to.
    #[must_use]
    pub fn bound_conversation(&self) -> Option<&ConversationId> {
        self.bound.as_ref()
    }

    #[must_use]
    pub fn reply_enabled(&self) -> bool {
        self.reply_enabled
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn prompt(&mut self, label: &str) {
        let _ = write!(self.out, "{label}: ");
        let _ = self.out.flush();
    }

    pub fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    pub fn help(&mut self) {
        self.line("Commands: /open  /close  /help  /quit");
        self.line("While chatting, any other line is sent to the support team.");
    }

    fn print_message(&mut self, message: &Message) {
        let speaker = match message.sender_type {
            SenderType::User => "you",
            SenderType::Admin => "support",
        };
        let content = sanitize_terminal_text(&message.content).replace('\n', "\n         ");
        let _ = writeln!(self.out, "{speaker:>7}: {content}");
    }
}

impl<W: Write> TranscriptSurface for TerminalView<W> {
    fn replace_transcript(&mut self, _markup: &str, messages: &[Message]) {
        // Only the tail is new unless history was rewritten server-side.
        if messages.starts_with(&self.printed) {
            for message in &messages[self.printed.len()..] {
                self.print_message(message);
            }
        } else {
            let _ = writeln!(self.out, "--- conversation refreshed ---");
            for message in messages {
                self.print_message(message);
            }
        }
        self.printed = messages.to_vec();
    }

    fn scroll_transcript_to_latest(&mut self) {
        let _ = self.out.flush();
    }
}

impl<W: Write> IntakeSurface for TerminalView<W> {
    fn show_intake_error(&mut self, message: &str) {
        self.line(&format!("! {message}"));
    }

    fn clear_intake_error(&mut self) {}

    fn set_intake_submitting(&mut self, submitting: bool) {
        if submitting {
            self.line(SUBMIT_LABEL_BUSY);
        }
    }
}

impl<W: Write> ReplySurface for TerminalView<W> {
    fn bind_reply_actions(&mut self, conversation_id: &ConversationId) {
        self.bound = Some(conversation_id.clone());
        self.reply_enabled = true;
    }

    fn unbind_reply_actions(&mut self) {
        self.bound = None;
        self.reply_enabled = false;
    }

    fn set_reply_enabled(&mut self, enabled: bool) {
        self.reply_enabled = enabled;
    }

    fn clear_reply_input(&mut self) {}

    fn focus_reply_input(&mut self) {
        let _ = self.out.flush();
    }

    fn notify_send_failure(&mut self, message: &str) {
        self.line(&format!("! {message}"));
    }
}

impl<W: Write> WidgetView for TerminalView<W> {
    fn show_closed(&mut self) {
        self.printed.clear();
        self.line("--- support chat closed ---");
    }

    fn show_intake_form(&mut self) {
        self.printed.clear();
        self.line("Start a conversation with our support team.");
    }

    fn show_chat(&mut self, conversation_id: &ConversationId) {
        self.printed.clear();
        let id = sanitize_terminal_text(conversation_id.as_str());
        self.line(&format!(
            "Connected to support (ticket {id}). Type a message and press Enter."
        ));
    }

    fn focus_toggle(&mut self) {
        self.line(&format!("[{TOGGLE_LABEL}] type /open to chat with us"));
    }
}

/// Drops control characters so remote content cannot drive the terminal.
/// Newlines survive; tabs become spaces.
#[must_use]
pub fn sanitize_terminal_text(raw: &str) -> String {
    raw.chars()
        .filter_map(|ch| match ch {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            ch if ch.is_control() => None,
            ch => Some(ch),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).expect("utf8 output")
    }

    #[test]
    fn escape_sequences_are_stripped() {
        assert_eq!(
            sanitize_terminal_text("\u{1b}[2Jhello\u{7}\tthere\r\nfriend"),
            "[2Jhello there\nfriend"
        );
    }

    #[test]
    fn transcript_prints_only_new_messages() {
        let mut view = TerminalView::new(Vec::new());
        let first = vec![Message::user("hi")];
        let second = vec![Message::user("hi"), Message::admin("hello, how can we help?")];

        view.replace_transcript("", &first);
        view.replace_transcript("", &second);

        assert_eq!(
            output(view),
            "    you: hi\nsupport: hello, how can we help?\n"
        );
    }

    #[test]
    fn rewritten_history_is_reprinted_in_full() {
        let mut view = TerminalView::new(Vec::new());
        view.replace_transcript("", &[Message::user("draft")]);
        view.replace_transcript("", &[Message::user("final")]);

        let printed = output(view);
        let reprinted = "--- conversation refreshed ---\n    you: final\n";
        assert!(printed.contains(reprinted));
    }

    #[test]
    fn reply_binding_tracks_latest_conversation() {
        let mut view = TerminalView::new(Vec::new());
        view.bind_reply_actions(&ConversationId::new("T1"));
        view.unbind_reply_actions();
        view.bind_reply_actions(&ConversationId::new("T2"));

        assert_eq!(view.bound_conversation(), Some(&ConversationId::new("T2")));
        assert!(view.reply_enabled());
    }
}
