use crate::types::Message;

/// Display target for the conversation transcript.
pub trait TranscriptSurface {
    /// Replace everything currently shown. `markup` is already escaped;
    /// `messages` is the same sequence for hosts that do not draw HTML.
    fn replace_transcript(&mut self, markup: &str, messages: &[Message]);
    fn scroll_transcript_to_latest(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Unchanged,
    Replaced,
}

/// Keeps the surface in step with the latest fetched history while leaving
/// it untouched when nothing changed between polls.
#[derive(Debug, Default)]
pub struct TranscriptRenderer {
    displayed: Option<String>,
    replacements: u64,
}

impl TranscriptRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<S>(&mut self, messages: &[Message], surface: &mut S) -> RenderOutcome
    where
        S: TranscriptSurface + ?Sized,
    {
        let markup = transcript_markup(messages);
        if self.displayed.as_deref() == Some(markup.as_str()) {
            return RenderOutcome::Unchanged;
        }

        surface.replace_transcript(&markup, messages);
        surface.scroll_transcript_to_latest();
        self.displayed = Some(markup);
        self.replacements = self.replacements.saturating_add(1);
        RenderOutcome::Replaced
    }

    /// Forget what is on screen. Called when the chat body is replaced by
    /// something else so the next render always draws.
    pub fn reset(&mut self) {
        self.displayed = None;
    }

    #[must_use]
    pub fn displayed_markup(&self) -> Option<&str> {
        self.displayed.as_deref()
    }

    #[must_use]
    pub fn replacements(&self) -> u64 {
        self.replacements
    }
}

#[must_use]
pub fn transcript_markup(messages: &[Message]) -> String {
    let mut markup = String::new();
    for message in messages {
        markup.push_str("<div class=\"msg ");
        markup.push_str(message.sender_type.as_str());
        markup.push_str("\">");
        markup.push_str(&escape_markup(&message.content));
        markup.push_str("</div>");
    }
    markup
}

/// Escapes every character with markup significance. All transcript content
/// passes through here regardless of sender.
#[must_use]
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}
