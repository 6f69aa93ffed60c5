use std::io::Stdout;

use anyhow::{Context, Result};
use support_widget_client::{FileSessionStore, ReqwestSupportGateway, TokioPollScheduler};
use support_widget_core::{
    IntakeForm, IntakeOutcome, PollOutcome, SessionStore, SupportWidget, SupportWidgetController,
    WidgetState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::SupportChatCli;
use crate::terminal::TerminalView;

type Controller = SupportWidgetController<
    FileSessionStore,
    TokioPollScheduler,
    TerminalView<Stdout>,
    ReqwestSupportGateway,
>;

const INTAKE_PROMPTS: [&str; 4] = [
    "Name",
    "Email",
    "Account number (optional, 10 digits)",
    "How can we help?",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open,
    Close,
    Help,
    Quit,
    Text(String),
}

#[must_use]
pub fn parse_command(line: &str) -> Command {
    match line.trim() {
        "/open" => Command::Open,
        "/close" => Command::Close,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Text(line.to_string()),
    }
}

/// Collects the intake fields one line at a time.
#[derive(Debug, Default)]
pub struct IntakeWizard {
    form: IntakeForm,
    step: usize,
}

impl IntakeWizard {
    #[must_use]
    pub fn prompt(&self) -> Option<&'static str> {
        INTAKE_PROMPTS.get(self.step).copied()
    }

    /// Stores `line` in the current field. Returns the form once the last
    /// field has been answered.
    pub fn accept(&mut self, line: &str) -> Option<IntakeForm> {
        let value = line.to_string();
        match self.step {
            0 => self.form.name = value,
            1 => self.form.email = value,
            2 => self.form.account = value,
            3 => self.form.description = value,
            _ => return None,
        }
        self.step += 1;
        (self.step == INTAKE_PROMPTS.len()).then(|| self.form.clone())
    }

    pub fn restart(&mut self) {
        self.step = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run_session(cli: SupportChatCli) -> Result<()> {
    let config = cli.widget_config()?;
    let store = match &cli.session_file {
        Some(path) => FileSessionStore::new(path),
        None => FileSessionStore::at_default_location(),
    };
    if cli.reset_session {
        store
            .clear_conversation_id()
            .context("failed to reset the saved support session")?;
    }
    info!(
        base_url = %config.base_url,
        session_file = %store.path().display(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "support chat starting"
    );

    let (scheduler, mut ticks) = TokioPollScheduler::channel();
    let gateway = ReqwestSupportGateway::new(&config);
    let view = TerminalView::new(std::io::stdout());
    let widget = SupportWidget::new(store, scheduler, view, config.poll_interval);
    let controller: Controller = SupportWidgetController::new(widget, gateway);
    let mut wizard = IntakeWizard::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    controller.with_widget_mut(|widget| widget.view_mut().help());
    controller.open().await;
    show_prompt(&controller, &wizard);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                if handle_line(&controller, &mut wizard, &line).await == Flow::Quit {
                    break;
                }
                show_prompt(&controller, &wizard);
            }
            Some(conversation_id) = ticks.recv() => {
                let outcome = controller.refresh(&conversation_id).await;
                debug!(conversation_id = %conversation_id, ?outcome, "poll tick");
                if outcome == PollOutcome::ConversationGone {
                    wizard.restart();
                    show_prompt(&controller, &wizard);
                }
            }
        }
    }

    controller.close();
    info!("support chat finished");
    Ok(())
}

async fn handle_line(controller: &Controller, wizard: &mut IntakeWizard, line: &str) -> Flow {
    match parse_command(line) {
        Command::Quit => return Flow::Quit,
        Command::Help => controller.with_widget_mut(|widget| widget.view_mut().help()),
        Command::Open => {
            if !controller.state().is_open() {
                wizard.restart();
                controller.open().await;
            }
        }
        Command::Close => controller.close(),
        Command::Text(text) => match controller.state() {
            WidgetState::Closed => {
                controller.with_widget_mut(|widget| {
                    widget.view_mut().line("Type /open to chat with support.");
                });
            }
            WidgetState::FormEntry => {
                if let Some(form) = wizard.accept(&text) {
                    let outcome = controller.submit_intake(&form).await;
                    if !matches!(outcome, IntakeOutcome::Created(_)) {
                        wizard.restart();
                    }
                }
            }
            WidgetState::ChatActive(_) => {
                let bound =
                    controller.with_widget(|widget| widget.view().bound_conversation().cloned());
                if let Some(conversation_id) = bound {
                    controller.submit_reply(&conversation_id, &text).await;
                }
            }
        },
    }
    Flow::Continue
}

fn show_prompt(controller: &Controller, wizard: &IntakeWizard) {
    if controller.state() != WidgetState::FormEntry {
        return;
    }
    if let Some(label) = wizard.prompt() {
        controller.with_widget_mut(|widget| widget.view_mut().prompt(label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_recognized_and_other_lines_are_text() {
        assert_eq!(parse_command(" /open "), Command::Open);
        assert_eq!(parse_command("/close"), Command::Close);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(
            parse_command("/opening hours?"),
            Command::Text("/opening hours?".to_string())
        );
    }

    #[test]
    fn wizard_collects_fields_in_order() {
        let mut wizard = IntakeWizard::default();
        assert_eq!(wizard.prompt(), Some("Name"));
        assert_eq!(wizard.accept("Ada"), None);
        assert_eq!(wizard.accept("ada@example.com"), None);
        assert_eq!(
            wizard.prompt(),
            Some("Account number (optional, 10 digits)")
        );
        assert_eq!(wizard.accept(""), None);

        let form = wizard.accept("Card declined").expect("complete form");
        assert_eq!(
            form,
            IntakeForm {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                account: String::new(),
                description: "Card declined".to_string(),
            }
        );
        assert_eq!(wizard.prompt(), None);
    }

    #[test]
    fn restarting_keeps_previous_answers_until_overwritten() {
        let mut wizard = IntakeWizard::default();
        for line in ["Ada", "ada@example.com", "12345", "Card declined"] {
            wizard.accept(line);
        }
        wizard.restart();

        assert_eq!(wizard.prompt(), Some("Name"));
        wizard.accept("Ada L.");
        wizard.accept("ada@example.com");
        wizard.accept("1234567890");
        let form = wizard.accept("Card declined").expect("complete form");
        assert_eq!(form.name, "Ada L.");
        assert_eq!(form.account, "1234567890");
    }
}
