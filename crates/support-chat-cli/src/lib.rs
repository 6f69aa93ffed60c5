use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use support_widget_core::WidgetConfig;
use support_widget_core::config::{resolve_base_url, resolve_poll_interval};

mod session;
mod terminal;

pub use session::{Command, IntakeWizard, parse_command, run_session};
pub use terminal::{TerminalView, sanitize_terminal_text};

#[derive(Parser, Debug)]
#[command(name = "support-chat")]
#[command(about = "Chat with the support team from a terminal")]
pub struct SupportChatCli {
    /// Ticket service base URL. Defaults to $SUPPORT_WIDGET_BASE_URL, then http://127.0.0.1:5000/api.
    #[arg(long)]
    pub base_url: Option<String>,

    /// File holding the active ticket id. Defaults to the platform data directory.
    #[arg(long)]
    pub session_file: Option<PathBuf>,

    /// History poll period in milliseconds (minimum 250).
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Forget the saved ticket before starting.
    #[arg(long)]
    pub reset_session: bool,
}

impl SupportChatCli {
    /// Flags win over the environment, which wins over defaults.
    pub fn widget_config(&self) -> anyhow::Result<WidgetConfig> {
        let base_url = match self.base_url.as_deref() {
            Some(base_url) => base_url.to_string(),
            None => resolve_base_url().context("invalid base url in environment")?.0,
        };
        let mut config = WidgetConfig::new(&base_url).context("invalid --base-url")?;

        let poll_interval = match self.poll_interval_ms {
            Some(millis) => Some(Duration::from_millis(millis)),
            None => resolve_poll_interval().context("invalid poll interval in environment")?,
        };
        if let Some(poll_interval) = poll_interval {
            config = config.with_poll_interval(poll_interval);
        }
        if let Some(millis) = self.request_timeout_ms {
            config = config.with_request_timeout(Duration::from_millis(millis));
        }
        Ok(config)
    }
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = SupportChatCli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(run_session(cli))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap::error::ErrorKind;
    use support_widget_core::polling::MIN_POLL_INTERVAL;

    use super::SupportChatCli;

    #[test]
    fn cli_accepts_no_arguments() {
        let cli = SupportChatCli::try_parse_from(["support-chat"]).expect("defaults");
        assert_eq!(cli.base_url, None);
        assert!(!cli.reset_session);
    }

    #[test]
    fn cli_rejects_unknown_flags() {
        let err = match SupportChatCli::try_parse_from(["support-chat", "--ticket", "abc"]) {
            Ok(_) => panic!("expected unknown argument error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn flags_build_the_widget_config() {
        let cli = SupportChatCli::try_parse_from([
            "support-chat",
            "--base-url",
            "https://help.example.com/api/",
            "--poll-interval-ms",
            "10",
            "--request-timeout-ms",
            "750",
            "--reset-session",
        ])
        .expect("parse");

        let config = cli.widget_config().expect("config");
        assert_eq!(config.base_url, "https://help.example.com/api");
        assert_eq!(config.poll_interval, MIN_POLL_INTERVAL);
        assert_eq!(config.request_timeout.as_millis(), 750);
        assert!(cli.reset_session);
    }

    #[test]
    fn invalid_base_url_flag_is_reported() {
        let cli = SupportChatCli::try_parse_from(["support-chat", "--base-url", "localhost:5000"])
            .expect("parse");
        assert!(cli.widget_config().is_err());
    }
}
