//! Session and synchronization engine for the embeddable support chat widget.
//!
//! The crate performs no I/O of its own. Persistence, networking, timers and
//! display are reached through the [`SessionStore`], [`SupportGateway`],
//! [`PollScheduler`] and [`WidgetView`] seams so the same engine drives the
//! browser build and the terminal client.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod intake;
pub mod polling;
pub mod reply;
pub mod session_store;
pub mod transcript;
pub mod types;
pub mod widget;

pub use config::{ConfigError, WidgetConfig};
pub use controller::SupportWidgetController;
pub use gateway::{GatewayError, HistoryError, SupportGateway};
pub use intake::{IntakeForm, IntakeOutcome, IntakeSurface, IntakeValidationError, PendingIntake};
pub use polling::{DEFAULT_POLL_INTERVAL, PollOutcome, PollScheduler, PollingEngine};
pub use reply::{PendingReply, ReplyOutcome, ReplySurface};
pub use session_store::{DEFAULT_SESSION_STORAGE_KEY, MemorySessionStore, SessionStore};
pub use transcript::{RenderOutcome, TranscriptRenderer, TranscriptSurface, escape_markup};
pub use types::{ConversationId, Message, SenderType, TicketIntakeRecord};
pub use widget::{SupportWidget, WidgetState, WidgetView};
