use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::types::{ConversationId, Message, SenderType, TicketIntakeRecord};

pub const INIT_TICKET_PATH: &str = "/init_ticket";
pub const REPLY_PATH: &str = "/reply";
pub const CREATE_TICKET_SUCCESS_STATUS: &str = "success";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request failed: {message}")]
    Request { message: String },
    #[error("response read failed: {message}")]
    Read { message: String },
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("failed to decode response: {message}")]
    Decode { message: String },
    #[error("{message}")]
    Rejected { message: String },
}

impl GatewayError {
    /// Text suitable for an inline error next to the control that failed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The conversation was closed or purged server-side.
    #[error("conversation not found")]
    NotFound,
    #[error(transparent)]
    Failure(#[from] GatewayError),
}

/// The only component allowed to talk to the ticket service. Each call is a
/// single round trip; callers own any retry policy.
#[async_trait(?Send)]
pub trait SupportGateway {
    async fn create_ticket(
        &self,
        record: &TicketIntakeRecord,
    ) -> Result<ConversationId, GatewayError>;

    async fn fetch_history(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, HistoryError>;

    async fn send_reply(
        &self,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<(), GatewayError>;
}

#[derive(Debug, Serialize)]
pub struct CreateTicketRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub account: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a TicketIntakeRecord> for CreateTicketRequest<'a> {
    fn from(record: &'a TicketIntakeRecord) -> Self {
        Self {
            name: &record.name,
            email: &record.email,
            account: record.account.as_deref().unwrap_or_default(),
            description: &record.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ticket_id: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateTicketResponse {
    fn conversation_id(&self) -> Option<ConversationId> {
        match self.ticket_id.as_ref()? {
            serde_json::Value::String(raw) => ConversationId::from_stored(raw),
            serde_json::Value::Number(number) => Some(ConversationId::new(number.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplyRequest<'a> {
    pub ticket_id: &'a str,
    pub sender_type: SenderType,
    pub message: &'a str,
}

impl<'a> ReplyRequest<'a> {
    #[must_use]
    pub fn from_user(conversation_id: &'a ConversationId, message: &'a str) -> Self {
        Self {
            ticket_id: conversation_id.as_str(),
            sender_type: SenderType::User,
            message,
        }
    }
}

/// Full history URL for `conversation_id`. The id is percent-encoded as a
/// single path segment, so separators inside it cannot change the route.
pub fn history_url(
    base_url: &str,
    conversation_id: &ConversationId,
) -> Result<String, GatewayError> {
    let invalid_base = |message: String| GatewayError::Request { message };
    let mut url = Url::parse(base_url)
        .map_err(|error| invalid_base(format!("invalid base url {base_url:?}: {error}")))?;
    url.path_segments_mut()
        .map_err(|()| invalid_base(format!("base url {base_url:?} cannot carry a path")))?
        .pop_if_empty()
        .extend(["ticket", conversation_id.as_str(), "history"]);
    Ok(url.into())
}

/// Success is decided by the body's `status` field; the HTTP status only
/// matters when the body cannot be parsed.
pub fn interpret_create_ticket_response(
    status: u16,
    body: &[u8],
) -> Result<ConversationId, GatewayError> {
    let response = match serde_json::from_slice::<CreateTicketResponse>(body) {
        Ok(response) => response,
        Err(error) if is_success_status(status) => {
            return Err(GatewayError::Decode {
                message: error.to_string(),
            });
        }
        Err(_) => return Err(http_error(status, body)),
    };

    if response.status.as_deref() != Some(CREATE_TICKET_SUCCESS_STATUS) {
        let message = response
            .message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
        return Err(GatewayError::Rejected { message });
    }

    response.conversation_id().ok_or_else(|| GatewayError::Decode {
        message: "ticket_id missing from successful response".to_string(),
    })
}

pub fn interpret_history_response(status: u16, body: &[u8]) -> Result<Vec<Message>, HistoryError> {
    if status == 404 {
        return Err(HistoryError::NotFound);
    }
    if !is_success_status(status) {
        return Err(http_error(status, body).into());
    }
    serde_json::from_slice::<Vec<Message>>(body).map_err(|error| {
        HistoryError::Failure(GatewayError::Decode {
            message: error.to_string(),
        })
    })
}

pub fn interpret_reply_response(status: u16, body: &[u8]) -> Result<(), GatewayError> {
    if is_success_status(status) {
        Ok(())
    } else {
        Err(http_error(status, body))
    }
}

#[must_use]
pub fn http_error(status: u16, body: &[u8]) -> GatewayError {
    let body = String::from_utf8_lossy(body).trim().to_string();
    let body = if body.is_empty() {
        "<empty>".to_string()
    } else {
        body
    };
    GatewayError::Http { status, body }
}

fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}
