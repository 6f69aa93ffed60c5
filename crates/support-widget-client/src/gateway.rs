use std::time::Duration;

use async_trait::async_trait;
use support_widget_core::config::{ConfigError, DEFAULT_REQUEST_TIMEOUT, WidgetConfig};
use support_widget_core::gateway::{
    CreateTicketRequest, INIT_TICKET_PATH, REPLY_PATH, ReplyRequest, history_url,
    interpret_create_ticket_response, interpret_history_response, interpret_reply_response,
};
use support_widget_core::{
    ConversationId, GatewayError, HistoryError, Message, SupportGateway, TicketIntakeRecord,
};
use tracing::debug;
use uuid::Uuid;

/// HTTP transport for the ticket service. One attempt per call; the poll
/// timer is the retry loop for history.
#[derive(Debug, Clone)]
pub struct ReqwestSupportGateway {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl ReqwestSupportGateway {
    #[must_use]
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.request_timeout,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_base_url(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let config = WidgetConfig::new(base_url)?
            .with_request_timeout(timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT));
        Ok(Self::new(&config))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn post_json<Req>(
        &self,
        path: &str,
        payload: &Req,
    ) -> Result<(u16, Vec<u8>), GatewayError>
    where
        Req: serde::Serialize + ?Sized,
    {
        let request = self
            .http
            .post(self.endpoint(path))
            .header("x-request-id", new_request_id())
            .timeout(self.timeout)
            .json(payload);
        read_response(request).await
    }

    async fn get(&self, url: &str) -> Result<(u16, Vec<u8>), GatewayError> {
        let request = self
            .http
            .get(url)
            .header("x-request-id", new_request_id())
            .timeout(self.timeout);
        read_response(request).await
    }
}

#[async_trait(?Send)]
impl SupportGateway for ReqwestSupportGateway {
    async fn create_ticket(
        &self,
        record: &TicketIntakeRecord,
    ) -> Result<ConversationId, GatewayError> {
        let (status, body) = self
            .post_json(INIT_TICKET_PATH, &CreateTicketRequest::from(record))
            .await?;
        interpret_create_ticket_response(status, &body)
    }

    async fn fetch_history(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, HistoryError> {
        let url = history_url(&self.base_url, conversation_id)?;
        let (status, body) = self.get(&url).await?;
        interpret_history_response(status, &body)
    }

    async fn send_reply(
        &self,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<(), GatewayError> {
        let (status, body) = self
            .post_json(REPLY_PATH, &ReplyRequest::from_user(conversation_id, content))
            .await?;
        interpret_reply_response(status, &body)
    }
}

async fn read_response(request: reqwest::RequestBuilder) -> Result<(u16, Vec<u8>), GatewayError> {
    let response = request
        .send()
        .await
        .map_err(|error| GatewayError::Request {
            message: error.to_string(),
        })?;
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|error| GatewayError::Read {
            message: error.to_string(),
        })?;
    debug!(status, bytes = body.len(), "support gateway response");
    Ok((status, body.to_vec()))
}

fn new_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}
