use async_trait::async_trait;
use futures_util::future::{Either, select};
use futures_util::pin_mut;
use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::future::sleep;
use serde::Serialize;
use support_widget_core::gateway::{
    CreateTicketRequest, INIT_TICKET_PATH, REPLY_PATH, ReplyRequest, history_url,
    interpret_create_ticket_response, interpret_history_response, interpret_reply_response,
};
use support_widget_core::{
    GatewayError, HistoryError, Message, SupportGateway, TicketIntakeRecord, WidgetConfig,
};
use uuid::Uuid;

use super::*;

/// `fetch`-backed transport for the ticket service.
pub(super) struct GlooSupportGateway {
    config: WidgetConfig,
}

impl GlooSupportGateway {
    pub(super) fn new(config: &WidgetConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn request(&self, builder: fn(&str) -> RequestBuilder, url: &str) -> RequestBuilder {
        builder(url)
            .header("x-request-id", &format!("req_{}", Uuid::new_v4().simple()))
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<(u16, Vec<u8>), GatewayError> {
        let body = serde_json::to_string(payload).map_err(|error| GatewayError::Request {
            message: format!("failed to serialize request body: {error}"),
        })?;
        let request = self
            .request(Request::post, &self.config.endpoint(path))
            .header("content-type", "application/json")
            .body(body)
            .map_err(|error| GatewayError::Request {
                message: format!("failed to build request: {error}"),
            })?;
        self.exchange(request).await
    }

    async fn get(&self, url: &str) -> Result<(u16, Vec<u8>), GatewayError> {
        let request = self
            .request(Request::get, url)
            .build()
            .map_err(|error| GatewayError::Request {
                message: format!("failed to build request: {error}"),
            })?;
        self.exchange(request).await
    }

    /// One round trip, abandoned once the request timeout elapses.
    async fn exchange(&self, request: Request) -> Result<(u16, Vec<u8>), GatewayError> {
        let round_trip = async move {
            let response = request
                .send()
                .await
                .map_err(|error| GatewayError::Request {
                    message: error.to_string(),
                })?;
            let status = response.status();
            let body = response
                .binary()
                .await
                .map_err(|error| GatewayError::Read {
                    message: error.to_string(),
                })?;
            Ok::<_, GatewayError>((status, body))
        };
        let timeout = self.config.request_timeout;
        let deadline = sleep(timeout);
        pin_mut!(round_trip, deadline);

        match select(round_trip, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(GatewayError::Request {
                message: format!("timed out after {} ms", timeout.as_millis()),
            }),
        }
    }
}

#[async_trait(?Send)]
impl SupportGateway for GlooSupportGateway {
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
        let url = history_url(&self.config.base_url, conversation_id)?;
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
