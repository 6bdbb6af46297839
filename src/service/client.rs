//! HTTP implementation of the chat service contract

use super::types::{ChatRequest, ChatResponse, VerifyAccountRequest, VerifyAccountResponse};
use super::{ChatService, ServiceError, UserProfile};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Chat service reached over HTTP with JSON bodies
pub struct HttpChatService {
    client: Client,
    base_url: String,
}

impl HttpChatService {
    /// No request timeout is configured; a hung service hangs the caller.
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ServiceError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(%url, "POST");

        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ServiceError::network(format!("Connection failed: {e}"))
                } else if e.is_request() || e.is_body() {
                    ServiceError::network(format!("Request failed: {e}"))
                } else {
                    ServiceError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ServiceError::from_status(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            ServiceError::invalid_response(format!("Failed to parse response: {e} - body: {text}"))
                .with_status(status.as_u16())
        })
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn verify_account(&self, account_number: &str) -> Result<UserProfile, ServiceError> {
        let response: VerifyAccountResponse = self
            .post_json("verify-account", &VerifyAccountRequest { account_number })
            .await?;
        Ok(response.user)
    }

    async fn chat(&self, account_number: &str, message: &str) -> Result<String, ServiceError> {
        let response: ChatResponse = self
            .post_json(
                "chat",
                &ChatRequest {
                    account_number,
                    message,
                },
            )
            .await?;
        Ok(response.response)
    }
}
