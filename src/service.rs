//! Remote chat service abstraction
//!
//! The remote service is a black box exposing two JSON endpoints:
//! account verification and chat. This module owns the client side of
//! that contract.

mod client;
mod error;
mod types;

pub use client::HttpChatService;
pub use error::{ServiceError, ServiceErrorKind};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the remote chat service
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Exchange an account number for the account holder's profile
    async fn verify_account(&self, account_number: &str) -> Result<UserProfile, ServiceError>;

    /// Send a chat message on behalf of a verified account, returning the reply text
    async fn chat(&self, account_number: &str, message: &str) -> Result<String, ServiceError>;
}

#[async_trait]
impl<T: ChatService + ?Sized> ChatService for Arc<T> {
    async fn verify_account(&self, account_number: &str) -> Result<UserProfile, ServiceError> {
        (**self).verify_account(account_number).await
    }

    async fn chat(&self, account_number: &str, message: &str) -> Result<String, ServiceError> {
        (**self).chat(account_number, message).await
    }
}

/// Logging wrapper for chat services
pub struct LoggingService {
    inner: Arc<dyn ChatService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn ChatService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatService for LoggingService {
    async fn verify_account(&self, account_number: &str) -> Result<UserProfile, ServiceError> {
        let start = std::time::Instant::now();
        let result = self.inner.verify_account(account_number).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    "Account verification succeeded"
                );
            }
            Err(e) => {
                tracing::warn!(
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Account verification failed"
                );
            }
        }

        result
    }

    async fn chat(&self, account_number: &str, message: &str) -> Result<String, ServiceError> {
        let start = std::time::Instant::now();
        let result = self.inner.chat(account_number, message).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    message_chars = message.chars().count(),
                    reply_chars = reply.chars().count(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }
}
