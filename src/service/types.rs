//! Wire types for the remote chat service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile returned by account verification.
///
/// Only `name` is required; anything else the service sends is kept
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// Body of `POST /verify-account`
#[derive(Debug, Serialize)]
pub struct VerifyAccountRequest<'a> {
    pub account_number: &'a str,
}

/// Successful `POST /verify-account` response
#[derive(Debug, Deserialize)]
pub struct VerifyAccountResponse {
    pub user: UserProfile,
}

/// Body of `POST /chat`
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub account_number: &'a str,
    pub message: &'a str,
}

/// Successful `POST /chat` response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
