//! Client configuration from the environment

use crate::state_machine::state::SendPolicy;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TITLE: &str = "Account Assistant";
const DEFAULT_INTRO_MS: u64 = 3000;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote chat service
    pub api_url: String,
    /// Initial voice preference
    pub voice: bool,
    /// Overrides speech program detection
    pub speech_command: Option<String>,
    pub intro: Duration,
    pub send_policy: SendPolicy,
    pub title: String,
    pub log_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let voice = var("VERICHAT_VOICE")
            .and_then(|v| parse_switch(&v))
            .unwrap_or(true);

        let intro_ms = var("VERICHAT_INTRO_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_INTRO_MS);

        let send_policy = match var("VERICHAT_SEND_POLICY").as_deref() {
            Some("serialized") => SendPolicy::Serialized,
            Some("concurrent") | None => SendPolicy::Concurrent,
            Some(other) => {
                tracing::warn!(value = %other, "Unknown send policy, using concurrent");
                SendPolicy::Concurrent
            }
        };

        let log_path = var("VERICHAT_LOG_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.verichat/client.log"))
            },
            PathBuf::from,
        );

        Self {
            api_url: var("VERICHAT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            voice,
            speech_command: var("VERICHAT_SPEECH_COMMAND"),
            intro: Duration::from_millis(intro_ms),
            send_policy,
            title: var("VERICHAT_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            log_path,
        }
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
