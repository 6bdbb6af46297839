//! Session state types

use crate::service::UserProfile;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Counter tagging each verification attempt
pub type Generation = u64;

/// Unique id of one outbound chat request within a session
pub type RequestId = u64;

// ============================================================================
// Transcript
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Greeting seeded into the transcript on successful verification
pub fn welcome_message(name: &str) -> String {
    format!("Welcome {name}! How can I help you today?")
}

// ============================================================================
// Session State
// ============================================================================

/// A chat send accepted into the transcript but not yet issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedSend {
    pub request_id: RequestId,
    pub message: String,
}

/// Everything that exists only once the account is verified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Generation of the verification attempt that established this session
    pub generation: Generation,
    pub account_number: String,
    pub user: UserProfile,
    pub transcript: Vec<Message>,
    /// Chat requests issued and not yet resolved
    #[serde(default)]
    pub in_flight: BTreeSet<RequestId>,
    /// Sends waiting their turn under [`SendPolicy::Serialized`]
    #[serde(default)]
    pub queued: VecDeque<QueuedSend>,
}

impl ChatSession {
    pub fn new(generation: Generation, account_number: String, user: UserProfile) -> Self {
        let welcome = welcome_message(&user.name);
        Self {
            generation,
            account_number,
            user,
            transcript: vec![Message::bot(welcome)],
            in_flight: BTreeSet::new(),
            queued: VecDeque::new(),
        }
    }

    /// Whether any accepted send is still waiting for a reply
    pub fn has_pending_send(&self) -> bool {
        !self.in_flight.is_empty() || !self.queued.is_empty()
    }
}

/// Verification progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Verification {
    #[default]
    Unverified,

    /// Verification request in flight
    Verifying {
        generation: Generation,
        account_number: String,
    },

    /// Terminal: there is no logout path
    Verified(ChatSession),
}

/// Summary of [`Verification`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Verifying,
    Verified,
}

/// Full session state owned by the runtime
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub verification: Verification,
    /// Last generation handed out; bumped on every verification attempt
    pub generation: Generation,
    /// Next chat request id to hand out
    pub next_request_id: RequestId,
}

impl Session {
    pub fn status(&self) -> VerificationStatus {
        match self.verification {
            Verification::Unverified => VerificationStatus::Unverified,
            Verification::Verifying { .. } => VerificationStatus::Verifying,
            Verification::Verified(_) => VerificationStatus::Verified,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Verification::Verified(_))
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self.verification, Verification::Verifying { .. })
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        match &self.verification {
            Verification::Verified(chat) => Some(chat),
            _ => None,
        }
    }

    pub fn account_number(&self) -> Option<&str> {
        match &self.verification {
            Verification::Unverified => None,
            Verification::Verifying { account_number, .. } => Some(account_number),
            Verification::Verified(chat) => Some(&chat.account_number),
        }
    }

    pub fn verified_user(&self) -> Option<&UserProfile> {
        self.chat().map(|chat| &chat.user)
    }

    /// Empty until verified
    pub fn transcript(&self) -> &[Message] {
        self.chat().map_or(&[], |chat| chat.transcript.as_slice())
    }

    pub fn pending_send(&self) -> bool {
        self.chat().is_some_and(ChatSession::has_pending_send)
    }
}

/// How concurrent chat sends are issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPolicy {
    /// Every send is issued immediately; replies append in resolution order
    #[default]
    Concurrent,
    /// One request at a time in send order; replies append in send order
    Serialized,
}

/// Context for a session (immutable configuration)
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub send_policy: SendPolicy,
}

impl SessionContext {
    pub fn new(send_policy: SendPolicy) -> Self {
        Self { send_policy }
    }
}
