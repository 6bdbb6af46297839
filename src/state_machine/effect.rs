//! Effects produced by state transitions

use super::state::{Generation, RequestId};
use super::transition::SessionError;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Publish the new state to the presentation layer
    NotifyStateChange,

    /// Call `POST /verify-account` (spawns as background task)
    RequestVerification {
        generation: Generation,
        account_number: String,
    },

    /// Call `POST /chat` (spawns as background task)
    RequestChat {
        generation: Generation,
        request_id: RequestId,
        account_number: String,
        message: String,
    },

    /// Hand text to speech output
    Speak { text: String },

    /// Empty the message input buffer
    ClearInput,

    /// Blocking user-visible notice
    Alert { error: SessionError },
}

impl Effect {
    pub fn speak(text: impl Into<String>) -> Self {
        Effect::Speak { text: text.into() }
    }

    pub fn alert(error: SessionError) -> Self {
        Effect::Alert { error }
    }
}
