//! Events that can occur in a session

use super::state::{Generation, RequestId};
use crate::service::{ServiceError, UserProfile};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    AccountSubmitted {
        account_number: String,
    },
    MessageSubmitted {
        text: String,
    },

    // Verification results
    VerificationSucceeded {
        generation: Generation,
        user: UserProfile,
    },
    VerificationFailed {
        generation: Generation,
        error: ServiceError,
    },

    // Chat results
    ChatReplied {
        generation: Generation,
        request_id: RequestId,
        response: String,
    },
    ChatFailed {
        generation: Generation,
        request_id: RequestId,
        error: ServiceError,
    },
}

impl Event {
    /// Whether this event is the resolution of an outbound request
    pub fn is_service_result(&self) -> bool {
        !matches!(
            self,
            Event::AccountSubmitted { .. } | Event::MessageSubmitted { .. }
        )
    }
}
