//! Pure state transition function

use super::state::{ChatSession, Message, QueuedSend, SendPolicy, Verification};
use super::{Effect, Event, Session, SessionContext};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: Session) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// No state change, no effects (stale or duplicate service result)
    pub fn unchanged(state: &Session) -> Self {
        Self::new(state.clone())
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors surfaced to the user.
///
/// Display strings are the user-facing notice text; the `reason` fields
/// carry the underlying service failure for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Invalid account number. Try again.")]
    Verification { reason: String },
    #[error("Please verify your account first.")]
    NotVerified,
    #[error("Message cannot be empty.")]
    EmptyMessage,
    #[error("Error sending message.")]
    Send { reason: String },
    #[error("Please enter an account number.")]
    EmptyAccountNumber,
    #[error("Account verification is already in progress.")]
    VerificationInProgress,
    #[error("Account is already verified.")]
    AlreadyVerified,
}

impl SessionError {
    /// Underlying cause, when one exists beyond the notice text
    pub fn reason(&self) -> Option<&str> {
        match self {
            SessionError::Verification { reason } | SessionError::Send { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    session: &Session,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, SessionError> {
    match (&session.verification, event) {
        // ============================================================
        // Account Submission
        // ============================================================

        (Verification::Unverified, Event::AccountSubmitted { account_number }) => {
            // Checked trimmed, sent as typed
            if account_number.trim().is_empty() {
                return Err(SessionError::EmptyAccountNumber);
            }

            let generation = session.generation + 1;
            let new_state = Session {
                verification: Verification::Verifying {
                    generation,
                    account_number: account_number.clone(),
                },
                generation,
                next_request_id: session.next_request_id,
            };

            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::NotifyStateChange)
                .with_effect(Effect::RequestVerification {
                    generation,
                    account_number,
                }))
        }

        (Verification::Verifying { .. }, Event::AccountSubmitted { .. }) => {
            Err(SessionError::VerificationInProgress)
        }

        (Verification::Verified(_), Event::AccountSubmitted { .. }) => {
            Err(SessionError::AlreadyVerified)
        }

        // ============================================================
        // Verification Results
        // ============================================================

        // Verifying + matching success -> Verified, seeded with the welcome
        (
            Verification::Verifying {
                generation,
                account_number,
            },
            Event::VerificationSucceeded {
                generation: resolved,
                user,
            },
        ) if *generation == resolved => {
            let chat = ChatSession::new(*generation, account_number.clone(), user);
            let welcome = super::state::welcome_message(&chat.user.name);

            Ok(TransitionResult::new(Session {
                verification: Verification::Verified(chat),
                ..session.clone()
            })
            .with_effect(Effect::NotifyStateChange)
            .with_effect(Effect::speak(welcome)))
        }

        // Verifying + matching failure -> Unverified, user may retry
        (
            Verification::Verifying { generation, .. },
            Event::VerificationFailed {
                generation: resolved,
                error,
            },
        ) if *generation == resolved => Ok(TransitionResult::new(Session {
            verification: Verification::Unverified,
            ..session.clone()
        })
        .with_effect(Effect::NotifyStateChange)
        .with_effect(Effect::alert(SessionError::Verification {
            reason: error.message,
        }))),

        // Stale generation, or a result arriving outside Verifying
        (_, Event::VerificationSucceeded { .. } | Event::VerificationFailed { .. }) => {
            Ok(TransitionResult::unchanged(session))
        }

        // ============================================================
        // Message Sending
        // ============================================================

        (Verification::Unverified | Verification::Verifying { .. }, Event::MessageSubmitted { .. }) => {
            Err(SessionError::NotVerified)
        }

        (Verification::Verified(chat), Event::MessageSubmitted { text }) => {
            if text.trim().is_empty() {
                return Err(SessionError::EmptyMessage);
            }

            let mut chat = chat.clone();
            let request_id = session.next_request_id;
            let issue_now = match context.send_policy {
                SendPolicy::Concurrent => true,
                SendPolicy::Serialized => !chat.has_pending_send(),
            };

            // Optimistic append: independent of how the request resolves
            chat.transcript.push(Message::user(text.clone()));

            let request = if issue_now {
                chat.in_flight.insert(request_id);
                Some(Effect::RequestChat {
                    generation: chat.generation,
                    request_id,
                    account_number: chat.account_number.clone(),
                    message: text,
                })
            } else {
                chat.queued.push_back(QueuedSend {
                    request_id,
                    message: text,
                });
                None
            };

            Ok(TransitionResult::new(Session {
                verification: Verification::Verified(chat),
                generation: session.generation,
                next_request_id: request_id + 1,
            })
            .with_effect(Effect::NotifyStateChange)
            .with_effect(Effect::ClearInput)
            .with_effects(request))
        }

        // ============================================================
        // Chat Results
        // ============================================================

        (
            Verification::Verified(chat),
            Event::ChatReplied {
                generation,
                request_id,
                response,
            },
        ) if chat.generation == generation && chat.in_flight.contains(&request_id) => {
            let mut chat = chat.clone();
            chat.in_flight.remove(&request_id);

            let outcome = if response.trim().is_empty() {
                Effect::alert(SessionError::Send {
                    reason: "service returned an empty response".to_string(),
                })
            } else {
                chat.transcript.push(Message::bot(response.clone()));
                Effect::speak(response)
            };
            let next = issue_next_queued(&mut chat, context);

            Ok(TransitionResult::new(Session {
                verification: Verification::Verified(chat),
                ..session.clone()
            })
            .with_effect(Effect::NotifyStateChange)
            .with_effect(outcome)
            .with_effects(next))
        }

        // The optimistic user message stays in the transcript unanswered
        (
            Verification::Verified(chat),
            Event::ChatFailed {
                generation,
                request_id,
                error,
            },
        ) if chat.generation == generation && chat.in_flight.contains(&request_id) => {
            let mut chat = chat.clone();
            chat.in_flight.remove(&request_id);
            let next = issue_next_queued(&mut chat, context);

            Ok(TransitionResult::new(Session {
                verification: Verification::Verified(chat),
                ..session.clone()
            })
            .with_effect(Effect::NotifyStateChange)
            .with_effect(Effect::alert(SessionError::Send {
                reason: error.message,
            }))
            .with_effects(next))
        }

        // Unknown request id or stale generation
        (_, Event::ChatReplied { .. } | Event::ChatFailed { .. }) => {
            Ok(TransitionResult::unchanged(session))
        }
    }
}

/// Under [`SendPolicy::Serialized`], issue the oldest queued send once
/// nothing is in flight.
fn issue_next_queued(chat: &mut ChatSession, context: &SessionContext) -> Option<Effect> {
    if context.send_policy != SendPolicy::Serialized || !chat.in_flight.is_empty() {
        return None;
    }
    let next = chat.queued.pop_front()?;
    chat.in_flight.insert(next.request_id);
    Some(Effect::RequestChat {
        generation: chat.generation,
        request_id: next.request_id,
        account_number: chat.account_number.clone(),
        message: next.message,
    })
}
