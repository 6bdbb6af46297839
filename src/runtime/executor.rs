//! Session runtime executor

use super::SessionUpdate;

use crate::service::ChatService;
use crate::speech::SpeechOutput;
use crate::state_machine::{transition, Effect, Event, Session, SessionContext};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Generic session runtime that can work with any chat service implementation
pub struct SessionRuntime<C>
where
    C: ChatService + 'static,
{
    context: SessionContext,
    state: Session,
    service: Arc<C>,
    speech: SpeechOutput,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
}

impl<C> SessionRuntime<C>
where
    C: ChatService + 'static,
{
    pub fn new(
        context: SessionContext,
        state: Session,
        service: C,
        speech: SpeechOutput,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<SessionUpdate>,
    ) -> Self {
        Self {
            context,
            state,
            service: Arc::new(service),
            speech,
            event_rx,
            event_tx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(send_policy = ?self.context.send_policy, "Starting session runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!("Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let is_service_result = event.is_service_result();

        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                // Rejected user actions are surfaced, state is untouched
                tracing::info!(error = %e, status = ?self.state.status(), "Action rejected");
                self.publish(SessionUpdate::Alert {
                    message: e.to_string(),
                });
                return;
            }
        };

        if is_service_result && result.effects.is_empty() {
            tracing::debug!(
                generation = self.state.generation,
                "Discarded stale service result"
            );
        }

        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::NotifyStateChange => {
                self.publish(SessionUpdate::StateChange {
                    session: self.state.clone(),
                });
            }

            Effect::RequestVerification {
                generation,
                account_number,
            } => {
                let service = self.service.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    tracing::info!(generation, "Verifying account (background)");

                    let event = match service.verify_account(&account_number).await {
                        Ok(user) => Event::VerificationSucceeded { generation, user },
                        Err(error) => Event::VerificationFailed { generation, error },
                    };
                    let _ = event_tx.send(event).await;
                });
            }

            Effect::RequestChat {
                generation,
                request_id,
                account_number,
                message,
            } => {
                let service = self.service.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    tracing::info!(generation, request_id, "Sending chat message (background)");

                    let event = match service.chat(&account_number, &message).await {
                        Ok(response) => Event::ChatReplied {
                            generation,
                            request_id,
                            response,
                        },
                        Err(error) => Event::ChatFailed {
                            generation,
                            request_id,
                            error,
                        },
                    };
                    let _ = event_tx.send(event).await;
                });
            }

            Effect::Speak { text } => {
                self.speech.speak(&text);
            }

            Effect::ClearInput => {
                self.publish(SessionUpdate::InputCleared);
            }

            Effect::Alert { error } => {
                tracing::warn!(
                    notice = %error,
                    reason = error.reason().unwrap_or_default(),
                    "Alerting user"
                );
                self.publish(SessionUpdate::Alert {
                    message: error.to_string(),
                });
            }
        }
    }

    fn publish(&self, update: SessionUpdate) {
        // No subscribers is fine: the UI may not be attached yet
        let _ = self.broadcast_tx.send(update);
    }
}
