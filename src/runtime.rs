//! Runtime for executing a session
//!
//! Owns the [`Session`], feeds events through the pure transition
//! function and carries out the resulting effects. The presentation layer
//! talks to it through a [`SessionHandle`].

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::service::ChatService;
use crate::speech::SpeechOutput;
use crate::state_machine::{Event, Session, SessionContext};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// Updates published to the presentation layer
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    StateChange {
        /// Full snapshot after the transition
        session: Session,
    },
    /// Blocking notice for the user
    Alert { message: String },
    InputCleared,
}

#[derive(Debug, Error)]
#[error("session runtime has stopped")]
pub struct SessionClosed;

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
}

impl SessionHandle {
    pub async fn submit_account(&self, account_number: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Event::AccountSubmitted {
            account_number: account_number.into(),
        })
        .await
    }

    pub async fn send_message(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Event::MessageSubmitted { text: text.into() }).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.broadcast_tx.subscribe()
    }

    async fn send(&self, event: Event) -> Result<(), SessionClosed> {
        self.event_tx.send(event).await.map_err(|_| SessionClosed)
    }
}

/// Start a session runtime on the current tokio runtime
pub fn spawn_session<C>(context: SessionContext, service: C, speech: SpeechOutput) -> SessionHandle
where
    C: ChatService + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);

    let runtime = SessionRuntime::new(
        context,
        Session::default(),
        service,
        speech,
        event_rx,
        event_tx.clone(),
        broadcast_tx.clone(),
    );

    tokio::spawn(async move {
        runtime.run().await;
    });

    SessionHandle {
        event_tx,
        broadcast_tx,
    }
}
