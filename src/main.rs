//! Verichat - terminal client for an account-assistant chat service
//!
//! Verifies an account number against the remote service, then runs a
//! chat session with it, optionally reading replies aloud.

mod config;
mod runtime;
mod service;
mod speech;
mod state_machine;
mod ui;

use config::ClientConfig;
use service::{HttpChatService, LoggingService};
use speech::{detect_synthesizer, SpeechOutput, VoicePreference};
use state_machine::SessionContext;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env();

    // The UI owns the terminal, so logs go to a file
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verichat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    tracing::info!(
        api_url = %config.api_url,
        send_policy = ?config.send_policy,
        voice = config.voice,
        "Starting client"
    );

    let client = HttpChatService::new(&config.api_url)?;
    let service = LoggingService::new(Arc::new(client));

    let synthesizer = detect_synthesizer(config.speech_command.as_deref());
    let speech = SpeechOutput::new(synthesizer, VoicePreference::new(config.voice));
    tracing::info!(synthesizer = speech.synthesizer_name(), "Speech output ready");

    let session = runtime::spawn_session(
        SessionContext::new(config.send_policy),
        service,
        speech.clone(),
    );

    let mut app = ui::App::new(config.title, speech);
    ui::run(&mut app, &session, config.intro).await?;

    tracing::info!("Client exiting");
    Ok(())
}
