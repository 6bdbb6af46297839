//! Presentation state and key dispatch

use crate::runtime::SessionUpdate;
use crate::speech::SpeechOutput;
use crate::state_machine::Session;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Transcript lines moved per page key
const SCROLL_STEP: u16 = 5;

const MISSED_NOTICES: &str = "Some notices were missed. Check the conversation.";

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiPhase {
    /// Splash shown until the intro finishes or is skipped
    Intro,
    LoginForm,
    ChatPanel,
}

/// Actions the UI loop forwards to the session runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    SubmitAccount(String),
    SendMessage(String),
    Quit,
}

/// All presentation state. Session state is only ever a snapshot
/// published by the runtime.
pub struct App {
    phase: UiPhase,
    title: String,
    account_input: String,
    message_input: String,
    session: Session,
    alert: Option<String>,
    /// Account sent, no snapshot or alert seen since
    submitting: bool,
    speech: SpeechOutput,
    /// Lines scrolled back from the newest transcript entry
    scroll: u16,
}

impl App {
    pub fn new(title: impl Into<String>, speech: SpeechOutput) -> Self {
        Self {
            phase: UiPhase::Intro,
            title: title.into(),
            account_input: String::new(),
            message_input: String::new(),
            session: Session::default(),
            alert: None,
            submitting: false,
            speech,
            scroll: 0,
        }
    }

    pub fn phase(&self) -> UiPhase {
        self.phase
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn account_input(&self) -> &str {
        &self.account_input
    }

    pub fn message_input(&self) -> &str {
        &self.message_input
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn voice_enabled(&self) -> bool {
        self.speech.is_enabled()
    }

    /// The verify button is disabled from the Enter press until the attempt resolves
    pub fn verify_pending(&self) -> bool {
        self.submitting || self.session.is_verifying()
    }

    pub fn verify_label(&self) -> &'static str {
        if self.verify_pending() {
            "Verifying..."
        } else {
            "Verify"
        }
    }

    pub fn voice_hint(&self) -> &'static str {
        if self.voice_enabled() {
            "Disable voice"
        } else {
            "Enable voice"
        }
    }

    /// Playback finished or skipped. Only the first call has an effect.
    pub fn finish_intro(&mut self) -> bool {
        if self.phase != UiPhase::Intro {
            return false;
        }
        tracing::debug!("Intro finished");
        self.phase = UiPhase::LoginForm;
        true
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            return Some(UiCommand::Quit);
        }

        // Alerts block everything until dismissed
        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return None;
        }

        match self.phase {
            UiPhase::Intro => {
                self.finish_intro();
                None
            }
            UiPhase::LoginForm => self.handle_login_key(key, ctrl),
            UiPhase::ChatPanel => self.handle_chat_key(key, ctrl),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent, ctrl: bool) -> Option<UiCommand> {
        match key.code {
            KeyCode::Enter => {
                if self.verify_pending() {
                    return None;
                }
                self.submitting = true;
                Some(UiCommand::SubmitAccount(self.account_input.clone()))
            }
            KeyCode::Backspace => {
                self.account_input.pop();
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.account_input.push(c);
                None
            }
            _ => None,
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent, ctrl: bool) -> Option<UiCommand> {
        if key.code == KeyCode::F(2) || (ctrl && key.code == KeyCode::Char('v')) {
            self.speech.toggle();
            return None;
        }

        match key.code {
            // Blank input still goes through so the session can reject it
            KeyCode::Enter if self.message_input.trim().is_empty() => {
                Some(UiCommand::SendMessage(self.message_input.clone()))
            }
            KeyCode::Enter => Some(UiCommand::SendMessage(std::mem::take(
                &mut self.message_input,
            ))),
            KeyCode::Backspace => {
                self.message_input.pop();
                None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_add(SCROLL_STEP);
                None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.message_input.push(c);
                None
            }
            _ => None,
        }
    }

    pub fn apply_update(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::StateChange { session } => {
                if session.transcript().len() > self.session.transcript().len() {
                    // Follow new messages
                    self.scroll = 0;
                }
                if session.is_verified() && self.phase == UiPhase::LoginForm {
                    self.phase = UiPhase::ChatPanel;
                }
                self.submitting = false;
                self.session = session;
            }
            SessionUpdate::Alert { message } => {
                self.submitting = false;
                self.alert = Some(message);
            }
            // Taken on Enter already; anything in the field now was typed since
            SessionUpdate::InputCleared => {}
        }
    }

    /// The update stream skipped `skipped` entries. The next snapshot
    /// catches the session up, but skipped alerts are gone.
    pub fn updates_lagged(&mut self, skipped: u64) {
        tracing::warn!(
            skipped,
            "UI fell behind session updates, notices may have been dropped"
        );
        self.submitting = false;
        self.alert = Some(MISSED_NOTICES.to_string());
    }

    /// Clamp scrolling so the top of the transcript is the furthest back
    pub fn clamp_scroll(&mut self, max: u16) {
        self.scroll = self.scroll.min(max);
    }
}
