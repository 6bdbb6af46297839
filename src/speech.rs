//! Speech output
//!
//! Speaks bot replies aloud through the platform's text-to-speech program
//! when the voice preference is enabled.

mod synthesizer;

pub use synthesizer::{detect_synthesizer, SpeechSynthesizer};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide voice on/off switch, independent of the session lifecycle.
///
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct VoicePreference {
    enabled: Arc<AtomicBool>,
}

impl VoicePreference {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Flip the preference, returning the new value
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::SeqCst)
    }
}

impl Default for VoicePreference {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Speaks text when the voice preference allows it
#[derive(Clone)]
pub struct SpeechOutput {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    preference: VoicePreference,
}

impl SpeechOutput {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, preference: VoicePreference) -> Self {
        Self {
            synthesizer,
            preference,
        }
    }

    /// Fire-and-forget; no-op while the voice is disabled
    pub fn speak(&self, text: &str) {
        if !self.preference.is_enabled() {
            tracing::debug!("Voice disabled, not speaking");
            return;
        }
        self.synthesizer.speak(text);
    }

    /// Flip the voice preference. Speech already handed to the platform is unaffected.
    pub fn toggle(&self) -> bool {
        let enabled = self.preference.toggle();
        tracing::info!(enabled, "Voice toggled");
        enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.preference.is_enabled()
    }

    pub fn synthesizer_name(&self) -> &str {
        self.synthesizer.name()
    }
}
