//! Platform text-to-speech backends

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// A platform speech capability: plain text in, default voice and rate
pub trait SpeechSynthesizer: Send + Sync {
    /// Start speaking `text` without waiting for it to finish
    fn speak(&self, text: &str);

    fn name(&self) -> &str;
}

/// Speaks by piping text to an external program (`say`, `espeak-ng`, ...)
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: PathBuf,
    args: Vec<String>,
    name: String,
}

impl CommandSynthesizer {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        let name = program
            .file_name()
            .map_or_else(|| program.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            program,
            args,
            name,
        }
    }

    /// Resolve `program` on PATH
    pub fn locate(program: &str, args: &[&str]) -> Option<Self> {
        let path = which::which(program).ok()?;
        Some(Self::new(path, args.iter().map(ToString::to_string).collect()))
    }

    /// Run the program to completion with `text` on stdin
    pub async fn run(&self, text: &str) -> std::io::Result<ExitStatus> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        child.wait().await
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(synthesizer = %self.name, "No async runtime, dropping speech");
            return;
        };

        // Overlapping calls run side by side; queueing is left to the platform
        let synth = self.clone();
        let text = text.to_string();
        handle.spawn(async move {
            match synth.run(&text).await {
                Ok(status) if status.success() => {
                    tracing::debug!(synthesizer = %synth.name, "Speech finished");
                }
                Ok(status) => {
                    tracing::warn!(synthesizer = %synth.name, %status, "Speech program exited with failure");
                }
                Err(e) => {
                    tracing::warn!(synthesizer = %synth.name, error = %e, "Failed to run speech program");
                }
            }
        });
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Used when no speech program is available
#[derive(Debug, Default)]
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&self, _text: &str) {}

    fn name(&self) -> &str {
        "silent"
    }
}

#[cfg(target_os = "macos")]
const PLATFORM_CANDIDATES: &[(&str, &[&str])] = &[("say", &["-f", "-"])];

#[cfg(not(target_os = "macos"))]
const PLATFORM_CANDIDATES: &[(&str, &[&str])] =
    &[("espeak-ng", &["--stdin"]), ("espeak", &["--stdin"])];

/// Pick a speech backend.
///
/// `command` overrides detection; it is split on whitespace into program
/// and arguments and must read the text from stdin.
pub fn detect_synthesizer(command: Option<&str>) -> Arc<dyn SpeechSynthesizer> {
    if let Some(command) = command {
        let mut parts = command.split_whitespace();
        if let Some(program) = parts.next() {
            let args: Vec<&str> = parts.collect();
            if let Some(synth) = CommandSynthesizer::locate(program, &args) {
                tracing::info!(synthesizer = %synth.name, "Using configured speech command");
                return Arc::new(synth);
            }
            tracing::warn!(%program, "Configured speech command not found, voice will be silent");
            return Arc::new(SilentSynthesizer);
        }
    }

    for (program, args) in PLATFORM_CANDIDATES {
        if let Some(synth) = CommandSynthesizer::locate(program, args) {
            tracing::info!(synthesizer = %synth.name, "Detected platform speech program");
            return Arc::new(synth);
        }
    }

    tracing::warn!("No speech program found, voice will be silent");
    Arc::new(SilentSynthesizer)
}
