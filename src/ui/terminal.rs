//! Terminal setup and the UI event loop

use super::app::{App, UiCommand, UiPhase};
use super::render;
use crate::runtime::{SessionClosed, SessionHandle, SessionUpdate};
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static ALT_SCREEN_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum UiError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Session(#[from] SessionClosed),
    #[error("terminal input stopped")]
    InputClosed,
}

/// Restores the terminal on drop, and on panic through a shared hook
pub struct TerminalRestoreGuard;

impl TerminalRestoreGuard {
    pub fn new() -> Self {
        install_terminal_panic_hook();
        TerminalRestoreGuard
    }

    pub fn enable_raw_mode(&self) -> io::Result<()> {
        enable_raw_mode()?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn enter_alt_screen(&self, stdout: &mut impl Write) -> io::Result<()> {
        execute!(stdout, EnterAlternateScreen)?;
        ALT_SCREEN_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
    let mut stdout = io::stdout();
    if ALT_SCREEN_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
    let _ = execute!(stdout, Show);
    let _ = stdout.flush();
}

fn install_terminal_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            tracing::error!(panic = %info, "UI panicked");
            previous(info);
        }));
    });
}

/// Input forwarded from the blocking reader thread
enum TerminalInput {
    Key(KeyEvent),
    Resize,
}

/// crossterm reads block, so they live on their own thread
fn spawn_input_reader(tx: mpsc::UnboundedSender<TerminalInput>) -> io::Result<()> {
    std::thread::Builder::new()
        .name("terminal-input".into())
        .spawn(move || loop {
            let input = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => TerminalInput::Key(key),
                Ok(Event::Resize(_, _)) => TerminalInput::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read terminal input");
                    break;
                }
            };
            if tx.send(input).is_err() {
                break;
            }
        })?;
    Ok(())
}

/// Whether the UI loop keeps going after one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

async fn handle_input(
    app: &mut App,
    session: &SessionHandle,
    input: Option<TerminalInput>,
) -> Result<Flow, UiError> {
    // Raw mode swallows Ctrl+C, so without the reader there is no way out
    let Some(input) = input else {
        tracing::error!("Terminal input reader stopped");
        return Err(UiError::InputClosed);
    };
    let TerminalInput::Key(key) = input else {
        return Ok(Flow::Continue);
    };
    match app.handle_key(key) {
        Some(UiCommand::Quit) => return Ok(Flow::Stop),
        Some(UiCommand::SubmitAccount(account_number)) => {
            session.submit_account(account_number).await?;
        }
        Some(UiCommand::SendMessage(text)) => {
            session.send_message(text).await?;
        }
        None => {}
    }
    Ok(Flow::Continue)
}

fn handle_update(
    app: &mut App,
    update: Result<SessionUpdate, broadcast::error::RecvError>,
) -> Flow {
    match update {
        Ok(update) => app.apply_update(update),
        Err(broadcast::error::RecvError::Lagged(skipped)) => app.updates_lagged(skipped),
        Err(broadcast::error::RecvError::Closed) => return Flow::Stop,
    }
    Flow::Continue
}

/// Configure the terminal, run the UI until the user quits, and tear everything down.
pub async fn run(app: &mut App, session: &SessionHandle, intro: Duration) -> Result<(), UiError> {
    let guard = TerminalRestoreGuard::new();
    guard.enable_raw_mode()?;
    let mut stdout = io::stdout();
    guard.enter_alt_screen(&mut stdout)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    spawn_input_reader(input_tx)?;
    let mut updates = session.subscribe();

    let intro_timer = tokio::time::sleep(intro);
    tokio::pin!(intro_timer);

    loop {
        terminal.draw(|frame| render::draw(frame, app))?;

        tokio::select! {
            () = &mut intro_timer, if app.phase() == UiPhase::Intro => {
                app.finish_intro();
            }
            input = input_rx.recv() => {
                if handle_input(app, session, input).await? == Flow::Stop {
                    break;
                }
            }
            update = updates.recv() => {
                if handle_update(app, update) == Flow::Stop {
                    break;
                }
            }
        }
    }

    drop(terminal);
    drop(guard);
    tracing::info!("UI stopped");
    Ok(())
}
