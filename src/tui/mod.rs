//! Interactive operator console. One loop owns the [`Console`] and feeds it
//! key presses, topic updates, request completions and debounce deadlines.

use std::fmt::{Display, Formatter};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::backend::{Backend, BackendError};
use crate::config::ConsoleConfig;
use crate::console::{Console, ConsoleEvent, OperatorAction};
use crate::runtime::EffectRunner;
use crate::sync::{ConnectionManager, TopicFeed};

mod config;
mod events;
mod lifecycle;
mod render;
mod state;

use config::INPUT_POLL_WAIT;
use events::{handle_key, LoopControl};
use lifecycle::{init_terminal, restore_terminal, TuiTerminal};
use render::{log_viewport_rows, render_ui};
use state::ViewState;

#[derive(Debug)]
pub enum TuiError {
    Io(io::Error),
    Backend(BackendError),
}

impl Display for TuiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TuiError::Io(error) => write!(f, "terminal failure: {error}"),
            TuiError::Backend(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for TuiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuiError::Io(error) => Some(error),
            TuiError::Backend(error) => Some(error),
        }
    }
}

impl From<io::Error> for TuiError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<BackendError> for TuiError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

enum TerminalInput {
    Key(KeyEvent),
    Resize,
    Failed(io::Error),
}

struct Channels {
    feed: TopicFeed,
    completions: mpsc::UnboundedReceiver<ConsoleEvent>,
    keys: mpsc::UnboundedReceiver<TerminalInput>,
}

pub async fn run_console(config: &ConsoleConfig, backend: Arc<dyn Backend>) -> Result<(), TuiError> {
    let (mut manager, feed) = ConnectionManager::start(config, Arc::clone(&backend))?;
    let (events_tx, completions) = mpsc::unbounded_channel();
    let runner = EffectRunner::new(backend, events_tx);
    let mut console = Console::new(config);
    let mut view = ViewState::default();

    let mut terminal = init_terminal()?;
    let stop = Arc::new(AtomicBool::new(false));
    let keys = spawn_key_reader(Arc::clone(&stop));
    tracing::info!(
        backend = %config.backend_url,
        transport = config.transport.label(),
        "console started"
    );

    runner.spawn_all(console.boot());
    let mut channels = Channels {
        feed,
        completions,
        keys,
    };
    let outcome = drive(
        &mut terminal,
        &mut console,
        &mut view,
        config,
        &runner,
        &mut channels,
    )
    .await;

    stop.store(true, Ordering::Relaxed);
    manager.shutdown();
    let restored = restore_terminal(&mut terminal);
    tracing::info!("console closed");
    outcome?;
    restored?;
    Ok(())
}

async fn drive(
    terminal: &mut TuiTerminal,
    console: &mut Console,
    view: &mut ViewState,
    config: &ConsoleConfig,
    runner: &EffectRunner,
    channels: &mut Channels,
) -> Result<(), TuiError> {
    loop {
        sync_viewport(terminal, console, view, runner)?;
        terminal.draw(|frame| render_ui(frame, &*console, &*view, config))?;

        let deadline = console.next_deadline();
        let event = tokio::select! {
            input = channels.keys.recv() => match input {
                Some(TerminalInput::Key(key)) => match handle_key(key, view, console.session()) {
                    LoopControl::Quit => return Ok(()),
                    LoopControl::Continue(actions) => {
                        for action in actions {
                            dispatch(console, runner, ConsoleEvent::Operator(action));
                        }
                        continue;
                    }
                },
                Some(TerminalInput::Resize) => continue,
                Some(TerminalInput::Failed(error)) => return Err(error.into()),
                None => return Ok(()),
            },
            Some(event) = channels.feed.next() => ConsoleEvent::Feed(event),
            Some(event) = channels.completions.recv() => event,
            _ = sleep_until(deadline) => ConsoleEvent::Tick,
        };
        dispatch(console, runner, event);
    }
}

fn dispatch(console: &mut Console, runner: &EffectRunner, event: ConsoleEvent) {
    let effects = console.handle(event, Instant::now());
    runner.spawn_all(effects);
}

/// Tells the log view how many rows it has whenever the terminal size
/// changes its pane height.
fn sync_viewport(
    terminal: &TuiTerminal,
    console: &mut Console,
    view: &mut ViewState,
    runner: &EffectRunner,
) -> Result<(), io::Error> {
    let size = terminal.size()?;
    let rows = log_viewport_rows(Rect::new(0, 0, size.width, size.height));
    if rows != view.viewport_rows {
        view.viewport_rows = rows;
        dispatch(
            console,
            runner,
            ConsoleEvent::Operator(OperatorAction::SetViewportRows(rows)),
        );
    }
    Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

/// Crossterm reads block, so keys are polled on the blocking pool and
/// forwarded until `stop` is set or the loop stops listening.
fn spawn_key_reader(stop: Arc<AtomicBool>) -> mpsc::UnboundedReceiver<TerminalInput> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            let input = match event::poll(INPUT_POLL_WAIT) {
                Ok(false) => continue,
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        TerminalInput::Key(key)
                    }
                    Ok(Event::Resize(_, _)) => TerminalInput::Resize,
                    Ok(_) => continue,
                    Err(error) => TerminalInput::Failed(error),
                },
                Err(error) => TerminalInput::Failed(error),
            };
            let failed = matches!(input, TerminalInput::Failed(_));
            if tx.send(input).is_err() || failed {
                break;
            }
        }
    });
    rx
}
