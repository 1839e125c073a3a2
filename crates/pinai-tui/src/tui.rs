//! Terminal setup and the single event channel the UI loop reads from
//!
//! Three producers feed one unbounded channel: the crossterm input reader,
//! a fixed-rate ticker, and every background request task (through
//! [`EventHandler::sender`]). The loop in `main` is the only consumer.

use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::tasks::TaskEvent;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Drives the "Thinking..." animation and clears a wrong PIN after its delay
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    /// Result or progress from a background request
    Task(TaskEvent),
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: EventSender,
    /// Stops the reader and ticker when the handler is dropped
    shutdown: CancellationToken,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        spawn_input_reader(tx.clone(), shutdown.clone());
        spawn_ticker(tx.clone(), TICK_INTERVAL, shutdown.clone());

        Self { rx, tx, shutdown }
    }

    /// Sender handed to background request tasks.
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Translate terminal input into app events. Key releases and repeats are
/// dropped so each physical press acts once.
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

fn spawn_input_reader(tx: EventSender, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => break,
                next = reader.next() => next,
            };
            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    tracing::warn!("terminal event error: {}", e);
                    continue;
                }
                None => break,
            };
            if let Some(app_event) = translate(event) {
                if tx.send(app_event).is_err() {
                    break;
                }
            }
        }
        tracing::debug!("input reader stopped");
    });
}

fn spawn_ticker(tx: EventSender, period: Duration, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stderr()))?)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Put the terminal back before the default hook prints, so the panic
/// message is readable. The panic also lands in the log file.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        tracing::error!("panic: {}", panic_info);
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn test_only_key_presses_are_forwarded() {
        let press = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(matches!(translate(Event::Key(press)), Some(AppEvent::Key(_))));

        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };
        assert!(translate(Event::Key(release)).is_none());
        assert!(matches!(translate(Event::Resize(80, 24)), Some(AppEvent::Resize(80, 24))));
        assert!(translate(Event::FocusGained).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_on_shutdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        spawn_ticker(tx, Duration::from_millis(250), shutdown.clone());

        assert!(matches!(rx.recv().await, Some(AppEvent::Tick)));
        assert!(matches!(rx.recv().await, Some(AppEvent::Tick)));

        shutdown.cancel();
        // The task drops its sender once it sees the cancellation
        while rx.recv().await.is_some() {}
    }
}
