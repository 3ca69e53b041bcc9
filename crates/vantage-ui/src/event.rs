//! Event handling for the TUI

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

/// Events that can occur in the session window
#[derive(Debug, Clone)]
pub enum Event
{
    /// Keyboard input event
    Key(KeyEvent),
    /// Tick event (for periodic updates)
    Tick,
}

/// Event handler that reads from crossterm and produces window events
///
/// Input polling runs on a blocking task so the cooperative event loop in
/// [`crate::tui::Tui::run`] only ever sees ready events; everything the
/// launcher core does still happens on that one loop.
pub struct EventHandler
{
    receiver: mpsc::Receiver<Event>,
    should_stop: Arc<AtomicBool>,
    handle: tokio::task::JoinHandle<()>,
}

impl EventHandler
{
    /// Create a new event handler
    ///
    /// This spawns a background task that reads crossterm events
    /// and sends them to the async receiver.
    #[must_use]
    pub fn new() -> Self
    {
        let tick_rate = Duration::from_millis(250);
        let (sender, receiver) = mpsc::channel(100);
        let should_stop = Arc::new(AtomicBool::new(false));

        let should_stop_clone = should_stop.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let mut last_tick = std::time::Instant::now();
            loop {
                if should_stop_clone.load(Ordering::Relaxed) {
                    break;
                }

                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or_else(|| Duration::from_secs(0));

                if event::poll(timeout).unwrap_or(false) {
                    if let Ok(CrosstermEvent::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press {
                            // Blocking send since we're in a blocking context;
                            // a closed channel means the window is gone.
                            if sender.blocking_send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if sender.blocking_send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = std::time::Instant::now();
                }
            }
        });

        Self {
            receiver,
            should_stop,
            handle,
        }
    }

    /// Stop the event handler gracefully
    pub fn stop(&mut self)
    {
        self.should_stop.store(true, Ordering::Relaxed);
        self.receiver.close();
    }

    /// Check if the event handler task is still running
    #[must_use]
    pub fn is_running(&self) -> bool
    {
        !self.handle.is_finished()
    }

    /// Get the next event (async)
    pub async fn next(&mut self) -> Option<Event>
    {
        self.receiver.recv().await
    }
}

impl Default for EventHandler
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl Drop for EventHandler
{
    fn drop(&mut self)
    {
        self.stop();
    }
}
