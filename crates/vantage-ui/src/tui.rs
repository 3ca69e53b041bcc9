//! Terminal User Interface initialization and management

use std::io::{self, Stdout};
use std::panic;

use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use vantage_utils::info;

use crate::app::App;
use crate::event::{Event, EventHandler};

/// Terminal session window
///
/// Manages the terminal state and runs the cooperative event loop that owns
/// the window for the lifetime of the session.
pub struct Tui
{
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui
{
    /// Create a new TUI instance
    ///
    /// Initializes the terminal in raw mode on the alternate screen and sets
    /// up panic handling to restore the terminal on panic.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization fails.
    pub fn new() -> io::Result<Self>
    {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        // Set up panic hook to restore terminal on panic
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = Self::restore();
            original_hook(panic_info);
        }));

        Ok(Self { terminal })
    }

    /// Run the window event loop until the user quits.
    ///
    /// Disassembly, artifact loading, and everything else the app triggers
    /// runs synchronously inside this loop; long-running engine calls block
    /// further input until they return.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal drawing or restoration fails.
    pub async fn run(&mut self, app: &mut App) -> io::Result<()>
    {
        info!(title = %app.title, "session window opened");

        let mut event_handler = EventHandler::new();

        loop {
            if app.should_quit {
                break;
            }

            self.terminal.draw(|frame| crate::ui::draw(frame, app))?;

            match tokio::time::timeout(std::time::Duration::from_millis(100), event_handler.next()).await {
                Ok(Some(Event::Key(key_event))) => {
                    if app.handle_key_event(key_event) {
                        break;
                    }
                }
                Ok(Some(Event::Tick)) => {
                    app.tick();
                }
                Ok(None) => {
                    // Channel closed
                    break;
                }
                Err(_) => {
                    // Timeout - re-check should_quit and continue
                }
            }
        }

        info!("session window closing");

        // Restore the terminal before the launcher flushes the session, so
        // any final output lands on the normal screen.
        Self::restore()?;
        event_handler.stop();

        Ok(())
    }

    /// Restore the terminal to its original state
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or the alternate screen cannot be left.
    pub fn restore() -> io::Result<()>
    {
        disable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, LeaveAlternateScreen)?;
        Ok(())
    }
}

impl Drop for Tui
{
    fn drop(&mut self)
    {
        let _ = Self::restore();
    }
}
