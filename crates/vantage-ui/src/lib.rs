//! # vantage-ui
//!
//! The session window for the Vantage launcher.
//!
//! Exactly one window exists per engine. Two back ends are available,
//! selected by the `VANTAGE_UI` environment variable:
//!
//! - `tui` (default): interactive ratatui interface on the alternate
//!   screen; user actions are applied to the engine and recorded into the
//!   session log as they happen.
//! - `headless`: print a summary of the resolved session and return, for
//!   scripted use.

pub mod app;
pub mod event;
pub mod headless;
pub mod tui;
pub mod ui;

use std::env;

use vantage_core::{Engine, SessionHandle};

pub use app::App;
pub use tui::Tui;

/// Which window back end to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend
{
    /// Interactive terminal UI
    Tui,
    /// Non-interactive summary
    Headless,
}

/// Read the back end selection from `VANTAGE_UI`.
///
/// Unknown values fall back to the TUI.
#[must_use]
pub fn backend_from_env() -> Backend
{
    match env::var("VANTAGE_UI").as_deref() {
        Ok("headless") => Backend::Headless,
        _ => Backend::Tui,
    }
}

/// Run the interactive window with an engine and session log.
///
/// Hands both back when the window closes so the launcher can flush the
/// session file.
///
/// # Errors
///
/// Returns an error if the terminal cannot be initialized or drawn to.
pub async fn run_tui(
    engine: Box<dyn Engine>,
    title: String,
    session: SessionHandle,
) -> std::io::Result<(Box<dyn Engine>, SessionHandle)>
{
    let mut app = App::new(engine, title, session);
    let mut tui = Tui::new()?;
    tui.run(&mut app).await?;
    Ok(app.into_parts())
}

/// Run the headless back end.
#[must_use]
pub fn run_headless(
    engine: Box<dyn Engine>,
    title: &str,
    session: SessionHandle,
) -> (Box<dyn Engine>, SessionHandle)
{
    headless::run(engine.as_ref(), title);
    (engine, session)
}
