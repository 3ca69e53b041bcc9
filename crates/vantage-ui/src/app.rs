//! Application state and logic

use vantage_core::session::{self, SessionHandle, UserAction};
use vantage_core::types::Address;
use vantage_core::Engine;

/// What an open input prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind
{
    /// `g`: go to an address or label
    Goto,
    /// `n`: rename the label at the cursor
    Rename,
    /// `;`: comment the address at the cursor
    Comment,
}

/// An in-progress input prompt.
#[derive(Debug, Clone)]
pub struct Prompt
{
    pub kind: PromptKind,
    pub buffer: String,
}

/// Session window state
///
/// Owns the engine and the session log for the lifetime of the window; both
/// are handed back when the window closes so the launcher can flush the
/// session. Every committed user action is applied to the engine first and
/// recorded into the log second: replay later reproduces exactly what the
/// engine saw.
pub struct App
{
    /// The one engine of this session
    pub engine: Box<dyn Engine>,
    /// Window title ("<target> - vantage")
    pub title: String,
    /// Action log
    pub session: SessionHandle,
    /// Whether the window should close
    pub should_quit: bool,
    /// Open input prompt, if any
    pub prompt: Option<Prompt>,
    /// Status or error line shown in the footer
    pub status: Option<String>,
}

impl App
{
    /// Create a new window state.
    #[must_use]
    pub fn new(engine: Box<dyn Engine>, title: String, session: SessionHandle) -> Self
    {
        Self {
            engine,
            title,
            session,
            should_quit: false,
            prompt: None,
            status: None,
        }
    }

    /// Tear down, handing engine and session back to the launcher.
    #[must_use]
    pub fn into_parts(self) -> (Box<dyn Engine>, SessionHandle)
    {
        (self.engine, self.session)
    }

    /// Handle a keyboard event
    ///
    /// Returns `true` if the window should close.
    pub fn handle_key_event(&mut self, key_event: crossterm::event::KeyEvent) -> bool
    {
        use crossterm::event::KeyCode;

        if self.prompt.is_some() {
            self.handle_prompt_key(key_event.code);
            return false;
        }

        self.status = None;

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return true;
            }
            KeyCode::Char('g') => {
                self.prompt = Some(Prompt {
                    kind: PromptKind::Goto,
                    buffer: String::new(),
                });
            }
            KeyCode::Char('n') => {
                if self.cursor().is_some() {
                    self.prompt = Some(Prompt {
                        kind: PromptKind::Rename,
                        buffer: String::new(),
                    });
                } else {
                    self.status = Some("no current address to rename".to_string());
                }
            }
            KeyCode::Char(';') => {
                if self.cursor().is_some() {
                    self.prompt = Some(Prompt {
                        kind: PromptKind::Comment,
                        buffer: String::new(),
                    });
                } else {
                    self.status = Some("no current address to comment".to_string());
                }
            }
            KeyCode::Char('c') => {
                if let Some(addr) = self.cursor() {
                    self.apply_and_record(UserAction::Disassemble { addr: addr.value() });
                } else {
                    self.status = Some("no current address to disassemble".to_string());
                }
            }
            KeyCode::Up => self.step_cursor(-1),
            KeyCode::Down => self.step_cursor(1),
            _ => {}
        }

        false
    }

    /// Periodic update hook.
    pub fn tick(&mut self) {}

    fn handle_prompt_key(&mut self, code: crossterm::event::KeyCode)
    {
        use crossterm::event::KeyCode;

        match code {
            KeyCode::Esc => {
                self.prompt = None;
            }
            KeyCode::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.buffer.push(c);
                }
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.commit_prompt(&prompt);
                }
            }
            _ => {}
        }
    }

    fn commit_prompt(&mut self, prompt: &Prompt)
    {
        let input = prompt.buffer.trim();
        if input.is_empty() {
            return;
        }

        match prompt.kind {
            PromptKind::Goto => {
                let action = if input.as_bytes().first().is_some_and(u8::is_ascii_digit) {
                    match vantage_core::entrypoint::parse_address(input) {
                        Ok(addr) => UserAction::FocusAddr { addr: addr.value() },
                        Err(err) => {
                            self.status = Some(err.to_string());
                            return;
                        }
                    }
                } else {
                    UserAction::FocusLabel {
                        label: input.to_string(),
                    }
                };
                self.apply_and_record(action);
            }
            PromptKind::Rename => {
                if let Some(addr) = self.cursor() {
                    self.apply_and_record(UserAction::Rename {
                        addr: addr.value(),
                        name: input.to_string(),
                    });
                }
            }
            PromptKind::Comment => {
                if let Some(addr) = self.cursor() {
                    self.apply_and_record(UserAction::Comment {
                        addr: addr.value(),
                        text: input.to_string(),
                    });
                }
            }
        }
    }

    /// Apply an action to the engine, then record it.
    ///
    /// An action that fails to apply (e.g. goto on an unknown label) is not
    /// recorded: the session log only ever contains actions the engine
    /// accepted, which is what makes replay deterministic.
    fn apply_and_record(&mut self, action: UserAction)
    {
        match session::apply(self.engine.as_mut(), &action) {
            Ok(()) => {
                self.session.record(action);
            }
            Err(err) => {
                self.status = Some(err.to_string());
            }
        }
    }

    fn cursor(&self) -> Option<Address>
    {
        self.engine.analysis().cursor()
    }

    /// Move the cursor to the previous/next labeled address.
    fn step_cursor(&mut self, direction: i32)
    {
        let labels: Vec<Address> = self.engine.analysis().labels().map(|(addr, _)| addr).collect();
        if labels.is_empty() {
            return;
        }

        let target = match self.cursor() {
            None => labels[0],
            Some(current) => {
                if direction < 0 {
                    *labels.iter().rev().find(|&&addr| addr < current).unwrap_or(&labels[0])
                } else {
                    *labels
                        .iter()
                        .find(|&&addr| addr > current)
                        .unwrap_or(&labels[labels.len() - 1])
                }
            }
        };

        self.apply_and_record(UserAction::FocusAddr { addr: target.value() });
    }
}
