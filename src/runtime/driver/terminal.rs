use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use thiserror::Error;

use crate::config::FitConfig;
use crate::error::{AutofitError, Result};
use crate::geometry::Size;
use crate::measure::CellMeasurer;
use crate::render::{AnsiRenderer, RendererSettings};
use crate::runtime::{DisplayEvent, DisplaySystem, FdSource, Reactor, ReactorConfig, poll_readable};

pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("reactor error: {0}")]
    Reactor(#[from] AutofitError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Longest stretch spent in one readiness wait.
///
/// Resizes arrive as a signal rather than bytes on the tty, so the wait is
/// cut short to pick them up promptly.
const RESIZE_POLL: Duration = Duration::from_millis(50);

/// Windowing events from the controlling terminal.
///
/// The surface is the terminal's cell grid. Its wake descriptor is a
/// read-only handle on `/dev/tty`, so keys are noticed even when stdin is a
/// pipe carrying text.
pub struct TerminalDisplay {
    tty: File,
    pending: VecDeque<DisplayEvent>,
}

impl TerminalDisplay {
    pub fn open() -> Result<Self> {
        let tty = OpenOptions::new()
            .read(true)
            .open("/dev/tty")
            .map_err(|err| AutofitError::Display(format!("cannot open /dev/tty: {err}")))?;
        let (width, height) = terminal::size()?;

        // the first frame needs a size and a paint, like a freshly mapped window
        let pending = VecDeque::from([
            DisplayEvent::Resized(Size::new(u32::from(width), u32::from(height))),
            DisplayEvent::Exposed,
        ]);
        Ok(Self { tty, pending })
    }
}

impl DisplaySystem for TerminalDisplay {
    fn next_event(&mut self) -> Result<Option<DisplayEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if !event::poll(Duration::ZERO)? {
                return Ok(None);
            }
            self.pending.extend(map_event(event::read()?));
        }
    }

    fn connection_descriptor(&self) -> Option<RawFd> {
        Some(self.tty.as_raw_fd())
    }

    fn wait_readable(&mut self, descriptors: &[RawFd], timeout: Duration) -> Result<Vec<RawFd>> {
        Ok(poll_readable(descriptors, timeout.min(RESIZE_POLL))?)
    }
}

/// Translate one terminal event into zero or more display events.
pub fn map_event(event: Event) -> Vec<DisplayEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Release => Vec::new(),
        Event::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            vec![DisplayEvent::Closed]
        }
        Event::Key(key) => vec![DisplayEvent::KeyPressed(key.code)],
        Event::Resize(width, height) => vec![
            DisplayEvent::Resized(Size::new(u32::from(width), u32::from(height))),
            DisplayEvent::Exposed,
        ],
        Event::FocusGained => vec![DisplayEvent::Other("focus_gained".to_string())],
        Event::FocusLost => vec![DisplayEvent::Other("focus_lost".to_string())],
        Event::Mouse(_) => vec![DisplayEvent::Other("mouse".to_string())],
        _ => vec![DisplayEvent::Other("unhandled".to_string())],
    }
}

/// Terminal driver that owns the reactor setup and manages raw mode plus
/// alternate screen transitions.
///
/// Text piped into stdin is watched for as long as the pipe stays open. When
/// stdin is the terminal itself only the seeded text is shown.
pub struct TerminalDriver {
    fit: FitConfig,
    config: ReactorConfig,
    initial_text: Option<String>,
}

impl TerminalDriver {
    pub fn new(fit: FitConfig) -> Self {
        Self {
            fit,
            config: ReactorConfig::default(),
            initial_text: None,
        }
    }

    pub fn with_reactor_config(mut self, config: ReactorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_initial_text(mut self, text: impl Into<String>) -> Self {
        self.initial_text = Some(text.into());
        self
    }

    pub fn run(self) -> DriverResult<()> {
        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        let result = self.run_inner();
        self.exit(&mut stdout);
        result
    }

    fn run_inner(&self) -> DriverResult<()> {
        let display = TerminalDisplay::open()?;
        let renderer = AnsiRenderer::new(io::stdout(), RendererSettings::from_config(&self.fit));
        let mut reactor = Reactor::new(display, renderer, CellMeasurer, self.fit.clone());
        *reactor.config_mut() = self.config.clone();

        if let Some(text) = self.initial_text.as_deref() {
            reactor.seed_text(text)?;
        }
        if self.fit.handle_input && !io::stdin().is_terminal() {
            reactor = reactor.with_input(FdSource::stdin()?);
        }

        reactor.run()?;
        Ok(())
    }

    fn enter(&self, stdout: &mut impl Write) -> DriverResult<()> {
        terminal::enable_raw_mode().map_err(|err| DriverError::Terminal(err.to_string()))?;
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(stdout, Show, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}
