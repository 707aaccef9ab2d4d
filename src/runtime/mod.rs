//! Single-threaded event loop.
//!
//! The [`Reactor`] owns the block set and multiplexes two sources: windowing
//! events from a [`DisplaySystem`] and replacement text from an optional
//! [`InputSource`]. Every pending windowing event is handled before the loop
//! blocks in the display's readiness wait, which is the only suspension point.

use std::collections::VecDeque;
use std::os::fd::RawFd;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use serde_json::json;

use crate::blocks::{BlockSet, blockify, sanitize};
use crate::config::FitConfig;
use crate::error::{AutofitError, Result};
use crate::geometry::Size;
use crate::layout::{LayoutContext, recalculate};
use crate::logging::{LogLevel, Logger, emit, json_kv, json_str};
use crate::measure::TextMeasurer;
use crate::metrics::ReactorMetrics;
use crate::render::Renderer;

pub mod driver;
mod event;
mod input;
mod readiness;
mod wake;

pub use event::{ConnectionChange, DisplayEvent, DisplaySystem};
pub use input::{Drained, FdSource, INPUT_CHUNK, InputBuffer, InputSource, ReadOutcome};
pub use readiness::poll_readable;
pub use wake::{WakeSet, WakeSetError};

const TARGET: &str = "autofit::reactor";

/// Configuration knobs for the reactor loop.
#[derive(Clone)]
pub struct ReactorConfig {
    /// Upper bound of a single readiness wait.
    pub wait_timeout: Duration,
    /// Growth step of the input buffer.
    pub input_chunk: usize,
    /// Structured logger for diagnostics. Defaults to warnings on stderr.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<ReactorMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(1),
            input_chunk: INPUT_CHUNK,
            logger: Some(Logger::stderr()),
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "autofit::reactor.metrics".to_string(),
        }
    }
}

impl ReactorConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(ReactorMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<ReactorMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

pub struct Reactor<D, R, M> {
    display: D,
    renderer: R,
    measurer: M,
    fit: FitConfig,
    config: ReactorConfig,
    input: Option<Box<dyn InputSource>>,
    buffer: InputBuffer,
    stream_open: bool,
    blocks: BlockSet,
    surface: Size,
    wake: WakeSet,
    synthetic: VecDeque<DisplayEvent>,
    should_exit: bool,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl<D, R, M> Reactor<D, R, M>
where
    D: DisplaySystem,
    R: Renderer,
    M: TextMeasurer,
{
    pub fn new(display: D, renderer: R, measurer: M, fit: FitConfig) -> Self {
        Self {
            display,
            renderer,
            measurer,
            fit,
            config: ReactorConfig::default(),
            input: None,
            buffer: InputBuffer::default(),
            stream_open: false,
            blocks: BlockSet::new(),
            surface: Size::default(),
            wake: WakeSet::new(),
            synthetic: VecDeque::new(),
            should_exit: false,
            start_instant: None,
            last_metrics_emit: None,
        }
    }

    /// Watch `source` for text. Ignored when input handling is disabled.
    pub fn with_input<S>(mut self, source: S) -> Self
    where
        S: InputSource + 'static,
    {
        self.stream_open = self.fit.handle_input;
        self.input = Some(Box::new(source));
        self
    }

    pub fn config_mut(&mut self) -> &mut ReactorConfig {
        &mut self.config
    }

    /// Show `text` until input arrives. Later input is appended to it.
    pub fn seed_text(&mut self, text: &str) -> Result<()> {
        self.buffer.extend(text.as_bytes())?;
        self.rebuild()
    }

    pub fn blocks(&self) -> &BlockSet {
        &self.blocks
    }

    pub fn surface(&self) -> Size {
        self.surface
    }

    pub fn buffered_input(&self) -> &[u8] {
        self.buffer.bytes()
    }

    pub fn is_stream_open(&self) -> bool {
        self.stream_open
    }

    pub fn wake_set(&self) -> &WakeSet {
        &self.wake
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run until a quit request or a closed display connection.
    ///
    /// Fatal errors end the loop and are returned; descriptor bookkeeping
    /// failures are logged and skipped.
    pub fn run(&mut self) -> Result<()> {
        let result = self.bootstrap().and_then(|()| self.run_loop());
        self.finalize(&result);
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        loop {
            self.drain_display()?;
            if self.should_exit {
                return Ok(());
            }

            let input_fd = self.watched_input();
            let mut descriptors: Vec<RawFd> = self.wake.iter().collect();
            if let Some(fd) = input_fd {
                descriptors.push(fd);
            }

            let ready = self
                .display
                .wait_readable(&descriptors, self.config.wait_timeout)?;
            if input_fd.is_some_and(|fd| ready.contains(&fd)) {
                self.drain_input()?;
            }

            self.maybe_emit_metrics();
        }
    }

    fn drain_display(&mut self) -> Result<()> {
        loop {
            self.apply_connection_changes()?;
            if self.should_exit {
                return Ok(());
            }
            let event = match self.synthetic.pop_front() {
                Some(event) => event,
                None => match self.display.next_event()? {
                    Some(event) => event,
                    None => return Ok(()),
                },
            };
            self.handle_event(event)?;
        }
    }

    fn handle_event(&mut self, event: DisplayEvent) -> Result<()> {
        self.record_metric(ReactorMetrics::record_event);
        self.log(
            LogLevel::Trace,
            "event_dispatched",
            [json_kv("event", json!(event.describe()))],
        );
        match event {
            DisplayEvent::Resized(size) => self.handle_resize(size),
            DisplayEvent::Exposed => self.redraw(),
            DisplayEvent::KeyPressed(code) => self.handle_key(code),
            DisplayEvent::Closed => {
                self.request_exit("display_closed");
                Ok(())
            }
            DisplayEvent::Other(name) => {
                self.log(LogLevel::Debug, "event_ignored", [json_str("event", name)]);
                Ok(())
            }
        }
    }

    fn handle_resize(&mut self, size: Size) -> Result<()> {
        if size == self.surface {
            return Ok(());
        }
        self.surface = size;
        self.relayout()?;
        if self.fit.double_buffer {
            self.renderer.retarget(size)?;
        }
        self.log(
            LogLevel::Info,
            "resized",
            [
                json_kv("width", json!(size.width)),
                json_kv("height", json!(size.height)),
            ],
        );
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char(c) if c == self.fit.quit_key => self.request_exit("quit_key"),
            KeyCode::Char(c) if c == self.fit.refresh_key => {
                self.relayout()?;
                self.synthetic.push_back(DisplayEvent::Exposed);
            }
            other => self.log(
                LogLevel::Debug,
                "key_ignored",
                [json_str("key", format!("{other:?}"))],
            ),
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        if !self.fit.double_buffer {
            self.renderer.clear()?;
        }
        self.renderer.draw(&self.blocks, self.surface)?;
        if self.fit.double_buffer {
            self.renderer.present()?;
        }
        self.record_metric(ReactorMetrics::record_redraw);
        Ok(())
    }

    fn drain_input(&mut self) -> Result<()> {
        let Some(source) = self.input.as_mut() else {
            return Ok(());
        };
        let drained = self.buffer.drain(&mut **source)?;
        if drained.closed {
            self.stream_open = false;
            self.log(
                LogLevel::Info,
                "input_closed",
                [json_kv("buffered", json!(self.buffer.len()))],
            );
        }

        self.rebuild()?;
        self.relayout()?;
        self.synthetic.push_back(DisplayEvent::Exposed);
        self.log(
            LogLevel::Debug,
            "input_drained",
            [
                json_kv("bytes", json!(drained.bytes)),
                json_kv("buffered", json!(self.buffer.len())),
            ],
        );
        Ok(())
    }

    fn rebuild(&mut self) -> Result<()> {
        let text = sanitize(self.buffer.bytes());
        self.blocks = blockify(&text)?;
        self.record_metric(ReactorMetrics::record_rebuild);
        self.log(
            LogLevel::Debug,
            "blocks_rebuilt",
            [json_kv("blocks", json!(self.blocks.len()))],
        );
        Ok(())
    }

    fn relayout(&mut self) -> Result<()> {
        let mut ctx = LayoutContext::new(&self.fit, &self.measurer);
        if let Some(logger) = self.config.logger.as_ref() {
            ctx = ctx.with_logger(logger);
        }
        let report = recalculate(ctx, &mut self.blocks, self.surface)?;
        self.record_metric(|metrics| metrics.record_relayout(report.passes));
        Ok(())
    }

    fn apply_connection_changes(&mut self) -> Result<()> {
        for change in self.display.take_connection_changes() {
            let (fd, outcome) = match change {
                ConnectionChange::Opened(fd) => (fd, self.wake.add(fd)),
                ConnectionChange::Closed(fd) => (fd, self.wake.remove(fd)),
            };
            match outcome {
                Ok(()) => self.log(
                    LogLevel::Debug,
                    "wake_set_updated",
                    [json_kv("fd", json!(fd)), json_kv("watched", json!(self.wake.len()))],
                ),
                Err(err) => self.absorb(err.into())?,
            }
        }
        Ok(())
    }

    /// Report a recoverable error and carry on; fatal ones are handed back.
    fn absorb(&self, err: AutofitError) -> Result<()> {
        if err.is_fatal() {
            return Err(err);
        }
        self.log(
            LogLevel::Warn,
            "wake_set_rejected",
            [json_str("error", err.to_string())],
        );
        Ok(())
    }

    fn watched_input(&self) -> Option<RawFd> {
        if !self.stream_open {
            return None;
        }
        self.input.as_ref().map(|source| source.descriptor())
    }

    fn request_exit(&mut self, reason: &str) {
        self.should_exit = true;
        self.log(LogLevel::Info, "exit_requested", [json_str("reason", reason)]);
    }

    fn bootstrap(&mut self) -> Result<()> {
        self.should_exit = false;
        self.buffer.set_chunk(self.config.input_chunk);
        self.ensure_metrics_initialized();
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);

        if let Some(fd) = self.display.connection_descriptor() {
            if let Err(err) = self.wake.add(fd) {
                self.absorb(err.into())?;
            }
        }
        self.log(
            LogLevel::Info,
            "reactor_started",
            [
                json_kv("blocks", json!(self.blocks.len())),
                json_kv("input", json!(self.stream_open)),
            ],
        );
        Ok(())
    }

    fn finalize(&mut self, result: &Result<()>) {
        if let Err(err) = result {
            self.log(
                LogLevel::Error,
                "reactor_failed",
                [json_str("error", err.to_string())],
            );
        }
        self.emit_metrics_snapshot(Instant::now());
        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis())
            .unwrap_or(0);
        self.log(
            LogLevel::Info,
            "reactor_stopped",
            [json_kv("uptime_ms", json!(uptime_ms))],
        );
    }

    fn ensure_metrics_initialized(&mut self) {
        if self.config.metrics.is_none() && self.config.metrics_interval > Duration::ZERO {
            self.config.enable_metrics();
        }
    }

    fn record_metric(&self, record: impl FnOnce(&mut ReactorMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut *guard);
            }
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics.is_none() || self.config.metrics_interval == Duration::ZERO {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.config.metrics_interval => return,
            _ => self.last_metrics_emit = Some(now),
        }
        self.emit_metrics_snapshot(now);
    }

    fn emit_metrics_snapshot(&self, now: Instant) {
        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();

        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let target = self.config.metrics_target.as_str();
                let _ = logger.log_event(guard.snapshot(uptime).to_log_event(target));
            }
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.config.logger.as_ref(), level, TARGET, message, fields);
    }
}
