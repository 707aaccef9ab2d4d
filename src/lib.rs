//! Auto-fit text layout engine with a single-threaded event loop.
//!
//! Text is split into one block per line, every block is grown to the
//! largest size whose ink box still fits the surface, and the resulting stack
//! is anchored by a nine-way alignment policy. The [`Reactor`] keeps that
//! layout current as the surface resizes and new text streams in.
//!
//! The engine is backend neutral: measuring, drawing and windowing sit behind
//! [`TextMeasurer`], [`Renderer`] and [`DisplaySystem`]. A terminal backend
//! ships in [`runtime::driver::terminal`].

pub mod blocks;
pub mod config;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod measure;
pub mod metrics;
pub mod render;
pub mod runtime;
pub mod width;

pub use blocks::{BlockSet, BlockState, TextBlock, blockify, sanitize};
pub use config::{Alignment, FitConfig, HorizontalAnchor, VerticalAnchor};
pub use error::{AutofitError, Result};
pub use geometry::{Extents, Position, Size};
pub use layout::{
    LayoutContext, MaximizeOutcome, Orchestrator, RecalcReport, RecalcState, StopReason, align,
    layout_area, maximize, recalculate,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    StderrSink,
};
pub use measure::{CellMeasurer, FontBook, MAX_PIXEL_SIZE, TextMeasurer};
pub use metrics::{MetricSnapshot, ReactorMetrics};
pub use render::{AnsiRenderer, Renderer, RendererSettings};
pub use runtime::driver::terminal::{DriverError, DriverResult, TerminalDisplay, TerminalDriver};
pub use runtime::{
    ConnectionChange, DisplayEvent, DisplaySystem, FdSource, InputBuffer, InputSource, Reactor,
    ReactorConfig, ReadOutcome, WakeSet, WakeSetError,
};
pub use width::display_width;
