//! Drawing sized blocks onto a surface.
//!
//! The reactor only talks to the [`Renderer`] trait; [`AnsiRenderer`] is the
//! terminal implementation.

mod ansi;

pub use ansi::{AnsiRenderer, RendererSettings};

use crate::blocks::BlockSet;
use crate::error::Result;
use crate::geometry::Size;

/// Presentation backend driven by the reactor.
pub trait Renderer {
    /// Wipe the visible surface before an unbuffered redraw.
    fn clear(&mut self) -> Result<()>;

    /// Draw every block at its stored position and size, clipped to `surface`.
    fn draw(&mut self, blocks: &BlockSet, surface: Size) -> Result<()>;

    /// Make a double-buffered frame visible. Unbuffered renderers flush.
    fn present(&mut self) -> Result<()>;

    /// Point a double-buffered drawable at a surface of a new size.
    fn retarget(&mut self, surface: Size) -> Result<()>;
}
