//! Text measurement backends.
//!
//! The layout engine only ever asks "how big is this text at this size";
//! [`TextMeasurer`] is that seam. [`CellMeasurer`] models a terminal grid,
//! [`FontBook`] measures real glyph outlines.

mod core;
mod font;

pub use core::{CellMeasurer, MAX_PIXEL_SIZE, TextMeasurer};
pub use font::FontBook;
