//! Text blocks: one per displayed line.
//!
//! A [`BlockSet`] is always rebuilt from scratch out of the current text
//! snapshot; layout passes then size and position its blocks in place.

mod core;
mod sanitize;

pub use core::{BlockSet, BlockState, TextBlock, blockify};
pub use sanitize::sanitize;
