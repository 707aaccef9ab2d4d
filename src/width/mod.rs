//! Terminal display width helpers.

mod utils;

pub use utils::display_width;
