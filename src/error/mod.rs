//! Crate-wide error taxonomy.
//!
//! Fatal kinds end the event loop; [`AutofitError::is_fatal`] is what the
//! reactor consults before deciding whether to report and continue.

mod types;

pub use types::{AutofitError, Result};
