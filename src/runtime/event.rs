use std::os::fd::RawFd;
use std::time::Duration;

use crossterm::event::KeyCode;

use crate::error::Result;
use crate::geometry::Size;

use super::readiness;

/// Windowing events the reactor reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// The surface now has this size.
    Resized(Size),
    /// Some or all of the surface needs repainting.
    Exposed,
    KeyPressed(KeyCode),
    /// The display connection went away.
    Closed,
    /// Anything else, kept by name for diagnostics.
    Other(String),
}

impl DisplayEvent {
    pub fn describe(&self) -> &'static str {
        match self {
            DisplayEvent::Resized(_) => "resized",
            DisplayEvent::Exposed => "exposed",
            DisplayEvent::KeyPressed(_) => "key_pressed",
            DisplayEvent::Closed => "closed",
            DisplayEvent::Other(_) => "other",
        }
    }
}

/// Extra descriptors the display system asks to be watched or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionChange {
    Opened(RawFd),
    Closed(RawFd),
}

/// Source of windowing events and owner of the readiness wait.
pub trait DisplaySystem {
    /// Next already-pending event, without blocking.
    fn next_event(&mut self) -> Result<Option<DisplayEvent>>;

    /// Connection changes reported since the previous call.
    fn take_connection_changes(&mut self) -> Vec<ConnectionChange> {
        Vec::new()
    }

    /// Descriptor that turns readable when new events arrive.
    fn connection_descriptor(&self) -> Option<RawFd>;

    /// Block until one of `descriptors` is readable or `timeout` passes.
    fn wait_readable(&mut self, descriptors: &[RawFd], timeout: Duration) -> Result<Vec<RawFd>> {
        Ok(readiness::poll_readable(descriptors, timeout)?)
    }
}
