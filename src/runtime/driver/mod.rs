//! Concrete backends that wire a [`super::Reactor`] to a real device.

pub mod terminal;
