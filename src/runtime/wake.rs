use std::os::fd::RawFd;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WakeSetError {
    #[error("descriptor {0} is already watched")]
    Duplicate(RawFd),
    #[error("descriptor {0} is not watched")]
    Missing(RawFd),
}

/// Descriptors the reactor waits on besides the input stream.
///
/// Insertion order is kept so readiness waits are reproducible.
#[derive(Debug, Default, Clone)]
pub struct WakeSet {
    descriptors: Vec<RawFd>,
}

impl WakeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, fd: RawFd) -> Result<(), WakeSetError> {
        if self.contains(fd) {
            return Err(WakeSetError::Duplicate(fd));
        }
        self.descriptors.push(fd);
        Ok(())
    }

    pub fn remove(&mut self, fd: RawFd) -> Result<(), WakeSetError> {
        let index = self
            .descriptors
            .iter()
            .position(|watched| *watched == fd)
            .ok_or(WakeSetError::Missing(fd))?;
        self.descriptors.remove(index);
        Ok(())
    }

    pub fn contains(&self, fd: RawFd) -> bool {
        self.descriptors.contains(&fd)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.descriptors.iter().copied()
    }
}
