use thiserror::Error;

use crate::runtime::WakeSetError;

/// Unified result type for the autofit crate.
pub type Result<T> = std::result::Result<T, AutofitError>;

/// Errors surfaced by the layout engine and its event loop.
#[derive(Debug, Error)]
pub enum AutofitError {
    #[error("allocation failed: {0}")]
    Allocation(String),
    #[error("cannot measure `{family}` at size {size}: {reason}")]
    Measure {
        family: String,
        size: u32,
        reason: String,
    },
    #[error("cannot build block set: {0}")]
    Blockify(String),
    #[error("wake descriptor set: {0}")]
    DescriptorSet(#[from] WakeSetError),
    #[error("input stream read failed: {0}")]
    StreamRead(std::io::Error),
    #[error(transparent)]
    FontLoad(#[from] owned_ttf_parser::FaceParsingError),
    #[error("render backend error: {0}")]
    Render(String),
    #[error("display backend error: {0}")]
    Display(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AutofitError {
    pub fn measure(family: &str, size: u32, reason: impl Into<String>) -> Self {
        Self::Measure {
            family: family.to_string(),
            size,
            reason: reason.into(),
        }
    }

    /// Whether this error must terminate the event loop.
    ///
    /// Only descriptor-set bookkeeping failures are recoverable; the operation
    /// that triggered them is skipped and the loop carries on.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DescriptorSet(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_set_errors_are_not_fatal() {
        let err = AutofitError::from(WakeSetError::Duplicate(4));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("4"));
    }

    #[test]
    fn measure_errors_are_fatal_and_descriptive() {
        let err = AutofitError::measure("Mono", 12, "family not loaded");
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "cannot measure `Mono` at size 12: family not loaded"
        );
    }

    #[test]
    fn stream_read_errors_are_fatal() {
        let err = AutofitError::StreamRead(std::io::Error::other("boom"));
        assert!(err.is_fatal());
    }
}
