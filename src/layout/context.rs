use crate::config::FitConfig;
use crate::logging::Logger;
use crate::measure::TextMeasurer;

/// Everything a layout pass reads but never mutates.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub config: &'a FitConfig,
    pub measurer: &'a dyn TextMeasurer,
    pub logger: Option<&'a Logger>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(config: &'a FitConfig, measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            config,
            measurer,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: &'a Logger) -> Self {
        self.logger = Some(logger);
        self
    }
}
