//! Auto-fit layout engine.
//!
//! [`recalculate`] drives a full pass: the [`maximize`] search picks font
//! sizes, then [`align`] positions every block on the surface. Callers hand
//! in a [`LayoutContext`] holding the configuration, the measurer and an
//! optional logger.

mod align;
mod area;
mod context;
mod maximizer;
mod orchestrator;

pub use align::align;
pub use area::layout_area;
pub use context::LayoutContext;
pub use maximizer::{MaximizeOutcome, StopReason, maximize};
pub use orchestrator::{Orchestrator, RecalcReport, RecalcState, recalculate};


#[cfg(test)]
mod tests {
    use super::testing::GridMeasurer;
    use crate::geometry::Extents;
    use crate::measure::TextMeasurer;

    #[test]
    fn grid_measurer_reports_a_baseline_offset() {
        let measurer = GridMeasurer::default();

        let extents = measurer.measure("Mono", 10, "abc").unwrap();

        assert_eq!(extents, Extents::new(15, 10, 0, 8));
        assert_eq!(measurer.measure("Mono", 10, "").unwrap(), Extents::default());
        assert_eq!(measurer.calls.get(), 2);
    }
}
