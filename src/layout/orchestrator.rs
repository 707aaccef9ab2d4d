use serde_json::json;

use crate::blocks::BlockSet;
use crate::error::Result;
use crate::geometry::Size;
use crate::logging::{LogLevel, emit, json_kv};

use super::{LayoutContext, align, layout_area, maximize};

const TARGET: &str = "autofit::orchestrator";

/// Progress of one recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecalcState {
    Idle,
    /// Running maximizer pass `pass` (zero based).
    Measuring { pass: usize },
    Aligning,
    Done,
    Failed,
}

/// Summary of a finished recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecalcReport {
    pub surface: Size,
    pub area: Size,
    /// Maximizer walks run; zero when a forced size was used.
    pub passes: usize,
    pub forced: bool,
}

/// Drives one recalculation through `Idle → Measuring → Aligning → Done`.
///
/// With a forced size the search is skipped and every block is measured once
/// at that size. With independent resize the measuring state repeats, each
/// pass locking one more block, until every block is locked or one pass per
/// block has run.
pub struct Orchestrator<'a> {
    ctx: LayoutContext<'a>,
    state: RecalcState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ctx: LayoutContext<'a>) -> Self {
        Self {
            ctx,
            state: RecalcState::Idle,
        }
    }

    pub fn state(&self) -> RecalcState {
        self.state
    }

    /// Recalculate `blocks` from scratch. The orchestrator may be reused; each
    /// run starts over from `Idle` whatever the previous run ended in.
    pub fn run(&mut self, blocks: &mut BlockSet, surface: Size) -> Result<RecalcReport> {
        self.state = RecalcState::Idle;
        let mut report = RecalcReport {
            surface,
            ..RecalcReport::default()
        };

        loop {
            match self.step(blocks, &mut report) {
                Ok(RecalcState::Done) => {
                    self.state = RecalcState::Done;
                    emit(
                        self.ctx.logger,
                        LogLevel::Debug,
                        TARGET,
                        "recalculated",
                        [
                            json_kv("blocks", blocks.len() as u64),
                            json_kv("passes", report.passes as u64),
                            json_kv("forced", report.forced),
                            json_kv("area_width", report.area.width),
                            json_kv("area_height", report.area.height),
                        ],
                    );
                    return Ok(report);
                }
                Ok(next) => self.state = next,
                Err(err) => {
                    emit(
                        self.ctx.logger,
                        LogLevel::Error,
                        TARGET,
                        "recalculation_failed",
                        [
                            json_kv("state", json!(format!("{:?}", self.state))),
                            json_kv("error", err.to_string()),
                        ],
                    );
                    self.state = RecalcState::Failed;
                    return Err(err);
                }
            }
        }
    }

    fn step(&self, blocks: &mut BlockSet, report: &mut RecalcReport) -> Result<RecalcState> {
        let config = self.ctx.config;
        match self.state {
            RecalcState::Idle => {
                blocks.reset();
                if blocks.is_empty() {
                    return Ok(RecalcState::Done);
                }
                report.area = layout_area(report.surface, config, blocks.len());
                if let Some(size) = config.forced_size() {
                    self.measure_forced(blocks, size)?;
                    report.forced = true;
                    return Ok(RecalcState::Aligning);
                }
                Ok(RecalcState::Measuring { pass: 0 })
            }
            RecalcState::Measuring { pass } => {
                maximize(&self.ctx, blocks, report.area)?;
                report.passes += 1;
                let next = pass + 1;
                if config.independent_resize && next < blocks.len() && !blocks.all_finalized() {
                    Ok(RecalcState::Measuring { pass: next })
                } else {
                    Ok(RecalcState::Aligning)
                }
            }
            RecalcState::Aligning => {
                align(
                    blocks,
                    report.surface,
                    config.padding,
                    config.line_spacing,
                    config.alignment,
                );
                Ok(RecalcState::Done)
            }
            RecalcState::Done | RecalcState::Failed => Ok(self.state),
        }
    }

    fn measure_forced(&self, blocks: &mut BlockSet, size: u32) -> Result<()> {
        let family = self.ctx.config.font_family.as_str();
        for block in blocks.iter_mut() {
            let extents = self.ctx.measurer.measure(family, size, block.text())?;
            block.record(size, extents);
            block.finalize();
        }
        Ok(())
    }
}

/// Run a full recalculation of `blocks` for a surface of `surface` size.
pub fn recalculate(
    ctx: LayoutContext<'_>,
    blocks: &mut BlockSet,
    surface: Size,
) -> Result<RecalcReport> {
    Orchestrator::new(ctx).run(blocks, surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::blockify;
    use crate::config::{Alignment, FitConfig};
    use crate::layout::testing::GridMeasurer;
    use crate::logging::Logger;
    use crate::logging::testing::MemorySink;

    #[test]
    fn two_lines_centered_on_800_by_600() {
        let config = FitConfig {
            padding: 10,
            line_spacing: 5,
            alignment: Alignment::Center,
            ..FitConfig::default()
        };
        let measurer = GridMeasurer::default();
        let mut blocks = blockify("Hi\nWorld").unwrap();
        let surface = Size::new(800, 600);

        let ctx = LayoutContext::new(&config, &measurer);
        let report = recalculate(ctx, &mut blocks, surface).unwrap();

        assert_eq!(blocks.texts(), vec!["Hi", "World"]);
        assert_eq!(report.area, Size::new(780, 575));
        assert_eq!(report.passes, 1);

        let size = blocks.get(1).unwrap().size;
        let width = blocks.iter().map(|block| block.extents.width).max().unwrap();
        let height: u32 = blocks.iter().map(|block| block.extents.height).sum();
        assert!(width <= 780);
        assert!(height <= 575);
        // one more unit would overflow the height
        assert!(2 * (size + 1) > 575);

        for block in &blocks {
            let left = block.position.x;
            let right = surface.width - block.position.x - block.extents.width;
            assert!(left.abs_diff(right) <= 1);
        }
        let top = blocks.get(0).unwrap().position.y;
        let last = blocks.get(1).unwrap();
        let bottom = surface.height - last.position.y - last.extents.height;
        assert!(top.abs_diff(bottom) <= 1);
        assert_eq!(last.position.y, top + blocks.get(0).unwrap().extents.height + 5);
    }

    #[test]
    fn shared_size_without_independent_resize() {
        let config = FitConfig::default();
        let measurer = GridMeasurer::default();
        let mut blocks = blockify("a long line\nshort").unwrap();

        let ctx = LayoutContext::new(&config, &measurer);
        recalculate(ctx, &mut blocks, Size::new(400, 400)).unwrap();

        let sizes: Vec<u32> = blocks.iter().map(|block| block.size).collect();
        assert_eq!(sizes[0], sizes[1]);
        assert!(blocks.get(0).unwrap().is_finalized());
        assert!(!blocks.get(1).unwrap().is_finalized());
    }

    #[test]
    fn independent_resize_lets_short_lines_grow() {
        let config = FitConfig {
            independent_resize: true,
            padding: 0,
            line_spacing: 0,
            ..FitConfig::default()
        };
        let measurer = GridMeasurer::default();
        let mut blocks = blockify("a long line\nshort").unwrap();

        let ctx = LayoutContext::new(&config, &measurer);
        let report = recalculate(ctx, &mut blocks, Size::new(400, 400)).unwrap();

        assert_eq!(report.passes, 2);
        assert!(blocks.all_finalized());
        assert!(blocks.get(1).unwrap().size > blocks.get(0).unwrap().size);
    }

    #[test]
    fn independent_resize_stops_once_everything_is_locked() {
        let config = FitConfig {
            independent_resize: true,
            ..FitConfig::default()
        };
        let measurer = GridMeasurer::default();
        let mut blocks = blockify("word\n\n\n").unwrap();

        let ctx = LayoutContext::new(&config, &measurer);
        let report = recalculate(ctx, &mut blocks, Size::new(300, 300)).unwrap();

        // empty lines lock during the first pass
        assert_eq!(report.passes, 1);
    }

    #[test]
    fn forced_size_skips_the_search() {
        let config = FitConfig {
            force_size: 14,
            ..FitConfig::default()
        };
        let measurer = GridMeasurer::default();
        let mut blocks = blockify("one\ntwo\nthree").unwrap();

        let ctx = LayoutContext::new(&config, &measurer);
        let report = recalculate(ctx, &mut blocks, Size::new(500, 500)).unwrap();

        assert!(report.forced);
        assert_eq!(report.passes, 0);
        assert_eq!(measurer.calls.get(), 3);
        assert!(blocks.iter().all(|block| block.size == 14 && block.is_finalized()));
    }

    #[test]
    fn forced_size_keeps_every_policy_on_the_surface() {
        let measurer = GridMeasurer::default();
        let surface = Size::new(300, 200);
        for alignment in Alignment::ALL {
            let config = FitConfig {
                force_size: 20,
                padding: 6,
                line_spacing: 4,
                alignment,
                ..FitConfig::default()
            };
            let mut blocks = blockify("alpha\nbe\ngamma ray").unwrap();
            recalculate(LayoutContext::new(&config, &measurer), &mut blocks, surface).unwrap();
            for block in &blocks {
                assert!(block.position.x + block.extents.width <= surface.width);
                assert!(block.position.y + block.extents.height <= surface.height);
            }
        }
    }

    #[test]
    fn empty_set_is_a_no_op() {
        let config = FitConfig::default();
        let measurer = GridMeasurer::default();
        let mut blocks = BlockSet::new();
        let mut orchestrator = Orchestrator::new(LayoutContext::new(&config, &measurer));

        orchestrator.run(&mut blocks, Size::new(100, 100)).unwrap();

        assert_eq!(orchestrator.state(), RecalcState::Done);
        assert_eq!(measurer.calls.get(), 0);
    }

    #[test]
    fn control_only_input_completes() {
        let config = FitConfig::default();
        let measurer = GridMeasurer::default();
        let text = crate::blocks::sanitize(b"\x01\x02\n\x1b[2J\n");
        let mut blocks = blockify(&text).unwrap();

        let ctx = LayoutContext::new(&config, &measurer);
        let report = recalculate(ctx, &mut blocks, Size::new(640, 480));

        assert!(report.is_ok());
        assert!(blocks.iter().all(|block| block.is_empty()));
    }

    #[test]
    fn identical_text_lays_out_identically() {
        let config = FitConfig::default();
        let measurer = GridMeasurer::default();
        let surface = Size::new(333, 222);
        let mut first = blockify("same\ntext here").unwrap();
        let mut second = blockify("same\ntext here").unwrap();

        recalculate(LayoutContext::new(&config, &measurer), &mut first, surface).unwrap();
        recalculate(LayoutContext::new(&config, &measurer), &mut second, surface).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn recalculating_again_reuses_previous_sizes() {
        let config = FitConfig::default();
        let measurer = GridMeasurer::default();
        let surface = Size::new(400, 300);
        let mut blocks = blockify("steady").unwrap();

        recalculate(LayoutContext::new(&config, &measurer), &mut blocks, surface).unwrap();
        let settled = blocks.clone();
        let cold_calls = measurer.calls.replace(0);
        recalculate(LayoutContext::new(&config, &measurer), &mut blocks, surface).unwrap();

        assert_eq!(blocks, settled);
        // warm start only needs to confirm the bracket
        assert!(measurer.calls.get() < cold_calls);
        assert_eq!(measurer.calls.get(), 3);
    }

    #[test]
    fn measure_failure_ends_in_failed_state() {
        let config = FitConfig {
            force_size: 9,
            ..FitConfig::default()
        };
        let measurer = GridMeasurer::failing_at(9);
        let sink = MemorySink::default();
        let logger = Logger::new(sink.clone());
        let ctx = LayoutContext::new(&config, &measurer).with_logger(&logger);
        let mut blocks = blockify("boom").unwrap();
        let mut orchestrator = Orchestrator::new(ctx);

        let err = orchestrator.run(&mut blocks, Size::new(100, 100)).unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(orchestrator.state(), RecalcState::Failed);
        assert!(sink.messages().contains(&"recalculation_failed".to_string()));
    }

    #[test]
    fn orchestrator_can_be_run_again_after_done() {
        let config = FitConfig::default();
        let measurer = GridMeasurer::default();
        let surface = Size::new(400, 300);
        let mut orchestrator = Orchestrator::new(LayoutContext::new(&config, &measurer));

        let mut first = blockify("abcdef\nxy").unwrap();
        orchestrator.run(&mut first, surface).unwrap();
        let mut second = blockify("abcdef\nxy").unwrap();
        let report = orchestrator.run(&mut second, surface).unwrap();

        assert_eq!(report.passes, 1);
        assert_eq!(orchestrator.state(), RecalcState::Done);
        assert!(second.get(0).unwrap().size > 0);
        assert_eq!(first, second);
    }

    #[test]
    fn orchestrator_recovers_after_a_failed_run() {
        let config = FitConfig {
            force_size: 9,
            ..FitConfig::default()
        };
        let measurer = GridMeasurer::failing_at(9);
        let mut orchestrator = Orchestrator::new(LayoutContext::new(&config, &measurer));
        let mut blocks = blockify("boom").unwrap();

        assert!(orchestrator.run(&mut blocks, Size::new(100, 100)).is_err());
        assert_eq!(orchestrator.state(), RecalcState::Failed);

        // the same failure again, not a stuck Failed state
        let calls = measurer.calls.get();
        assert!(orchestrator.run(&mut blocks, Size::new(100, 100)).is_err());
        assert_eq!(measurer.calls.get(), calls + 1);

        let mut empty = BlockSet::new();
        orchestrator.run(&mut empty, Size::new(100, 100)).unwrap();
        assert_eq!(orchestrator.state(), RecalcState::Done);
    }
}
