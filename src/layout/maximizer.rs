use serde_json::json;

use crate::blocks::BlockSet;
use crate::error::Result;
use crate::geometry::Size;
use crate::logging::{LogLevel, emit, json_kv};
use crate::measure::MAX_PIXEL_SIZE;

use super::LayoutContext;

const TARGET: &str = "autofit::maximizer";

/// Why a maximizer walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No open blocks or no usable area; nothing was touched.
    NothingToDo,
    /// First fitting size found while shrinking.
    Fitted,
    /// Still fitting when the configured maximum was reached.
    CapReached,
    /// Still fitting at the largest size a measurer accepts.
    Ceiling,
    /// Every block measured with no ink at a nonzero size.
    Degenerate,
    /// Locked blocks alone overflow the area; size zero was accepted.
    Floor,
}

/// Result of one maximizer walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaximizeOutcome {
    pub size: u32,
    pub finalized: Option<usize>,
    pub iterations: u32,
    pub reason: StopReason,
}

impl MaximizeOutcome {
    fn idle() -> Self {
        Self {
            size: 0,
            finalized: None,
            iterations: 0,
            reason: StopReason::NothingToDo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Growing,
    Shrinking,
}

/// Find the largest size at which every open block, stacked under the
/// blocks already locked, fits `area`; then lock the widest open block at
/// that size.
///
/// The walk starts from a seed and moves one unit at a time: upward while the
/// stack fits, then downward after the first overflow until it fits again.
/// Empty lines are locked as soon as they are measured.
pub fn maximize(
    ctx: &LayoutContext<'_>,
    blocks: &mut BlockSet,
    area: Size,
) -> Result<MaximizeOutcome> {
    let Some(longest) = blocks.longest_unfinalized() else {
        emit(ctx.logger, LogLevel::Debug, TARGET, "nothing_to_size", std::iter::empty());
        return Ok(MaximizeOutcome::idle());
    };
    if area.is_empty() {
        emit(
            ctx.logger,
            LogLevel::Debug,
            TARGET,
            "area_empty",
            [json_kv("width", area.width), json_kv("height", area.height)],
        );
        return Ok(MaximizeOutcome::idle());
    }

    let cap = ctx.config.max_size();
    let mut size = seed_size(blocks, longest, area, cap);
    let mut direction = Direction::Growing;
    let mut iterations = 0;

    emit(
        ctx.logger,
        LogLevel::Debug,
        TARGET,
        "seeded",
        [
            json_kv("size", size),
            json_kv("area_width", area.width),
            json_kv("area_height", area.height),
            json_kv("open_blocks", blocks.unfinalized_count() as u64),
        ],
    );

    let reason = loop {
        iterations += 1;
        measure_open(ctx, blocks, size)?;
        let bounds = bounding_box(blocks);

        emit(
            ctx.logger,
            LogLevel::Trace,
            TARGET,
            "step",
            [
                json_kv("size", size),
                json_kv("bounds_width", bounds.width),
                json_kv("bounds_height", bounds.height),
                json_kv("growing", direction == Direction::Growing),
            ],
        );

        if size != 0 && bounds.is_empty() {
            break StopReason::Degenerate;
        }

        if !area.contains(bounds) {
            if size == 0 {
                break StopReason::Floor;
            }
            direction = Direction::Shrinking;
            size -= 1;
            continue;
        }

        match direction {
            Direction::Shrinking => break StopReason::Fitted,
            Direction::Growing => {
                if cap.is_some_and(|cap| size >= cap) {
                    break StopReason::CapReached;
                }
                if size >= MAX_PIXEL_SIZE {
                    break StopReason::Ceiling;
                }
                size += 1;
            }
        }
    };

    let finalized = blocks.longest_unfinalized();
    if let Some(block) = finalized.and_then(|index| blocks.get_mut(index)) {
        block.finalize();
    }

    emit(
        ctx.logger,
        LogLevel::Debug,
        TARGET,
        "size_fixed",
        [
            json_kv("size", size),
            json_kv("iterations", iterations),
            json_kv("reason", json!(format!("{reason:?}"))),
            json_kv("finalized", json!(finalized)),
        ],
    );

    Ok(MaximizeOutcome {
        size,
        finalized,
        iterations,
        reason,
    })
}

/// Starting size: the longest block's previous size, else the cap, else a
/// guess that spreads the longest line over the full width.
fn seed_size(blocks: &BlockSet, longest: usize, area: Size, cap: Option<u32>) -> u32 {
    let (previous, columns) = blocks
        .get(longest)
        .map(|block| (block.size, block.text_width()))
        .unwrap_or((0, 0));

    let seed = if previous > 0 {
        previous
    } else if let Some(cap) = cap {
        cap
    } else {
        area.width / columns.max(1) as u32
    };

    cap.map_or(seed, |cap| seed.min(cap)).min(MAX_PIXEL_SIZE)
}

fn measure_open(ctx: &LayoutContext<'_>, blocks: &mut BlockSet, size: u32) -> Result<()> {
    let family = ctx.config.font_family.as_str();
    for block in blocks.iter_mut().filter(|block| !block.is_finalized()) {
        let extents = ctx.measurer.measure(family, size, block.text())?;
        block.record(size, extents);
        if block.is_empty() {
            block.finalize();
        }
    }
    Ok(())
}

/// Stacked box of every block: widest width, summed heights.
fn bounding_box(blocks: &BlockSet) -> Size {
    blocks.iter().fold(Size::default(), |acc, block| {
        Size::new(
            acc.width.max(block.extents.width),
            acc.height.saturating_add(block.extents.height),
        )
    })
}
