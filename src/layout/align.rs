use crate::blocks::BlockSet;
use crate::config::{Alignment, HorizontalAnchor, VerticalAnchor};
use crate::geometry::{Position, Size};

/// Position every block on a `surface` sized canvas.
///
/// Each block is anchored horizontally on its own; vertically the blocks form
/// one stack with `spacing` between consecutive lines. Results that would
/// leave the surface are pulled back inside whenever the content fits at all,
/// and never go negative.
pub fn align(
    blocks: &mut BlockSet,
    surface: Size,
    padding: u32,
    spacing: u32,
    alignment: Alignment,
) {
    if blocks.is_empty() {
        return;
    }

    let gaps = blocks.len().saturating_sub(1) as u32;
    let total_height = blocks
        .iter()
        .fold(0u32, |acc, block| acc.saturating_add(block.extents.height))
        .saturating_add(spacing.saturating_mul(gaps));

    let start = match alignment.vertical() {
        VerticalAnchor::Top => padding,
        VerticalAnchor::Center => surface.height.saturating_sub(total_height) / 2,
        VerticalAnchor::Bottom => surface
            .height
            .saturating_sub(padding)
            .saturating_sub(total_height),
    };
    let mut y = start.min(surface.height.saturating_sub(total_height));

    for block in blocks.iter_mut() {
        let width = block.extents.width;
        let x = match alignment.horizontal() {
            HorizontalAnchor::Left => padding,
            HorizontalAnchor::Center => surface.width.saturating_sub(width) / 2,
            HorizontalAnchor::Right => surface.width.saturating_sub(width).saturating_sub(padding),
        };

        block.position = Position::new(x.min(surface.width.saturating_sub(width)), y);
        y = y
            .saturating_add(block.extents.height)
            .saturating_add(spacing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::blockify;
    use crate::geometry::Extents;

    fn sized(lines: &[(u32, u32)]) -> BlockSet {
        let text = vec!["x"; lines.len()].join("\n");
        let mut blocks = blockify(&text).unwrap();
        for (block, (width, height)) in blocks.iter_mut().zip(lines) {
            block.record(10, Extents::new(*width, *height, 0, 0));
        }
        blocks
    }

    fn positions(blocks: &BlockSet) -> Vec<(u32, u32)> {
        blocks
            .iter()
            .map(|block| (block.position.x, block.position.y))
            .collect()
    }

    #[test]
    fn top_left_stacks_from_the_padding() {
        let mut blocks = sized(&[(50, 20), (30, 10)]);
        align(&mut blocks, Size::new(200, 100), 5, 3, Alignment::NorthWest);
        assert_eq!(positions(&blocks), vec![(5, 5), (5, 28)]);
    }

    #[test]
    fn bottom_right_ends_at_the_padding() {
        let mut blocks = sized(&[(50, 20), (30, 10)]);
        align(&mut blocks, Size::new(200, 100), 5, 3, Alignment::SouthEast);
        // total height 33, last block ends at 95
        assert_eq!(positions(&blocks), vec![(145, 62), (165, 85)]);
        let last = blocks.get(1).unwrap();
        assert_eq!(last.position.y + last.extents.height, 95);
    }

    #[test]
    fn center_is_symmetric_about_the_middle() {
        let mut blocks = sized(&[(40, 20), (60, 30)]);
        align(&mut blocks, Size::new(200, 100), 7, 10, Alignment::Center);
        // total 60, top gap 20 == bottom gap 20
        assert_eq!(positions(&blocks), vec![(80, 20), (70, 50)]);
    }

    #[test]
    fn spacing_only_between_lines() {
        let mut blocks = sized(&[(10, 10)]);
        align(&mut blocks, Size::new(100, 100), 0, 50, Alignment::South);
        assert_eq!(positions(&blocks), vec![(45, 90)]);
    }

    #[test]
    fn every_policy_stays_inside_the_surface() {
        let surface = Size::new(120, 90);
        for alignment in Alignment::ALL {
            let mut blocks = sized(&[(100, 20), (60, 25), (80, 15)]);
            align(&mut blocks, surface, 8, 4, alignment);
            for block in &blocks {
                assert!(block.position.x + block.extents.width <= surface.width, "{alignment}");
                assert!(block.position.y + block.extents.height <= surface.height, "{alignment}");
            }
        }
    }

    #[test]
    fn overflowing_content_clamps_to_origin() {
        let mut blocks = sized(&[(300, 200)]);
        align(&mut blocks, Size::new(100, 50), 10, 0, Alignment::SouthEast);
        assert_eq!(positions(&blocks), vec![(0, 0)]);
    }

    #[test]
    fn padding_yields_when_content_barely_fits() {
        let mut blocks = sized(&[(95, 10)]);
        align(&mut blocks, Size::new(100, 50), 10, 0, Alignment::West);
        assert_eq!(blocks.get(0).unwrap().position.x, 5);
    }
}
