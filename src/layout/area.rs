use crate::config::FitConfig;
use crate::geometry::Size;

/// Usable rectangle for `block_count` lines on a surface of `surface` size.
///
/// Padding is removed from both sides of each axis and one line spacing per
/// gap between lines is removed from the height. Every subtraction saturates,
/// so oversized padding yields an empty area rather than wrapping around.
pub fn layout_area(surface: Size, config: &FitConfig, block_count: usize) -> Size {
    let padding = config.padding.saturating_mul(2);
    let gaps = block_count.saturating_sub(1) as u32;
    let spacing = config.line_spacing.saturating_mul(gaps);

    Size::new(
        surface.width.saturating_sub(padding),
        surface.height.saturating_sub(padding).saturating_sub(spacing),
    )
}
