use crate::error::{AutofitError, Result};
use crate::geometry::Extents;
use crate::width::display_width;

/// Largest size any measurer is asked to realize.
pub const MAX_PIXEL_SIZE: u32 = 32_767;

/// Measures the ink box of a string rendered in `family` at `size`.
///
/// Implementations fail when the family or the size cannot be realized.
pub trait TextMeasurer {
    fn measure(&self, family: &str, size: u32, text: &str) -> Result<Extents>;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, family: &str, size: u32, text: &str) -> Result<Extents> {
        (**self).measure(family, size, text)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for Box<T> {
    fn measure(&self, family: &str, size: u32, text: &str) -> Result<Extents> {
        (**self).measure(family, size, text)
    }
}

/// Terminal-grid measurer: a glyph at size `s` covers `s` rows and `s`
/// columns per display column.
///
/// The family is ignored since a terminal renders with a single font.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasurer;

impl TextMeasurer for CellMeasurer {
    fn measure(&self, family: &str, size: u32, text: &str) -> Result<Extents> {
        if size > MAX_PIXEL_SIZE {
            return Err(AutofitError::measure(family, size, "size exceeds cell limit"));
        }
        let columns = display_width(text) as u32;
        if columns == 0 {
            return Ok(Extents::default());
        }
        Ok(Extents::new(columns.saturating_mul(size), size, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_scale_with_size() {
        let extents = CellMeasurer.measure("any", 3, "ab").unwrap();
        assert_eq!(extents, Extents::new(6, 3, 0, 0));
    }

    #[test]
    fn empty_text_has_no_ink() {
        assert_eq!(CellMeasurer.measure("any", 9, "").unwrap(), Extents::default());
    }

    #[test]
    fn oversized_requests_fail() {
        let err = CellMeasurer.measure("any", MAX_PIXEL_SIZE + 1, "a").unwrap_err();
        assert!(matches!(err, AutofitError::Measure { .. }));
    }

    #[test]
    fn boxed_measurers_delegate() {
        let boxed: Box<dyn TextMeasurer> = Box::new(CellMeasurer);
        assert_eq!(boxed.measure("any", 2, "x").unwrap().width, 2);
    }
}
