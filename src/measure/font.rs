use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace, name_id};

use crate::error::{AutofitError, Result};
use crate::geometry::Extents;

use super::core::{MAX_PIXEL_SIZE, TextMeasurer};

struct LoadedFace {
    family: String,
    face: OwnedFace,
}

/// Parsed TrueType/OpenType faces, looked up by family name.
///
/// Measurements use the glyph outlines' bounding boxes, so the reported box
/// is the ink actually drawn rather than the line box.
#[derive(Default)]
pub struct FontBook {
    faces: Vec<LoadedFace>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a font and register it under its own family name, which is
    /// returned.
    pub fn load(&mut self, bytes: Vec<u8>) -> Result<String> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        let family = face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id::FAMILY && name.is_unicode())
            .and_then(|name| name.to_string())
            .ok_or_else(|| AutofitError::Config("font has no family name".to_string()))?;
        self.faces.push(LoadedFace {
            family: family.clone(),
            face,
        });
        Ok(family)
    }

    /// Parse a font and register it under an explicit family alias.
    pub fn load_as(&mut self, family: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        self.faces.push(LoadedFace {
            family: family.into(),
            face,
        });
        Ok(())
    }

    pub fn families(&self) -> Vec<&str> {
        self.faces.iter().map(|loaded| loaded.family.as_str()).collect()
    }

    fn face(&self, family: &str) -> Option<&OwnedFace> {
        self.faces
            .iter()
            .find(|loaded| loaded.family.eq_ignore_ascii_case(family))
            .map(|loaded| &loaded.face)
    }
}

impl TextMeasurer for FontBook {
    fn measure(&self, family: &str, size: u32, text: &str) -> Result<Extents> {
        if size > MAX_PIXEL_SIZE {
            return Err(AutofitError::measure(family, size, "size exceeds font limit"));
        }
        let face = self
            .face(family)
            .ok_or_else(|| AutofitError::measure(family, size, "family not loaded"))?
            .as_face_ref();

        let scaling = size as f32 / face.units_per_em() as f32;

        // (x_min, y_min, x_max, y_max) in font units, y pointing up; the pen
        // is 64-bit so very long lines cannot wrap it
        let mut ink: Option<(i64, i64, i64, i64)> = None;
        let mut pen: i64 = 0;
        for ch in text.chars() {
            let gid = face
                .glyph_index(ch)
                .or_else(|| face.glyph_index('\u{FFFD}'))
                .unwrap_or(GlyphId(0));

            if let Some(bbox) = face.glyph_bounding_box(gid) {
                let glyph = (
                    pen + i64::from(bbox.x_min),
                    i64::from(bbox.y_min),
                    pen + i64::from(bbox.x_max),
                    i64::from(bbox.y_max),
                );
                ink = Some(match ink {
                    None => glyph,
                    Some((x0, y0, x1, y1)) => {
                        (x0.min(glyph.0), y0.min(glyph.1), x1.max(glyph.2), y1.max(glyph.3))
                    }
                });
            }

            pen += i64::from(face.glyph_hor_advance(gid).unwrap_or_default());
        }

        let Some((x_min, y_min, x_max, y_max)) = ink else {
            return Ok(Extents::default());
        };

        Ok(Extents::new(
            ((x_max - x_min) as f32 * scaling).ceil() as u32,
            ((y_max - y_min) as f32 * scaling).ceil() as u32,
            (-x_min as f32 * scaling).round() as i32,
            (y_max as f32 * scaling).round() as i32,
        ))
    }
}
