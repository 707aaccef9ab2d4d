use std::io::Write;

use unicode_width::UnicodeWidthChar;

use crate::blocks::{BlockSet, TextBlock};
use crate::config::FitConfig;
use crate::cursor;
use crate::error::Result;
use crate::geometry::Size;

use super::Renderer;

/// Renderer runtime parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererSettings {
    /// Outline each block's box in reverse video.
    pub debug_boxes: bool,
    /// Skip the text itself; useful together with `debug_boxes`.
    pub disable_text: bool,
    /// Compose frames off screen and emit them on `present`.
    pub double_buffer: bool,
}

impl RendererSettings {
    pub fn from_config(config: &FitConfig) -> Self {
        Self {
            debug_boxes: config.debug_boxes,
            disable_text: config.disable_text,
            double_buffer: config.double_buffer,
        }
    }
}

/// ANSI escape code renderer for a cell surface.
///
/// A block at size `s` is drawn as its text with every glyph repeated `s`
/// times across and every row repeated `s` times down, which matches what
/// [`crate::measure::CellMeasurer`] reports.
pub struct AnsiRenderer<W: Write> {
    writer: W,
    settings: RendererSettings,
    back_buffer: Vec<u8>,
}

impl<W: Write> AnsiRenderer<W> {
    pub fn new(writer: W, settings: RendererSettings) -> Self {
        Self {
            writer,
            settings,
            back_buffer: Vec::new(),
        }
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        if self.settings.double_buffer {
            self.back_buffer.extend_from_slice(bytes);
        } else {
            self.writer.write_all(bytes)?;
        }
        Ok(())
    }

    fn draw_outline(&mut self, block: &TextBlock, surface: Size) -> Result<()> {
        let (x, y) = (block.position.x, block.position.y);
        let width = block.extents.width.min(surface.width.saturating_sub(x));
        let height = block.extents.height.min(surface.height.saturating_sub(y));
        if width == 0 || height == 0 {
            return Ok(());
        }

        let mut frame = String::new();
        frame.push_str(cursor::reverse_on());
        for row in 0..height {
            frame.push_str(&cursor::move_to(x, y + row));
            if row == 0 || row + 1 == height {
                frame.extend(std::iter::repeat_n(' ', width as usize));
            } else {
                frame.push(' ');
                if width > 1 {
                    frame.push_str(&cursor::move_to(x + width - 1, y + row));
                    frame.push(' ');
                }
            }
        }
        frame.push_str(cursor::reset_attributes());
        self.emit(frame.as_bytes())
    }

    fn draw_text(&mut self, block: &TextBlock, surface: Size) -> Result<()> {
        if block.is_empty() || block.size == 0 {
            return Ok(());
        }
        let x = block.position.x.saturating_add_signed(block.extents.x_offset);
        let y = block.position.y.saturating_add_signed(block.extents.y_offset);
        let columns = surface.width.saturating_sub(x);
        let line = scaled_line(block.text(), block.size, columns);
        if line.is_empty() {
            return Ok(());
        }

        let rows = block.size.min(surface.height.saturating_sub(y));
        let mut frame = String::new();
        for row in 0..rows {
            frame.push_str(&cursor::move_to(x, y + row));
            frame.push_str(&line);
        }
        self.emit(frame.as_bytes())
    }
}

impl<W: Write> Renderer for AnsiRenderer<W> {
    fn clear(&mut self) -> Result<()> {
        self.emit(cursor::clear_screen().as_bytes())
    }

    fn draw(&mut self, blocks: &BlockSet, surface: Size) -> Result<()> {
        if self.settings.debug_boxes {
            for block in blocks {
                self.draw_outline(block, surface)?;
            }
        }
        if !self.settings.disable_text {
            for block in blocks {
                self.draw_text(block, surface)?;
            }
        }
        if !self.settings.double_buffer {
            self.writer.flush()?;
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        if self.settings.double_buffer {
            // a buffered frame replaces the screen wholesale
            self.writer.write_all(cursor::clear_screen().as_bytes())?;
            self.writer.write_all(&self.back_buffer)?;
            self.back_buffer.clear();
        }
        self.writer.flush()?;
        Ok(())
    }

    fn retarget(&mut self, _surface: Size) -> Result<()> {
        // a stale frame was composed for the old geometry
        self.back_buffer.clear();
        Ok(())
    }
}

/// `text` with every glyph repeated `scale` times, cut to `columns` cells.
fn scaled_line(text: &str, scale: u32, columns: u32) -> String {
    let mut line = String::new();
    let mut used: u32 = 0;
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0) as u32;
        for _ in 0..scale {
            if used + width > columns {
                return line;
            }
            line.push(ch);
            used += width;
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::blockify;
    use crate::geometry::{Extents, Position};

    fn placed(text: &str, size: u32, position: Position) -> BlockSet {
        let mut blocks = blockify(text).unwrap();
        for block in blocks.iter_mut() {
            let columns = crate::display_width(block.text()) as u32;
            block.record(size, Extents::new(columns * size, size, 0, 0));
            block.position = position;
        }
        blocks
    }

    const SURFACE: Size = Size {
        width: 40,
        height: 10,
    };

    fn unbuffered() -> AnsiRenderer<Vec<u8>> {
        AnsiRenderer::new(Vec::new(), RendererSettings::default())
    }

    #[test]
    fn scales_glyphs_in_both_directions() {
        let mut renderer = unbuffered();
        renderer.draw(&placed("ab", 2, Position::new(3, 1)), SURFACE).unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(output, "\x1b[2;4Haabb\x1b[3;4Haabb");
    }

    #[test]
    fn clips_to_the_surface() {
        let mut renderer = unbuffered();
        renderer.draw(&placed("xyz", 3, Position::new(35, 8)), SURFACE).unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(output, "\x1b[9;36Hxxxyy\x1b[10;36Hxxxyy");
    }

    #[test]
    fn double_buffer_holds_frames_until_present() {
        let settings = RendererSettings {
            double_buffer: true,
            ..RendererSettings::default()
        };
        let mut renderer = AnsiRenderer::new(Vec::new(), settings);
        renderer.draw(&placed("q", 1, Position::new(0, 0)), SURFACE).unwrap();
        assert!(renderer.writer.is_empty());

        renderer.retarget(SURFACE).unwrap();
        renderer.draw(&placed("q", 1, Position::new(0, 0)), SURFACE).unwrap();
        renderer.present().unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(output, "\x1b[2J\x1b[1;1Hq");
    }

    #[test]
    fn debug_boxes_without_text() {
        let settings = RendererSettings {
            debug_boxes: true,
            disable_text: true,
            double_buffer: false,
        };
        let mut renderer = AnsiRenderer::new(Vec::new(), settings);
        renderer.draw(&placed("hi", 1, Position::new(1, 1)), SURFACE).unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.starts_with("\x1b[7m\x1b[2;2H  "));
        assert!(output.ends_with("\x1b[0m"));
        assert!(!output.contains('h'));
    }

    #[test]
    fn settings_follow_config() {
        let config = FitConfig {
            debug_boxes: true,
            double_buffer: false,
            ..FitConfig::default()
        };
        let settings = RendererSettings::from_config(&config);
        assert!(settings.debug_boxes);
        assert!(!settings.double_buffer);
        assert!(!settings.disable_text);
    }
}
