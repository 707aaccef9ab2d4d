//! Layout and rendering configuration.
//!
//! [`FitConfig`] is built once at startup and then only ever borrowed; every
//! layout call receives it explicitly instead of reaching for global state.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AutofitError, Result};

/// Horizontal component of an [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

/// Vertical component of an [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// Nine-way placement of the text stack within the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Alignment {
    NorthWest,
    North,
    NorthEast,
    West,
    #[default]
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Alignment {
    pub const ALL: [Alignment; 9] = [
        Alignment::NorthWest,
        Alignment::North,
        Alignment::NorthEast,
        Alignment::West,
        Alignment::Center,
        Alignment::East,
        Alignment::SouthWest,
        Alignment::South,
        Alignment::SouthEast,
    ];

    pub fn horizontal(self) -> HorizontalAnchor {
        match self {
            Alignment::NorthWest | Alignment::West | Alignment::SouthWest => HorizontalAnchor::Left,
            Alignment::North | Alignment::Center | Alignment::South => HorizontalAnchor::Center,
            Alignment::NorthEast | Alignment::East | Alignment::SouthEast => {
                HorizontalAnchor::Right
            }
        }
    }

    pub fn vertical(self) -> VerticalAnchor {
        match self {
            Alignment::NorthWest | Alignment::North | Alignment::NorthEast => VerticalAnchor::Top,
            Alignment::West | Alignment::Center | Alignment::East => VerticalAnchor::Center,
            Alignment::SouthWest | Alignment::South | Alignment::SouthEast => {
                VerticalAnchor::Bottom
            }
        }
    }
}

impl FromStr for Alignment {
    type Err = AutofitError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nw" | "northwest" => Ok(Alignment::NorthWest),
            "n" | "north" => Ok(Alignment::North),
            "ne" | "northeast" => Ok(Alignment::NorthEast),
            "w" | "west" => Ok(Alignment::West),
            "c" | "center" | "centre" => Ok(Alignment::Center),
            "e" | "east" => Ok(Alignment::East),
            "sw" | "southwest" => Ok(Alignment::SouthWest),
            "s" | "south" => Ok(Alignment::South),
            "se" | "southeast" => Ok(Alignment::SouthEast),
            other => Err(AutofitError::Config(format!("unknown alignment `{other}`"))),
        }
    }
}

impl TryFrom<String> for Alignment {
    type Error = AutofitError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Alignment::NorthWest => "nw",
            Alignment::North => "n",
            Alignment::NorthEast => "ne",
            Alignment::West => "w",
            Alignment::Center => "center",
            Alignment::East => "e",
            Alignment::SouthWest => "sw",
            Alignment::South => "s",
            Alignment::SouthEast => "se",
        };
        f.write_str(name)
    }
}

/// Read-only knobs consumed by the layout engine, the renderer and the reactor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Space kept clear between the surface edge and the text.
    pub padding: u32,
    /// Gap inserted between consecutive lines.
    pub line_spacing: u32,
    pub alignment: Alignment,
    /// Size applied to every line without searching. Zero enables the search.
    pub force_size: u32,
    /// Upper bound for the search. Zero means unbounded.
    pub max_size: u32,
    /// Give each line its own maximal size instead of one shared size.
    pub independent_resize: bool,
    pub font_family: String,
    /// Outline every block's ink box.
    pub debug_boxes: bool,
    /// Draw only the debug boxes.
    pub disable_text: bool,
    pub double_buffer: bool,
    /// Watch the input stream for replacement text.
    pub handle_input: bool,
    pub quit_key: char,
    pub refresh_key: char,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            padding: 10,
            line_spacing: 10,
            alignment: Alignment::Center,
            force_size: 0,
            max_size: 0,
            independent_resize: false,
            font_family: "monospace".to_string(),
            debug_boxes: false,
            disable_text: false,
            double_buffer: true,
            handle_input: true,
            quit_key: 'q',
            refresh_key: 'r',
        }
    }
}

impl FitConfig {
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: FitConfig =
            serde_json::from_str(source).map_err(|err| AutofitError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_size > 0 && self.force_size > self.max_size {
            return Err(AutofitError::Config(format!(
                "force_size {} exceeds max_size {}",
                self.force_size, self.max_size
            )));
        }
        if self.quit_key == self.refresh_key {
            return Err(AutofitError::Config(
                "quit and refresh keys must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn max_size(&self) -> Option<u32> {
        (self.max_size > 0).then_some(self.max_size)
    }

    pub fn forced_size(&self) -> Option<u32> {
        (self.force_size > 0).then_some(self.force_size)
    }
}
