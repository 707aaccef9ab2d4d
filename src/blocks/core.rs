use crate::error::{AutofitError, Result};
use crate::geometry::{Extents, Position};
use crate::width::display_width;

/// Lifecycle of a block within one recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    /// Never measured in the current recalculation.
    #[default]
    Unsized,
    /// Measured at the size currently being searched.
    Sized,
    /// Size and extents locked until the next recalculation.
    Finalized,
}

/// One line of text with its size, ink extents and placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    text: String,
    state: BlockState,
    pub size: u32,
    pub extents: Extents,
    pub position: Position,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: BlockState::Unsized,
            size: 0,
            extents: Extents::default(),
            position: Position::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.state == BlockState::Finalized
    }

    /// Display width of the text in columns; decides which line is "longest".
    pub fn text_width(&self) -> usize {
        display_width(&self.text)
    }

    /// Record a measurement taken at `size`. Finalized blocks keep their
    /// locked values.
    pub fn record(&mut self, size: u32, extents: Extents) {
        if self.is_finalized() {
            return;
        }
        self.size = size;
        self.extents = extents;
        self.state = BlockState::Sized;
    }

    pub fn finalize(&mut self) {
        self.state = BlockState::Finalized;
    }

    /// Unlock the block for a new recalculation. Size and extents stay as a
    /// hint for the next search.
    pub fn reset(&mut self) {
        self.state = BlockState::Unsized;
    }
}

/// Ordered set of every line currently on display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSet {
    blocks: Vec<TextBlock>,
}

impl BlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextBlock> {
        self.blocks.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, TextBlock> {
        self.blocks.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&TextBlock> {
        self.blocks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TextBlock> {
        self.blocks.get_mut(index)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.blocks.iter().map(TextBlock::text).collect()
    }

    pub fn unfinalized_count(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_finalized()).count()
    }

    pub fn all_finalized(&self) -> bool {
        self.blocks.iter().all(TextBlock::is_finalized)
    }

    /// Index of the widest block still open for sizing. Ties go to the
    /// earliest line.
    pub fn longest_unfinalized(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (index, block) in self.blocks.iter().enumerate() {
            if block.is_finalized() {
                continue;
            }
            let width = block.text_width();
            if best.map(|(_, widest)| width > widest).unwrap_or(true) {
                best = Some((index, width));
            }
        }
        best.map(|(index, _)| index)
    }

    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.reset();
        }
    }
}

impl<'a> IntoIterator for &'a BlockSet {
    type Item = &'a TextBlock;
    type IntoIter = std::slice::Iter<'a, TextBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Split `text` into a fresh [`BlockSet`], one block per line.
///
/// Lines end at `\n` or `\r\n`; a trailing terminator does not produce an
/// extra empty line and empty input produces an empty set.
pub fn blockify(text: &str) -> Result<BlockSet> {
    let line_count = text.lines().count();
    let mut blocks = Vec::new();
    blocks
        .try_reserve_exact(line_count)
        .map_err(|err| AutofitError::Blockify(err.to_string()))?;
    blocks.extend(text.lines().map(TextBlock::new));
    Ok(BlockSet { blocks })
}
