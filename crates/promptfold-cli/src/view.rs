//! Folded rendering of a transcript
//!
//! Tracks which blocks are collapsed, keyed by their starting line, and
//! renders the transcript with each collapsed block's hidden span replaced by
//! its indicator.

use promptfold_core::{Block, FoldDecorator};
use std::collections::BTreeSet;

pub struct FoldView {
    blocks: Vec<Block>,
    folded_lines: BTreeSet<usize>,
}

impl FoldView {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            folded_lines: BTreeSet::new(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns `true` when the block starting at `start_line` is collapsed.
    pub fn is_line_folded(&self, start_line: usize) -> bool {
        self.folded_lines.contains(&start_line)
    }

    /// Toggle the block starting at `start_line`. Returns the new collapsed state.
    ///
    /// Blocks that are not foldable (the live block, empty bodies) never collapse.
    pub fn toggle_fold(&mut self, start_line: usize) -> bool {
        if self.folded_lines.remove(&start_line) {
            return false;
        }
        let foldable = self
            .blocks
            .iter()
            .any(|b| b.start_line == start_line && b.foldable);
        if foldable {
            self.folded_lines.insert(start_line);
        }
        foldable
    }

    /// Collapse every foldable block.
    pub fn fold_all(&mut self) {
        for block in self.blocks.iter().filter(|b| b.foldable) {
            self.folded_lines.insert(block.start_line);
        }
    }

    /// Expand every collapsed block.
    pub fn unfold_all(&mut self) {
        self.folded_lines.clear();
    }

    /// Lines hidden by collapsed blocks.
    pub fn hidden_line_count(&self) -> usize {
        self.collapsed().map(Block::hidden_line_count).sum()
    }

    fn collapsed(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| self.folded_lines.contains(&b.start_line))
    }

    /// Render `text` with collapsed blocks replaced by their indicator.
    ///
    /// A decorator that declines a block hides the span without a marker.
    pub fn render(&self, text: &str, decorator: &dyn FoldDecorator, ansi: bool) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        for block in self.collapsed() {
            let hidden = block.hidden_range();
            if hidden.is_empty() || hidden.start < cursor || hidden.end > text.len() {
                continue;
            }
            out.push_str(&text[cursor..hidden.start]);
            if let Some(decoration) = decorator.decorate(block) {
                let marker = format!(
                    " {} {} hidden",
                    decoration.glyph,
                    plural(block.hidden_line_count(), "line")
                );
                match decoration.color.as_deref().filter(|_| ansi) {
                    Some(color) => out.push_str(&paint(&marker, color)),
                    None => out.push_str(&marker),
                }
            }
            cursor = hidden.end;
        }

        out.push_str(&text[cursor..]);
        out
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Wrap `text` in a 24-bit foreground color. Colors other than `#rrggbb` are ignored.
fn paint(text: &str, color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
