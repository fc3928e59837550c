//! Transcript buffer backed by a rope.
//!
//! A REPL transcript grows by appends from the running process but may also be
//! edited anywhere by the user, so it is stored in a [`Rope`] the same way an
//! editor buffer would be. Prompt lookups scan line by line outward from the
//! probe position, which keeps each call proportional to the distance to the
//! next prompt instead of the size of the transcript.
//!
//! ## Offsets
//!
//! All positions are byte offsets. Only `\n` separates lines.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

use crate::error::{FoldError, Result};
use crate::folding::PromptPattern;
use crate::host::PromptHost;

/// What [`PromptHost::next_prompt`] answers when fewer prompts remain than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptOverflow {
    /// Report that no further prompt exists.
    #[default]
    Stop,
    /// Answer with the end of the transcript.
    ClampToEnd,
}

/// A REPL or shell transcript with a prompt pattern.
///
/// # Examples
///
/// ```
/// use promptfold_core::{PromptHost, PromptPattern, TranscriptBuffer};
///
/// let prompt = PromptPattern::new("^> ").unwrap();
/// let buffer = TranscriptBuffer::new("> ls\na b\n> ", prompt);
///
/// assert_eq!(buffer.looking_at_block_start(0), Some(0..2));
/// assert_eq!(buffer.next_prompt(0, 1), Some(9));
/// assert_eq!(buffer.next_prompt(9, 1), None);
/// ```
#[derive(Debug, Clone)]
pub struct TranscriptBuffer {
    rope: Rope,
    prompt: PromptPattern,
    overflow: PromptOverflow,
}

impl TranscriptBuffer {
    /// Creates a transcript from existing text.
    pub fn new(text: impl AsRef<str>, prompt: PromptPattern) -> Self {
        Self {
            rope: Rope::from_str(text.as_ref()),
            prompt,
            overflow: PromptOverflow::default(),
        }
    }

    /// Creates an empty transcript.
    pub fn empty(prompt: PromptPattern) -> Self {
        Self {
            rope: Rope::new(),
            prompt,
            overflow: PromptOverflow::default(),
        }
    }

    /// Sets the answer given when prompt lookups run past the last prompt.
    pub fn with_overflow(mut self, overflow: PromptOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn prompt(&self) -> &PromptPattern {
        &self.prompt
    }

    /// Replaces the prompt pattern, e.g. after the user reconfigures the mode.
    pub fn set_prompt(&mut self, prompt: PromptPattern) {
        self.prompt = prompt;
    }

    pub fn overflow(&self) -> PromptOverflow {
        self.overflow
    }

    /// Returns the entire transcript as a `String`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Returns the number of lines. A trailing newline starts a final empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the text of a line including its line break, or `None` when out of bounds.
    pub fn line(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        Some(self.rope.line(line_idx).to_string())
    }

    /// Returns the byte offset where a line starts, or `None` when out of bounds.
    pub fn line_to_byte(&self, line_idx: usize) -> Option<usize> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        Some(self.rope.line_to_byte(line_idx))
    }

    /// Appends process output or echoed input at the end of the transcript.
    pub fn append(&mut self, text: impl AsRef<str>) {
        let end = self.rope.len_chars();
        self.rope.insert(end, text.as_ref());
    }

    /// Inserts text at a byte offset.
    ///
    /// # Errors
    /// Returns [`FoldError::OutOfBounds`] if `offset` is past the end.
    pub fn insert(&mut self, offset: usize, text: impl AsRef<str>) -> Result<()> {
        self.check_offset(offset)?;
        let char_idx = self.rope.byte_to_char(offset);
        self.rope.insert(char_idx, text.as_ref());
        Ok(())
    }

    /// Deletes the text in a byte range.
    ///
    /// # Errors
    /// Returns [`FoldError::OutOfBounds`] if the range ends past the buffer or is reversed.
    pub fn delete(&mut self, range: Range<usize>) -> Result<()> {
        self.check_offset(range.end)?;
        if range.start > range.end {
            return Err(FoldError::OutOfBounds {
                offset: range.start,
                len: self.rope.len_bytes(),
            });
        }
        if range.is_empty() {
            return Ok(());
        }

        let start = self.rope.byte_to_char(range.start);
        let end = self.rope.byte_to_char(range.end);
        self.rope.remove(start..end);
        Ok(())
    }

    /// The prompt match on a line, when the line starts with a prompt.
    pub fn prompt_at_line(&self, line_idx: usize) -> Option<Range<usize>> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let start = self.rope.line_to_byte(line_idx);
        let line: Cow<'_, str> = self.rope.line(line_idx).into();
        self.prompt
            .match_at(&line, 0)
            .map(|m| start + m.start..start + m.end)
    }

    /// The most recent prompt match, which is where the user is typing.
    pub fn live_prompt(&self) -> Option<Range<usize>> {
        (0..self.rope.len_lines())
            .rev()
            .find_map(|line_idx| self.prompt_at_line(line_idx))
    }

    /// Where live input begins: the end of the last prompt, or the end of the
    /// transcript when no prompt has been printed yet.
    pub fn live_input_start(&self) -> usize {
        self.live_prompt()
            .map_or(self.rope.len_bytes(), |prompt| prompt.end)
    }

    /// Line starts of every prompt in the transcript, in order.
    pub fn prompt_offsets(&self) -> Vec<usize> {
        (0..self.rope.len_lines())
            .filter_map(|line_idx| self.prompt_at_line(line_idx))
            .map(|m| m.start)
            .collect()
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.rope.len_bytes() {
            return Err(FoldError::OutOfBounds {
                offset,
                len: self.rope.len_bytes(),
            });
        }
        Ok(())
    }

    fn clamp(&self, offset: usize) -> usize {
        offset.min(self.rope.len_bytes())
    }
}

impl PromptHost for TranscriptBuffer {
    fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    fn line_start(&self, offset: usize) -> usize {
        let line_idx = self.rope.byte_to_line(self.clamp(offset));
        self.rope.line_to_byte(line_idx)
    }

    fn line_end(&self, offset: usize) -> usize {
        let line_idx = self.rope.byte_to_line(self.clamp(offset));
        if line_idx + 1 < self.rope.len_lines() {
            self.rope.line_to_byte(line_idx + 1) - 1
        } else {
            self.rope.len_bytes()
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.rope.byte_to_line(self.clamp(offset))
    }

    fn slice(&self, range: Range<usize>) -> String {
        let end = self.clamp(range.end);
        let start = range.start.min(end);
        let start = self.rope.byte_to_char(start);
        let end = self.rope.byte_to_char(end);
        self.rope.slice(start..end).to_string()
    }

    fn looking_at_block_start(&self, offset: usize) -> Option<Range<usize>> {
        if offset > self.rope.len_bytes() {
            return None;
        }
        let line_idx = self.rope.byte_to_line(offset);
        let start = self.rope.line_to_byte(line_idx);
        let line: Cow<'_, str> = self.rope.line(line_idx).into();
        self.prompt
            .match_at(&line, offset - start)
            .map(|m| start + m.start..start + m.end)
    }

    fn next_prompt(&self, offset: usize, n: usize) -> Option<usize> {
        let mut remaining = n.max(1);
        let first = self.rope.byte_to_line(self.clamp(offset)) + 1;

        for line_idx in first..self.rope.len_lines() {
            if let Some(prompt) = self.prompt_at_line(line_idx) {
                remaining -= 1;
                if remaining == 0 {
                    return Some(prompt.start);
                }
            }
        }

        match self.overflow {
            PromptOverflow::Stop => None,
            PromptOverflow::ClampToEnd => Some(self.rope.len_bytes()),
        }
    }
}
