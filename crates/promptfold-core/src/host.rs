//! The primitives a transcript host supplies to the folding core.
//!
//! All positions are byte offsets into the transcript. Every method is a
//! read-only probe: callers pass an explicit offset and the host never moves
//! a cursor or otherwise mutates state to answer.

use std::ops::Range;

/// Read-only view of a transcript that can locate prompts.
pub trait PromptHost {
    /// Length of the transcript in bytes.
    fn len(&self) -> usize;

    /// Returns true when the transcript is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset of the start of the line containing `offset`.
    fn line_start(&self, offset: usize) -> usize;

    /// Byte offset of the end of the line containing `offset`.
    ///
    /// This is the offset of the terminating `\n`, or the transcript length on
    /// the last line.
    fn line_end(&self, offset: usize) -> usize;

    /// 0-based index of the line containing `offset`.
    fn line_of(&self, offset: usize) -> usize;

    /// Copy of the text in `range`, clamped to the transcript.
    fn slice(&self, range: Range<usize>) -> String;

    /// The prompt match starting exactly at `offset`, if there is one.
    fn looking_at_block_start(&self, offset: usize) -> Option<Range<usize>>;

    /// Start of the `n`-th prompt line strictly after the line containing `offset`.
    ///
    /// Returns `None` when no such prompt exists, unless the host chooses to
    /// clamp to the end of the transcript instead.
    fn next_prompt(&self, offset: usize, n: usize) -> Option<usize>;
}
