//! Foldable block detection for prompt-anchored transcripts.
//!
//! A block runs from one prompt to just before the next one. Every block is
//! foldable except the one holding the live prompt, which the user is still
//! typing into.

use std::ops::Range;

use super::motion::advance_blocks;
use super::pattern::EndPattern;
use crate::host::PromptHost;

/// Decides whether the prompt at `offset` starts a block that may be folded.
///
/// The prompt must match at `offset`, another prompt must follow on a later
/// line, and the line holding that following prompt must itself look like a
/// block start. The last prompt in the transcript never qualifies. A host
/// answer that does not land after the current line counts as "no further
/// prompt".
pub fn is_foldable_block_start<H>(host: &H, offset: usize) -> bool
where
    H: PromptHost + ?Sized,
{
    let Some(prompt) = host.looking_at_block_start(offset) else {
        return false;
    };

    let line_end = host.line_end(prompt.end);
    let next = match host.next_prompt(prompt.end, 1) {
        Some(next) if next > line_end && next <= host.len() => next,
        Some(next) => {
            tracing::trace!(offset, next, "next prompt does not follow the current line");
            return false;
        }
        None => {
            tracing::trace!(offset, "live prompt is not foldable");
            return false;
        }
    };

    host.looking_at_block_start(host.line_start(next)).is_some()
}

/// A prompt-anchored block of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Byte range of the prompt match.
    pub prompt: Range<usize>,
    /// End of the prompt's line; the input typed at the prompt ends here.
    pub header_end: usize,
    /// From the end of the prompt to the start of the preserved blank-line gap.
    pub body: Range<usize>,
    /// Start of the following prompt, `None` for the live block.
    pub next_prompt: Option<usize>,
    /// Starting line (0-based).
    pub start_line: usize,
    /// Last line of the body (0-based, inclusive).
    pub end_line: usize,
    /// Whether the block may be folded.
    pub foldable: bool,
}

impl Block {
    /// The span a fold engine hides: everything after the input line up to the gap.
    pub fn hidden_range(&self) -> Range<usize> {
        self.header_end.min(self.body.end)..self.body.end
    }

    /// Get the number of lines in this block, not counting the gap.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Number of lines hidden when the block is folded.
    pub fn hidden_line_count(&self) -> usize {
        self.end_line - self.start_line
    }

    /// Check if this block contains a given line.
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Check if this block contains a byte offset, including its prompt.
    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.prompt.start && offset < self.body.end.max(self.prompt.end)
    }
}

/// Eligibility hook: is the prompt at the given offset a foldable block start?
pub type EligibilityHook = fn(&dyn PromptHost, usize) -> bool;

/// Motion hook: where is the `n`-th prompt after the given offset?
pub type MotionHook = fn(&dyn PromptHost, usize, usize) -> Option<usize>;

/// [`is_foldable_block_start`] as a hook for a fold engine.
pub fn eligibility_hook(host: &dyn PromptHost, offset: usize) -> bool {
    is_foldable_block_start(host, offset)
}

/// [`advance_blocks`] as a hook for a fold engine.
pub fn motion_hook(host: &dyn PromptHost, offset: usize, n: usize) -> Option<usize> {
    advance_blocks(host, offset, n)
}

/// Walks a transcript and computes its blocks.
#[derive(Debug, Clone)]
pub struct FoldingDetector {
    end: EndPattern,
    /// Minimum lines for a block to be offered for folding.
    min_lines: usize,
    eligible: EligibilityHook,
    forward: MotionHook,
}

impl FoldingDetector {
    /// Create a detector that ends blocks with `end`.
    pub fn new(end: EndPattern) -> Self {
        Self {
            end,
            min_lines: 2,
            eligible: eligibility_hook,
            forward: motion_hook,
        }
    }

    /// Set the minimum number of lines for a block to be offered for folding.
    pub fn min_lines(mut self, lines: usize) -> Self {
        self.min_lines = lines;
        self
    }

    /// Replace the eligibility and motion hooks.
    pub fn with_hooks(mut self, eligible: EligibilityHook, forward: MotionHook) -> Self {
        self.eligible = eligible;
        self.forward = forward;
        self
    }

    pub fn end_pattern(&self) -> &EndPattern {
        &self.end
    }

    /// Every block in the transcript, in order, including the live one.
    pub fn detect(&self, host: &dyn PromptHost) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut cursor = self.first_prompt(host);

        while let Some(start) = cursor {
            let Some(prompt) = host.looking_at_block_start(start) else {
                break;
            };
            let header_end = host.line_end(prompt.end);
            let next = (self.forward)(host, start, 1).filter(|&next| {
                next > header_end && host.looking_at_block_start(next).is_some()
            });
            let body_end = match next {
                Some(next) => self.gap_start(host, prompt.end, next),
                None => host.len(),
            };

            blocks.push(Block {
                start_line: host.line_of(prompt.start),
                end_line: host.line_of(body_end.max(prompt.end)),
                foldable: (self.eligible)(host, start),
                prompt: prompt.clone(),
                header_end,
                body: prompt.end..body_end.max(prompt.end),
                next_prompt: next,
            });
            cursor = next;
        }

        blocks
    }

    /// Blocks a fold engine may collapse: eligible and at least `min_lines` long.
    pub fn foldable(&self, host: &dyn PromptHost) -> Vec<Block> {
        self.detect(host)
            .into_iter()
            .filter(|block| block.foldable && block.line_count() >= self.min_lines)
            .collect()
    }

    fn first_prompt(&self, host: &dyn PromptHost) -> Option<usize> {
        if host.looking_at_block_start(0).is_some() {
            return Some(0);
        }
        host.next_prompt(0, 1)
            .filter(|&next| next > 0 && host.looking_at_block_start(next).is_some())
    }

    /// Where the block before the prompt at `next` stops.
    ///
    /// When the end pattern matches, the block stops right before its line
    /// breaks. With fewer line breaks than the tolerance asks for, all of them
    /// stay outside the block.
    fn gap_start(&self, host: &dyn PromptHost, body_start: usize, next: usize) -> usize {
        let breaks = self.end.line_breaks();
        if let Some(start) = next.checked_sub(breaks) {
            if start >= body_start {
                let window = host.slice(start..host.line_end(next));
                if self.end.matches_exactly(&window) {
                    return start;
                }
            }
        }

        let window = host.slice(body_start..next);
        let trailing = window.len() - window.trim_end_matches('\n').len();
        next - trailing
    }
}

/// Convenience function to detect blocks with default settings.
pub fn detect_blocks(host: &dyn PromptHost, end: &EndPattern) -> Vec<Block> {
    FoldingDetector::new(end.clone()).detect(host)
}
