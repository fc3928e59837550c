//! Forward motion across prompt-anchored blocks.

use crate::host::PromptHost;

/// Position of the `n`-th prompt after the line containing `offset`.
///
/// Moves to the end of the current line and asks the host for the `n`-th
/// following prompt, so a call from anywhere inside block `i` lands on the
/// prompt of block `i + n`. A count of zero is treated as one. When fewer
/// prompts remain, the host's answer is returned unchanged.
pub fn advance_blocks<H>(host: &H, offset: usize, n: usize) -> Option<usize>
where
    H: PromptHost + ?Sized,
{
    let line_end = host.line_end(offset);
    host.next_prompt(line_end, n.max(1))
}
