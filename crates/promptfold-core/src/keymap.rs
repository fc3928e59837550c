//! Fold key remapping.
//!
//! With remapping enabled the fold key toggles the block under the cursor as
//! long as the cursor sits before the live input; at or after the live input
//! it keeps its normal editing function.

use crate::folding::is_foldable_block_start;
use crate::host::PromptHost;

/// What a press of the fold key should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Toggle the fold of the block under the cursor.
    ToggleFold,
    /// Perform the key's normal function.
    Passthrough,
}

/// Decide what the fold key does with the cursor at `cursor`.
pub fn fold_key_action(remap_enabled: bool, cursor: usize, live_input_start: usize) -> KeyAction {
    if remap_enabled && cursor < live_input_start {
        KeyAction::ToggleFold
    } else {
        KeyAction::Passthrough
    }
}

/// Start of the foldable block enclosing `cursor`, if any.
///
/// Walks back line by line to the nearest prompt line at or before the cursor.
pub fn toggle_target<H>(host: &H, cursor: usize) -> Option<usize>
where
    H: PromptHost + ?Sized,
{
    let mut line = host.line_start(cursor.min(host.len()));
    loop {
        if host.looking_at_block_start(line).is_some() {
            return is_foldable_block_start(host, line).then_some(line);
        }
        if line == 0 {
            return None;
        }
        line = host.line_start(line - 1);
    }
}
