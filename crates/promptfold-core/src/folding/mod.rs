//! Prompt-anchored block folding.
//!
//! This module provides:
//! - [`pattern`] - prompt patterns and the derived end-of-block pattern
//! - [`detector`] - the foldable-block predicate and block enumeration
//! - [`motion`] - forward motion across blocks

pub mod detector;
pub mod motion;
pub mod pattern;

pub use detector::{
    Block, EligibilityHook, FoldingDetector, MotionHook, detect_blocks, eligibility_hook,
    is_foldable_block_start, motion_hook,
};
pub use motion::advance_blocks;
pub use pattern::{EndPattern, PromptPattern, compile_end_pattern, resolve_prompt_pattern};
