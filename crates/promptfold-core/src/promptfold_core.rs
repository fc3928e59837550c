//! promptfold core - block boundaries for folding REPL and shell transcripts
//!
//! A transcript interleaves prompts, typed input and program output. This
//! crate finds the prompt-anchored blocks in such a transcript so a generic
//! fold engine can collapse them:
//!
//! - `compile_end_pattern` - where a folded block stops, keeping a configurable
//!   number of blank lines visible before the next prompt
//! - `is_foldable_block_start` - accepts every prompt except the live one
//! - `advance_blocks` - moves forward `n` prompts to find a block's end
//!
//! The fold engine itself stays outside: it receives a [`FoldSpec`] through a
//! [`FoldRegistry`] and probes the transcript through the [`PromptHost`] trait.
//! [`TranscriptBuffer`] is a rope-backed host.

pub mod buffer;
pub mod decoration;
mod error;
pub mod folding;
mod host;
pub mod keymap;
pub mod registry;
pub mod session;

pub use buffer::{PromptOverflow, TranscriptBuffer};
pub use decoration::{
    DEFAULT_INDICATOR, Decoration, FoldDecorator, HighlightScheme, IndicatorDecorator,
    indicator_glyph,
};
pub use error::*;
pub use folding::{
    Block, EligibilityHook, EndPattern, FoldingDetector, MotionHook, PromptPattern,
    advance_blocks, compile_end_pattern, detect_blocks, is_foldable_block_start,
    resolve_prompt_pattern,
};
pub use host::PromptHost;
pub use keymap::{KeyAction, fold_key_action, toggle_target};
pub use registry::{DEFAULT_COMMENT_LEAD, FoldRegistry, FoldSpec, RegistrationId};
pub use session::{FoldConfig, FoldSession};
