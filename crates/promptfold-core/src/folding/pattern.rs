//! Prompt and end-of-block patterns.
//!
//! A [`PromptPattern`] recognizes prompt lines. The [`EndPattern`] derived from
//! it with [`compile_end_pattern`] recognizes exactly `blank_lines + 1` line
//! breaks followed by a prompt, which is where a folded block stops.

use regex::{Regex, RegexBuilder};
use std::fmt;
use std::ops::Range;

use crate::error::{FoldError, Result};

/// A line-anchored pattern identifying prompt lines.
///
/// Patterns are compiled in multi-line mode so `^` matches at every line start.
#[derive(Clone)]
pub struct PromptPattern {
    source: String,
    regex: Regex,
}

impl PromptPattern {
    /// Compile a prompt pattern.
    ///
    /// # Errors
    /// Returns [`FoldError::EmptyPattern`] for an empty string and
    /// [`FoldError::InvalidPattern`] when the regex does not compile.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let source = pattern.into();
        if source.is_empty() {
            return Err(FoldError::EmptyPattern);
        }

        let regex = build_regex(&source)?;
        Ok(Self { source, regex })
    }

    /// The pattern text as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the match range when the prompt matches starting exactly at `offset`.
    ///
    /// Text before `offset` is still visible to the regex, so `^` only matches
    /// when `offset` is at a line start.
    pub fn match_at(&self, text: &str, offset: usize) -> Option<Range<usize>> {
        if offset > text.len() {
            return None;
        }

        self.regex
            .find_at(text, offset)
            .filter(|m| m.start() == offset)
            .map(|m| m.range())
    }
}

impl fmt::Debug for PromptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PromptPattern").field(&self.source).finish()
    }
}

impl fmt::Display for PromptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for PromptPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PromptPattern {}

/// The pattern marking where a foldable block ends.
#[derive(Clone)]
pub struct EndPattern {
    source: String,
    regex: Regex,
    anchored: Regex,
    line_breaks: usize,
}

impl EndPattern {
    /// The compiled pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of line breaks required before the prompt (tolerance + 1).
    pub fn line_breaks(&self) -> usize {
        self.line_breaks
    }

    /// Number of blank lines kept visible between a folded block and the next prompt.
    pub fn blank_lines(&self) -> usize {
        self.line_breaks - 1
    }

    /// Returns true when `text` starts with exactly the required line breaks
    /// followed by a prompt.
    pub fn matches_exactly(&self, text: &str) -> bool {
        self.anchored.is_match(text)
    }

    /// Returns true when the pattern matches starting exactly at `offset`.
    pub fn matches_at(&self, text: &str, offset: usize) -> bool {
        offset <= text.len()
            && self
                .regex
                .find_at(text, offset)
                .is_some_and(|m| m.start() == offset)
    }
}

impl fmt::Debug for EndPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndPattern")
            .field("source", &self.source)
            .field("line_breaks", &self.line_breaks)
            .finish()
    }
}

impl fmt::Display for EndPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for EndPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for EndPattern {}

/// Derive the end-of-block pattern: `blank_lines + 1` line breaks, then a prompt.
///
/// A tolerance of zero still requires the single line break separating the
/// block body from the next prompt.
pub fn compile_end_pattern(prompt: &PromptPattern, blank_lines: usize) -> Result<EndPattern> {
    let line_breaks = blank_lines + 1;
    let source = format!(r"\n{{{}}}(?:{})", line_breaks, prompt.as_str());
    let regex = build_regex(&source)?;
    let anchored = build_regex(&format!(r"\A(?:{})", source))?;

    Ok(EndPattern {
        source,
        regex,
        anchored,
        line_breaks,
    })
}

/// Pick the prompt pattern for a mode: the explicit override first, then the host default.
///
/// # Errors
/// [`FoldError::MissingPromptPattern`] when neither is available; folding
/// cannot work without one.
pub fn resolve_prompt_pattern(
    mode: &str,
    override_pattern: Option<&str>,
    host_default: Option<&str>,
) -> Result<PromptPattern> {
    match override_pattern.or(host_default) {
        Some(pattern) => PromptPattern::new(pattern),
        None => Err(FoldError::MissingPromptPattern {
            mode: mode.to_string(),
        }),
    }
}

fn build_regex(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|e| FoldError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
