//! Visual decoration of fold regions.
//!
//! Purely cosmetic: a fold engine calls a [`FoldDecorator`] once for each
//! region it creates and draws whatever comes back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

use crate::folding::Block;

/// Indicator used when none is configured.
pub const DEFAULT_INDICATOR: &str = "angle-bracket";

/// Face whose color the indicator takes.
pub const INDICATOR_FACE: &str = "fold-indicator";

/// Face consulted when the scheme has no indicator face.
pub const FALLBACK_FACE: &str = "comment";

/// Glyph for an indicator identifier. Unknown identifiers use the default glyph.
pub fn indicator_glyph(indicator: &str) -> &'static str {
    match indicator {
        "triangle" => "▸",
        "ellipsis" => "…",
        "plus" => "+",
        _ => "<",
    }
}

/// Colors by face name, as provided by the active highlighting scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightScheme {
    faces: BTreeMap<String, String>,
}

impl HighlightScheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a face color.
    pub fn with_face(mut self, face: impl Into<String>, color: impl Into<String>) -> Self {
        self.faces.insert(face.into(), color.into());
        self
    }

    pub fn color(&self, face: &str) -> Option<&str> {
        self.faces.get(face).map(String::as_str)
    }

    /// The indicator color, falling back to the comment face.
    pub fn indicator_color(&self) -> Option<&str> {
        self.color(INDICATOR_FACE).or_else(|| self.color(FALLBACK_FACE))
    }
}

/// Marker drawn for one fold region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Indicator identifier.
    pub indicator: String,
    /// Text drawn for the indicator.
    pub glyph: &'static str,
    /// Color from the highlighting scheme.
    pub color: Option<String>,
    /// The hidden span the marker stands for.
    pub range: Range<usize>,
}

/// Called once per created fold region.
pub trait FoldDecorator {
    fn decorate(&self, block: &Block) -> Option<Decoration>;
}

/// Decorates regions with a configured indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorDecorator {
    indicator: Option<String>,
    color: Option<String>,
}

impl IndicatorDecorator {
    pub fn new(indicator: Option<&str>, scheme: &HighlightScheme) -> Self {
        Self {
            indicator: indicator.map(str::to_string),
            color: scheme.indicator_color().map(str::to_string),
        }
    }

    /// A decorator that never draws anything.
    pub fn none() -> Self {
        Self {
            indicator: None,
            color: None,
        }
    }

    pub fn indicator(&self) -> Option<&str> {
        self.indicator.as_deref()
    }
}

impl FoldDecorator for IndicatorDecorator {
    fn decorate(&self, block: &Block) -> Option<Decoration> {
        let indicator = self.indicator.as_ref()?;
        Some(Decoration {
            indicator: indicator.clone(),
            glyph: indicator_glyph(indicator),
            color: self.color.clone(),
            range: block.hidden_range(),
        })
    }
}
