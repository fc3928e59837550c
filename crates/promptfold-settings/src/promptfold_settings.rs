//! promptfold settings
//!
//! Persisted configuration for prompt folding:
//! - Fold settings shared by every mode (prompt override, blank lines, indicator, key remap)
//! - Per-mode prompt patterns and overrides
//! - The highlighting scheme used to color fold indicators
//!
//! Settings are resolved into a [`FoldConfig`] per mode and handed to the core
//! explicitly; nothing is looked up by name later.

use anyhow::{Context, Result};
use promptfold_core::{DEFAULT_INDICATOR, FoldConfig, HighlightScheme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod settings_file;

pub use settings_file::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptFoldSettings {
    pub fold: FoldSettings,
    pub modes: BTreeMap<String, ModeSettings>,
    pub highlight: HighlightScheme,
}

impl Default for PromptFoldSettings {
    fn default() -> Self {
        Self {
            fold: FoldSettings::default(),
            modes: builtin_modes(),
            highlight: HighlightScheme::new().with_face("comment", "#6a737d"),
        }
    }
}

impl PromptFoldSettings {
    /// Load settings from the user config directory, or defaults when there is no file.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::settings_path()?)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let mut settings: Self =
            serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")?;

        for (name, mode) in builtin_modes() {
            settings.modes.entry(name).or_insert(mode);
        }
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(Self::settings_path()?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        settings_file()
    }

    /// Merge the shared fold settings with the overrides for `mode`.
    pub fn resolve(&self, mode: &str) -> ResolvedMode {
        let overrides = self.modes.get(mode);
        let prompt_pattern = overrides
            .and_then(|m| m.prompt_pattern.clone())
            .or_else(|| self.fold.prompt_pattern.clone());
        let blank_lines = overrides
            .and_then(|m| m.blank_lines)
            .unwrap_or(self.fold.blank_lines);

        let mut config = FoldConfig::new()
            .with_blank_lines(blank_lines)
            .with_indicator(self.fold.indicator.clone())
            .with_remap_key(self.fold.remap_key);
        config.prompt_pattern = prompt_pattern;
        config.comment_lead = overrides.and_then(|m| m.comment_lead.clone());

        ResolvedMode {
            mode: mode.to_string(),
            config,
            host_prompt: overrides.and_then(|m| m.host_prompt.clone()),
        }
    }

    /// Configured mode names, sorted.
    pub fn mode_names(&self) -> Vec<&str> {
        self.modes.keys().map(String::as_str).collect()
    }
}

/// Fold settings shared by every mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldSettings {
    /// Prompt pattern used instead of the mode's host prompt.
    pub prompt_pattern: Option<String>,
    /// Blank lines before a prompt kept outside a fold.
    pub blank_lines: usize,
    /// Fold indicator identifier; `null` turns the indicator off.
    pub indicator: Option<String>,
    /// Whether the fold key toggles folds before the live input.
    pub remap_key: bool,
}

impl Default for FoldSettings {
    fn default() -> Self {
        Self {
            prompt_pattern: None,
            blank_lines: 0,
            indicator: Some(DEFAULT_INDICATOR.to_string()),
            remap_key: true,
        }
    }
}

/// Settings for one transcript mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSettings {
    /// The prompt pattern the host uses for this mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_prompt: Option<String>,
    /// Prompt pattern override for this mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_pattern: Option<String>,
    /// Blank-line tolerance for this mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blank_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_lead: Option<String>,
}

impl ModeSettings {
    pub fn with_host_prompt(prompt: impl Into<String>, comment_lead: impl Into<String>) -> Self {
        Self {
            host_prompt: Some(prompt.into()),
            comment_lead: Some(comment_lead.into()),
            ..Self::default()
        }
    }
}

/// Configuration for one mode, ready for a fold session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMode {
    pub mode: String,
    pub config: FoldConfig,
    /// Prompt pattern used when the configuration has no override.
    pub host_prompt: Option<String>,
}

/// Modes known out of the box.
pub fn builtin_modes() -> BTreeMap<String, ModeSettings> {
    [
        ("shell", r"^[^#$%>\n]*[#$%>] *", "#"),
        ("python", r"^>>> ", "#"),
        ("node", r"^> ", "//"),
        ("ghci", r"^ghci> ", "--"),
    ]
    .into_iter()
    .map(|(name, prompt, lead)| (name.to_string(), ModeSettings::with_host_prompt(prompt, lead)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = PromptFoldSettings::default();
        assert_eq!(settings.fold.blank_lines, 0);
        assert_eq!(settings.fold.indicator.as_deref(), Some("angle-bracket"));
        assert!(settings.fold.remap_key);
        assert_eq!(settings.mode_names(), vec!["ghci", "node", "python", "shell"]);
        assert_eq!(settings.highlight.indicator_color(), Some("#6a737d"));
    }

    #[test]
    fn test_resolve_builtin_mode() {
        let resolved = PromptFoldSettings::default().resolve("python");

        assert_eq!(resolved.mode, "python");
        assert_eq!(resolved.host_prompt.as_deref(), Some("^>>> "));
        assert_eq!(resolved.config.prompt_pattern, None);
        assert_eq!(resolved.config.comment_lead.as_deref(), Some("#"));
        assert_eq!(resolved.config.blank_lines, 0);
    }

    #[test]
    fn test_mode_overrides_win() {
        let mut settings = PromptFoldSettings::default();
        settings.fold.prompt_pattern = Some("^global> ".to_string());
        settings.fold.blank_lines = 1;
        settings.modes.insert(
            "psql".to_string(),
            ModeSettings {
                prompt_pattern: Some("^\\w+=# ".to_string()),
                blank_lines: Some(2),
                ..ModeSettings::default()
            },
        );

        let psql = settings.resolve("psql");
        assert_eq!(psql.config.prompt_pattern.as_deref(), Some("^\\w+=# "));
        assert_eq!(psql.config.blank_lines, 2);
        assert_eq!(psql.host_prompt, None);

        let shell = settings.resolve("shell");
        assert_eq!(shell.config.prompt_pattern.as_deref(), Some("^global> "));
        assert_eq!(shell.config.blank_lines, 1);
    }

    #[test]
    fn test_unknown_mode_has_no_prompt() {
        let resolved = PromptFoldSettings::default().resolve("inferior-lisp");
        assert_eq!(resolved.host_prompt, None);
        assert_eq!(resolved.config.prompt_pattern, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: PromptFoldSettings =
            serde_json::from_str(r#"{ "fold": { "blank_lines": 3 } }"#).unwrap();

        assert_eq!(settings.fold.blank_lines, 3);
        assert_eq!(settings.fold.indicator.as_deref(), Some("angle-bracket"));
        assert!(settings.fold.remap_key);
    }

    #[test]
    fn test_null_indicator_disables_it() {
        let settings: PromptFoldSettings =
            serde_json::from_str(r#"{ "fold": { "indicator": null, "remap_key": false } }"#)
                .unwrap();

        assert_eq!(settings.fold.indicator, None);
        let resolved = settings.resolve("shell");
        assert_eq!(resolved.config.indicator, None);
        assert!(!resolved.config.remap_key);
    }
}
