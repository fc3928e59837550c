//! Per-buffer folding lifecycle.
//!
//! A [`FoldSession`] owns the resolved configuration for one transcript
//! buffer. [`FoldSession::setup`] and [`FoldSession::teardown`] are paired and
//! idempotent; setup either registers a complete spec or leaves the session
//! inactive.

use crate::decoration::{DEFAULT_INDICATOR, HighlightScheme, IndicatorDecorator};
use crate::error::Result;
use crate::folding::{PromptPattern, compile_end_pattern, resolve_prompt_pattern};
use crate::keymap::{KeyAction, fold_key_action};
use crate::registry::{DEFAULT_COMMENT_LEAD, FoldRegistry, FoldSpec, RegistrationId};

/// Folding configuration for one buffer, already resolved by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldConfig {
    /// Prompt pattern override; `None` uses the host default.
    pub prompt_pattern: Option<String>,
    /// Blank lines before a prompt that stay visible outside a fold.
    pub blank_lines: usize,
    /// Fold indicator identifier; `None` disables the indicator.
    pub indicator: Option<String>,
    /// Whether the fold key toggles folds before the live input.
    pub remap_key: bool,
    /// Comment lead for the fold engine.
    pub comment_lead: Option<String>,
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            prompt_pattern: None,
            blank_lines: 0,
            indicator: Some(DEFAULT_INDICATOR.to_string()),
            remap_key: true,
            comment_lead: None,
        }
    }
}

impl FoldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.prompt_pattern = Some(pattern.into());
        self
    }

    pub fn with_blank_lines(mut self, lines: usize) -> Self {
        self.blank_lines = lines;
        self
    }

    pub fn with_indicator(mut self, indicator: Option<String>) -> Self {
        self.indicator = indicator;
        self
    }

    pub fn with_remap_key(mut self, remap: bool) -> Self {
        self.remap_key = remap;
        self
    }

    pub fn with_comment_lead(mut self, lead: impl Into<String>) -> Self {
        self.comment_lead = Some(lead.into());
        self
    }

    /// Build the spec this configuration describes for `mode`.
    pub fn build_spec(&self, mode: &str, host_default: Option<&str>) -> Result<FoldSpec> {
        let start =
            resolve_prompt_pattern(mode, self.prompt_pattern.as_deref(), host_default)?;
        let end = compile_end_pattern(&start, self.blank_lines)?;
        let lead = self.comment_lead.as_deref().unwrap_or(DEFAULT_COMMENT_LEAD);
        Ok(FoldSpec::new(mode, start, end).with_comment_lead(lead))
    }
}

/// Folding state for one transcript buffer.
#[derive(Debug)]
pub struct FoldSession {
    mode: String,
    config: FoldConfig,
    active: Option<FoldSpec>,
    registration: Option<RegistrationId>,
}

impl FoldSession {
    pub fn new(mode: impl Into<String>, config: FoldConfig) -> Self {
        Self {
            mode: mode.into(),
            config,
            active: None,
            registration: None,
        }
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn config(&self) -> &FoldConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The registered spec, while the session is active.
    pub fn spec(&self) -> Option<&FoldSpec> {
        self.active.as_ref()
    }

    /// This session's handle in the registry, while the session is active.
    pub fn registration(&self) -> Option<RegistrationId> {
        self.registration
    }

    /// The prompt pattern in use, while the session is active.
    pub fn prompt(&self) -> Option<&PromptPattern> {
        self.active.as_ref().map(|spec| &spec.start)
    }

    /// Resolve the prompt pattern, compile the end pattern and register the spec.
    ///
    /// Calling this on an active session returns the existing spec. When no
    /// prompt pattern can be resolved a warning is logged, the session stays
    /// inactive and the error is returned.
    pub fn setup(
        &mut self,
        registry: &mut FoldRegistry,
        host_default: Option<&str>,
    ) -> Result<&FoldSpec> {
        let spec = match self.active.take() {
            Some(spec) => spec,
            None => {
                let spec = self.build(host_default)?;
                self.registration = Some(registry.register(spec.clone()));
                tracing::debug!(mode = %self.mode, "prompt folding enabled");
                spec
            }
        };

        Ok(self.active.insert(spec))
    }

    /// Unregister this session's spec. Does nothing on an inactive session.
    ///
    /// Other sessions of the same mode keep their own registrations.
    pub fn teardown(&mut self, registry: &mut FoldRegistry) {
        if self.active.take().is_some() {
            if let Some(id) = self.registration.take() {
                registry.unregister(id);
            }
            tracing::debug!(mode = %self.mode, "prompt folding disabled");
        }
    }

    /// Apply a new configuration, recompiling the end pattern if the session is active.
    ///
    /// On failure the previous configuration and spec stay in effect.
    pub fn reconfigure(
        &mut self,
        config: FoldConfig,
        registry: &mut FoldRegistry,
        host_default: Option<&str>,
    ) -> Result<()> {
        if self.active.is_none() {
            self.config = config;
            return Ok(());
        }

        let previous = std::mem::replace(&mut self.config, config);
        let spec = match self.build(host_default) {
            Ok(spec) => spec,
            Err(err) => {
                self.config = previous;
                return Err(err);
            }
        };

        match self.registration {
            Some(id) if registry.replace(id, spec.clone()) => {}
            _ => self.registration = Some(registry.register(spec.clone())),
        }
        tracing::debug!(mode = %self.mode, end = %spec.end, "prompt folding reconfigured");
        self.active = Some(spec);
        Ok(())
    }

    /// What the fold key should do with the cursor at `cursor`.
    pub fn key_action(&self, cursor: usize, live_input_start: usize) -> KeyAction {
        fold_key_action(
            self.is_active() && self.config.remap_key,
            cursor,
            live_input_start,
        )
    }

    /// The decoration hook for this session's indicator.
    pub fn decorator(&self, scheme: &HighlightScheme) -> IndicatorDecorator {
        IndicatorDecorator::new(self.config.indicator.as_deref(), scheme)
    }

    fn build(&self, host_default: Option<&str>) -> Result<FoldSpec> {
        self.config
            .build_spec(&self.mode, host_default)
            .inspect_err(|err| {
                tracing::warn!(mode = %self.mode, error = %err, "prompt folding unavailable");
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FoldError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_defaults() {
        let config = FoldConfig::default();
        assert_eq!(config.prompt_pattern, None);
        assert_eq!(config.blank_lines, 0);
        assert_eq!(config.indicator.as_deref(), Some("angle-bracket"));
        assert!(config.remap_key);
    }

    #[test]
    fn test_setup_uses_host_default() {
        let mut registry = FoldRegistry::new();
        let mut session = FoldSession::new("shell", FoldConfig::new());

        let spec = session.setup(&mut registry, Some("^\\$ ")).unwrap();
        assert_eq!(spec.start.as_str(), "^\\$ ");
        assert_eq!(spec.end.as_str(), r"\n{1}(?:^\$ )");
        assert!(session.is_active());
        assert!(registry.contains("shell"));
    }

    #[test]
    fn test_override_beats_host_default() {
        let mut registry = FoldRegistry::new();
        let config = FoldConfig::new()
            .with_prompt_pattern("^>>> ")
            .with_blank_lines(2)
            .with_comment_lead("# ");
        let mut session = FoldSession::new("python", config);

        let spec = session.setup(&mut registry, Some("^> ")).unwrap();
        assert_eq!(spec.start.as_str(), "^>>> ");
        assert_eq!(spec.end.line_breaks(), 3);
        assert_eq!(spec.comment_lead, "# ");
    }

    #[test]
    fn test_setup_without_pattern_stays_inactive() {
        let mut registry = FoldRegistry::new();
        let mut session = FoldSession::new("inferior-lisp", FoldConfig::new());

        let err = session.setup(&mut registry, None).unwrap_err();
        assert_eq!(
            err,
            FoldError::MissingPromptPattern {
                mode: "inferior-lisp".to_string()
            }
        );
        assert!(!session.is_active());
        assert!(registry.is_empty());
        assert_eq!(session.key_action(0, 10), KeyAction::Passthrough);
    }

    #[test]
    fn test_setup_and_teardown_are_idempotent() {
        let mut registry = FoldRegistry::new();
        let mut session = FoldSession::new("shell", FoldConfig::new());

        session.setup(&mut registry, Some("^> ")).unwrap();
        session.setup(&mut registry, Some("^> ")).unwrap();
        assert_eq!(registry.len(), 1);

        session.teardown(&mut registry);
        assert!(!session.is_active());
        assert!(registry.is_empty());

        session.teardown(&mut registry);
        assert!(registry.is_empty());

        session.setup(&mut registry, Some("^> ")).unwrap();
        assert!(registry.contains("shell"));
    }

    #[test]
    fn test_two_buffers_share_a_mode() {
        let mut registry = FoldRegistry::new();
        let mut first = FoldSession::new("shell", FoldConfig::new());
        let mut second = FoldSession::new("shell", FoldConfig::new());

        first.setup(&mut registry, Some("^> ")).unwrap();
        second.setup(&mut registry, Some("^> ")).unwrap();

        first.teardown(&mut registry);
        assert!(registry.contains("shell"));
        second.teardown(&mut registry);
        assert!(!registry.contains("shell"));
    }

    #[test]
    fn test_teardown_leaves_other_sessions_spec() {
        let mut registry = FoldRegistry::new();
        let mut tight = FoldSession::new("shell", FoldConfig::new());
        let mut loose = FoldSession::new("shell", FoldConfig::new().with_blank_lines(2));

        tight.setup(&mut registry, Some("^> ")).unwrap();
        loose.setup(&mut registry, Some("^> ")).unwrap();
        assert_eq!(registry.require("shell").unwrap().end.line_breaks(), 3);

        loose.teardown(&mut registry);
        let remaining = registry.require("shell").unwrap();
        assert_eq!(remaining.end, tight.spec().unwrap().end);
        assert_eq!(remaining.end.line_breaks(), 1);
    }

    #[test]
    fn test_reconfigure_only_touches_own_registration() {
        let mut registry = FoldRegistry::new();
        let mut first = FoldSession::new("shell", FoldConfig::new());
        let mut second = FoldSession::new("shell", FoldConfig::new());
        first.setup(&mut registry, Some("^> ")).unwrap();
        second.setup(&mut registry, Some("^> ")).unwrap();

        first
            .reconfigure(FoldConfig::new().with_blank_lines(1), &mut registry, Some("^> "))
            .unwrap();

        let first_id = first.registration().unwrap();
        assert_eq!(registry.registration(first_id).unwrap().end.line_breaks(), 2);
        assert_eq!(registry.require("shell").unwrap().end.line_breaks(), 1);

        second.teardown(&mut registry);
        assert_eq!(registry.require("shell").unwrap().end.line_breaks(), 2);

        first.teardown(&mut registry);
        assert!(registry.is_empty());
        assert_eq!(first.registration(), None);
    }

    #[test]
    fn test_reconfigure_recompiles_end_pattern() {
        let mut registry = FoldRegistry::new();
        let mut session = FoldSession::new("shell", FoldConfig::new());
        session.setup(&mut registry, Some("^> ")).unwrap();

        session
            .reconfigure(FoldConfig::new().with_blank_lines(1), &mut registry, Some("^> "))
            .unwrap();

        assert_eq!(session.spec().unwrap().end.line_breaks(), 2);
        assert_eq!(registry.require("shell").unwrap().end.line_breaks(), 2);
        assert_eq!(registry.len(), 1);

        session.teardown(&mut registry);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_reconfigure_keeps_previous_spec() {
        let mut registry = FoldRegistry::new();
        let mut session = FoldSession::new("shell", FoldConfig::new());
        session.setup(&mut registry, Some("^> ")).unwrap();

        let bad = FoldConfig::new().with_prompt_pattern("^[");
        let err = session.reconfigure(bad, &mut registry, Some("^> ")).unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(session.config(), &FoldConfig::new());
        assert_eq!(session.prompt().unwrap().as_str(), "^> ");
        assert_eq!(registry.require("shell").unwrap().start.as_str(), "^> ");
    }

    #[test]
    fn test_reconfigure_inactive_session() {
        let mut registry = FoldRegistry::new();
        let mut session = FoldSession::new("shell", FoldConfig::new());

        session
            .reconfigure(FoldConfig::new().with_blank_lines(3), &mut registry, None)
            .unwrap();
        assert_eq!(session.config().blank_lines, 3);
        assert!(!session.is_active());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_key_action_respects_remap_setting() {
        let mut registry = FoldRegistry::new();
        let mut session = FoldSession::new("shell", FoldConfig::new());
        session.setup(&mut registry, Some("^> ")).unwrap();

        assert_eq!(session.key_action(3, 10), KeyAction::ToggleFold);
        assert_eq!(session.key_action(12, 10), KeyAction::Passthrough);

        let mut plain = FoldSession::new("shell", FoldConfig::new().with_remap_key(false));
        plain.setup(&mut registry, Some("^> ")).unwrap();
        assert_eq!(plain.key_action(3, 10), KeyAction::Passthrough);
    }
}
