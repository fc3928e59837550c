//! Registration of fold specs with a fold engine, keyed by transcript mode.

use std::collections::HashMap;

use crate::error::{FoldError, Result};
use crate::folding::{
    Block, EligibilityHook, EndPattern, FoldingDetector, MotionHook, PromptPattern,
    eligibility_hook, motion_hook,
};
use crate::host::PromptHost;

/// Comment lead handed to the fold engine when a mode defines none.
pub const DEFAULT_COMMENT_LEAD: &str = "#";

/// Everything a fold engine needs to fold one transcript mode.
#[derive(Debug, Clone)]
pub struct FoldSpec {
    /// Mode the spec is registered under.
    pub mode: String,
    /// Pattern marking the start of a block.
    pub start: PromptPattern,
    /// Pattern marking where a block's hidden region ends.
    pub end: EndPattern,
    /// Fallback comment lead for the engine.
    pub comment_lead: String,
    /// Finds the end of a block.
    pub forward: MotionHook,
    /// Rejects the live block.
    pub eligible: EligibilityHook,
}

impl FoldSpec {
    /// Create a spec with the default hooks and comment lead.
    pub fn new(mode: impl Into<String>, start: PromptPattern, end: EndPattern) -> Self {
        Self {
            mode: mode.into(),
            start,
            end,
            comment_lead: DEFAULT_COMMENT_LEAD.to_string(),
            forward: motion_hook,
            eligible: eligibility_hook,
        }
    }

    /// Set the comment lead.
    pub fn with_comment_lead(mut self, lead: impl Into<String>) -> Self {
        self.comment_lead = lead.into();
        self
    }

    /// Run the eligibility hook.
    pub fn is_foldable(&self, host: &dyn PromptHost, offset: usize) -> bool {
        (self.eligible)(host, offset)
    }

    /// Run the motion hook.
    pub fn forward(&self, host: &dyn PromptHost, offset: usize, n: usize) -> Option<usize> {
        (self.forward)(host, offset, n)
    }

    /// A detector wired to this spec's end pattern and hooks.
    pub fn detector(&self) -> FoldingDetector {
        FoldingDetector::new(self.end.clone()).with_hooks(self.eligible, self.forward)
    }

    /// Every block of the transcript under this spec.
    pub fn blocks(&self, host: &dyn PromptHost) -> Vec<Block> {
        self.detector().detect(host)
    }
}

/// Handle for one registration, returned by [`FoldRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

#[derive(Debug, Clone)]
struct Registration {
    id: RegistrationId,
    spec: FoldSpec,
}

/// Fold specs by mode.
///
/// Each buffer registers its own spec and gets a [`RegistrationId`] back.
/// Several buffers may share a mode; the most recent registration is the one
/// in effect, and removing it puts the previous one back.
#[derive(Debug, Default)]
pub struct FoldRegistry {
    entries: HashMap<String, Vec<Registration>>,
    next_id: u64,
}

impl FoldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec for its mode. It takes effect over earlier registrations.
    pub fn register(&mut self, spec: FoldSpec) -> RegistrationId {
        let id = RegistrationId(self.next_id);
        self.next_id += 1;

        tracing::debug!(mode = %spec.mode, end = %spec.end, "registered fold spec");
        self.entries
            .entry(spec.mode.clone())
            .or_default()
            .push(Registration { id, spec });
        id
    }

    /// Swap the spec behind `id`, keeping its place among the mode's registrations.
    ///
    /// Returns false when `id` is not registered.
    pub fn replace(&mut self, id: RegistrationId, spec: FoldSpec) -> bool {
        match self.find_mut(id) {
            Some(entry) if entry.spec.mode == spec.mode => {
                entry.spec = spec;
                true
            }
            Some(entry) => {
                tracing::warn!(old = %entry.spec.mode, new = %spec.mode, "registration cannot change mode");
                false
            }
            None => false,
        }
    }

    /// Remove the registration `id` and return its spec.
    ///
    /// The mode falls back to its previous registration, or is dropped when
    /// none remain. Unknown ids are ignored.
    pub fn unregister(&mut self, id: RegistrationId) -> Option<FoldSpec> {
        let (mode, index) = self.entries.iter().find_map(|(mode, registrations)| {
            registrations
                .iter()
                .position(|r| r.id == id)
                .map(|index| (mode.clone(), index))
        })?;

        let registrations = self.entries.get_mut(&mode)?;
        let removed = registrations.remove(index);
        if registrations.is_empty() {
            self.entries.remove(&mode);
            tracing::debug!(mode = %mode, "unregistered fold spec");
        }
        Some(removed.spec)
    }

    /// The spec in effect for `mode`.
    pub fn get(&self, mode: &str) -> Option<&FoldSpec> {
        self.entries
            .get(mode)
            .and_then(|registrations| registrations.last())
            .map(|r| &r.spec)
    }

    /// Like [`get`](Self::get), but an unknown mode is an error.
    pub fn require(&self, mode: &str) -> Result<&FoldSpec> {
        self.get(mode)
            .ok_or_else(|| FoldError::UnknownMode(mode.to_string()))
    }

    /// The spec registered under `id`, whether or not it is the one in effect.
    pub fn registration(&self, id: RegistrationId) -> Option<&FoldSpec> {
        self.entries
            .values()
            .flatten()
            .find(|r| r.id == id)
            .map(|r| &r.spec)
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.entries.contains_key(mode)
    }

    /// Registered modes, sorted.
    pub fn modes(&self) -> Vec<&str> {
        let mut modes: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        modes.sort_unstable();
        modes
    }

    /// Number of modes with at least one registration.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find_mut(&mut self, id: RegistrationId) -> Option<&mut Registration> {
        self.entries.values_mut().flatten().find(|r| r.id == id)
    }
}
