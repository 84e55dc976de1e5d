use crate::artifact::Artifact;
use serde_json::Value;
use std::collections::HashMap;

/// Process-scoped keyed store of artifacts, written by each stage and read by
/// later stages.
///
/// Writes use overwrite semantics. The pipeline enforces ordering, so within
/// one run every write happens strictly before any dependent read; parallel
/// groups operate on a cloned snapshot and their writes are merged back at the
/// barrier.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    entries: HashMap<String, Artifact>,
}

impl SharedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an artifact under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, artifact: Artifact) {
        self.entries.insert(key.into(), artifact);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Artifact> {
        self.entries.get(key)
    }

    /// The structured payload under `key`, if present and structured.
    #[must_use]
    pub fn structured(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(Artifact::as_structured)
    }

    /// The markdown text under `key`, if present and markdown.
    #[must_use]
    pub fn markdown(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Artifact::as_markdown)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
