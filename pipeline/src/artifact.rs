use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An immutable value produced by exactly one stage.
///
/// The pipeline does not interpret the payload; structured artifacts are
/// neutral JSON validated by the stage that produced them, markdown artifacts
/// are plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// A record already validated against its producer's schema.
    Structured(Value),
    /// Markdown text.
    Markdown(String),
}

impl Artifact {
    #[must_use]
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Markdown(_) => None,
        }
    }

    #[must_use]
    pub fn as_markdown(&self) -> Option<&str> {
        match self {
            Self::Markdown(text) => Some(text),
            Self::Structured(_) => None,
        }
    }
}

/// Timestamps are both envelope metadata and filename suffixes, so the format
/// must sort lexicographically and stay unique across quick successive writes
/// (hence the millisecond component).
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Metadata recorded alongside every persisted artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    pub timestamp: String,
    pub invocation_id: String,
    pub agent_name: String,
    pub output_key: String,
}

impl Envelope {
    /// An envelope stamped with the current local time.
    #[must_use]
    pub fn new(invocation_id: &str, agent_name: &str, output_key: &str) -> Self {
        Self::with_timestamp(
            &Local::now().format(TIMESTAMP_FORMAT).to_string(),
            invocation_id,
            agent_name,
            output_key,
        )
    }

    /// An envelope with an explicit timestamp, for deterministic callers.
    #[must_use]
    pub fn with_timestamp(
        timestamp: &str,
        invocation_id: &str,
        agent_name: &str,
        output_key: &str,
    ) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            invocation_id: invocation_id.to_string(),
            agent_name: agent_name.to_string(),
            output_key: output_key.to_string(),
        }
    }
}
