use crate::{
    artifact::{Artifact, Envelope},
    errors::StoreError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Default flat output directory shared by every pipeline.
pub const DEFAULT_OUTPUT_DIR: &str = "data/collections";

/// On-disk representation of one structured artifact: the envelope flattened
/// next to the payload under `output`.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStructured {
    #[serde(flatten)]
    envelope: Envelope,
    output: Value,
}

/// File-backed artifact persistence.
///
/// Filenames double as the lookup key between independently-invoked pipeline
/// runs: a stage that needs another run's output reads it by conventional
/// filename rather than through shared state. Structured artifacts get a
/// timestamp suffix (every persist creates a new file); markdown artifacts
/// keep a fixed name and are overwritten, because downstream stages load them
/// by exact filename.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if needed) the store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open the default `data/collections` store.
    pub fn open_default() -> io::Result<Self> {
        Self::new(DEFAULT_OUTPUT_DIR)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a structured artifact as `{output_key}_{timestamp}.json`.
    pub fn persist_structured(
        &self,
        envelope: &Envelope,
        output: &Value,
    ) -> Result<PathBuf, StoreError> {
        let filename = format!("{}_{}.json", envelope.output_key, envelope.timestamp);
        let path = self.root.join(filename);
        let document = PersistedStructured {
            envelope: envelope.clone(),
            output: output.clone(),
        };
        fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        debug!(path = %path.display(), key = %envelope.output_key, "persisted structured artifact");
        Ok(path)
    }

    /// Write a markdown artifact as `{output_key}.md`, prefixed with a
    /// frontmatter header carrying the envelope.
    pub fn persist_markdown(&self, envelope: &Envelope, body: &str) -> Result<PathBuf, StoreError> {
        let filename = format!("{}.md", envelope.output_key);
        let path = self.root.join(filename);
        let content = format!("{}{body}", render_frontmatter(envelope));
        fs::write(&path, content)?;
        debug!(path = %path.display(), key = %envelope.output_key, "persisted markdown artifact");
        Ok(path)
    }

    /// Persist an artifact in the representation matching its kind.
    pub fn persist(&self, envelope: &Envelope, artifact: &Artifact) -> Result<PathBuf, StoreError> {
        match artifact {
            Artifact::Structured(value) => self.persist_structured(envelope, value),
            Artifact::Markdown(text) => self.persist_markdown(envelope, text),
        }
    }

    /// Load the payload of a structured artifact by exact filename.
    ///
    /// `None` means "upstream stage not yet run": the file is absent or could
    /// not be parsed. Callers degrade, they never fail on this.
    #[must_use]
    pub fn load_structured(&self, filename: &str) -> Option<Value> {
        let path = self.root.join(filename);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) => {
                debug!(path = %path.display(), %error, "structured artifact not available");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            // Unwrap the envelope; tolerate bare payloads written by hand.
            Ok(value) => Some(value.get("output").cloned().unwrap_or(value)),
            Err(error) => {
                warn!(path = %path.display(), %error, "structured artifact is not valid JSON");
                None
            }
        }
    }

    /// Load the newest persisted payload for `output_key`.
    ///
    /// Timestamped filenames sort lexicographically, so the maximum matching
    /// name is the most recent write.
    #[must_use]
    pub fn load_latest_structured(&self, output_key: &str) -> Option<Value> {
        let prefix = format!("{output_key}_");
        let exact = format!("{output_key}.json");
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) => {
                debug!(root = %self.root.display(), %error, "output directory not readable");
                return None;
            }
        };
        let latest = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                name == &exact || (name.starts_with(&prefix) && name.ends_with(".json"))
            })
            .max()?;
        self.load_structured(&latest)
    }

    /// Load a markdown artifact by exact filename, stripping any frontmatter
    /// header. `None` means the upstream stage has not run.
    #[must_use]
    pub fn load_markdown(&self, filename: &str) -> Option<String> {
        let path = self.root.join(filename);
        match fs::read_to_string(&path) {
            Ok(content) => Some(strip_frontmatter(&content).trim().to_string()),
            Err(error) => {
                debug!(path = %path.display(), %error, "markdown artifact not available");
                None
            }
        }
    }

    /// Markdown body of `filename`, or the explicit missing-input note.
    #[must_use]
    pub fn markdown_or_note(&self, filename: &str, producer: &str) -> String {
        self.load_markdown(filename)
            .unwrap_or_else(|| Self::missing_note(filename, producer))
    }

    /// Newest structured payload for `output_key` rendered as pretty JSON, or
    /// the explicit missing-input note.
    #[must_use]
    pub fn structured_or_note(&self, output_key: &str, producer: &str) -> String {
        self.load_latest_structured(output_key)
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or_else(|| Self::missing_note(output_key, producer))
    }

    /// The placeholder substituted for an absent upstream artifact. It must be
    /// unambiguous to any consumer or human reviewer, so it names both the
    /// missing artifact and the stage that produces it.
    #[must_use]
    pub fn missing_note(filename: &str, producer: &str) -> String {
        format!("[{filename} not found. Run the {producer} stage first.]")
    }
}

fn render_frontmatter(envelope: &Envelope) -> String {
    format!(
        "---\ntimestamp: {}\ninvocation_id: {}\nagent_name: {}\noutput_key: {}\n---\n\n",
        envelope.timestamp, envelope.invocation_id, envelope.agent_name, envelope.output_key
    )
}

/// Remove a leading `---` ... `---` frontmatter block, if present.
fn strip_frontmatter(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("---") else {
        return content;
    };
    match rest.find("\n---") {
        Some(end) => {
            let after = &rest[end + "\n---".len()..];
            after.trim_start_matches(['\r', '\n'])
        }
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::strip_frontmatter;

    #[test]
    fn strips_leading_frontmatter_only() {
        let content = "---\ntimestamp: t\n---\n\n# Title\n\n---\nnot frontmatter\n";
        let body = strip_frontmatter(content);
        assert!(body.starts_with("# Title"));
        assert!(body.contains("not frontmatter"));
    }

    #[test]
    fn leaves_plain_markdown_untouched() {
        let content = "# Title\n\nBody.";
        assert_eq!(strip_frontmatter(content), content);
    }

    #[test]
    fn unterminated_block_is_left_as_is() {
        let content = "---\nno closing marker";
        assert_eq!(strip_frontmatter(content), content);
    }
}
