use blogflow_sdk::{ModelError, SearchError};
use thiserror::Error;

/// Errors that are fatal to a single stage.
///
/// A missing upstream artifact is deliberately not represented here: stages
/// degrade to an explicit placeholder and keep running (see
/// [`crate::ArtifactStore::missing_note`]).
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Completion model error: {0}")]
    Model(#[from] ModelError),
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
    /// A structured reply did not conform to the stage's declared schema.
    #[error("Schema validation failed for `{output_key}`: {message}")]
    Schema { output_key: String, message: String },
    #[error("Invariant: {0}")]
    Invariant(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Two stages in one pipeline declare the same output key. Caught at
    /// construction, before anything runs.
    #[error("Duplicate output key `{0}` in pipeline definition")]
    DuplicateOutputKey(String),
    #[error("Pipeline `{0}` has no stages")]
    Empty(String),
    /// A stage failed; the pipeline halted without running later stages.
    #[error("Stage `{stage}` failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: StageError,
    },
}

/// Artifact store I/O failures. Callers log and continue: a persistence
/// failure must never abort a run, the artifact is still in shared state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
