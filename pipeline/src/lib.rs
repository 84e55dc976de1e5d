mod artifact;
mod config;
mod errors;
pub mod gap;
pub mod hunter;
mod instruction;
mod pipeline;
mod stage;
mod state;
mod store;
pub mod writer;

pub use artifact::{Artifact, Envelope};
pub use config::Config;
pub use errors::{PipelineError, StageError, StoreError};
pub use instruction::InstructionSource;
pub use pipeline::{ParallelGroup, Pipeline, PipelineBuilder, PipelineNode, RunReport};
pub use stage::{CompletionStage, SearchStage, Stage, StageContext, StructuredStage, Validate};
pub use state::SharedState;
pub use store::{ArtifactStore, DEFAULT_OUTPUT_DIR};
