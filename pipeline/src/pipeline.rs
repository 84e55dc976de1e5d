use crate::{
    artifact::{Artifact, Envelope},
    errors::PipelineError,
    stage::{Stage, StageContext},
    state::SharedState,
    store::ArtifactStore,
};
use futures::future::{join_all, BoxFuture};
use std::{collections::HashSet, sync::Arc};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// A node in the pipeline graph. Composition is recursive: a nested sequential
/// pipeline or a parallel group is usable wherever a single stage is.
pub enum PipelineNode {
    Stage(Arc<dyn Stage>),
    Sequential(Pipeline),
    Parallel(ParallelGroup),
}

impl From<Pipeline> for PipelineNode {
    fn from(pipeline: Pipeline) -> Self {
        Self::Sequential(pipeline)
    }
}

impl From<ParallelGroup> for PipelineNode {
    fn from(group: ParallelGroup) -> Self {
        Self::Parallel(group)
    }
}

impl From<Arc<dyn Stage>> for PipelineNode {
    fn from(stage: Arc<dyn Stage>) -> Self {
        Self::Stage(stage)
    }
}

/// A named group of branches that become runnable together and complete as a
/// barrier: the pipeline does not proceed past the group until every branch
/// has finished. Branches read a snapshot of state taken when the group
/// starts, so they cannot observe each other's writes.
pub struct ParallelGroup {
    name: String,
    branches: Vec<PipelineNode>,
}

impl ParallelGroup {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            branches: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a branch.
    #[must_use]
    pub fn branch(mut self, node: impl Into<PipelineNode>) -> Self {
        self.branches.push(node.into());
        self
    }

    /// Add a single stage as a branch.
    #[must_use]
    pub fn stage(self, stage: impl Stage + 'static) -> Self {
        self.branch(PipelineNode::Stage(Arc::new(stage)))
    }
}

/// Report of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub invocation_id: String,
    /// Stage names in completion order.
    pub completed: Vec<String>,
}

/// One stage's pending contribution: collected during node execution, applied
/// to shared state (and optionally the store) once the node finishes.
struct StageWrite {
    stage_name: String,
    output_key: String,
    artifact: Artifact,
    persist: bool,
}

/// A directed composition of stages: sequential nodes run strictly in
/// declared order, parallel groups run concurrently behind a barrier.
pub struct Pipeline {
    name: String,
    nodes: Vec<PipelineNode>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl Pipeline {
    #[must_use]
    pub fn builder(name: &str) -> PipelineBuilder {
        PipelineBuilder {
            name: name.to_string(),
            nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every output key declared anywhere in this pipeline's tree.
    #[must_use]
    pub fn output_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for node in &self.nodes {
            collect_keys(node, &mut keys);
        }
        keys
    }

    /// Run the pipeline to completion, mutating `state` as stages finish and
    /// persisting opted-in artifacts to `store`.
    ///
    /// A stage failure halts the run before any later sequential stage;
    /// parallel siblings that already succeeded keep their writes. Persistence
    /// failures are logged and never abort the run.
    pub async fn run(
        &self,
        state: &mut SharedState,
        store: &ArtifactStore,
    ) -> Result<RunReport, PipelineError> {
        let invocation_id = Uuid::new_v4().to_string();
        let span = info_span!("pipeline.run", pipeline = %self.name, %invocation_id);

        async {
            let mut completed = Vec::new();
            for node in &self.nodes {
                let (writes, failure) = run_node(node, state.clone(), store).await;
                for write in writes {
                    apply_write(write, state, store, &invocation_id, &mut completed);
                }
                if let Some(error) = failure {
                    warn!(error = %error, "pipeline halted");
                    return Err(error);
                }
            }
            info!(stages = completed.len(), "pipeline completed");
            Ok(RunReport {
                invocation_id,
                completed,
            })
        }
        .instrument(span)
        .await
    }
}

fn apply_write(
    write: StageWrite,
    state: &mut SharedState,
    store: &ArtifactStore,
    invocation_id: &str,
    completed: &mut Vec<String>,
) {
    info!(stage = %write.stage_name, key = %write.output_key, "stage completed");
    if write.persist {
        let envelope = Envelope::new(invocation_id, &write.stage_name, &write.output_key);
        if let Err(error) = store.persist(&envelope, &write.artifact) {
            // The artifact stays available in shared state; keep going.
            warn!(stage = %write.stage_name, %error, "failed to persist artifact");
        }
    }
    state.set(write.output_key, write.artifact);
    completed.push(write.stage_name);
}

/// Execute one node against a snapshot of state, returning the writes it
/// produced and the first failure, if any.
///
/// Sequential children see each other's writes through a locally evolving
/// copy; parallel branches each get their own snapshot and their writes only
/// become visible to later nodes after the barrier.
fn run_node<'a>(
    node: &'a PipelineNode,
    mut state: SharedState,
    store: &'a ArtifactStore,
) -> BoxFuture<'a, (Vec<StageWrite>, Option<PipelineError>)> {
    Box::pin(async move {
        match node {
            PipelineNode::Stage(stage) => {
                let span = info_span!("stage.execute", stage = %stage.name());
                let ctx = StageContext {
                    state: &state,
                    store,
                };
                match stage.execute(&ctx).instrument(span).await {
                    Ok(artifact) => (
                        vec![StageWrite {
                            stage_name: stage.name().to_string(),
                            output_key: stage.output_key().to_string(),
                            artifact,
                            persist: stage.persisted(),
                        }],
                        None,
                    ),
                    Err(source) => (
                        vec![],
                        Some(PipelineError::Stage {
                            stage: stage.name().to_string(),
                            source,
                        }),
                    ),
                }
            }
            PipelineNode::Sequential(pipeline) => {
                let mut all_writes = Vec::new();
                for child in &pipeline.nodes {
                    let (writes, failure) = run_node(child, state.clone(), store).await;
                    for write in writes {
                        state.set(write.output_key.clone(), write.artifact.clone());
                        all_writes.push(write);
                    }
                    if failure.is_some() {
                        return (all_writes, failure);
                    }
                }
                (all_writes, None)
            }
            PipelineNode::Parallel(group) => {
                let span = info_span!("parallel.group", group = %group.name);
                let results = join_all(
                    group
                        .branches
                        .iter()
                        .map(|branch| run_node(branch, state.clone(), store)),
                )
                .instrument(span)
                .await;

                // The barrier: every branch has finished by now. Keep the
                // writes of branches that succeeded even when a sibling
                // failed; surface the first failure.
                let mut all_writes = Vec::new();
                let mut first_failure = None;
                for (writes, failure) in results {
                    all_writes.extend(writes);
                    if first_failure.is_none() {
                        first_failure = failure;
                    }
                }
                (all_writes, first_failure)
            }
        }
    })
}

fn collect_keys(node: &PipelineNode, keys: &mut Vec<String>) {
    match node {
        PipelineNode::Stage(stage) => keys.push(stage.output_key().to_string()),
        PipelineNode::Sequential(pipeline) => {
            for child in &pipeline.nodes {
                collect_keys(child, keys);
            }
        }
        PipelineNode::Parallel(group) => {
            for branch in &group.branches {
                collect_keys(branch, keys);
            }
        }
    }
}

pub struct PipelineBuilder {
    name: String,
    nodes: Vec<PipelineNode>,
}

impl PipelineBuilder {
    /// Append a sequential stage.
    #[must_use]
    pub fn stage(self, stage: impl Stage + 'static) -> Self {
        self.node(PipelineNode::Stage(Arc::new(stage)))
    }

    /// Append a parallel group.
    #[must_use]
    pub fn parallel(self, group: ParallelGroup) -> Self {
        self.node(PipelineNode::Parallel(group))
    }

    /// Append a nested sequential pipeline.
    #[must_use]
    pub fn pipeline(self, pipeline: Pipeline) -> Self {
        self.node(PipelineNode::Sequential(pipeline))
    }

    /// Append any node.
    #[must_use]
    pub fn node(mut self, node: impl Into<PipelineNode>) -> Self {
        self.nodes.push(node.into());
        self
    }

    /// Validate the composition. No two stages anywhere in the tree may
    /// declare the same output key: shared state is mutated only by the owner
    /// of a key, and catching a clash here beats a race at run time.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        if self.nodes.is_empty() {
            return Err(PipelineError::Empty(self.name));
        }
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for node in &self.nodes {
            collect_keys(node, &mut keys);
        }
        for key in keys {
            if !seen.insert(key.clone()) {
                return Err(PipelineError::DuplicateOutputKey(key));
            }
        }
        Ok(Pipeline {
            name: self.name,
            nodes: self.nodes,
        })
    }
}
