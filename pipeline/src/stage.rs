use crate::{
    artifact::Artifact,
    errors::StageError,
    instruction::InstructionSource,
    state::SharedState,
    store::ArtifactStore,
};
use blogflow_sdk::{
    CompletionInput, CompletionModel, ResponseFormatJson, ResponseFormatOption, RetryPolicy,
    SearchProvider,
};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::{marker::PhantomData, sync::Arc};
use tracing::warn;

/// The read-only view a stage executes against.
pub struct StageContext<'a> {
    pub state: &'a SharedState,
    pub store: &'a ArtifactStore,
}

/// A named unit of work: reads zero or more keys of shared state, performs one
/// capability call, produces exactly one artifact under one output key.
///
/// Output keys are mandatory at construction; there is no auto-detection of
/// "the" relevant state key.
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;
    fn output_key(&self) -> &str;
    /// Whether the pipeline writes this stage's artifact to the artifact
    /// store on completion.
    fn persisted(&self) -> bool {
        false
    }
    async fn execute(&self, ctx: &StageContext<'_>) -> Result<Artifact, StageError>;
}

/// Bounds checks applied to a structured reply after schema decoding.
pub trait Validate {
    /// Reject values that decoded but violate a documented bound.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A stage that produces a markdown artifact from one completion call.
pub struct CompletionStage {
    name: String,
    output_key: String,
    model: Arc<dyn CompletionModel>,
    instruction: InstructionSource,
    retry: RetryPolicy,
    temperature: Option<f64>,
    persist: bool,
}

impl CompletionStage {
    pub fn new(
        name: &str,
        output_key: &str,
        model: Arc<dyn CompletionModel>,
        instruction: impl Into<InstructionSource>,
    ) -> Self {
        Self {
            name: name.to_string(),
            output_key: output_key.to_string(),
            model,
            instruction: instruction.into(),
            retry: RetryPolicy::default(),
            temperature: None,
            persist: false,
        }
    }

    /// Persist the artifact to the store when the stage completes.
    #[must_use]
    pub fn persisted_to_store(mut self) -> Self {
        self.persist = true;
        self
    }

    /// Replace the default retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait::async_trait]
impl Stage for CompletionStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_key(&self) -> &str {
        &self.output_key
    }

    fn persisted(&self) -> bool {
        self.persist
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> Result<Artifact, StageError> {
        let input = CompletionInput {
            prompt: self.instruction.render(ctx),
            response_format: Some(ResponseFormatOption::Text),
            temperature: self.temperature,
            ..Default::default()
        };
        let response = self.retry.run(|| self.model.complete(input.clone())).await?;
        Ok(Artifact::Markdown(response.text))
    }
}

/// A stage that produces a schema-validated structured artifact.
///
/// The completion call carries the JSON schema of `T`; the reply is decoded
/// into `T` and bounds-checked. Any mismatch is fatal to the stage.
pub struct StructuredStage<T> {
    name: String,
    output_key: String,
    model: Arc<dyn CompletionModel>,
    instruction: InstructionSource,
    retry: RetryPolicy,
    temperature: Option<f64>,
    persist: bool,
    schema_name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StructuredStage<T>
where
    T: DeserializeOwned + Serialize + JsonSchema + Validate + Send + Sync + 'static,
{
    pub fn new(
        name: &str,
        output_key: &str,
        model: Arc<dyn CompletionModel>,
        instruction: impl Into<InstructionSource>,
    ) -> Self {
        let schema_name = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("Output")
            .to_string();
        Self {
            name: name.to_string(),
            output_key: output_key.to_string(),
            model,
            instruction: instruction.into(),
            retry: RetryPolicy::default(),
            temperature: None,
            persist: false,
            schema_name,
            _marker: PhantomData,
        }
    }

    /// Persist the artifact to the store when the stage completes.
    #[must_use]
    pub fn persisted_to_store(mut self) -> Self {
        self.persist = true;
        self
    }

    /// Replace the default retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn schema_error(&self, message: String) -> StageError {
        StageError::Schema {
            output_key: self.output_key.clone(),
            message,
        }
    }
}

#[async_trait::async_trait]
impl<T> Stage for StructuredStage<T>
where
    T: DeserializeOwned + Serialize + JsonSchema + Validate + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn output_key(&self) -> &str {
        &self.output_key
    }

    fn persisted(&self) -> bool {
        self.persist
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> Result<Artifact, StageError> {
        let schema = serde_json::to_value(schemars::schema_for!(T))
            .map_err(|e| StageError::Invariant(format!("schema generation failed: {e}")))?;
        let input = CompletionInput {
            prompt: self.instruction.render(ctx),
            response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
                name: self.schema_name.clone(),
                description: None,
                schema: Some(schema),
            })),
            temperature: self.temperature,
            ..Default::default()
        };

        let response = self.retry.run(|| self.model.complete(input.clone())).await?;

        let record: T = serde_json::from_str(strip_code_fences(&response.text))
            .map_err(|e| self.schema_error(format!("reply does not match schema: {e}")))?;
        record
            .validate()
            .map_err(|message| self.schema_error(message))?;

        let value = serde_json::to_value(&record)
            .map_err(|e| StageError::Invariant(format!("re-serialization failed: {e}")))?;
        Ok(Artifact::Structured(value))
    }
}

/// A stage that executes one search per planned query and collects the raw
/// hits, tagged with the index of the task that produced them.
///
/// When the upstream plan is absent the stage still completes, producing an
/// artifact that carries an explicit missing-input note instead of hits.
pub struct SearchStage {
    name: String,
    output_key: String,
    provider: Arc<dyn SearchProvider>,
    queries: Arc<dyn for<'a> Fn(&StageContext<'a>) -> Vec<String> + Send + Sync>,
    retry: RetryPolicy,
}

impl SearchStage {
    pub fn new<F>(
        name: &str,
        output_key: &str,
        provider: Arc<dyn SearchProvider>,
        queries: F,
    ) -> Self
    where
        F: for<'a> Fn(&StageContext<'a>) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            output_key: output_key.to_string(),
            provider,
            queries: Arc::new(queries),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the default retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait::async_trait]
impl Stage for SearchStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_key(&self) -> &str {
        &self.output_key
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> Result<Artifact, StageError> {
        let queries = (self.queries)(ctx);
        if queries.is_empty() {
            warn!(stage = %self.name, "no search queries available, emitting missing-input note");
            return Ok(Artifact::Structured(json!({
                "note": "[no search queries available: upstream plan missing or empty]",
                "batches": [],
            })));
        }

        let mut batches = Vec::with_capacity(queries.len());
        for (task_id, query) in queries.iter().enumerate() {
            let hits = self.retry.run(|| self.provider.search(query)).await?;
            batches.push(json!({
                "task_id": task_id,
                "query": query,
                "results": hits,
            }));
        }
        Ok(Artifact::Structured(json!({ "batches": batches })))
    }
}

/// Trim a Markdown code fence around a JSON document, which some models emit
/// even when asked for raw JSON.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::strip_code_fences;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fences("```\n[]\n```"), "[]");
    }

    #[test]
    fn leaves_raw_json_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
