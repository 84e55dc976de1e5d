use crate::{CompletionInput, CompletionResponse, ModelResult};

/// A text-completion capability.
///
/// Implementations are injected into each pipeline stage at construction
/// (`Arc<dyn CompletionModel>`); there is no process-wide shared client.
#[async_trait::async_trait]
pub trait CompletionModel: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model_id(&self) -> String;
    /// Perform a single completion call with a fully-rendered prompt.
    async fn complete(&self, input: CompletionInput) -> ModelResult<CompletionResponse>;
}
