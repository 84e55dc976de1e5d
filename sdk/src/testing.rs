//! Mock capabilities for testing pipelines without network access.

use crate::{
    completion::CompletionModel,
    errors::{ModelError, ModelResult, SearchError, SearchResult},
    search::SearchProvider,
    types::{CompletionInput, CompletionResponse, SearchHit},
};
use std::{collections::VecDeque, sync::Mutex, time::Duration};

/// Result for a mocked `complete` call.
/// It can either be a full response or an error to return.
pub enum MockCompleteResult {
    Response(CompletionResponse),
    Error(ModelError),
}

impl MockCompleteResult {
    /// Construct a result that yields a plain-text reply.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Response(CompletionResponse {
            text: text.into(),
            usage: None,
        })
    }

    /// Construct a result that yields the provided error.
    #[must_use]
    pub fn error(error: ModelError) -> Self {
        Self::Error(error)
    }
}

impl From<CompletionResponse> for MockCompleteResult {
    fn from(response: CompletionResponse) -> Self {
        Self::Response(response)
    }
}

impl From<ModelError> for MockCompleteResult {
    fn from(error: ModelError) -> Self {
        Self::Error(error)
    }
}

#[derive(Default)]
struct MockCompletionState {
    mocked_results: VecDeque<MockCompleteResult>,
    tracked_inputs: Vec<CompletionInput>,
}

/// A mock completion model that tracks inputs and yields predefined outputs.
pub struct MockCompletionModel {
    model_id: String,
    latency: Option<Duration>,
    state: Mutex<MockCompletionState>,
}

impl Default for MockCompletionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionModel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            model_id: "mock-model".to_string(),
            latency: None,
            state: Mutex::new(MockCompletionState::default()),
        }
    }

    /// Add an artificial delay to every call, useful for exercising
    /// concurrency behavior such as parallel-group barriers.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    /// Queue the next result to return.
    pub fn enqueue(&self, result: impl Into<MockCompleteResult>) {
        self.state
            .lock()
            .unwrap()
            .mocked_results
            .push_back(result.into());
    }

    /// Queue a plain-text reply.
    pub fn enqueue_text(&self, text: impl Into<String>) {
        self.enqueue(MockCompleteResult::text(text));
    }

    /// Every input `complete` has been called with, in call order.
    #[must_use]
    pub fn tracked_inputs(&self) -> Vec<CompletionInput> {
        self.state.lock().unwrap().tracked_inputs.clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().tracked_inputs.len()
    }
}

#[async_trait::async_trait]
impl CompletionModel for MockCompletionModel {
    fn provider(&self) -> &'static str {
        "mock"
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn complete(&self, input: CompletionInput) -> ModelResult<CompletionResponse> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let result = {
            let mut state = self.state.lock().unwrap();
            state.tracked_inputs.push(input);
            state.mocked_results.pop_front()
        };
        match result {
            Some(MockCompleteResult::Response(response)) => Ok(response),
            Some(MockCompleteResult::Error(error)) => Err(error),
            None => Err(ModelError::Invariant(
                "mock",
                "no mocked result queued".to_string(),
            )),
        }
    }
}

#[derive(Default)]
struct MockSearchState {
    mocked_results: VecDeque<SearchResult<Vec<SearchHit>>>,
    tracked_queries: Vec<String>,
}

/// A mock search provider. When the queue is empty it returns no hits, which
/// is a valid (empty) search outcome.
#[derive(Default)]
pub struct MockSearchProvider {
    state: Mutex<MockSearchState>,
}

impl MockSearchProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the hits returned by the next call.
    pub fn enqueue_hits(&self, hits: Vec<SearchHit>) {
        self.state.lock().unwrap().mocked_results.push_back(Ok(hits));
    }

    /// Queue an error for the next call.
    pub fn enqueue_error(&self, error: SearchError) {
        self.state
            .lock()
            .unwrap()
            .mocked_results
            .push_back(Err(error));
    }

    /// Every query `search` has been called with, in call order.
    #[must_use]
    pub fn tracked_queries(&self) -> Vec<String> {
        self.state.lock().unwrap().tracked_queries.clone()
    }
}

#[async_trait::async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, query: &str) -> SearchResult<Vec<SearchHit>> {
        let mut state = self.state.lock().unwrap();
        state.tracked_queries.push(query.to_string());
        state.mocked_results.pop_front().unwrap_or_else(|| Ok(vec![]))
    }
}

/// Convenience constructor for a [`SearchHit`] in tests.
#[must_use]
pub fn hit(title: &str, snippet: &str, url: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        snippet: snippet.to_string(),
        url: url.to_string(),
    }
}
