use crate::{SearchHit, SearchResult};

/// A web-search capability.
///
/// An empty hit list is a successful result, not an error.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// Execute one query and return the matching results.
    async fn search(&self, query: &str) -> SearchResult<Vec<SearchHit>>;
}
