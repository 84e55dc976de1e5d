use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the provider failed or the parsing of the response
    /// failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returned a non-OK status code.
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The model refused to process the input.
    #[error("Refusal: {0}")]
    Refusal(String),
    /// The model's output could not be coerced to the requested schema.
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),
    /// The response from the provider was unexpected. (e.g. no choices
    /// returned in a completion)
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum SearchError {
    /// The request to the search backend failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered but the reply could not be used.
    #[error("Provider error from {0}: {1}")]
    Provider(&'static str, String),
}

pub type SearchResult<T> = Result<T, SearchError>;
