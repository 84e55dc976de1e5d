use crate::{ModelError, SearchError};
use rand::Rng;
use reqwest::StatusCode;
use std::{future::Future, time::Duration};

/// Classifies an error as worth retrying under a given status allow-list.
pub trait Retryable {
    fn is_transient(&self, retry_on: &[StatusCode]) -> bool;
}

impl Retryable for ModelError {
    fn is_transient(&self, retry_on: &[StatusCode]) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::StatusCode(status, _) => retry_on.contains(status),
            _ => false,
        }
    }
}

impl Retryable for SearchError {
    fn is_transient(&self, _retry_on: &[StatusCode]) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Provider(..) => false,
        }
    }
}

/// Bounded exponential-backoff retry applied to every capability invocation.
///
/// One policy instance is handed to each stage at construction so retry
/// behavior is configured in a single place rather than per call site.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Delay multiplier between consecutive retries.
    pub exp_base: f64,
    /// HTTP status codes considered transient.
    pub retry_on: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay: Duration::from_secs(1),
            exp_base: 7.0,
            retry_on: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl RetryPolicy {
    /// A policy that performs exactly one attempt.
    #[must_use]
    pub fn none() -> Self {
        Self {
            attempts: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_retryable<E: Retryable>(&self, error: &E) -> bool {
        error.is_transient(&self.retry_on)
    }

    fn delay_for(&self, retry_index: u32) -> Duration {
        let backoff = self
            .initial_delay
            .mul_f64(self.exp_base.powi(retry_index.try_into().unwrap_or(i32::MAX)));
        // Up to 10% jitter so concurrent stages do not retry in lockstep.
        let jitter = rand::thread_rng().gen_range(0.0..0.1);
        backoff.mul_f64(1.0 + jitter)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is exhausted. The last error is surfaced as-is.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts.max(1);
        let mut retry_index = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if retry_index + 1 >= attempts || !self.is_retryable(&error) {
                        return Err(error);
                    }
                    let delay = self.delay_for(retry_index);
                    tracing::warn!(
                        retry_index,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient capability error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    retry_index += 1;
                }
            }
        }
    }
}
