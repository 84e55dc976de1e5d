use blogflow_sdk::{
    testing::{MockCompleteResult, MockCompletionModel},
    CompletionInput, CompletionModel, ModelError, RetryPolicy,
};
use std::time::Duration;

fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        initial_delay: Duration::from_millis(1),
        exp_base: 1.0,
        ..RetryPolicy::default()
    }
}

fn input(prompt: &str) -> CompletionInput {
    CompletionInput {
        prompt: prompt.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn retries_transient_status_then_succeeds() {
    let model = MockCompletionModel::new();
    model.enqueue(MockCompleteResult::error(ModelError::StatusCode(
        reqwest::StatusCode::TOO_MANY_REQUESTS,
        "rate limited".to_string(),
    )));
    model.enqueue_text("done");

    let policy = fast_policy(3);
    let response = policy
        .run(|| model.complete(input("hello")))
        .await
        .expect("second attempt should succeed");

    assert_eq!(response.text, "done");
    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn does_not_retry_non_transient_errors() {
    let model = MockCompletionModel::new();
    model.enqueue(MockCompleteResult::error(ModelError::Refusal(
        "no".to_string(),
    )));
    model.enqueue_text("never reached");

    let policy = fast_policy(5);
    let error = policy
        .run(|| model.complete(input("hello")))
        .await
        .expect_err("refusal must surface immediately");

    assert!(matches!(error, ModelError::Refusal(_)));
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn surfaces_last_error_when_budget_exhausted() {
    let model = MockCompletionModel::new();
    for _ in 0..2 {
        model.enqueue(MockCompleteResult::error(ModelError::StatusCode(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            "down".to_string(),
        )));
    }

    let policy = fast_policy(2);
    let error = policy
        .run(|| model.complete(input("hello")))
        .await
        .expect_err("budget of two attempts should be exhausted");

    assert!(matches!(
        error,
        ModelError::StatusCode(reqwest::StatusCode::SERVICE_UNAVAILABLE, _)
    ));
    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn status_outside_retry_set_is_fatal() {
    let model = MockCompletionModel::new();
    model.enqueue(MockCompleteResult::error(ModelError::StatusCode(
        reqwest::StatusCode::UNAUTHORIZED,
        "bad key".to_string(),
    )));

    let policy = fast_policy(5);
    let error = policy
        .run(|| model.complete(input("hello")))
        .await
        .expect_err("401 is not transient");

    assert!(matches!(
        error,
        ModelError::StatusCode(reqwest::StatusCode::UNAUTHORIZED, _)
    ));
    assert_eq!(model.call_count(), 1);
}
