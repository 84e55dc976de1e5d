use crate::{CompletionInput, CompletionResponse, ModelResult, ModelUsage};
use opentelemetry::trace::Status;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub(crate) struct CompletionSpan {
    span: Span,
    usage: Option<ModelUsage>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    top_p: Option<f64>,
}

impl CompletionSpan {
    pub fn new(provider: &str, model_id: &str, input: &CompletionInput) -> Self {
        let span = info_span!("blogflow_sdk.complete");
        span.set_attribute("gen_ai.operation.name", "generate_content");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("gen_ai.request.model", model_id.to_string());

        Self {
            span,
            usage: None,
            max_tokens: input.max_tokens,
            temperature: input.temperature,
            top_p: input.top_p,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_response(&mut self, response: &CompletionResponse) {
        if let Some(usage) = &response.usage {
            self.usage = Some(usage.clone());
        }
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(usage) = &self.usage {
            self.span
                .set_attribute("gen_ai.usage.input_tokens", i64::from(usage.input_tokens));
            self.span
                .set_attribute("gen_ai.usage.output_tokens", i64::from(usage.output_tokens));
        }

        if let Some(max_tokens) = self.max_tokens {
            self.span
                .set_attribute("gen_ai.request.max_tokens", i64::from(max_tokens));
        }
        if let Some(temperature) = self.temperature {
            self.span
                .set_attribute("gen_ai.request.temperature", temperature);
        }
        if let Some(top_p) = self.top_p {
            self.span.set_attribute("gen_ai.request.top_p", top_p);
        }
    }
}

pub(crate) async fn trace_complete<F, Fut>(
    provider: &str,
    model_id: &str,
    input: &CompletionInput,
    f: F,
) -> ModelResult<CompletionResponse>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ModelResult<CompletionResponse>>,
{
    let mut span = CompletionSpan::new(provider, model_id, input);
    let result = span.instrument_future(f()).await;

    match &result {
        Ok(response) => span.on_response(response),
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}
