use crate::{
    completion::CompletionModel,
    errors::{ModelError, ModelResult},
    opentelemetry::trace_complete,
    types::{CompletionInput, CompletionResponse, ModelUsage, ResponseFormatOption},
};
use reqwest::{
    header::{self, HeaderValue},
    Client,
};

/// OpenRouter speaks the OpenAI chat-completions dialect.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default free-tier model. Free-tier models may be rate limited; the retry
/// policy covers short bursts, otherwise supply your own model id.
pub const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

pub struct OpenRouterModel {
    pub model_id: String,
    pub base_url: String,
    pub client: Client,
}

pub struct OpenRouterModelOptions {
    pub api_key: String,
    /// Model id, e.g. "meta-llama/llama-3.3-70b-instruct:free". Defaults to
    /// [`DEFAULT_OPENROUTER_MODEL`].
    pub model_id: Option<String>,
    pub base_url: Option<String>,
}

impl OpenRouterModel {
    #[must_use]
    pub fn new(options: OpenRouterModelOptions) -> Self {
        let mut headers = header::HeaderMap::new();
        let mut auth_header_value: HeaderValue =
            format!("Bearer {}", options.api_key).try_into().unwrap();
        auth_header_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header_value);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        Self {
            model_id: options
                .model_id
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            base_url: options
                .base_url
                .unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
            client: Client::builder().default_headers(headers).build().unwrap(),
        }
    }

    async fn send(&self, input: CompletionInput) -> ModelResult<CompletionResponse> {
        let params = convert_to_chat_params(input, self.model_id.clone());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::StatusCode(
                status,
                response.text().await.unwrap_or_default(),
            ));
        }

        let json = response.json::<openrouter_api::ChatCompletion>().await?;

        let choice = json
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Invariant("openrouter", "no choices in response".to_string()))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(ModelError::Refusal(refusal));
        }

        let text = choice.message.content.unwrap_or_default();

        Ok(CompletionResponse {
            text,
            usage: json.usage.map(|usage| ModelUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            }),
        })
    }
}

#[async_trait::async_trait]
impl CompletionModel for OpenRouterModel {
    fn provider(&self) -> &'static str {
        "openrouter"
    }

    fn model_id(&self) -> String {
        self.model_id.to_string()
    }

    async fn complete(&self, input: CompletionInput) -> ModelResult<CompletionResponse> {
        trace_complete(self.provider(), &self.model_id, &input, || {
            self.send(input.clone())
        })
        .await
    }
}

fn convert_to_chat_params(
    input: CompletionInput,
    model_id: String,
) -> openrouter_api::ChatCompletionCreateParams {
    let mut messages = Vec::with_capacity(2);
    if let Some(system_prompt) = input.system_prompt {
        messages.push(openrouter_api::ChatMessage {
            role: "system",
            content: system_prompt,
        });
    }
    messages.push(openrouter_api::ChatMessage {
        role: "user",
        content: input.prompt,
    });

    openrouter_api::ChatCompletionCreateParams {
        model: model_id,
        messages,
        temperature: input.temperature,
        top_p: input.top_p,
        max_tokens: input.max_tokens,
        response_format: input.response_format.map(convert_to_response_format),
    }
}

fn convert_to_response_format(
    response_format: ResponseFormatOption,
) -> openrouter_api::ResponseFormat {
    match response_format {
        ResponseFormatOption::Text => openrouter_api::ResponseFormat::Text,
        ResponseFormatOption::Json(json) => openrouter_api::ResponseFormat::JsonSchema {
            json_schema: openrouter_api::JsonSchemaFormat {
                name: json.name,
                description: json.description,
                schema: json.schema,
                strict: true,
            },
        },
    }
}

mod openrouter_api {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Debug, Serialize)]
    pub struct ChatCompletionCreateParams {
        pub model: String,
        pub messages: Vec<ChatMessage>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub temperature: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub top_p: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub max_tokens: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub response_format: Option<ResponseFormat>,
    }

    #[derive(Debug, Serialize)]
    pub struct ChatMessage {
        pub role: &'static str,
        pub content: String,
    }

    #[derive(Debug, Serialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum ResponseFormat {
        Text,
        JsonSchema { json_schema: JsonSchemaFormat },
    }

    #[derive(Debug, Serialize)]
    pub struct JsonSchemaFormat {
        pub name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub schema: Option<Value>,
        pub strict: bool,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatCompletion {
        pub choices: Vec<ChatCompletionChoice>,
        pub usage: Option<CompletionUsage>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatCompletionChoice {
        pub message: ChatCompletionMessage,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatCompletionMessage {
        pub content: Option<String>,
        pub refusal: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CompletionUsage {
        pub prompt_tokens: u32,
        pub completion_tokens: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseFormatJson;
    use serde_json::json;

    #[test]
    fn converts_prompt_and_system_prompt_to_messages() {
        let params = convert_to_chat_params(
            CompletionInput {
                system_prompt: Some("be terse".to_string()),
                prompt: "hello".to_string(),
                temperature: Some(0.2),
                ..Default::default()
            },
            "test-model".to_string(),
        );

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value["messages"],
            json!([
                {"role": "system", "content": "be terse"},
                {"role": "user", "content": "hello"}
            ])
        );
        assert_eq!(value["model"], "test-model");
        assert_eq!(value["temperature"], 0.2);
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn converts_json_response_format_to_json_schema() {
        let params = convert_to_chat_params(
            CompletionInput {
                prompt: "plan".to_string(),
                response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
                    name: "ResearchPlan".to_string(),
                    description: None,
                    schema: Some(json!({"type": "object"})),
                })),
                ..Default::default()
            },
            "test-model".to_string(),
        );

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(
            value["response_format"]["json_schema"]["name"],
            "ResearchPlan"
        );
        assert_eq!(value["response_format"]["json_schema"]["strict"], true);
    }
}
