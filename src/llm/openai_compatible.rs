use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::error::LlmError;
use crate::llm::interface::{CompletionClient, CompletionRequest};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for OpenAI-compatible chat completion APIs (OpenAI, Groq,
/// Mistral, Gemini's compatibility endpoint, self-hosted gateways).
#[derive(Debug)]
pub struct OpenAiCompatibleClient {
    client: Client,
    name: String,
    model: String,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    pub fn new(
        model: String,
        base_url: String,
        api_key: String,
        request_timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        info!(model = %model, base_url = %base_url, "initialized OpenAI-compatible client");
        let name = format!("openai_compatible/{model}");
        Ok(Self { client, name, model, base_url, api_key })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system_prompt },
                ChatMessage { role: "user", content: &request.user_text },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let payload = response.text().await?;
        debug!(bytes = payload.len(), "received completion payload");
        parse_completion(&payload)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Pull the first choice's text out of a chat-completions payload.
fn parse_completion(payload: &str) -> Result<String, LlmError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(payload)
        .map_err(|e| LlmError::MalformedOutput(format!("completion payload: {e}")))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    let content = content.trim();
    if content.is_empty() {
        return Err(LlmError::MalformedOutput("empty completion".to_string()));
    }
    Ok(content.to_string())
}
