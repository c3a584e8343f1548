use serde::{Deserialize, Serialize};

use crate::config;

use super::prompt::{ANALYSIS_SYSTEM_PROMPT, MAX_CONTEXT_TURNS};
use super::{ChatTurn, ModelClient, ModelError};

/// OpenRouter chat-completions client (OpenAI-compatible).
///
/// Endpoint: POST {base_url}/chat/completions. Returns the assistant
/// message content, expected to be the JSON object the system prompt
/// demands.
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenRouterClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Build a client from `CARESIGNAL_OPENROUTER_*` environment settings.
    pub fn from_env() -> Self {
        Self::new(
            &config::openrouter_base_url(),
            &config::openrouter_api_key(),
            &config::openrouter_model(),
            config::model_timeout_secs(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ModelClient for OpenRouterClient {
    fn analyze(&self, text: &str, context: &[ChatTurn]) -> Result<String, ModelError> {
        if self.api_key.is_empty() {
            return Err(ModelError::MissingApiKey);
        }

        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = vec![ChatMessage {
            role: "system",
            content: ANALYSIS_SYSTEM_PROMPT,
        }];

        // Only the trailing turns, and only recognized roles.
        let start = context.len().saturating_sub(MAX_CONTEXT_TURNS);
        for turn in &context[start..] {
            if turn.role == "user" || turn.role == "assistant" {
                messages.push(ChatMessage {
                    role: &turn.role,
                    content: &turn.content,
                });
            }
        }

        messages.push(ChatMessage {
            role: "user",
            content: text,
        });

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.2,
            max_tokens: 1024,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ModelError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ModelError::Timeout(self.timeout_secs)
                } else {
                    ModelError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Model provider returned error");
            return Err(ModelError::Provider {
                status: status.as_u16(),
                body: truncate(&body, 500),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| ModelError::ResponseShape(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::ResponseShape("no choices in response".into()))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
