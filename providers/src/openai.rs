//! OpenAI chat-completions adapter.

use ag_core::types::{GenerateRequest, ProviderRun, TokenUsage};
use ag_core::TextProvider;
use async_trait::async_trait;
use config::ProviderSettings;
use errors::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub struct OpenAiProvider {
    client: Client,
    settings: ProviderSettings,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<UsageDto>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageDto {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

impl From<UsageDto> for TokenUsage {
    fn from(u: UsageDto) -> Self {
        TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(settings: ProviderSettings) -> Self {
        OpenAiProvider {
            client: Client::new(),
            settings,
        }
    }

    async fn call(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<(String, Option<TokenUsage>), ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        let body = ChatRequest {
            model: self.settings.model.clone(),
            temperature: 0.0,
            max_tokens: 800,
            messages,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let url = format!("{}/chat/completions", self.settings.base_url);
        let started = Instant::now();
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| transport_error("openai", &e, started.elapsed().as_millis() as u64))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: "openai".to_string(),
                status,
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| ProviderError::Transport {
            provider: "openai".to_string(),
            reason: e.to_string(),
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok((text, parsed.usage.map(TokenUsage::from)))
    }
}

/// Classify a reqwest failure: an elapsed deadline is a timeout, anything
/// else is transport.
pub(crate) fn transport_error(provider: &str, e: &reqwest::Error, elapsed_ms: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_string(),
            elapsed_ms,
        }
    } else {
        ProviderError::Transport {
            provider: provider.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    fn configured(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn generate(&self, request: &GenerateRequest) -> ProviderRun {
        let Some(api_key) = self.settings.api_key.clone() else {
            return ProviderRun::skipped(self.name());
        };
        let started = Instant::now();
        match self.call(&api_key, request).await {
            Ok((text, usage)) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                if text.trim().is_empty() {
                    let err = ProviderError::EmptyCompletion {
                        provider: "openai".to_string(),
                    };
                    tracing::warn!(provider = "openai", elapsed_ms, "empty completion");
                    ProviderRun::failed(&err, elapsed_ms)
                } else {
                    ProviderRun::success(text, usage, elapsed_ms)
                }
            }
            Err(err) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::warn!(provider = "openai", error = %err, elapsed_ms, "provider call failed");
                ProviderRun::failed(&err, elapsed_ms)
            }
        }
    }
}
