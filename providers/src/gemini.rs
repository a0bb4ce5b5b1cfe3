//! Gemini adapter, speaking the OpenAI-compatible chat endpoint.
//!
//! Unlike the OpenAI adapter, a response format is always sent: the
//! endpoint distinguishes `json_object` and `text` explicitly.

use ag_core::types::{GenerateRequest, ProviderRun, TokenUsage};
use ag_core::TextProvider;
use async_trait::async_trait;
use config::ProviderSettings;
use errors::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub struct GeminiProvider {
    client: Client,
    settings: ProviderSettings,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
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

impl GeminiProvider {
    #[must_use]
    pub fn new(settings: ProviderSettings) -> Self {
        GeminiProvider {
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
            messages,
            response_format: ResponseFormat {
                format_type: if request.json_mode {
                    "json_object"
                } else {
                    "text"
                },
            },
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
            .map_err(|e| {
                crate::openai::transport_error("gemini", &e, started.elapsed().as_millis() as u64)
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ProviderError::Http {
                provider: "gemini".to_string(),
                status,
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| ProviderError::Transport {
            provider: "gemini".to_string(),
            reason: e.to_string(),
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        Ok((text, usage))
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
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
                        provider: "gemini".to_string(),
                    };
                    ProviderRun::failed(&err, elapsed_ms)
                } else {
                    ProviderRun::success(text, usage, elapsed_ms)
                }
            }
            Err(err) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::warn!(provider = "gemini", error = %err, elapsed_ms, "provider call failed");
                ProviderRun::failed(&err, elapsed_ms)
            }
        }
    }
}
