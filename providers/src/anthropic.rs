//! Anthropic messages-API adapter.
//!
//! Anthropic has no native JSON response mode; strict-JSON output is
//! requested through the system prompt. Exhausted account balance comes
//! back as HTTP 4xx and is treated as skipped rather than failed, so the
//! backend drops out of fan-out selection silently.

use ag_core::types::{GenerateRequest, ProviderRun, TokenUsage};
use ag_core::TextProvider;
use async_trait::async_trait;
use config::ProviderSettings;
use errors::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const JSON_SYSTEM_SUFFIX: &str =
    "You MUST respond with valid JSON (RFC 8259) only, without any surrounding prose.";

pub struct AnthropicProvider {
    client: Client,
    settings: ProviderSettings,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<UserMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl From<AnthropicUsage> for TokenUsage {
    fn from(u: AnthropicUsage) -> Self {
        let total = match (u.input_tokens, u.output_tokens) {
            (Some(i), Some(o)) => Some(i + o),
            _ => None,
        };
        TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: total,
        }
    }
}

impl AnthropicProvider {
    #[must_use]
    pub fn new(settings: ProviderSettings) -> Self {
        AnthropicProvider {
            client: Client::new(),
            settings,
        }
    }

    /// Account-level refusals are non-applicability, not failure.
    fn is_skip_status(status: u16, body: &str) -> bool {
        matches!(status, 400 | 402 | 403)
            || body.to_lowercase().contains("credit balance is too low")
    }

    async fn call(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<(String, Option<TokenUsage>), (ProviderError, bool)> {
        let system = if request.json_mode {
            Some(match &request.system {
                Some(s) => format!("{}\n\n{}", s, JSON_SYSTEM_SUFFIX),
                None => JSON_SYSTEM_SUFFIX.to_string(),
            })
        } else {
            request.system.clone()
        };

        let body = MessagesRequest {
            model: self.settings.model.clone(),
            max_tokens: 1024,
            messages: vec![UserMessage {
                role: "user",
                content: request.prompt.clone(),
            }],
            system,
        };

        let url = format!("{}/v1/messages", self.settings.base_url);
        let started = Instant::now();
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| {
                (
                    crate::openai::transport_error(
                        "anthropic",
                        &e,
                        started.elapsed().as_millis() as u64,
                    ),
                    false,
                )
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| status.to_string());
            let skip = Self::is_skip_status(status, &body);
            return Err((
                ProviderError::Http {
                    provider: "anthropic".to_string(),
                    status,
                    body,
                },
                skip,
            ));
        }

        let parsed: MessagesResponse = resp.json().await.map_err(|e| {
            (
                ProviderError::Transport {
                    provider: "anthropic".to_string(),
                    reason: e.to_string(),
                },
                false,
            )
        })?;

        let text = parsed
            .content
            .iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text.clone())
            .unwrap_or_default();
        Ok((text, parsed.usage.map(TokenUsage::from)))
    }
}

#[async_trait]
impl TextProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
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
                        provider: "anthropic".to_string(),
                    };
                    tracing::warn!(provider = "anthropic", elapsed_ms, "empty completion");
                    ProviderRun::failed(&err, elapsed_ms)
                } else {
                    ProviderRun::success(text, usage, elapsed_ms)
                }
            }
            Err((err, skip)) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::warn!(provider = "anthropic", error = %err, skip, "provider call failed");
                let mut run = ProviderRun::failed(&err, elapsed_ms);
                run.skipped = run.skipped || skip;
                run
            }
        }
    }
}
