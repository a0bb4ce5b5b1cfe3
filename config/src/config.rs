//! Configuration structures for all pipeline components.

use serde::{Deserialize, Serialize};

/// Top-level immutable configuration, resolved once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            providers: ProvidersConfig::default(),
            cache: CacheConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Settings for one text-generation backend.
///
/// A `None` API key means the backend is unconfigured: its adapter
/// reports calls as skipped rather than failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ProviderSettings {
    #[must_use]
    pub fn new(model: &str, base_url: &str) -> Self {
        ProviderSettings {
            api_key: None,
            model: model.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

/// Per-backend settings for the four supported providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    pub mistral: ProviderSettings,
    pub gemini: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            openai: ProviderSettings::new("gpt-4o-mini", "https://api.openai.com/v1"),
            anthropic: ProviderSettings::new(
                "claude-3-5-sonnet-20240620",
                "https://api.anthropic.com",
            ),
            mistral: ProviderSettings::new("mistral-large-latest", "https://api.mistral.ai/v1"),
            gemini: ProviderSettings::new(
                "gemini-2.0-flash",
                "https://generativelanguage.googleapis.com/v1beta/openai",
            ),
        }
    }
}

/// Response-cache settings. A missing Redis URL selects the in-memory
/// implementation; the choice is made by the factory, not by inline
/// feature detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            redis_url: None,
            ttl_seconds: 300,
        }
    }
}

/// Orchestrator defaults, overridable per call via `AnalyzeOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub max_claims: usize,
    /// When set, every stage gets this uniform budget instead of the
    /// built-in per-stage defaults.
    pub stage_timeout_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_claims: 6,
            stage_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_credentials() {
        let config = Config::default();
        assert!(config.providers.openai.api_key.is_none());
        assert!(config.providers.anthropic.api_key.is_none());
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.pipeline.max_claims, 6);
    }
}
