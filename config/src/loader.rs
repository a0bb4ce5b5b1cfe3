//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor
//! app principles. This is the only place in the workspace that touches
//! `std::env`.
//!
//! # Variables
//! - `OPENAI_API_KEY` / `OPENAI_MODEL` / `OPENAI_BASE_URL`
//! - `ANTHROPIC_API_KEY` / `ANTHROPIC_MODEL` / `ANTHROPIC_BASE_URL`
//! - `MISTRAL_API_KEY` / `MISTRAL_MODEL` / `MISTRAL_BASE_URL`
//! - `GEMINI_API_KEY` / `GEMINI_MODEL` / `GEMINI_BASE_URL`
//! - `AG_REDIS_URL`: Redis cache URL (unset selects the in-memory cache)
//! - `AG_CACHE_TTL_SECONDS`: cache entry TTL (default: 300)
//! - `AG_MAX_CLAIMS`: default claim cap per request (default: 6)
//! - `AG_STAGE_TIMEOUT_MS`: uniform per-stage budget override

use crate::config::{CacheConfig, Config, PipelineConfig, ProviderSettings, ProvidersConfig};
use std::env;

/// Load configuration from environment variables, applying defaults for
/// anything unset.
#[must_use]
pub fn load_from_env() -> Config {
    Config {
        providers: load_providers_from_env(),
        cache: CacheConfig {
            redis_url: env::var("AG_REDIS_URL").ok(),
            ttl_seconds: parse_env("AG_CACHE_TTL_SECONDS").unwrap_or(300),
        },
        pipeline: PipelineConfig {
            max_claims: parse_env("AG_MAX_CLAIMS").unwrap_or(6),
            stage_timeout_ms: parse_env("AG_STAGE_TIMEOUT_MS"),
        },
    }
}

fn load_providers_from_env() -> ProvidersConfig {
    let defaults = ProvidersConfig::default();
    ProvidersConfig {
        openai: load_provider("OPENAI", defaults.openai),
        anthropic: load_provider("ANTHROPIC", defaults.anthropic),
        mistral: load_provider("MISTRAL", defaults.mistral),
        gemini: load_provider("GEMINI", defaults.gemini),
    }
}

fn load_provider(prefix: &str, defaults: ProviderSettings) -> ProviderSettings {
    ProviderSettings {
        api_key: env::var(format!("{}_API_KEY", prefix)).ok().filter(|k| !k.is_empty()),
        model: env::var(format!("{}_MODEL", prefix)).unwrap_or(defaults.model),
        base_url: env::var(format!("{}_BASE_URL", prefix)).unwrap_or(defaults.base_url),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_provider_falls_back_to_defaults() {
        // Uses a prefix no environment sets.
        let settings = load_provider("AG_NONEXISTENT", ProviderSettings::new("m", "https://x"));
        assert!(settings.api_key.is_none());
        assert_eq!(settings.model, "m");
        assert_eq!(settings.base_url, "https://x");
    }
}
