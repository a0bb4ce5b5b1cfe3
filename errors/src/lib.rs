//! # Agora Errors
//!
//! Shared error taxonomy for the claim-distillation pipeline.
//!
//! The pipeline's failure model is "nothing throws, but everything stays
//! truthful about what succeeded": provider and validation failures are
//! values that stages absorb into defaults, never panics. These types give
//! every absorbed failure a precise name before it is flattened into
//! stage metadata.

use thiserror::Error;

/// Failures of a single external text-generation call.
///
/// `MissingCredential` is the one variant that means the call was never
/// attempted ("skipped"); every other variant means it was attempted and
/// did not succeed ("failed").
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Credential missing for provider: {provider}")]
    MissingCredential { provider: String },

    #[error("Provider {provider} timed out after {elapsed_ms}ms")]
    Timeout { provider: String, elapsed_ms: u64 },

    #[error("Provider {provider} returned HTTP {status}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Transport failure for provider {provider}: {reason}")]
    Transport { provider: String, reason: String },

    #[error("Provider {provider} returned an empty completion")]
    EmptyCompletion { provider: String },
}

impl ProviderError {
    /// True when the backend was never attempted (missing configuration).
    ///
    /// Callers treat skipped providers as silently non-applicable, while
    /// failed ones are logged with provider identity and status.
    pub fn is_skip(&self) -> bool {
        matches!(self, ProviderError::MissingCredential { .. })
    }

    pub fn provider(&self) -> &str {
        match self {
            ProviderError::MissingCredential { provider }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::Http { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::EmptyCompletion { provider } => provider,
        }
    }
}

/// Structural validation failures of provider output.
///
/// A parse or schema failure is a normal, expected outcome; it is reported
/// to the calling stage, which takes its fallback path.
#[derive(Debug, Clone, Error)]
pub enum ValidationFailure {
    #[error("Response is not valid JSON: {reason}")]
    NotJson { reason: String },

    #[error("Expected a JSON object, got {found}")]
    NotAnObject { found: String },

    #[error("Schema violation at {field}: {reason}")]
    SchemaViolation { field: String, reason: String },
}

/// Cache backend failures.
///
/// Cache errors never fail a stage: the wrapped provider call proceeds as
/// if the lookup missed.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {reason}")]
    Backend { reason: String },

    #[error("Cache serialization failed: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for ValidationFailure {
    fn from(e: serde_json::Error) -> Self {
        ValidationFailure::NotJson {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_is_skip() {
        let err = ProviderError::MissingCredential {
            provider: "anthropic".to_string(),
        };
        assert!(err.is_skip());
        assert_eq!(err.provider(), "anthropic");
    }

    #[test]
    fn test_timeout_is_not_skip() {
        let err = ProviderError::Timeout {
            provider: "openai".to_string(),
            elapsed_ms: 9000,
        };
        assert!(!err.is_skip());
    }

    #[test]
    fn test_validation_failure_display() {
        let err = ValidationFailure::SchemaViolation {
            field: "claims[0].text".to_string(),
            reason: "empty".to_string(),
        };
        assert!(err.to_string().contains("claims[0].text"));
    }
}
