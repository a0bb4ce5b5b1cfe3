//! Claim extraction: provider-backed with a deterministic fallback.
//!
//! The provider path asks a backend to split input text into atomic,
//! fact-checkable claims. When that fails (timeout, invalid JSON, zero
//! rows) a sentence-boundary heuristic takes over so the pipeline still
//! has something to enrich. Only when both paths come up empty is the
//! run fatal.

use ag_core::types::{AtomicClaim, GenerateRequest, MAX_INPUT_CHARS};
use ag_core::TextProvider;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use crate::prompts;
use crate::validator;

/// Fragments shorter than this are noise, not claims.
const MIN_FRAGMENT_CHARS: usize = 15;

/// What atomicization produced and which path produced it.
#[derive(Debug, Clone)]
pub struct AtomicizeOutcome {
    pub claims: Vec<AtomicClaim>,
    /// True when the heuristic splitter supplied the claims (or nothing
    /// could be extracted at all).
    pub fallback_used: bool,
}

fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Sentence terminators, line breaks, and list enumerators all count
    // as claim boundaries.
    RE.get_or_init(|| {
        Regex::new(r"(?m)[.!?]+\s+|\n+|^\s*(?:[-•*]|\d+[.)])\s+").expect("boundary pattern is valid")
    })
}

/// Deterministic splitter used when the provider path yields nothing.
///
/// Splits on sentence boundaries and enumerators, drops fragments too
/// short to be a claim, and caps the result.
#[must_use]
pub fn heuristic_split(text: &str, max_claims: usize) -> Vec<AtomicClaim> {
    boundary_re()
        .split(text)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() >= MIN_FRAGMENT_CHARS)
        .take(max_claims)
        .map(AtomicClaim::from_text)
        .collect()
}

/// Extract atomic claims from free-form input.
///
/// Input is bounded to [`MAX_INPUT_CHARS`] up front. The provider gets
/// one shot within `budget`; any failure mode falls through to
/// [`heuristic_split`].
pub async fn atomicize(
    provider: &dyn TextProvider,
    text: &str,
    max_claims: usize,
    budget: Duration,
) -> AtomicizeOutcome {
    let bounded = utils::truncate_chars(text.trim(), MAX_INPUT_CHARS);
    if bounded.is_empty() {
        return AtomicizeOutcome {
            claims: Vec::new(),
            fallback_used: true,
        };
    }

    let request = GenerateRequest::new(prompts::atomicizer_prompt(bounded, max_claims))
        .json()
        .with_timeout(budget);
    let run = provider.generate(&request).await;

    if run.has_text() {
        match validator::validate_object(&run.text) {
            Ok(value) => {
                let claims = validator::parse_claims(&value, max_claims);
                if !claims.is_empty() {
                    return AtomicizeOutcome {
                        claims,
                        fallback_used: false,
                    };
                }
                debug!(provider = provider.name(), "atomicizer returned zero usable claims");
            }
            Err(failure) => {
                debug!(provider = provider.name(), %failure, "atomicizer response rejected");
            }
        }
    } else if let Some(error) = &run.error {
        debug!(provider = provider.name(), error, skipped = run.skipped, "atomicizer call unusable");
    }

    AtomicizeOutcome {
        claims: heuristic_split(bounded, max_claims),
        fallback_used: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use testing::{ok_json_run, MockProvider};

    #[test]
    fn test_heuristic_split_sentences_and_bullets() {
        let text = "Public transit should be free for residents. Rents rose by twelve percent last year!\n- The city must build two thousand flats\n2) Short.";
        let claims = heuristic_split(text, 6);
        assert_eq!(claims.len(), 3);
        assert!(claims[0].text.starts_with("Public transit"));
        assert!(claims[2].text.starts_with("The city"));
    }

    #[test]
    fn test_heuristic_split_caps_and_drops_fragments() {
        let text = "One meaningful claim about housing. Two meaningful claims about housing. Three meaningful claims about housing. ok.";
        let claims = heuristic_split(text, 2);
        assert_eq!(claims.len(), 2);
    }

    #[tokio::test]
    async fn test_atomicize_uses_provider_output() {
        let provider = MockProvider::new("mock", "mock-model").enqueue(ok_json_run(&json!({
            "claims": [{"text": "Transit should be free.", "level": "local"}]
        })));
        let outcome = atomicize(&provider, "Transit should be free for everyone, always.", 6,
                                Duration::from_secs(5)).await;
        assert!(!outcome.fallback_used);
        assert_eq!(outcome.claims.len(), 1);
        assert_eq!(outcome.claims[0].text, "Transit should be free.");
    }

    #[tokio::test]
    async fn test_atomicize_falls_back_on_invalid_json() {
        let provider = MockProvider::new("mock", "mock-model").enqueue(ag_core::types::ProviderRun::success(
            "I could not find any claims, sorry.".to_string(),
            None,
            12,
        ));
        let outcome = atomicize(&provider, "Rents in the city rose sharply last year.", 6,
                                Duration::from_secs(5)).await;
        assert!(outcome.fallback_used);
        assert_eq!(outcome.claims.len(), 1);
    }

    #[tokio::test]
    async fn test_atomicize_empty_input_is_empty_fallback() {
        let provider = MockProvider::new("mock", "mock-model");
        let outcome = atomicize(&provider, "   \n ", 6, Duration::from_secs(5)).await;
        assert!(outcome.fallback_used);
        assert!(outcome.claims.is_empty());
    }
}
