//! Editorial scoring across five axes.
//!
//! The rater is the only role that never leaves its slot empty: an
//! unusable response yields the marked timeout default so downstream
//! consumers can tell a genuine mid-range score from a defaulted one.

use ag_core::types::{AtomicClaim, GenerateRequest, ScoreSet};
use ag_core::TextProvider;
use futures_util::future::join_all;
use std::time::Duration;
use tracing::debug;

use crate::prompts;
use crate::validator;

/// Rate one claim; falls back to [`ScoreSet::timeout_default`] on any
/// provider or validation failure.
pub async fn rate_one(
    provider: &dyn TextProvider,
    claim: &AtomicClaim,
    budget: Duration,
) -> ScoreSet {
    let request = GenerateRequest::new(prompts::rater_prompt(&claim.text))
        .json()
        .with_timeout(budget);
    let run = provider.generate(&request).await;
    if run.has_text() {
        match validator::validate_object(&run.text).and_then(|v| validator::parse_scores(&v)) {
            Ok(scores) => return scores,
            Err(failure) => {
                debug!(claim = %claim.canonical_id, %failure, "rater response rejected");
            }
        }
    }
    ScoreSet::timeout_default()
}

/// Rate every claim concurrently.
pub async fn rate_all(
    provider: &dyn TextProvider,
    claims: &[AtomicClaim],
    budget: Duration,
) -> Vec<ScoreSet> {
    join_all(claims.iter().map(|c| rate_one(provider, c, budget))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::types::ScoreOrigin;
    use serde_json::json;
    use testing::{claim, ok_json_run, MockProvider};

    #[tokio::test]
    async fn test_rate_one_parses_scores() {
        let provider = MockProvider::new("mock", "mock-model").enqueue(ok_json_run(&json!({
            "precision": {"value": 0.8, "justification": "concrete number"},
            "verifiability": {"value": 0.7, "justification": "statistics exist"},
            "relevance": {"value": 0.9, "justification": "live debate"},
            "readability": {"value": 0.8, "justification": "plain wording"},
            "balance": {"value": 0.6, "justification": "one-sided"},
        })));
        let scores = rate_one(&provider, &claim("Rents rose sharply."), Duration::from_secs(5)).await;
        assert_eq!(scores.origin, ScoreOrigin::Rated);
        assert!((scores.precision.value - 0.8).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_rate_one_defaults_on_missing_axis() {
        let provider = MockProvider::new("mock", "mock-model")
            .enqueue(ok_json_run(&json!({"precision": {"value": 0.8, "justification": "x"}})));
        let scores = rate_one(&provider, &claim("Some claim text."), Duration::from_secs(5)).await;
        assert!(scores.is_placeholder());
    }
}
