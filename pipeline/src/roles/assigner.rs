//! Jurisdiction assignment.
//!
//! The current contract classifies one claim per call. The legacy batch
//! contract classified all claims in one call and joined results back by
//! claim text; that join is kept exactly as shipped, including its known
//! weakness that claims with identical normalized text share one entry.

use ag_core::legacy::LegacyJurisdiction;
use ag_core::types::{AtomicClaim, GenerateRequest, Jurisdiction};
use ag_core::TextProvider;
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::prompts;
use crate::validator;

/// Classify the responsible political level and organ for one claim.
pub async fn assign_one(
    provider: &dyn TextProvider,
    claim: &AtomicClaim,
    budget: Duration,
) -> Option<Jurisdiction> {
    let request = GenerateRequest::new(prompts::assigner_prompt(&claim.text))
        .with_system(prompts::ASSIGNER_SYSTEM)
        .json()
        .with_timeout(budget);
    let run = provider.generate(&request).await;
    if !run.has_text() {
        return None;
    }
    match validator::validate_object(&run.text).and_then(|v| validator::parse_jurisdiction(&v)) {
        Ok(jurisdiction) => Some(jurisdiction),
        Err(failure) => {
            debug!(claim = %claim.canonical_id, %failure, "assigner response rejected");
            None
        }
    }
}

/// Classify every claim concurrently, one call per claim.
pub async fn assign_all(
    provider: &dyn TextProvider,
    claims: &[AtomicClaim],
    budget: Duration,
) -> Vec<Option<Jurisdiction>> {
    join_all(claims.iter().map(|c| assign_one(provider, c, budget))).await
}

fn upgrade_legacy(j: &LegacyJurisdiction) -> Jurisdiction {
    Jurisdiction {
        level: j.level,
        organ: Some(j.organ.trim().to_string()).filter(|o| !o.is_empty()),
        // The legacy contract carried no topic key.
        topic_key: "other".to_string(),
        rationale: Some(j.rationale.trim().to_string()).filter(|r| !r.is_empty()),
    }
}

/// Legacy batch path: one call for all claims, results joined back by
/// normalized claim text. Unmatched claims stay unassigned.
pub async fn assign_batch_legacy(
    provider: &dyn TextProvider,
    claims: &[AtomicClaim],
    budget: Duration,
) -> Vec<Option<Jurisdiction>> {
    let payload = claims
        .iter()
        .map(|c| format!("- {}", c.text))
        .collect::<Vec<_>>()
        .join("\n");
    let request = GenerateRequest::new(prompts::assigner_batch_prompt(&payload))
        .with_system(prompts::ASSIGNER_SYSTEM)
        .json()
        .with_timeout(budget);
    let run = provider.generate(&request).await;

    let mut by_text: HashMap<String, Jurisdiction> = HashMap::new();
    if run.has_text() {
        match validator::validate_object(&run.text) {
            Ok(value) => {
                for entry in value
                    .get("map")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                {
                    let Some(text) = entry.get("claim").and_then(Value::as_str) else {
                        continue;
                    };
                    let Some(raw) = entry.get("jurisdiction") else {
                        continue;
                    };
                    if let Ok(legacy) =
                        serde_json::from_value::<LegacyJurisdiction>(raw.clone())
                    {
                        by_text.insert(utils::normalize_text(text), upgrade_legacy(&legacy));
                    }
                }
            }
            Err(failure) => {
                debug!(%failure, "legacy assigner batch rejected");
            }
        }
    }

    claims
        .iter()
        .map(|c| by_text.get(&c.normalized_text()).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::types::JurisdictionLevel;
    use serde_json::json;
    use testing::{claim, ok_json_run, MockProvider};

    #[tokio::test]
    async fn test_assign_one_parses_jurisdiction() {
        let provider = MockProvider::new("mock", "mock-model").enqueue(ok_json_run(&json!({
            "level": "local", "organ": "city council",
            "topic_key": "transport", "rationale": "municipal fare policy"
        })));
        let j = assign_one(&provider, &claim("Transit should be free."), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(j.level, JurisdictionLevel::Local);
        assert_eq!(j.topic_key, "transport");
    }

    #[tokio::test]
    async fn test_assign_one_invalid_response_is_none() {
        let provider = MockProvider::new("mock", "mock-model")
            .enqueue(ok_json_run(&json!({"organ": "nobody"})));
        let j = assign_one(&provider, &claim("Some claim text here."), Duration::from_secs(5)).await;
        assert!(j.is_none());
    }

    #[tokio::test]
    async fn test_assign_batch_legacy_joins_by_normalized_text() {
        let claims = vec![
            claim("Transit should be free."),
            claim("Rents rose sharply."),
        ];
        let provider = MockProvider::new("mock", "mock-model").enqueue(ok_json_run(&json!({
            "map": [
                {"claim": "  TRANSIT should be free. ",
                 "jurisdiction": {"level": "local", "organ": "city council", "rationale": "fares"}},
            ]
        })));
        let out = assign_batch_legacy(&provider, &claims, Duration::from_secs(5)).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap().level, JurisdictionLevel::Local);
        assert_eq!(out[0].as_ref().unwrap().topic_key, "other");
        assert!(out[1].is_none());
    }
}
