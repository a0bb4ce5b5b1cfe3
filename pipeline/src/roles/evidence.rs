//! Evidence hypothesis generation.
//!
//! Preferred contract: one batch call keyed by canonical id. When the
//! batch response keys nothing the role retries once against the legacy
//! text-keyed contract and upgrades the slots at the boundary, so the
//! caller always sees canonical-id-keyed hypotheses.

use ag_core::legacy::{self, LegacyEvidenceSlot};
use ag_core::types::{AtomicClaim, EvidenceHypothesis, GenerateRequest};
use ag_core::TextProvider;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::debug;

use crate::prompts;
use crate::validator;

/// Hypotheses kept per claim, matching the prompt contract.
const MAX_HINTS_PER_CLAIM: usize = 4;

/// Propose evidence hypotheses for a single claim.
pub async fn evidence_for_claim(
    provider: &dyn TextProvider,
    claim: &AtomicClaim,
    budget: Duration,
) -> Vec<EvidenceHypothesis> {
    let request = GenerateRequest::new(prompts::evidence_prompt(&claim.text))
        .with_system(prompts::EVIDENCE_SYSTEM)
        .json()
        .with_timeout(budget);
    let run = provider.generate(&request).await;
    if !run.has_text() {
        return Vec::new();
    }
    match validator::validate_object(&run.text) {
        Ok(value) => value
            .get("evidence")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|row| validator::parse_evidence_row(row, &claim.canonical_id))
            .take(MAX_HINTS_PER_CLAIM)
            .collect(),
        Err(failure) => {
            debug!(claim = %claim.canonical_id, %failure, "evidence response rejected");
            Vec::new()
        }
    }
}

/// Propose evidence for all claims, keyed by canonical id.
///
/// A single claim goes through the per-claim contract; multiple claims
/// go through the canonical batch contract with automatic fallback to
/// the legacy one.
pub async fn evidence_for_claims(
    provider: &dyn TextProvider,
    claims: &[AtomicClaim],
    budget: Duration,
) -> HashMap<String, Vec<EvidenceHypothesis>> {
    match claims {
        [] => HashMap::new(),
        [only] => {
            let hints = evidence_for_claim(provider, only, budget).await;
            if hints.is_empty() {
                HashMap::new()
            } else {
                HashMap::from([(only.canonical_id.clone(), hints)])
            }
        }
        many => {
            let map = evidence_batch(provider, many, budget).await;
            if !map.is_empty() {
                return map;
            }
            debug!("canonical evidence batch keyed nothing, retrying legacy contract");
            evidence_batch_legacy(provider, many, budget).await
        }
    }
}

async fn evidence_batch(
    provider: &dyn TextProvider,
    claims: &[AtomicClaim],
    budget: Duration,
) -> HashMap<String, Vec<EvidenceHypothesis>> {
    let items = claims
        .iter()
        .map(|c| {
            serde_json::json!({"claim_canonical_id": c.canonical_id, "text": c.text}).to_string()
        })
        .collect::<Vec<_>>()
        .join("\n");
    let request = GenerateRequest::new(prompts::evidence_batch_prompt(&items))
        .with_system(prompts::EVIDENCE_SYSTEM)
        .json()
        .with_timeout(budget);
    let run = provider.generate(&request).await;
    if !run.has_text() {
        return HashMap::new();
    }

    let known: HashSet<&str> = claims.iter().map(|c| c.canonical_id.as_str()).collect();
    let mut out: HashMap<String, Vec<EvidenceHypothesis>> = HashMap::new();
    match validator::validate_object(&run.text) {
        Ok(value) => {
            for entry in value
                .get("evidence")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let Some(id) = entry.get("claim_canonical_id").and_then(Value::as_str) else {
                    continue;
                };
                // Fabricated ids are dropped rather than creating orphans.
                if !known.contains(id) {
                    continue;
                }
                let hints: Vec<EvidenceHypothesis> = entry
                    .get("hints")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(|row| validator::parse_evidence_row(row, id))
                    .take(MAX_HINTS_PER_CLAIM)
                    .collect();
                if !hints.is_empty() {
                    out.insert(id.to_string(), hints);
                }
            }
        }
        Err(failure) => {
            debug!(%failure, "evidence batch rejected");
        }
    }
    out
}

async fn evidence_batch_legacy(
    provider: &dyn TextProvider,
    claims: &[AtomicClaim],
    budget: Duration,
) -> HashMap<String, Vec<EvidenceHypothesis>> {
    let payload = claims
        .iter()
        .map(|c| format!("- {}", c.text))
        .collect::<Vec<_>>()
        .join("\n");
    let request = GenerateRequest::new(prompts::evidence_batch_legacy_prompt(&payload))
        .with_system(prompts::EVIDENCE_SYSTEM)
        .json()
        .with_timeout(budget);
    let run = provider.generate(&request).await;
    if !run.has_text() {
        return HashMap::new();
    }

    let by_text: HashMap<String, &AtomicClaim> = claims
        .iter()
        .map(|c| (c.normalized_text(), c))
        .collect();
    let mut out: HashMap<String, Vec<EvidenceHypothesis>> = HashMap::new();
    match validator::validate_object(&run.text) {
        Ok(value) => {
            for entry in value
                .get("evidence")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let Some(text) = entry.get("claim").and_then(Value::as_str) else {
                    continue;
                };
                let Some(claim) = by_text.get(&utils::normalize_text(text)) else {
                    continue;
                };
                let hints: Vec<EvidenceHypothesis> = entry
                    .get("hints")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(|row| {
                        serde_json::from_value::<LegacyEvidenceSlot>(row.clone()).ok()
                    })
                    .filter_map(|slot| legacy::upgrade_evidence(&slot, &claim.canonical_id))
                    .take(MAX_HINTS_PER_CLAIM)
                    .collect();
                if !hints.is_empty() {
                    out.insert(claim.canonical_id.clone(), hints);
                }
            }
        }
        Err(failure) => {
            debug!(%failure, "legacy evidence batch rejected");
        }
    }
    out
}
