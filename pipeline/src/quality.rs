//! Quality gate derivation.
//!
//! The gate is recomputed from the enriched claim at assembly time; it is
//! never mutated independently, so it cannot drift from the data it
//! describes.

use ag_core::types::{AtomicClaim, EvidenceHypothesis, Jurisdiction, QualityGate};

/// A claim counts as atomic when its text is non-empty and contains no
/// internal sentence boundary.
fn is_atomic(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    let interior = trimmed.trim_end_matches(['.', '!', '?']);
    !interior.contains(['.', '!', '?'])
}

/// Compute the completeness gate for one enriched claim.
#[must_use]
pub fn derive_gate(
    claim: &AtomicClaim,
    jurisdiction: Option<&Jurisdiction>,
    evidence: &[EvidenceHypothesis],
    json_valid: bool,
) -> QualityGate {
    QualityGate {
        json_valid,
        atomization_complete: is_atomic(&claim.text),
        readability_in_band: claim.readability.in_target_band(),
        jurisdiction_present: jurisdiction.is_some(),
        evidence_present: evidence.iter().any(EvidenceHypothesis::is_usable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::types::{JurisdictionLevel, SourceType};
    use testing::claim;

    fn jurisdiction() -> Jurisdiction {
        Jurisdiction {
            level: JurisdictionLevel::Local,
            organ: Some("city council".to_string()),
            topic_key: "transport".to_string(),
            rationale: None,
        }
    }

    fn hypothesis(query: &str) -> EvidenceHypothesis {
        EvidenceHypothesis {
            claim_canonical_id: "cid".to_string(),
            source_type: SourceType::Official,
            search_query: query.to_string(),
            expected_metric: String::new(),
            year: None,
        }
    }

    #[test]
    fn test_gate_reflects_enrichments() {
        let c = claim("Transit should be free.");
        let j = jurisdiction();
        let evidence = [hypothesis("fare statistics")];
        let gate = derive_gate(&c, Some(&j), &evidence, true);
        assert!(gate.atomization_complete);
        assert!(gate.readability_in_band);
        assert!(gate.jurisdiction_present);
        assert!(gate.evidence_present);
        assert!(gate.json_valid);
    }

    #[test]
    fn test_gate_flags_missing_enrichments() {
        let c = claim("Transit should be free. And parking should not.");
        let evidence = [hypothesis("   ")];
        let gate = derive_gate(&c, None, &evidence, false);
        assert!(!gate.atomization_complete);
        assert!(!gate.jurisdiction_present);
        assert!(!gate.evidence_present);
        assert!(!gate.json_valid);
    }
}
