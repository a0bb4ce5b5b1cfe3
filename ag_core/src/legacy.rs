//! First-generation (batch) data shapes and the adapters between the two
//! schema generations.
//!
//! The legacy generation predates canonical ids: enrichments were keyed
//! by claim text, years were strings, scores sometimes ran 0..100, and
//! the result envelope was an array of enriched claims plus `_meta`.
//! Both generations coexist behind one public contract; these pure, total
//! functions convert at the boundary so business rules never branch on
//! "which generation is this".

use crate::types::{
    AtomicClaim, EnrichedClaim, EvidenceHypothesis, JurisdictionLevel, Perspectives,
    PipelineResult, ReadabilityTier, ScoreAxis, ScoreOrigin, ScoreSet, SourceType, YEAR_MAX,
    YEAR_MIN,
};
use serde::{Deserialize, Serialize};

/// Legacy claim: no canonical id, no language/readability, ASCII-keyed
/// `measure` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyClaim {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub time_period: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub level: Option<JurisdictionLevel>,
    #[serde(default)]
    pub affected_parties: Vec<String>,
    #[serde(default)]
    pub measure: Option<String>,
    #[serde(default)]
    pub uncertainties: Vec<String>,
}

/// Legacy jurisdiction entry, joined to claims by normalized text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyJurisdiction {
    pub level: JurisdictionLevel,
    pub organ: String,
    pub rationale: String,
}

/// Legacy evidence slot: `query` instead of `search_query`, year as a
/// string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyEvidenceSlot {
    pub source_type: SourceType,
    pub query: String,
    #[serde(default)]
    pub expected_metric: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

/// Legacy perspectives carried the alternative as a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyPerspectives {
    #[serde(default)]
    pub pro: Vec<String>,
    #[serde(default)]
    pub contra: Vec<String>,
    #[serde(default)]
    pub alternative: Vec<String>,
}

/// Legacy editorial score: axes sometimes 0..100, one flat reasons list,
/// and a derived total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyEditorialScore {
    pub precision: f64,
    pub verifiability: f64,
    pub relevance: f64,
    pub readability: f64,
    pub balance: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    pub total: f64,
}

/// Legacy enriched claim: claim fields flattened next to enrichments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyEnrichedClaim {
    #[serde(flatten)]
    pub claim: LegacyClaim,
    pub jurisdiction: Option<LegacyJurisdiction>,
    pub evidence: Vec<LegacyEvidenceSlot>,
    pub perspectives: LegacyPerspectives,
    pub editorial: LegacyEditorialScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyStep {
    pub name: String,
    pub ms: u64,
    pub ok: bool,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyMeta {
    pub ok: bool,
    pub took_ms: u64,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt_version: Option<String>,
    #[serde(default)]
    pub fallback_used: bool,
    #[serde(default)]
    pub steps: Vec<LegacyStep>,
}

/// Legacy result envelope: claims array plus `_meta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyResult {
    pub claims: Vec<LegacyEnrichedClaim>,
    #[serde(rename = "_meta")]
    pub meta: LegacyMeta,
}

/// Upgrade a legacy claim to the canonical shape.
///
/// Derives the canonical id from the text, defaults language to "de" and
/// readability to B1, and falls back to "count" for a missing measure.
#[must_use]
pub fn upgrade_claim(claim: &LegacyClaim, fallback_measure: Option<&str>) -> AtomicClaim {
    let mut upgraded = AtomicClaim::from_text(&claim.text);
    upgraded.id = claim.id.clone();
    upgraded.topic = claim.topic.clone();
    upgraded.time_period = claim.time_period.clone();
    upgraded.place = claim.place.clone();
    upgraded.level = claim.level;
    upgraded.affected_parties = claim.affected_parties.clone();
    upgraded.measurement_unit = claim
        .measure
        .clone()
        .or_else(|| fallback_measure.map(str::to_string))
        .unwrap_or_else(|| "count".to_string());
    upgraded.uncertainties = claim.uncertainties.clone();
    upgraded
}

/// Upgrade a legacy evidence slot, re-keying it by canonical id.
///
/// Slots with empty queries are unusable and yield `None`; implausible
/// years are coerced to `None` rather than dropping the slot.
#[must_use]
pub fn upgrade_evidence(
    slot: &LegacyEvidenceSlot,
    claim_canonical_id: &str,
) -> Option<EvidenceHypothesis> {
    let query = slot.query.trim();
    if query.is_empty() {
        return None;
    }
    let year = slot
        .year
        .as_deref()
        .and_then(|y| y.trim().parse::<i32>().ok())
        .filter(|y| (YEAR_MIN..=YEAR_MAX).contains(y));
    Some(EvidenceHypothesis {
        claim_canonical_id: claim_canonical_id.to_string(),
        source_type: slot.source_type,
        search_query: query.to_string(),
        expected_metric: slot.expected_metric.clone().unwrap_or_default(),
        year,
    })
}

/// Upgrade legacy perspectives: cap both sides, collapse the alternative
/// list to its first entry.
#[must_use]
pub fn upgrade_perspectives(p: &LegacyPerspectives) -> Perspectives {
    let alternative = p
        .alternative
        .first()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "Alternative proposal pending.".to_string());
    Perspectives {
        pro: p.pro.iter().take(3).cloned().collect(),
        contra: p.contra.iter().take(3).cloned().collect(),
        alternative,
    }
}

/// Upgrade a legacy score, normalizing 0..100 axes into [0,1].
#[must_use]
pub fn upgrade_score(s: &LegacyEditorialScore) -> ScoreSet {
    let norm = |v: f64| if v > 1.0 { v / 100.0 } else { v };
    let joined = s.reasons.join("; ");
    let axis = |v: f64, label: &str| {
        let justification = if joined.is_empty() {
            format!("no {} justification recorded", label)
        } else {
            joined.clone()
        };
        ScoreAxis::new(norm(v), justification)
    };
    ScoreSet {
        precision: axis(s.precision, "precision"),
        verifiability: axis(s.verifiability, "verifiability"),
        relevance: axis(s.relevance, "relevance"),
        readability: axis(s.readability, "readability"),
        balance: axis(s.balance, "balance"),
        origin: ScoreOrigin::Rated,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn downgrade_claim(claim: &AtomicClaim) -> LegacyClaim {
    LegacyClaim {
        id: claim.id.clone(),
        text: claim.text.clone(),
        topic: claim.topic.clone(),
        time_period: claim.time_period.clone(),
        place: claim.place.clone(),
        level: claim.level,
        affected_parties: claim.affected_parties.clone(),
        measure: Some(claim.measurement_unit.clone()),
        uncertainties: claim.uncertainties.clone(),
    }
}

fn downgrade_score(score: &ScoreSet) -> LegacyEditorialScore {
    let values = [
        score.precision.value,
        score.verifiability.value,
        score.relevance.value,
        score.readability.value,
        score.balance.value,
    ];
    LegacyEditorialScore {
        precision: round2(values[0]),
        verifiability: round2(values[1]),
        relevance: round2(values[2]),
        readability: round2(values[3]),
        balance: round2(values[4]),
        reasons: score
            .axes()
            .iter()
            .map(|a| a.justification.clone())
            .collect(),
        total: round2(values.iter().sum()),
    }
}

/// Wrap a canonical pipeline result into the legacy batch envelope for
/// downstream consumers still on the first-generation shape.
#[must_use]
pub fn to_legacy_result(result: &PipelineResult) -> LegacyResult {
    let claims = result
        .claims
        .iter()
        .map(|enriched| LegacyEnrichedClaim {
            claim: downgrade_claim(&enriched.claim),
            jurisdiction: enriched.jurisdiction.as_ref().map(|j| LegacyJurisdiction {
                level: j.level,
                organ: j.organ.clone().unwrap_or_default(),
                rationale: j.rationale.clone().unwrap_or_default(),
            }),
            evidence: enriched
                .evidence
                .iter()
                .map(|e| LegacyEvidenceSlot {
                    source_type: e.source_type,
                    query: e.search_query.clone(),
                    expected_metric: Some(e.expected_metric.clone()),
                    year: e.year.map(|y| y.to_string()),
                })
                .collect(),
            perspectives: enriched
                .perspectives
                .as_ref()
                .map(|p| LegacyPerspectives {
                    pro: p.pro.clone(),
                    contra: p.contra.clone(),
                    alternative: vec![p.alternative.clone()],
                })
                .unwrap_or_default(),
            editorial: downgrade_score(&enriched.score),
        })
        .collect();
    LegacyResult {
        claims,
        meta: LegacyMeta {
            ok: result.meta.ok,
            took_ms: result.meta.elapsed_ms,
            model: Some(result.meta.model.clone()),
            prompt_version: Some(result.meta.prompt_version.clone()),
            fallback_used: result.meta.fallback.any(),
            steps: result
                .meta
                .steps
                .iter()
                .map(|s| LegacyStep {
                    name: s.stage.to_string(),
                    ms: s.elapsed_ms,
                    ok: s.ok,
                    note: s.note.clone(),
                })
                .collect(),
        },
    }
}

/// Drop-in check used by tests and the readability gate: an upgraded
/// claim must land in the canonical defaults.
#[must_use]
pub fn upgraded_defaults_hold(claim: &AtomicClaim) -> bool {
    claim.language == "de" && claim.readability == ReadabilityTier::B1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FallbackFlags, PipelineMeta, QualityGate, TerminalReason};
    use chrono::Utc;
    use uuid::Uuid;

    fn legacy_claim(text: &str) -> LegacyClaim {
        LegacyClaim {
            id: "c1".to_string(),
            text: text.to_string(),
            topic: None,
            time_period: Some("2024".to_string()),
            place: Some("Berlin".to_string()),
            level: Some(JurisdictionLevel::Local),
            affected_parties: vec!["commuters".to_string()],
            measure: None,
            uncertainties: vec![],
        }
    }

    #[test]
    fn test_upgrade_claim_derives_canonical_id_like_direct_path() {
        let text = "Public transit should become free.";
        let upgraded = upgrade_claim(&legacy_claim(text), None);
        let direct = AtomicClaim::from_text(text);
        assert_eq!(upgraded.canonical_id, direct.canonical_id);
        assert_eq!(upgraded.id, "c1");
        assert_eq!(upgraded.measurement_unit, "count");
        assert!(upgraded_defaults_hold(&upgraded));
    }

    #[test]
    fn test_upgrade_evidence_requires_query_and_plausible_year() {
        let slot = LegacyEvidenceSlot {
            source_type: SourceType::Press,
            query: "fare revenue statistics".to_string(),
            expected_metric: Some("EUR".to_string()),
            year: Some("2022".to_string()),
        };
        let h = upgrade_evidence(&slot, "cafe1234cafe1234").unwrap();
        assert_eq!(h.year, Some(2022));
        assert_eq!(h.claim_canonical_id, "cafe1234cafe1234");

        let empty = LegacyEvidenceSlot {
            query: "   ".to_string(),
            ..slot.clone()
        };
        assert!(upgrade_evidence(&empty, "x").is_none());

        let ancient = LegacyEvidenceSlot {
            year: Some("1492".to_string()),
            ..slot
        };
        assert_eq!(upgrade_evidence(&ancient, "x").unwrap().year, None);
    }

    #[test]
    fn test_upgrade_score_normalizes_percent_scale() {
        let legacy = LegacyEditorialScore {
            precision: 80.0,
            verifiability: 0.7,
            relevance: 100.0,
            readability: 0.4,
            balance: 55.0,
            reasons: vec!["clear wording".to_string()],
            total: 0.0,
        };
        let score = upgrade_score(&legacy);
        assert!((score.precision.value - 0.8).abs() < 1e-9);
        assert!((score.verifiability.value - 0.7).abs() < 1e-9);
        assert!((score.relevance.value - 1.0).abs() < 1e-9);
        assert_eq!(score.origin, ScoreOrigin::Rated);
        assert_eq!(score.balance.justification, "clear wording");
    }

    #[test]
    fn test_downgrade_rounds_and_totals() {
        let enriched = EnrichedClaim {
            claim: AtomicClaim::from_text("Rents rose by ten percent."),
            jurisdiction: None,
            evidence: vec![],
            perspectives: None,
            score: ScoreSet {
                precision: ScoreAxis::new(0.333, "a"),
                verifiability: ScoreAxis::new(0.5, "b"),
                relevance: ScoreAxis::new(0.5, "c"),
                readability: ScoreAxis::new(0.5, "d"),
                balance: ScoreAxis::new(0.5, "e"),
                origin: ScoreOrigin::Rated,
            },
            quality: QualityGate {
                json_valid: true,
                atomization_complete: true,
                readability_in_band: true,
                jurisdiction_present: false,
                evidence_present: false,
            },
        };
        let result = PipelineResult {
            claims: vec![enriched],
            meta: PipelineMeta {
                ok: true,
                run_id: Uuid::new_v4(),
                started_at: Utc::now(),
                elapsed_ms: 42,
                prompt_version: "v2".to_string(),
                model: "test-model".to_string(),
                steps: vec![],
                fallback: FallbackFlags::default(),
                reason: None::<TerminalReason>,
            },
        };
        let legacy = to_legacy_result(&result);
        assert_eq!(legacy.claims.len(), 1);
        let editorial = &legacy.claims[0].editorial;
        assert!((editorial.precision - 0.33).abs() < 1e-9);
        assert!((editorial.total - 2.33).abs() < 1e-9);
        assert_eq!(editorial.reasons.len(), 5);
        assert!(legacy.claims[0].perspectives.alternative.is_empty());
        assert_eq!(legacy.meta.took_ms, 42);
    }
}
