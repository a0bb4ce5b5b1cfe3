//! End-to-end pipeline runs against a stage-aware scripted backend.

use ag_core::types::{
    AnalyzeOptions, GenerateRequest, JurisdictionLevel, ProviderRun, StageBudgets, TerminalReason,
};
use ag_core::TextProvider;
use async_trait::async_trait;
use pipeline::{analyze, analyze_legacy};
use serde_json::{json, Value};
use std::time::Duration;

const INPUT: &str =
    "Public transit should be free for all residents. Rents rose by twelve percent last year.";

/// Which stage a request belongs to, recognized from its prompt contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Atomicize,
    Assign,
    Evidence,
    Perspectives,
    Rate,
}

fn classify(request: &GenerateRequest) -> Role {
    if request.prompt.contains("atomicizer") {
        Role::Atomicize
    } else if request.prompt.contains("five editorial axes") {
        Role::Rate
    } else if request.prompt.contains("balanced viewpoints")
        || request.prompt.contains("arguments in\nfavor")
    {
        Role::Perspectives
    } else if request.prompt.contains("evidence") {
        Role::Evidence
    } else {
        Role::Assign
    }
}

/// A backend that answers each stage with schema-correct JSON, with
/// per-stage switches to misbehave.
struct StageBackend {
    claims: Vec<&'static str>,
    /// Stages that answer with prose instead of JSON.
    broken: Vec<Role>,
    /// Stages that hang past any reasonable budget.
    stalled: Vec<Role>,
}

impl StageBackend {
    fn healthy() -> Self {
        StageBackend {
            claims: vec![
                "Public transit should be free for all residents.",
                "Rents rose by twelve percent last year.",
            ],
            broken: Vec::new(),
            stalled: Vec::new(),
        }
    }

    fn answer(&self, role: Role, request: &GenerateRequest) -> Value {
        match role {
            Role::Atomicize => json!({
                "claims": self.claims.iter().map(|text| json!({
                    "text": text,
                    "topic": "transport",
                    "level": "local",
                    "affected_parties": ["residents"],
                })).collect::<Vec<_>>()
            }),
            Role::Assign => json!({
                "level": "local",
                "organ": "city council",
                "topic_key": "transport",
                "rationale": "municipal competence",
            }),
            Role::Evidence => {
                // The batch prompt embeds one JSON item per line; answer
                // for exactly the ids it asked about.
                let entries: Vec<Value> = request
                    .prompt
                    .lines()
                    .filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
                    .filter_map(|item| {
                        let id = item.get("claim_canonical_id")?.as_str()?.to_string();
                        Some(json!({
                            "claim_canonical_id": id,
                            "hints": [{
                                "source_type": "official",
                                "search_query": "municipal statistics",
                                "expected_metric": "EUR per year",
                                "year": 2023,
                            }],
                        }))
                    })
                    .collect();
                json!({"evidence": entries})
            }
            Role::Perspectives => json!({
                "pro": ["affordable mobility"],
                "contra": ["budget pressure"],
                "alternative": "Targeted fare subsidies.",
            }),
            Role::Rate => json!({
                "precision": {"value": 0.8, "justification": "concrete"},
                "verifiability": {"value": 0.7, "justification": "statistics exist"},
                "relevance": {"value": 0.9, "justification": "live debate"},
                "readability": {"value": 0.8, "justification": "plain"},
                "balance": {"value": 0.6, "justification": "one-sided"},
            }),
        }
    }
}

#[async_trait]
impl TextProvider for StageBackend {
    fn name(&self) -> &'static str {
        "stage-backend"
    }

    fn model(&self) -> &str {
        "stage-model"
    }

    fn configured(&self) -> bool {
        true
    }

    async fn generate(&self, request: &GenerateRequest) -> ProviderRun {
        let role = classify(request);
        if self.stalled.contains(&role) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.broken.contains(&role) {
            return ProviderRun::success("cannot help with that".to_string(), None, 2);
        }
        ProviderRun::success(self.answer(role, request).to_string(), None, 5)
    }
}

#[tokio::test]
async fn healthy_backend_yields_fully_enriched_claims() {
    let backend = StageBackend::healthy();
    let result = analyze(&backend, INPUT, &AnalyzeOptions::default()).await;

    assert!(result.meta.ok);
    assert!(!result.meta.fallback.any());
    assert_eq!(result.meta.model, "stage-model");
    assert_eq!(result.meta.prompt_version, "v2");
    assert_eq!(result.claims.len(), 2);
    assert_eq!(result.meta.steps.len(), 5);
    assert!(result.meta.steps.iter().all(|s| s.ok));

    for enriched in &result.claims {
        let jurisdiction = enriched.jurisdiction.as_ref().unwrap();
        assert_eq!(jurisdiction.level, JurisdictionLevel::Local);
        assert_eq!(jurisdiction.topic_key, "transport");
        assert_eq!(enriched.evidence.len(), 1);
        assert_eq!(enriched.evidence[0].claim_canonical_id, enriched.claim.canonical_id);
        assert!(enriched.perspectives.is_some());
        assert!(!enriched.score.is_placeholder());
        assert!(enriched.quality.json_valid);
        assert!(enriched.quality.jurisdiction_present);
        assert!(enriched.quality.evidence_present);
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_assigner_degrades_only_its_slot() {
    let backend = StageBackend {
        stalled: vec![Role::Assign],
        ..StageBackend::healthy()
    };
    let options = AnalyzeOptions {
        max_claims: 6,
        budgets: StageBudgets::uniform(Duration::from_secs(2)),
    };
    let result = analyze(&backend, INPUT, &options).await;

    assert!(result.meta.ok);
    assert!(result.meta.fallback.assign);
    assert!(!result.meta.fallback.evidence);
    assert!(!result.meta.fallback.perspectives);
    assert!(!result.meta.fallback.rate);
    for enriched in &result.claims {
        assert!(enriched.jurisdiction.is_none());
        assert!(!enriched.evidence.is_empty());
        assert!(enriched.perspectives.is_some());
        assert!(!enriched.score.is_placeholder());
        assert!(!enriched.quality.jurisdiction_present);
    }
    let assign_step = result
        .meta
        .steps
        .iter()
        .find(|s| s.stage.to_string() == "assign")
        .unwrap();
    assert!(!assign_step.ok);
    assert!(assign_step.note.is_some());
}

#[tokio::test]
async fn broken_evidence_stage_leaves_empty_lists() {
    let backend = StageBackend {
        broken: vec![Role::Evidence],
        ..StageBackend::healthy()
    };
    let result = analyze(&backend, INPUT, &AnalyzeOptions::default()).await;

    assert!(result.meta.ok);
    assert!(result.meta.fallback.evidence);
    for enriched in &result.claims {
        assert!(enriched.evidence.is_empty());
        assert!(!enriched.quality.evidence_present);
        // The other slots are unaffected.
        assert!(enriched.jurisdiction.is_some());
        assert!(enriched.perspectives.is_some());
    }
}

#[tokio::test]
async fn canonical_ids_are_stable_across_runs() {
    let backend = StageBackend::healthy();
    let first = analyze(&backend, INPUT, &AnalyzeOptions::default()).await;
    let second = analyze(&backend, INPUT, &AnalyzeOptions::default()).await;
    let ids = |r: &ag_core::types::PipelineResult| {
        r.claims.iter().map(|c| c.claim.canonical_id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_ne!(first.meta.run_id, second.meta.run_id);
}

#[tokio::test]
async fn empty_input_reports_terminal_reason() {
    let backend = StageBackend::healthy();
    let result = analyze(&backend, "", &AnalyzeOptions::default()).await;
    assert!(!result.meta.ok);
    assert_eq!(result.meta.reason, Some(TerminalReason::NoClaimsExtractable));
    assert!(result.claims.is_empty());
}

#[tokio::test]
async fn legacy_envelope_round_trips_enrichments() {
    let backend = StageBackend::healthy();
    let legacy = analyze_legacy(&backend, INPUT, &AnalyzeOptions::default()).await;

    assert!(legacy.meta.ok);
    assert!(!legacy.meta.fallback_used);
    assert_eq!(legacy.claims.len(), 2);
    let first = &legacy.claims[0];
    assert_eq!(first.jurisdiction.as_ref().unwrap().organ, "city council");
    assert_eq!(first.evidence[0].query, "municipal statistics");
    assert_eq!(first.evidence[0].year.as_deref(), Some("2023"));
    assert_eq!(first.perspectives.alternative, vec!["Targeted fare subsidies."]);
    assert!(first.editorial.total > 0.0);

    // The envelope serializes with the legacy `_meta` key.
    let value = serde_json::to_value(&legacy).unwrap();
    assert!(value.get("_meta").is_some());
}
