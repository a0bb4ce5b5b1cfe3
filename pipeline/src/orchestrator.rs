//! Pipeline orchestration.
//!
//! One entry point, [`analyze`], drives atomicization and the four
//! enrichment roles under per-stage timeout budgets. Every stage is
//! raced against its budget; a lost race degrades that stage's slot and
//! is recorded in the step metadata, it never aborts the run. The
//! orchestrator always returns a structurally valid result: the only
//! terminal condition is zero extractable claims, reported inside the
//! result rather than as an error.

use ag_core::legacy::{self, LegacyResult};
use ag_core::types::{
    AnalyzeOptions, AtomicClaim, EnrichedClaim, EvidenceHypothesis, FallbackFlags, Jurisdiction,
    Perspectives, PipelineMeta, PipelineResult, ScoreSet, Stage, StageReport, TerminalReason,
    PROMPT_VERSION,
};
use ag_core::TextProvider;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::atomicizer::{self, AtomicizeOutcome};
use crate::quality;
use crate::roles::{assigner, evidence, perspectives, rater};

/// Slack granted on top of the atomicizer budget so its internal
/// provider timeout, not the outer race, is the one that normally fires.
const ATOMICIZE_GRACE: Duration = Duration::from_millis(500);

const BUDGET_NOTE: &str = "stage budget exhausted";

/// Race a stage future against its budget.
///
/// `None` means the budget was exhausted; the caller substitutes that
/// stage's degraded value.
async fn staged<T, F>(stage: Stage, budget: Duration, fut: F) -> (Option<T>, StageReport)
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    match tokio::time::timeout(budget, fut).await {
        Ok(value) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            info!(%stage, elapsed_ms, "stage complete");
            (
                Some(value),
                StageReport {
                    stage,
                    elapsed_ms,
                    ok: true,
                    note: None,
                },
            )
        }
        Err(_) => {
            warn!(%stage, budget_ms = budget.as_millis() as u64, "stage budget exhausted");
            (
                None,
                StageReport {
                    stage,
                    elapsed_ms: start.elapsed().as_millis() as u64,
                    ok: false,
                    note: Some(BUDGET_NOTE.to_string()),
                },
            )
        }
    }
}

/// Distill input text into enriched atomic claims.
///
/// Never fails: degraded stages leave empty slots and set fallback
/// flags, and the zero-claims case comes back as `meta.ok = false` with
/// a reason code.
pub async fn analyze(
    provider: &dyn TextProvider,
    text: &str,
    options: &AnalyzeOptions,
) -> PipelineResult {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let start = Instant::now();
    let budgets = options.budgets;
    info!(%run_id, provider = provider.name(), chars = text.chars().count(), "analyze start");

    let mut steps: Vec<StageReport> = Vec::with_capacity(5);
    let mut fallback = FallbackFlags::default();

    // Atomicize. The provider call inside already honors the budget; the
    // outer race only catches a backend that ignores its deadline.
    let (outcome, report) = staged(
        Stage::Atomicize,
        budgets.atomicize + ATOMICIZE_GRACE,
        atomicizer::atomicize(provider, text, options.max_claims, budgets.atomicize),
    )
    .await;
    let outcome = outcome.unwrap_or_else(|| AtomicizeOutcome {
        claims: atomicizer::heuristic_split(
            utils::truncate_chars(text.trim(), ag_core::types::MAX_INPUT_CHARS),
            options.max_claims,
        ),
        fallback_used: true,
    });
    fallback.atomicize = outcome.fallback_used;
    steps.push(report);
    let claims = outcome.claims;

    if claims.is_empty() {
        info!(%run_id, "no claims extractable, terminating");
        return PipelineResult {
            claims: Vec::new(),
            meta: PipelineMeta {
                ok: false,
                run_id,
                started_at,
                elapsed_ms: start.elapsed().as_millis() as u64,
                prompt_version: PROMPT_VERSION.to_string(),
                model: provider.model().to_string(),
                steps,
                fallback,
                reason: Some(TerminalReason::NoClaimsExtractable),
            },
        };
    }

    // Independent enrichment stages run concurrently, each under its own
    // budget.
    let ((assigned, assign_report), (evidence_map, evidence_report), (persp, persp_report)) = tokio::join!(
        staged(
            Stage::Assign,
            budgets.assign,
            assigner::assign_all(provider, &claims, budgets.assign),
        ),
        staged(
            Stage::Evidence,
            budgets.evidence,
            evidence::evidence_for_claims(provider, &claims, budgets.evidence),
        ),
        staged(
            Stage::Perspectives,
            budgets.perspectives,
            perspectives::perspectives_all(provider, &claims, budgets.perspectives),
        ),
    );

    let assigned: Vec<Option<Jurisdiction>> =
        assigned.unwrap_or_else(|| vec![None; claims.len()]);
    fallback.assign = !assign_report.ok || assigned.iter().all(Option::is_none);
    steps.push(assign_report);

    let evidence_map: HashMap<String, Vec<EvidenceHypothesis>> =
        evidence_map.unwrap_or_default();
    fallback.evidence = !evidence_report.ok || evidence_map.is_empty();
    steps.push(evidence_report);

    let persp: Vec<Option<Perspectives>> = persp.unwrap_or_else(|| vec![None; claims.len()]);
    fallback.perspectives = !persp_report.ok || persp.iter().all(Option::is_none);
    steps.push(persp_report);

    // Scores depend on nothing else; rating runs after so the enrichment
    // budgets are not shared with it.
    let (scores, rate_report) = staged(
        Stage::Rate,
        budgets.rate,
        rater::rate_all(provider, &claims, budgets.rate),
    )
    .await;
    let scores: Vec<ScoreSet> =
        scores.unwrap_or_else(|| claims.iter().map(|_| ScoreSet::timeout_default()).collect());
    fallback.rate = !rate_report.ok || scores.iter().any(ScoreSet::is_placeholder);
    steps.push(rate_report);

    let json_valid = !fallback.atomicize;
    let claims = assemble(claims, assigned, &evidence_map, persp, scores, json_valid);

    let meta = PipelineMeta {
        ok: true,
        run_id,
        started_at,
        elapsed_ms: start.elapsed().as_millis() as u64,
        prompt_version: PROMPT_VERSION.to_string(),
        model: provider.model().to_string(),
        steps,
        fallback,
        reason: None,
    };
    info!(%run_id, claims = claims.len(), degraded = meta.fallback.any(),
          elapsed_ms = meta.elapsed_ms, "analyze done");
    PipelineResult { claims, meta }
}

fn assemble(
    claims: Vec<AtomicClaim>,
    assigned: Vec<Option<Jurisdiction>>,
    evidence_map: &HashMap<String, Vec<EvidenceHypothesis>>,
    persp: Vec<Option<Perspectives>>,
    scores: Vec<ScoreSet>,
    json_valid: bool,
) -> Vec<EnrichedClaim> {
    claims
        .into_iter()
        .zip(assigned)
        .zip(persp)
        .zip(scores)
        .map(|(((claim, jurisdiction), perspectives), score)| {
            let evidence = evidence_map
                .get(&claim.canonical_id)
                .cloned()
                .unwrap_or_default();
            let quality =
                quality::derive_gate(&claim, jurisdiction.as_ref(), &evidence, json_valid);
            EnrichedClaim {
                claim,
                jurisdiction,
                evidence,
                perspectives,
                score,
                quality,
            }
        })
        .collect()
}

/// Run the pipeline and wrap the result in the first-generation batch
/// envelope.
pub async fn analyze_legacy(
    provider: &dyn TextProvider,
    text: &str,
    options: &AnalyzeOptions,
) -> LegacyResult {
    let result = analyze(provider, text, options).await;
    legacy::to_legacy_result(&result)
}
