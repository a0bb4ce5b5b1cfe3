//! Canonical data model for the claim-distillation pipeline.
//!
//! All entities are created and consumed within a single orchestration
//! call; nothing here is persisted. Mutation is strictly additive: each
//! pipeline stage only fills the fields it owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Version tag for the prompt catalog, recorded in result metadata.
pub const PROMPT_VERSION: &str = "v2";

/// Input text is bounded before processing (truncate, don't reject).
pub const MAX_INPUT_CHARS: usize = 8000;

/// Upper bound for a single claim text.
pub const MAX_CLAIM_TEXT_CHARS: usize = 4000;

/// Plausible year range for evidence hypotheses.
pub const YEAR_MIN: i32 = 1900;
pub const YEAR_MAX: i32 = 2100;

/// Fixed topic taxonomy the jurisdiction assigner maps onto. Unknown keys
/// are folded to `"other"` rather than rejected.
pub const TOPIC_TAXONOMY: [&str; 15] = [
    "climate_energy",
    "transport",
    "housing",
    "health",
    "education",
    "migration",
    "economy_labor",
    "taxes_finance",
    "digital",
    "security",
    "justice",
    "agriculture_environment",
    "social_welfare",
    "culture_media",
    "foreign_eu",
];

/// Fold a free-form topic key onto the fixed taxonomy.
#[must_use]
pub fn normalize_topic_key(raw: &str) -> String {
    let key = raw.trim().to_lowercase().replace([' ', '-'], "_");
    if TOPIC_TAXONOMY.contains(&key.as_str()) {
        key
    } else {
        "other".to_string()
    }
}

/// Political level a claim's subject matter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JurisdictionLevel {
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "national")]
    National,
    #[serde(rename = "regional")]
    Regional,
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "unclear")]
    Unclear,
}

/// Source category an evidence hypothesis proposes to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Official,
    Press,
    Research,
}

/// Target readability band for claim texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadabilityTier {
    A2,
    B1,
    B2,
}

impl ReadabilityTier {
    /// The editorial target band is B1/B2; A2 falls below it.
    #[must_use]
    pub fn in_target_band(self) -> bool {
        matches!(self, ReadabilityTier::B1 | ReadabilityTier::B2)
    }
}

/// A single, one-sentence, independently fact-checkable statement
/// extracted from input text.
///
/// `canonical_id` is a pure function of the normalized text and is the
/// join key between a claim and its enrichments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicClaim {
    pub id: String,
    pub text: String,
    pub canonical_id: String,
    /// Free-text summary of the underlying matter, when stated.
    pub topic: Option<String>,
    pub time_period: Option<String>,
    pub place: Option<String>,
    pub level: Option<JurisdictionLevel>,
    pub affected_parties: Vec<String>,
    pub measurement_unit: String,
    pub uncertainties: Vec<String>,
    pub language: String,
    pub readability: ReadabilityTier,
}

impl AtomicClaim {
    /// Build a claim from bare text, deriving ids and filling defaults.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        AtomicClaim {
            id: utils::claim_id(text),
            text: utils::truncate_chars(text, MAX_CLAIM_TEXT_CHARS).to_string(),
            canonical_id: utils::canonical_id(text),
            topic: None,
            time_period: None,
            place: None,
            level: None,
            affected_parties: Vec::new(),
            measurement_unit: "count".to_string(),
            uncertainties: Vec::new(),
            language: "de".to_string(),
            readability: ReadabilityTier::B1,
        }
    }

    /// Normalized text, the weaker identity used by legacy batch joins.
    #[must_use]
    pub fn normalized_text(&self) -> String {
        utils::normalize_text(&self.text)
    }
}

/// Political level and concrete body responsible for a claim.
/// Attached to a claim, never to raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub level: JurisdictionLevel,
    pub organ: Option<String>,
    pub topic_key: String,
    pub rationale: Option<String>,
}

/// A proposed, falsifiable search query and expected metric that could
/// confirm or refute a claim. Never a resolved fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceHypothesis {
    pub claim_canonical_id: String,
    pub source_type: SourceType,
    pub search_query: String,
    pub expected_metric: String,
    pub year: Option<i32>,
}

impl EvidenceHypothesis {
    /// A hypothesis is usable when its query is non-empty and its year,
    /// if any, is plausible.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.search_query.trim().is_empty()
            && self.year.is_none_or(|y| (YEAR_MIN..=YEAR_MAX).contains(&y))
    }
}

/// Balanced viewpoints on a claim: up to three per side plus one
/// alternative proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perspectives {
    pub pro: Vec<String>,
    pub contra: Vec<String>,
    pub alternative: String,
}

/// Maximum entries per perspective side, enforced in validation rather
/// than left to provider discretion.
pub const MAX_PERSPECTIVES_PER_SIDE: usize = 3;

/// Whether a score set was produced by the rater or defaulted after a
/// timeout. A defaulted mid-range score must stay distinguishable from a
/// genuine one downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrigin {
    Rated,
    TimeoutDefault,
}

/// Justification text carried by defaulted score axes.
pub const TIMEOUT_SCORE_NOTE: &str = "rating unavailable: editorial stage timed out";

/// One editorial axis: a value in [0,1] with a short justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreAxis {
    pub value: f64,
    pub justification: String,
}

impl ScoreAxis {
    /// Construct an axis, clamping the value into [0,1].
    #[must_use]
    pub fn new(value: f64, justification: impl Into<String>) -> Self {
        ScoreAxis {
            value: value.clamp(0.0, 1.0),
            justification: justification.into(),
        }
    }
}

/// Editorial quality scores across five axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSet {
    pub precision: ScoreAxis,
    pub verifiability: ScoreAxis,
    pub relevance: ScoreAxis,
    pub readability: ScoreAxis,
    pub balance: ScoreAxis,
    pub origin: ScoreOrigin,
}

impl ScoreSet {
    /// The defaulted score set used when the rater times out or returns
    /// invalid output: 0.5 on every axis, explicitly marked.
    #[must_use]
    pub fn timeout_default() -> Self {
        let axis = || ScoreAxis::new(0.5, TIMEOUT_SCORE_NOTE);
        ScoreSet {
            precision: axis(),
            verifiability: axis(),
            relevance: axis(),
            readability: axis(),
            balance: axis(),
            origin: ScoreOrigin::TimeoutDefault,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.origin == ScoreOrigin::TimeoutDefault
    }

    #[must_use]
    pub fn axes(&self) -> [&ScoreAxis; 5] {
        [
            &self.precision,
            &self.verifiability,
            &self.relevance,
            &self.readability,
            &self.balance,
        ]
    }
}

/// Derived completeness booleans. Computed from the enriched claim,
/// never independently mutated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityGate {
    pub json_valid: bool,
    pub atomization_complete: bool,
    pub readability_in_band: bool,
    pub jurisdiction_present: bool,
    pub evidence_present: bool,
}

/// A claim together with every enrichment the pipeline managed to attach.
/// Absent enrichments stay `None`/empty; the metadata records why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedClaim {
    #[serde(flatten)]
    pub claim: AtomicClaim,
    pub jurisdiction: Option<Jurisdiction>,
    pub evidence: Vec<EvidenceHypothesis>,
    pub perspectives: Option<Perspectives>,
    pub score: ScoreSet,
    pub quality: QualityGate,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Atomicize,
    Assign,
    Evidence,
    Perspectives,
    Rate,
}

/// Outcome of one stage: how long it ran, whether it settled in budget,
/// and a short note for the degraded cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub elapsed_ms: u64,
    pub ok: bool,
    pub note: Option<String>,
}

/// Per-stage fallback flags so callers can distinguish a fully-enriched
/// answer from a degraded one.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FallbackFlags {
    pub atomicize: bool,
    pub assign: bool,
    pub evidence: bool,
    pub perspectives: bool,
    pub rate: bool,
}

impl FallbackFlags {
    #[must_use]
    pub fn any(&self) -> bool {
        self.atomicize || self.assign || self.evidence || self.perspectives || self.rate
    }
}

/// Reason code for early pipeline termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    /// Provider and heuristic fallback both yielded zero claims. The only
    /// fatal condition in the pipeline.
    NoClaimsExtractable,
}

/// Metadata attached to every pipeline result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMeta {
    pub ok: bool,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub prompt_version: String,
    pub model: String,
    pub steps: Vec<StageReport>,
    pub fallback: FallbackFlags,
    pub reason: Option<TerminalReason>,
}

/// The versioned output of one orchestration call. Always structurally
/// valid, including the zero-claims case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub claims: Vec<EnrichedClaim>,
    pub meta: PipelineMeta,
}

/// Per-stage timeout budgets.
#[derive(Debug, Clone, Copy)]
pub struct StageBudgets {
    pub atomicize: Duration,
    pub assign: Duration,
    pub evidence: Duration,
    pub perspectives: Duration,
    pub rate: Duration,
}

impl Default for StageBudgets {
    fn default() -> Self {
        StageBudgets {
            atomicize: Duration::from_millis(15_000),
            assign: Duration::from_millis(12_000),
            evidence: Duration::from_millis(9_000),
            perspectives: Duration::from_millis(9_000),
            rate: Duration::from_millis(8_000),
        }
    }
}

impl StageBudgets {
    /// One budget for every stage, for callers tuning a single knob.
    #[must_use]
    pub fn uniform(budget: Duration) -> Self {
        StageBudgets {
            atomicize: budget,
            assign: budget,
            evidence: budget,
            perspectives: budget,
            rate: budget,
        }
    }
}

/// Options accepted by the orchestrator entry point.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub max_claims: usize,
    pub budgets: StageBudgets,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        AnalyzeOptions {
            max_claims: 6,
            budgets: StageBudgets::default(),
        }
    }
}

/// Request passed to a text-generation backend.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub json_mode: bool,
    pub timeout: Duration,
}

impl GenerateRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerateRequest {
            prompt: prompt.into(),
            system: None,
            json_mode: false,
            timeout: Duration::from_millis(30_000),
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Require a strict JSON object response from the backend.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Token accounting reported by a backend, when available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Uniform outcome of one provider call.
///
/// Adapters never return an `Err` for timeout or HTTP failure; those
/// become `ok = false` with the error recorded. `skipped = true` means
/// the call was never attempted because configuration was missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRun {
    pub ok: bool,
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub error: Option<String>,
    pub skipped: bool,
    pub elapsed_ms: u64,
}

impl ProviderRun {
    #[must_use]
    pub fn success(text: String, usage: Option<TokenUsage>, elapsed_ms: u64) -> Self {
        ProviderRun {
            ok: true,
            text,
            usage,
            error: None,
            skipped: false,
            elapsed_ms,
        }
    }

    /// Record a failure that was attempted but did not succeed.
    #[must_use]
    pub fn failed(error: &errors::ProviderError, elapsed_ms: u64) -> Self {
        ProviderRun {
            ok: false,
            text: String::new(),
            usage: None,
            error: Some(error.to_string()),
            skipped: error.is_skip(),
            elapsed_ms,
        }
    }

    /// Record a stage that was never attempted (missing credential).
    #[must_use]
    pub fn skipped(provider: &str) -> Self {
        ProviderRun {
            ok: false,
            text: String::new(),
            usage: None,
            error: Some(format!("{} credential missing", provider)),
            skipped: true,
            elapsed_ms: 0,
        }
    }

    /// True for a usable completion: succeeded with non-empty text.
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.ok && !self.text.trim().is_empty()
    }
}
