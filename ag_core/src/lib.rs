//! # Agora Core
//!
//! Shared types and traits for the claim-distillation pipeline.
//!
//! This crate provides:
//! - The canonical data model (claims, enrichments, result envelope)
//! - Capability traits for text-generation backends and response caches
//! - The legacy (first-generation) batch shapes and the pure upgrade /
//!   downgrade adapters between the two schema generations
//!
//! Generation checks never leak into business rules: callers convert at
//! the boundary once via [`legacy`] and work with canonical types.

pub mod legacy;
pub mod traits;
pub mod types;

pub use traits::{ResponseCache, TextProvider};
pub use types::{
    AnalyzeOptions, AtomicClaim, EnrichedClaim, EvidenceHypothesis, FallbackFlags,
    GenerateRequest, Jurisdiction, JurisdictionLevel, Perspectives, PipelineMeta, PipelineResult,
    ProviderRun, QualityGate, ReadabilityTier, ScoreAxis, ScoreOrigin, ScoreSet, SourceType,
    Stage, StageBudgets, StageReport, TerminalReason, TokenUsage,
};
