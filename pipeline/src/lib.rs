//! # Distillation Pipeline
//!
//! The orchestration engine: distills free-form citizen-submitted text
//! into atomic, verifiable political claims, enriched with jurisdiction,
//! evidence hypotheses, balanced perspectives and editorial scores.
//!
//! The pipeline fans work out to unreliable external backends, enforces
//! per-stage timeout budgets, validates every response against a strict
//! structural contract, and degrades to partial results instead of
//! failing the whole request. Only the atomicizer is fatal when both its
//! provider path and its heuristic fallback come up empty.

pub mod atomicizer;
pub mod orchestrator;
pub mod prompts;
pub mod quality;
pub mod roles;
pub mod validator;

pub use atomicizer::{atomicize, heuristic_split, AtomicizeOutcome};
pub use orchestrator::{analyze, analyze_legacy};
pub use quality::derive_gate;
