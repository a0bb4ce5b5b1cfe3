//! # Configuration
//!
//! Centralized configuration for the claim-distillation pipeline.
//!
//! Configuration is resolved once at process start into an explicit
//! immutable [`Config`] and injected from there; business logic never
//! reads ambient environment state directly. Model choice, credentials
//! and cache backend selection all live here.

pub mod config;
pub mod loader;

pub use config::{CacheConfig, Config, PipelineConfig, ProviderSettings, ProvidersConfig};
pub use loader::load_from_env;
