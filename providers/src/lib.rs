//! # Provider Adapters
//!
//! One adapter per external text-generation backend, all behind the
//! [`ag_core::TextProvider`] capability trait. Each backend has a
//! different native call shape; orchestration code depends only on the
//! trait and never learns which backend answered.
//!
//! Also home to the multi-provider fan-out used by contribution-level
//! orchestration and the content-addressed caching wrapper.

pub mod anthropic;
pub mod cached;
pub mod fanout;
pub mod gemini;
pub mod mistral;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use cached::CachedProvider;
pub use fanout::{fan_out, FanOutOptions, FanOutOutcome, FanOutRun};
pub use gemini::GeminiProvider;
pub use mistral::MistralProvider;
pub use openai::OpenAiProvider;

use ag_core::TextProvider;
use config::ProvidersConfig;
use std::sync::Arc;

/// Build the full adapter set in fan-out priority order.
///
/// Unconfigured backends are still constructed; their calls come back as
/// skipped, which selection treats as silently non-applicable.
#[must_use]
pub fn build_providers(config: &ProvidersConfig) -> Vec<Arc<dyn TextProvider>> {
    vec![
        Arc::new(OpenAiProvider::new(config.openai.clone())),
        Arc::new(AnthropicProvider::new(config.anthropic.clone())),
        Arc::new(MistralProvider::new(config.mistral.clone())),
        Arc::new(GeminiProvider::new(config.gemini.clone())),
    ]
}
