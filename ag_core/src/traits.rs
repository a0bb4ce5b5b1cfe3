//! Capability traits at the pipeline's external seams.

use crate::types::{GenerateRequest, ProviderRun};
use async_trait::async_trait;
use std::time::Duration;

/// Uniform interface over one external text-generation backend.
///
/// Implementations are selected by injected configuration, never by
/// inline environment inspection inside orchestration logic. `generate`
/// is infallible by contract: timeouts, HTTP failures and missing
/// credentials all become fields on [`ProviderRun`].
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Stable backend identity used in logs and fan-out run labels.
    fn name(&self) -> &'static str;

    /// Model the adapter is configured to call.
    fn model(&self) -> &str;

    /// Whether a credential is configured. When false, `generate` must
    /// return a skipped run without attempting network I/O.
    fn configured(&self) -> bool;

    async fn generate(&self, request: &GenerateRequest) -> ProviderRun;
}

/// Content-addressed response cache, read-through by all stages.
///
/// Entries are immutable once written (same key always maps to the same
/// value), so concurrent writers racing on a key cause at most redundant
/// provider calls, never incorrect results.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, errors::CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), errors::CacheError>;
}
