//! Content-addressed caching wrapper around any text provider.
//!
//! Memoizes successful runs by a hash of (provider, model, json flag,
//! system, prompt) so identical requests are not paid for twice. Cache
//! failures degrade to a plain provider call; they never fail a stage.

use ag_core::types::{GenerateRequest, ProviderRun};
use ag_core::{ResponseCache, TextProvider};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct CachedProvider {
    inner: Arc<dyn TextProvider>,
    cache: Arc<dyn ResponseCache>,
    ttl: Duration,
}

impl CachedProvider {
    #[must_use]
    pub fn new(inner: Arc<dyn TextProvider>, cache: Arc<dyn ResponseCache>, ttl: Duration) -> Self {
        CachedProvider { inner, cache, ttl }
    }

    /// Content address of a request against this provider and model.
    /// Entries are immutable: the same key always maps to the same value.
    fn cache_key(&self, request: &GenerateRequest) -> String {
        let material = format!(
            "{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}",
            self.inner.name(),
            self.inner.model(),
            request.json_mode,
            request.system.as_deref().unwrap_or(""),
            request.prompt,
        );
        format!("ai:{}", utils::sha256_hex(&material))
    }
}

#[async_trait]
impl TextProvider for CachedProvider {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn configured(&self) -> bool {
        self.inner.configured()
    }

    async fn generate(&self, request: &GenerateRequest) -> ProviderRun {
        if !self.inner.configured() {
            // Skipped runs are not worth caching.
            return self.inner.generate(request).await;
        }

        let key = self.cache_key(request);
        match self.cache.get(&key).await {
            Ok(Some(raw)) => {
                if let Ok(run) = serde_json::from_str::<ProviderRun>(&raw) {
                    tracing::debug!(provider = self.inner.name(), "cache hit");
                    return run;
                }
                tracing::debug!(provider = self.inner.name(), "cache entry undecodable, refetching");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(provider = self.inner.name(), error = %e, "cache read failed");
            }
        }

        let run = self.inner.generate(request).await;
        if run.ok {
            match serde_json::to_string(&run) {
                Ok(serialized) => {
                    if let Err(e) = self.cache.set(&key, &serialized, self.ttl).await {
                        tracing::debug!(provider = self.inner.name(), error = %e, "cache write failed");
                    }
                }
                Err(e) => {
                    tracing::debug!(provider = self.inner.name(), error = %e, "cache serialize failed");
                }
            }
        }
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testing::MockProvider;

    #[test]
    fn test_cache_key_is_stable_and_discriminating() {
        let inner: Arc<dyn TextProvider> = Arc::new(MockProvider::new("mock", "mock-model"));
        let cache: Arc<dyn ResponseCache> = Arc::new(testing::NullCache::default());
        let provider = CachedProvider::new(inner, cache, Duration::from_secs(300));

        let a = provider.cache_key(&GenerateRequest::new("same prompt").json());
        let b = provider.cache_key(&GenerateRequest::new("same prompt").json());
        let c = provider.cache_key(&GenerateRequest::new("same prompt"));
        let d = provider.cache_key(&GenerateRequest::new("other prompt").json());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert!(a.starts_with("ai:"));
    }
}
