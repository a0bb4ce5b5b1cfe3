//! Scripted provider and cache doubles, plus claim builders.

use ag_core::types::{AtomicClaim, GenerateRequest, ProviderRun};
use ag_core::{ResponseCache, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A provider that replays a scripted queue of runs.
///
/// When the script is exhausted the last scripted run repeats, so a
/// single `ok_json_run` can serve a whole stage sequence. An optional
/// artificial delay simulates a slow backend for timeout races.
pub struct MockProvider {
    name: &'static str,
    model: String,
    script: Mutex<VecDeque<ProviderRun>>,
    last: Mutex<Option<ProviderRun>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    configured: bool,
}

impl MockProvider {
    #[must_use]
    pub fn new(name: &'static str, model: &str) -> Self {
        MockProvider {
            name,
            model: model.to_string(),
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
            configured: true,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Mark the provider as having no credential: every call is skipped.
    #[must_use]
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    #[must_use]
    pub fn enqueue(self, run: ProviderRun) -> Self {
        self.script.lock().unwrap().push_back(run);
        self
    }

    /// Number of generate calls observed, skipped calls excluded.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, _request: &GenerateRequest) -> ProviderRun {
        if !self.configured {
            return ProviderRun::skipped(self.name);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(run) => {
                *self.last.lock().unwrap() = Some(run.clone());
                run
            }
            None => self.last.lock().unwrap().clone().unwrap_or_else(|| {
                ProviderRun {
                    ok: false,
                    text: String::new(),
                    usage: None,
                    error: Some("mock script exhausted".to_string()),
                    skipped: false,
                    elapsed_ms: 0,
                }
            }),
        }
    }
}

/// A cache that stores nothing and always misses.
#[derive(Default)]
pub struct NullCache;

#[async_trait]
impl ResponseCache for NullCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, errors::CacheError> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<(), errors::CacheError> {
        Ok(())
    }
}

/// A successful run whose text is the serialized JSON value.
#[must_use]
pub fn ok_json_run(value: &serde_json::Value) -> ProviderRun {
    ProviderRun::success(value.to_string(), None, 5)
}

/// A claim fixture with derived ids and defaults.
#[must_use]
pub fn claim(text: &str) -> AtomicClaim {
    AtomicClaim::from_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_replays_script_then_repeats() {
        let provider = MockProvider::new("mock", "mock-model")
            .enqueue(ok_json_run(&serde_json::json!({"a": 1})))
            .enqueue(ok_json_run(&serde_json::json!({"b": 2})));
        let req = GenerateRequest::new("x");
        assert!(provider.generate(&req).await.text.contains("\"a\""));
        assert!(provider.generate(&req).await.text.contains("\"b\""));
        // Script exhausted: the last run repeats.
        assert!(provider.generate(&req).await.text.contains("\"b\""));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unconfigured_mock_is_skipped() {
        let provider = MockProvider::new("mock", "mock-model").unconfigured();
        let run = provider.generate(&GenerateRequest::new("x")).await;
        assert!(run.skipped);
        assert!(!run.ok);
        assert_eq!(provider.call_count(), 0);
    }
}
