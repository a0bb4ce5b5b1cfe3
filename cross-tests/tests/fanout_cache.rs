//! Multi-provider fan-out and response caching across real adapter wiring.

use ag_core::types::{GenerateRequest, ProviderRun};
use ag_core::TextProvider;
use cache::MemoryCache;
use config::ProvidersConfig;
use providers::{build_providers, fan_out, CachedProvider, FanOutOptions};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use testing::{ok_json_run, MockProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fan_out_prefers_first_successful_provider() {
    let providers: Vec<Arc<dyn TextProvider>> = vec![
        Arc::new(MockProvider::new("first", "m1").unconfigured()),
        Arc::new(MockProvider::new("second", "m2").enqueue(ok_json_run(&json!({"answer": 2})))),
        Arc::new(MockProvider::new("third", "m3").enqueue(ok_json_run(&json!({"answer": 3})))),
    ];
    let outcome = fan_out(&providers, "prompt", &FanOutOptions::default()).await;
    let best = outcome.best_run().unwrap();
    assert_eq!(best.provider, "second");
    assert!(best.run.text.contains("\"answer\":2"));
    assert_eq!(outcome.runs.len(), 3);
}

#[tokio::test]
async fn fan_out_with_no_usable_run_selects_nothing() {
    let providers: Vec<Arc<dyn TextProvider>> = vec![
        Arc::new(MockProvider::new("a", "m").unconfigured()),
        Arc::new(MockProvider::new("b", "m").enqueue(ProviderRun::failed(
            &errors::ProviderError::EmptyCompletion {
                provider: "b".to_string(),
            },
            7,
        ))),
    ];
    let outcome = fan_out(&providers, "prompt", &FanOutOptions::default()).await;
    assert!(outcome.best_run().is_none());
}

#[tokio::test]
async fn fan_out_over_wire_adapters_skips_unconfigured_backends() {
    // Only the OpenAI-shaped backend is configured and answering; the
    // other three have no credentials and must never be attempted.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "wire answer"}}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProvidersConfig {
        openai: config::ProviderSettings {
            api_key: Some("test-key".to_string()),
            model: "test-model".to_string(),
            base_url: server.uri(),
        },
        ..ProvidersConfig::default()
    };
    let providers = build_providers(&config);
    assert_eq!(providers.len(), 4);

    let outcome = fan_out(&providers, "prompt", &FanOutOptions::default()).await;
    let best = outcome.best_run().unwrap();
    assert_eq!(best.provider, "openai");
    assert_eq!(best.run.text, "wire answer");
    assert_eq!(outcome.runs.iter().filter(|r| r.run.skipped).count(), 3);
}

#[tokio::test]
async fn cached_provider_serves_repeat_requests_from_cache() {
    let inner = Arc::new(
        MockProvider::new("mock", "mock-model").enqueue(ok_json_run(&json!({"cached": true}))),
    );
    let cache = Arc::new(MemoryCache::new());
    let provider = CachedProvider::new(inner.clone(), cache, Duration::from_secs(60));

    let request = GenerateRequest::new("same prompt").json();
    let first = provider.generate(&request).await;
    let second = provider.generate(&request).await;

    assert!(first.ok);
    assert!(second.ok);
    assert_eq!(first.text, second.text);
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test]
async fn cached_provider_distinguishes_prompts() {
    let inner = Arc::new(
        MockProvider::new("mock", "mock-model")
            .enqueue(ok_json_run(&json!({"n": 1})))
            .enqueue(ok_json_run(&json!({"n": 2}))),
    );
    let cache = Arc::new(MemoryCache::new());
    let provider = CachedProvider::new(inner.clone(), cache, Duration::from_secs(60));

    let a = provider.generate(&GenerateRequest::new("prompt a")).await;
    let b = provider.generate(&GenerateRequest::new("prompt b")).await;
    assert_ne!(a.text, b.text);
    assert_eq!(inner.call_count(), 2);
}
