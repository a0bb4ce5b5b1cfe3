//! Multi-provider fan-out for contribution-level orchestration.
//!
//! All adapters are invoked concurrently for the same prompt under a
//! shared timeout. Selection is a simple heuristic, not a quality
//! ranking: the first configured-order run with a non-empty success wins;
//! if none succeed, the longest non-empty failure text is used as a last
//! resort.

use ag_core::types::{GenerateRequest, ProviderRun};
use ag_core::TextProvider;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FanOutOptions {
    pub json_mode: bool,
    pub system: Option<String>,
    pub timeout: Duration,
}

impl Default for FanOutOptions {
    fn default() -> Self {
        FanOutOptions {
            json_mode: false,
            system: None,
            timeout: Duration::from_millis(30_000),
        }
    }
}

/// One provider's labeled run within a fan-out.
#[derive(Debug, Clone)]
pub struct FanOutRun {
    pub provider: String,
    pub run: ProviderRun,
}

#[derive(Debug, Clone)]
pub struct FanOutOutcome {
    /// Every run, in configured provider order. Skipped providers stay
    /// listed so callers can see what was never attempted.
    pub runs: Vec<FanOutRun>,
    /// Index into `runs` of the selected response, if any run produced
    /// non-empty text.
    pub best: Option<usize>,
}

impl FanOutOutcome {
    #[must_use]
    pub fn best_run(&self) -> Option<&FanOutRun> {
        self.best.map(|idx| &self.runs[idx])
    }
}

/// Query every provider concurrently and select one response.
pub async fn fan_out(
    providers: &[Arc<dyn TextProvider>],
    prompt: &str,
    opts: &FanOutOptions,
) -> FanOutOutcome {
    let mut request = GenerateRequest::new(prompt).with_timeout(opts.timeout);
    if opts.json_mode {
        request = request.json();
    }
    if let Some(system) = &opts.system {
        request = request.with_system(system.clone());
    }

    let calls = providers.iter().map(|provider| {
        let request = request.clone();
        let provider = Arc::clone(provider);
        async move {
            FanOutRun {
                provider: provider.name().to_string(),
                run: provider.generate(&request).await,
            }
        }
    });
    let runs: Vec<FanOutRun> = join_all(calls).await;

    let best = select_best(&runs);
    if let Some(idx) = best {
        tracing::debug!(
            provider = %runs[idx].provider,
            first_success = runs[idx].run.has_text(),
            "fan-out selection"
        );
    }
    FanOutOutcome { runs, best }
}

/// First success with non-empty text, else the longest non-empty text
/// among the failures.
fn select_best(runs: &[FanOutRun]) -> Option<usize> {
    if let Some(idx) = runs.iter().position(|r| r.run.has_text()) {
        return Some(idx);
    }
    runs.iter()
        .enumerate()
        .filter(|(_, r)| !r.run.text.trim().is_empty())
        .max_by_key(|(_, r)| r.run.text.len())
        .map(|(idx, _)| idx)
}
