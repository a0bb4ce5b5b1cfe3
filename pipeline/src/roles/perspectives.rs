//! Balanced perspective generation: pro, contra, one alternative.

use ag_core::types::{AtomicClaim, GenerateRequest, Perspectives};
use ag_core::TextProvider;
use futures_util::future::join_all;
use std::time::Duration;
use tracing::debug;

use crate::prompts;
use crate::validator;

/// Generate balanced viewpoints for one claim.
pub async fn perspectives_one(
    provider: &dyn TextProvider,
    claim: &AtomicClaim,
    budget: Duration,
) -> Option<Perspectives> {
    let request = GenerateRequest::new(prompts::perspectives_prompt(&claim.text))
        .json()
        .with_timeout(budget);
    let run = provider.generate(&request).await;
    if !run.has_text() {
        return None;
    }
    match validator::validate_object(&run.text).and_then(|v| validator::parse_perspectives(&v)) {
        Ok(p) => Some(p),
        Err(failure) => {
            debug!(claim = %claim.canonical_id, %failure, "perspectives response rejected");
            None
        }
    }
}

/// Generate perspectives for every claim concurrently.
pub async fn perspectives_all(
    provider: &dyn TextProvider,
    claims: &[AtomicClaim],
    budget: Duration,
) -> Vec<Option<Perspectives>> {
    join_all(claims.iter().map(|c| perspectives_one(provider, c, budget))).await
}
