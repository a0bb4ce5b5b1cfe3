//! Prompt catalog, version-tagged via [`ag_core::types::PROMPT_VERSION`].
//!
//! Every prompt demands a strict JSON object; the validator rejects
//! anything else. Neutrality of perspective output is requested through
//! the prompt only, there is no automated check behind it.

const ATOMICIZER_TEMPLATE: &str = r#"You are the atomicizer of a civic deliberation platform.
Task: extract atomic political claims from the text below. One sentence each,
independently fact-checkable, plain B1/B2 language. Keep the content, normalize
the tone, no censorship. Unknown slot values are null. Split bundled ideas,
at most <<<MAX>>> claims.

Respond with a STRICT JSON object:
{"claims":[
 {"text": string, "topic": string|null, "time_period": string|null,
  "place": string|null, "level": "EU"|"national"|"regional"|"local"|null,
  "affected_parties": string[], "measurement_unit": string|null,
  "uncertainties": string[]}
]}

== TEXT ==
<<<TEXT>>>"#;

pub const ASSIGNER_SYSTEM: &str = "Classify the political level (EU/national/regional/local/unclear), \
name the concretely responsible organ (short) or null, and map the matter onto \
one key of a fixed 15-topic taxonomy. JSON only.";

const ASSIGNER_USER_TEMPLATE: &str = r#"Text: <<<TEXT>>>
Respond with a STRICT JSON object:
{"level":"EU"|"national"|"regional"|"local"|"unclear","organ":string|null,"topic_key":string,"rationale":string|null}"#;

const ASSIGNER_BATCH_TEMPLATE: &str = r#"For every claim below, classify the responsible political level,
organ and a short rationale.

Respond with a STRICT JSON object:
{"map":[{"claim": string, "jurisdiction": {"level":"EU"|"national"|"regional"|"local"|"unclear","organ": string,"rationale": string}}]}

== CLAIMS ==
<<<CLAIMS>>>"#;

pub const EVIDENCE_SYSTEM: &str = "You propose falsifiable evidence hypotheses for political claims: \
concrete search queries against official statistics, press archives or research, \
with the metric a finding would have to show. You never assert facts. JSON only.";

const EVIDENCE_USER_TEMPLATE: &str = r#"Claim: <<<CLAIM>>>
Propose at most 4 evidence hypotheses.
Respond with a STRICT JSON object:
{"evidence":[{"source_type":"official"|"press"|"research","search_query": string,"expected_metric": string,"year": number|null}]}"#;

const EVIDENCE_BATCH_TEMPLATE: &str = r#"For every item below, propose at most 4 evidence hypotheses.

Respond with a STRICT JSON object:
{"evidence":[{"claim_canonical_id": string,"hints":[{"source_type":"official"|"press"|"research","search_query": string,"expected_metric": string,"year": number|null}]}]}

== ITEMS ==
<<<ITEMS>>>"#;

const EVIDENCE_BATCH_LEGACY_TEMPLATE: &str = r#"For every claim below, propose at most 4 evidence hints.

Respond with a STRICT JSON object:
{"evidence":[{"claim": string,"hints":[{"source_type":"official"|"press"|"research","query": string,"expected_metric": string|null,"year": string|null}]}]}

== CLAIMS ==
<<<CLAIMS>>>"#;

const PERSPECTIVES_TEMPLATE: &str = r#"Give balanced viewpoints on the claim below: up to 3 arguments in
favor, up to 3 against, and exactly one constructive alternative proposal.
Stay neutral in wording; do not endorse a side.

Respond with a STRICT JSON object:
{"pro": string[], "contra": string[], "alternative": string}

Claim: <<<CLAIM>>>"#;

const RATER_TEMPLATE: &str = r#"Rate the claim below on five editorial axes, each 0.0 to 1.0 with a
short justification: precision, verifiability, relevance, readability, balance.

Respond with a STRICT JSON object:
{"precision":{"value": number,"justification": string},
 "verifiability":{"value": number,"justification": string},
 "relevance":{"value": number,"justification": string},
 "readability":{"value": number,"justification": string},
 "balance":{"value": number,"justification": string}}

Claim: <<<CLAIM>>>"#;

#[must_use]
pub fn atomicizer_prompt(text: &str, max_claims: usize) -> String {
    ATOMICIZER_TEMPLATE
        .replace("<<<MAX>>>", &max_claims.to_string())
        .replace("<<<TEXT>>>", text)
}

#[must_use]
pub fn assigner_prompt(claim_text: &str) -> String {
    ASSIGNER_USER_TEMPLATE.replace("<<<TEXT>>>", claim_text)
}

#[must_use]
pub fn assigner_batch_prompt(claims_payload: &str) -> String {
    ASSIGNER_BATCH_TEMPLATE.replace("<<<CLAIMS>>>", claims_payload)
}

#[must_use]
pub fn evidence_prompt(claim_text: &str) -> String {
    EVIDENCE_USER_TEMPLATE.replace("<<<CLAIM>>>", claim_text)
}

#[must_use]
pub fn evidence_batch_prompt(items_payload: &str) -> String {
    EVIDENCE_BATCH_TEMPLATE.replace("<<<ITEMS>>>", items_payload)
}

#[must_use]
pub fn evidence_batch_legacy_prompt(claims_payload: &str) -> String {
    EVIDENCE_BATCH_LEGACY_TEMPLATE.replace("<<<CLAIMS>>>", claims_payload)
}

#[must_use]
pub fn perspectives_prompt(claim_text: &str) -> String {
    PERSPECTIVES_TEMPLATE.replace("<<<CLAIM>>>", claim_text)
}

#[must_use]
pub fn rater_prompt(claim_text: &str) -> String {
    RATER_TEMPLATE.replace("<<<CLAIM>>>", claim_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomicizer_prompt_substitution() {
        let prompt = atomicizer_prompt("Rents are too high.", 6);
        assert!(prompt.contains("Rents are too high."));
        assert!(prompt.contains("at most 6 claims"));
        assert!(!prompt.contains("<<<"));
    }
}
