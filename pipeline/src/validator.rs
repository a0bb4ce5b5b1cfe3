//! Structural validation of provider output.
//!
//! Providers wrap JSON in prose, code fences, or return garbage under
//! pressure; all of that is a normal, expected outcome here. Failures are
//! reported as values and trigger the calling stage's fallback path,
//! never a panic. Items failing their own checks are dropped one by one
//! rather than invalidating the surrounding list.

use ag_core::types::{
    AtomicClaim, EvidenceHypothesis, Jurisdiction, JurisdictionLevel, Perspectives, ScoreAxis,
    ScoreOrigin, ScoreSet, SourceType, normalize_topic_key, MAX_PERSPECTIVES_PER_SIDE, YEAR_MAX,
    YEAR_MIN,
};
use errors::ValidationFailure;
use serde_json::Value;

/// Parse provider text into a strict JSON object.
///
/// Incidental formatting (fenced code blocks) is stripped first; anything
/// that is not a single JSON object is a validation failure.
pub fn validate_object(raw: &str) -> Result<Value, ValidationFailure> {
    let clean = utils::strip_code_fences(raw);
    let value: Value = serde_json::from_str(clean)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ValidationFailure::NotAnObject {
            found: json_type_name(&value).to_string(),
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn str_list(value: &Value, key: &str, cap: usize) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(cap)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn level_field(value: &Value, key: &str) -> Option<JurisdictionLevel> {
    value
        .get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

/// Decode the atomicizer response: claims with invalid or empty text are
/// dropped, the remainder capped at `max_claims`.
pub fn parse_claims(value: &Value, max_claims: usize) -> Vec<AtomicClaim> {
    let Some(rows) = value.get("claims").and_then(Value::as_array) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| {
            let text = str_field(row, "text")?;
            let mut claim = AtomicClaim::from_text(&text);
            claim.topic = str_field(row, "topic");
            claim.time_period = str_field(row, "time_period");
            claim.place = str_field(row, "place");
            claim.level = level_field(row, "level");
            claim.affected_parties = str_list(row, "affected_parties", 6);
            if let Some(unit) = str_field(row, "measurement_unit") {
                claim.measurement_unit = unit;
            }
            claim.uncertainties = str_list(row, "uncertainties", 4);
            Some(claim)
        })
        .take(max_claims)
        .collect()
}

/// Decode a single-claim jurisdiction classification.
pub fn parse_jurisdiction(value: &Value) -> Result<Jurisdiction, ValidationFailure> {
    let level = level_field(value, "level").ok_or_else(|| ValidationFailure::SchemaViolation {
        field: "level".to_string(),
        reason: "missing or not a known jurisdiction level".to_string(),
    })?;
    let topic_key = str_field(value, "topic_key").ok_or_else(|| {
        ValidationFailure::SchemaViolation {
            field: "topic_key".to_string(),
            reason: "missing".to_string(),
        }
    })?;
    Ok(Jurisdiction {
        level,
        organ: str_field(value, "organ").map(|o| bounded(&o, 120)),
        topic_key: normalize_topic_key(&topic_key),
        rationale: str_field(value, "rationale").map(|r| bounded(&r, 400)),
    })
}

fn bounded(s: &str, max_chars: usize) -> String {
    utils::truncate_chars(s, max_chars).to_string()
}

/// Decode one evidence hypothesis row, re-keyed to the given claim.
/// Rows without a usable query are dropped; implausible years are
/// individually discarded.
pub fn parse_evidence_row(row: &Value, claim_canonical_id: &str) -> Option<EvidenceHypothesis> {
    let source_type: SourceType = serde_json::from_value(row.get("source_type")?.clone()).ok()?;
    let search_query = str_field(row, "search_query").or_else(|| str_field(row, "query"))?;
    let year = row
        .get("year")
        .and_then(Value::as_i64)
        .map(|y| y as i32)
        .filter(|y| (YEAR_MIN..=YEAR_MAX).contains(y));
    Some(EvidenceHypothesis {
        claim_canonical_id: claim_canonical_id.to_string(),
        source_type,
        search_query: bounded(&search_query, 240),
        expected_metric: str_field(row, "expected_metric").unwrap_or_default(),
        year,
    })
}

/// Decode the perspectives response, enforcing the per-side cap here
/// rather than trusting provider discretion.
pub fn parse_perspectives(value: &Value) -> Result<Perspectives, ValidationFailure> {
    let pro = str_list(value, "pro", MAX_PERSPECTIVES_PER_SIDE);
    let contra = str_list(value, "contra", MAX_PERSPECTIVES_PER_SIDE);
    let alternative = str_field(value, "alternative")
        .unwrap_or_else(|| "Alternative proposal pending.".to_string());
    if pro.is_empty() && contra.is_empty() {
        return Err(ValidationFailure::SchemaViolation {
            field: "pro/contra".to_string(),
            reason: "both sides empty".to_string(),
        });
    }
    Ok(Perspectives {
        pro,
        contra,
        alternative,
    })
}

/// Decode the editorial rating response. All five axes must be present
/// and numeric; values are clamped into [0,1].
pub fn parse_scores(value: &Value) -> Result<ScoreSet, ValidationFailure> {
    let axis = |name: &str| -> Result<ScoreAxis, ValidationFailure> {
        let entry = value
            .get(name)
            .ok_or_else(|| ValidationFailure::SchemaViolation {
                field: name.to_string(),
                reason: "missing axis".to_string(),
            })?;
        let raw = entry.get("value").and_then(Value::as_f64).ok_or_else(|| {
            ValidationFailure::SchemaViolation {
                field: format!("{}.value", name),
                reason: "missing or not a number".to_string(),
            }
        })?;
        let justification =
            str_field(entry, "justification").unwrap_or_else(|| "no justification given".to_string());
        Ok(ScoreAxis::new(raw, bounded(&justification, 140)))
    };
    Ok(ScoreSet {
        precision: axis("precision")?,
        verifiability: axis("verifiability")?,
        relevance: axis("relevance")?,
        readability: axis("readability")?,
        balance: axis("balance")?,
        origin: ScoreOrigin::Rated,
    })
}
