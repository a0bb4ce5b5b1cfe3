//! # Agora Utilities
//!
//! Pure helper functions shared across the pipeline: text normalization,
//! canonical-id hashing, code-fence stripping, and bounded truncation.
//!
//! Everything in this crate is deterministic and side-effect free; the
//! canonical-id invariant (identical normalized text always yields the
//! same id, across calls and processes) depends on that.

use sha2::{Digest, Sha256};

/// 64-bit FNV-1a offset basis.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
/// 64-bit FNV-1a prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Normalize text for canonical identity: case-folded, diacritics
/// stripped, whitespace collapsed.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match fold_diacritic(ch) {
            Some(folded) => out.push_str(folded),
            None => out.extend(ch.to_lowercase()),
        }
    }
    out
}

/// Strip the diacritic from common Latin letters; `None` means the char
/// carries none and is lowercased as-is. German sharp s expands to "ss".
fn fold_diacritic(ch: char) -> Option<&'static str> {
    Some(match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ñ' | 'Ñ' => "n",
        'ç' | 'Ç' => "c",
        'ß' => "ss",
        _ => return None,
    })
}

/// Compute a 64-bit FNV-1a hash of a string.
#[must_use]
pub fn fnv1a_hash(text: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in text.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Stable canonical id for a claim text: lower-hex FNV-1a 64 of the
/// normalized text, zero-padded to 16 characters.
///
/// # Examples
///
/// ```
/// use utils::canonical_id;
///
/// let a = canonical_id("Nahverkehr soll kostenlos werden.");
/// let b = canonical_id("  nahverkehr soll kostenlos werden.  ");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 16);
/// ```
#[must_use]
pub fn canonical_id(text: &str) -> String {
    format!("{:016x}", fnv1a_hash(&normalize_text(text)))
}

/// Deterministic claim id derived from the canonical hash.
#[must_use]
pub fn claim_id(text: &str) -> String {
    format!("clm-{}", canonical_id(text))
}

/// Compute a SHA-256 hex digest, used for content-addressed cache keys.
#[must_use]
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Strip fenced code blocks that providers wrap around JSON payloads.
///
/// Removes a leading ```` ```lang ```` marker and a trailing ```` ``` ````;
/// text without fences passes through unchanged.
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return raw;
    };
    // Skip the optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    rest.trim().trim_end_matches("```").trim()
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
/// Inputs are bounded before processing (truncate, don't reject).
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
