//! Client identifier validation and generation.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static UUID_V4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[0-9a-f]{8}-?[0-9a-f]{4}-?4[0-9a-f]{3}-?[89ab][0-9a-f]{3}-?[0-9a-f]{12}$",
    )
    .expect("uuid pattern is valid")
});

static COOKIE_CID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("cookie cid pattern is valid"));

/// Source of fresh client identifiers.
pub trait IdGenerator: Send + Sync {
    /// Generate a new canonical-form identifier.
    fn generate(&self) -> String;
}

/// Random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuid;

impl IdGenerator for RandomUuid {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Whether `s` is a version 4 UUID, with or without dashes.
pub fn is_canonical(s: &str) -> bool {
    UUID_V4.is_match(s)
}

/// Whether `s` looks like the `<digits>.<digits>` id stored in browser cookies.
pub fn is_cookie_client_id(s: &str) -> bool {
    COOKIE_CID.is_match(s)
}

/// Re-insert dashes at their canonical positions.
///
/// Returns `None` when `s` is not a version 4 UUID.
pub fn normalize(s: &str) -> Option<String> {
    if !is_canonical(s) {
        return None;
    }

    let hex: String = s.chars().filter(|c| *c != '-').collect();
    Some(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

/// Pick the client id for a visitor.
///
/// Candidates are tried in order. With `strict` set, a candidate must be a
/// UUID (normalized on the way out) or a cookie-style id; otherwise the first
/// non-empty candidate is taken verbatim. Falls back to `generator`.
pub fn resolve_client_id(
    candidates: &[Option<&str>],
    strict: bool,
    generator: &dyn IdGenerator,
) -> String {
    for candidate in candidates.iter().flatten() {
        if candidate.is_empty() {
            continue;
        }
        if !strict {
            return (*candidate).to_string();
        }
        if let Some(normalized) = normalize(candidate) {
            return normalized;
        }
        if is_cookie_client_id(candidate) {
            return (*candidate).to_string();
        }
        debug!(client_id = %candidate, "ignoring malformed client id");
    }

    generator.generate()
}
