//! Content fingerprints for step task descriptions.
//!
//! A fingerprint is the cache key for a step: the same task description text
//! always hashes to the same fingerprint, across runs and processes, so
//! identical instructions reuse identical generated code.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
const FINGERPRINT_LEN: usize = 12;

/// Computes the deterministic fingerprint of a task description.
///
/// The text is normalized before hashing: leading and trailing whitespace is
/// trimmed and internal whitespace runs collapse to single spaces. Casing is
/// preserved. The normalization is part of the cache contract: two prompts
/// that differ only in whitespace share one cache entry, while a casing
/// change produces a new fingerprint.
///
/// # Examples
///
/// ```rust
/// use drover_core::fingerprint::fingerprint;
///
/// let a = fingerprint("click login");
/// let b = fingerprint("  click   login ");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 12);
/// assert_ne!(a, fingerprint("Click login"));
/// ```
pub fn fingerprint(text: &str) -> String {
    let normalized = normalize(text);
    let digest = Sha256::digest(normalized.as_bytes());
    let mut hex = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN.div_ceil(2)) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Collapses whitespace runs and trims the ends of the text.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
