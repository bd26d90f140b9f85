//! Deterministic signed 32-bit hash of a context string.
//!
//! Seeds for both keystreams are mixed from this hash. The iteration
//! runs over UTF-16 code units (not code points) because that is what
//! the format's host indexes strings by.

/// Returned for the empty string and for any string whose hash
/// computes to exactly zero.
pub const HASH_FALLBACK: i32 = 1_789_537_805;

/// Hashes a string into a signed 32-bit word.
///
/// For each UTF-16 code unit `c`: `h = (h << 5) - h + c`, truncated to
/// signed 32 bits after every step. Empty input and a zero result both
/// map to [`HASH_FALLBACK`].
pub fn sign_hash(s: &str) -> i32 {
    if s.is_empty() {
        return HASH_FALLBACK;
    }
    let mut h: i32 = 0;
    for unit in s.encode_utf16() {
        h = (h << 5).wrapping_sub(h).wrapping_add(i32::from(unit));
    }
    if h == 0 {
        HASH_FALLBACK
    } else {
        h
    }
}
