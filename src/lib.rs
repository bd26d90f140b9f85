//! # Veilwire - reversible telemetry payload codec
//!
//! Veilwire obfuscates an ordered stream of key/value telemetry signals
//! into a compact textual payload and recovers it bit-exactly, given the
//! same shared context (a hash string, a client identifier, a 32-bit
//! salt and a challenge-type tag).
//!
//! ## Overview
//!
//! The pipeline, inside out:
//! - entries are framed as `{"key":value,...` text and XOR-masked byte
//!   by byte with the **main keystream** (seeded from the hash and the
//!   challenge type, salted with a countdown)
//! - a terminator byte seals the frame and the whole buffer gets a
//!   second mask from the **cid keystream** (seeded from the client
//!   identifier)
//! - the masked buffer is packed through a salted **envelope**: three
//!   bytes to four characters of a 64-character alphabet (`-`, `_`,
//!   digits, letters)
//!
//! This is obfuscation, not encryption: there is no key material beyond
//! the shared context, and the scheme offers no cryptographic security.
//! Decoding never fails (wrong context yields garbage, malformed input
//! is skipped), so no error handling is needed on the read path.
//!
//! ## Example
//!
//! ```rust
//! use veilwire::{ChallengeType, Decoder, Encoder, Value};
//!
//! let hash = "5D41402ABC4B2A76B9719D911017C592";
//! let mut encoder = Encoder::new(hash, "client-7f3a", 1337);
//! encoder.add("screenWidth", 1920);
//! encoder.add("captchaResponse", "xyz123");
//! let payload = encoder.finish();
//!
//! let decoder = Decoder::new(hash, "client-7f3a", 1337, ChallengeType::Captcha);
//! assert_eq!(
//!     decoder.decode(&payload),
//!     vec![
//!         ("screenWidth".to_string(), Value::Int(1920)),
//!         ("captchaResponse".to_string(), Value::Str("xyz123".to_string())),
//!     ]
//! );
//! ```
//!
//! ## Modules
//!
//! - [`encoder`] / [`decoder`]: the entry codec
//! - [`stream`]: keystream byte generators
//! - [`wire`]: alphabet and envelope framing
//! - [`value`]: the entry value sum
//! - [`salt`]: clock collaborator for derived salts

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod decoder;
pub mod encoder;
pub mod hash;
pub mod salt;
mod scan;
pub mod stream;
pub mod value;
pub mod wire;
pub mod word;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use salt::{Clock, SystemClock};
pub use value::Value;

/// Base word folded into every main-stream seed. Exceeds 32-bit range;
/// seed derivation uses its signed 32-bit image, while the derived-salt
/// product uses the full value.
pub const MAIN_SEED_BASE: i64 = 9_959_949_970;

/// Base word folded into the cid-stream seed.
pub const CID_SEED_BASE: i32 = 1_809_053_797;

const CAPTCHA_SEED_MASK: i32 = -1_748_112_727;
const INTERSTITIAL_SEED_MASK: i32 = -883_841_716;

/// Challenge flavour the payload belongs to.
///
/// Only the main-seed mask differs between the two; everything else in
/// the pipeline is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChallengeType {
    #[default]
    Captcha,
    Interstitial,
}

impl ChallengeType {
    pub(crate) fn seed_mask(self) -> i32 {
        match self {
            ChallengeType::Captcha => CAPTCHA_SEED_MASK,
            ChallengeType::Interstitial => INTERSTITIAL_SEED_MASK,
        }
    }

    /// The wire tag for this challenge type.
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeType::Captcha => "captcha",
            ChallengeType::Interstitial => "interstitial",
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A challenge-type tag that is neither `captcha` nor `interstitial`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognised challenge type tag: {0:?}")]
pub struct UnknownChallengeType(pub String);

impl FromStr for ChallengeType {
    type Err = UnknownChallengeType;

    /// Parses a tag case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("captcha") {
            Ok(ChallengeType::Captcha)
        } else if s.eq_ignore_ascii_case("interstitial") {
            Ok(ChallengeType::Interstitial)
        } else {
            Err(UnknownChallengeType(s.to_owned()))
        }
    }
}

/// Main-stream seed for a session.
pub(crate) fn main_seed(hash_text: &str, challenge: ChallengeType) -> i32 {
    word::truncate(MAIN_SEED_BASE) ^ hash::sign_hash(hash_text) ^ challenge.seed_mask()
}

/// Cid-stream seed for a session.
pub(crate) fn cid_seed(cid: &str) -> i32 {
    CID_SEED_BASE ^ hash::sign_hash(cid)
}
