//! Session salt derivation from a host-provided clock.
//!
//! The salt is normally supplied by the caller; when it is not, one is
//! derived deterministically from a millisecond timestamp. The clock is
//! a collaborator behind a trait so hosts (and tests) can substitute
//! their own source.

use crate::word;
use crate::MAIN_SEED_BASE;

/// Mixed into the timestamp before scrambling. Exceeds 32-bit range on
/// purpose; only its signed 32-bit image takes part.
const SALT_TIME_MASK: i64 = 11_027_890_091;

/// Millisecond clock supplied by the host.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Derives a session salt from the clock.
///
/// The timestamp folds to i32, shifts right by three, XORs with the time
/// mask and scrambles. The scrambled word is then multiplied by the main
/// seed base in f64 (the product overflows 32 bits and must round the
/// way a double does, not wrap) before folding back through
/// [`word::to_int32`] and one more scramble.
pub(crate) fn derive_salt(clock: &dyn Clock) -> i32 {
    let t = clock.now_millis() as i32;
    let inner = word::mix((t >> 3) ^ word::truncate(SALT_TIME_MASK));
    let product = f64::from(inner) * MAIN_SEED_BASE as f64;
    word::mix(word::to_int32(product))
}
