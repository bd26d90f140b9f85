//! Payload decoding.
//!
//! This module orchestrates the decode pipeline, the exact reverse of
//! the encoder:
//! 1. Unpack the envelope into the overlaid byte buffer
//! 2. Strip the cid-stream overlay (burning the terminator's draw first)
//! 3. Drop the envelope surplus and the terminator byte
//! 4. Strip the main-stream mask and scan the recovered text
//!
//! Decoding NEVER fails. A payload produced under a different context
//! decodes to garbage (usually an empty entry list) rather than an
//! error; detecting a context mismatch is the caller's responsibility.

use log::trace;

use crate::scan::scan_entries;
use crate::stream::StreamFactory;
use crate::value::Value;
use crate::wire::envelope;
use crate::ChallengeType;

/// Payload decoder for one session context.
///
/// Holds only derived seeds and the salt; each [`decode`](Decoder::decode)
/// call builds fresh keystreams, so a decoder may be reused across
/// payloads of the same session.
#[derive(Debug)]
pub struct Decoder {
    main_seed: i32,
    cid_seed: i32,
    salt: i32,
}

impl Decoder {
    /// Creates a decoder. All four context parts must match the encoder
    /// for the round-trip to succeed.
    pub fn new(hash: &str, cid: &str, salt: i32, challenge: ChallengeType) -> Self {
        Decoder {
            main_seed: crate::main_seed(hash, challenge),
            cid_seed: crate::cid_seed(cid),
            salt,
        }
    }

    /// Recovers the ordered entry sequence from payload text.
    pub fn decode(&self, payload: &str) -> Vec<(String, Value)> {
        let mut data = envelope::decode(payload, self.salt);
        trace!("unpacked {} bytes from {} chars", data.len(), payload.len());

        // Mirror the encoder's construction order: cid stream first
        // (plain), main stream second (taking the alt latch).
        let mut factory = StreamFactory::new();
        let mut cid_stream = factory.stream(self.cid_seed, self.salt, false);
        let mut main = factory.stream(self.main_seed, self.salt, true);

        cid_stream.next(false); // the terminator's draw
        for b in data.iter_mut() {
            *b ^= cid_stream.next(false);
        }

        let surplus = envelope::surplus(payload.chars().count());
        data.truncate(data.len().saturating_sub(surplus));
        data.pop(); // terminator

        for b in data.iter_mut() {
            *b ^= main.next(false);
        }

        scan_entries(&String::from_utf8_lossy(&data))
    }
}
