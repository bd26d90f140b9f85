//! Payload encoding.
//!
//! This module orchestrates the encode pipeline:
//! 1. Frame each accepted entry (`{`/`,` separator, quoted key, `:`,
//!    JSON value text) and XOR every byte with the main keystream
//! 2. Append the terminator byte from the main stream's cached draw and
//!    the first cid-stream output
//! 3. Overlay the whole buffer with successive cid-stream outputs
//! 4. Pack the buffer through the salted envelope into payload text
//!
//! Entry validation never fails a call: entries that cannot be encoded
//! are dropped silently (trace-logged) and do not advance the keystream,
//! so they leave no mark on the payload at all.

use log::trace;

use crate::salt::{derive_salt, Clock};
use crate::stream::{ByteStream, StreamFactory};
use crate::value::Value;
use crate::wire::envelope;
use crate::ChallengeType;

/// Streaming payload encoder.
///
/// An encoder owns one session context (hash, cid, salt, challenge
/// type). Entries are framed into the buffer as they are added;
/// [`finish`](Encoder::finish) seals the session and emits the payload
/// text. Not safe for concurrent use; distinct encoders are fully
/// independent.
#[derive(Debug)]
pub struct Encoder {
    hash: String,
    cid: String,
    salt: i32,
    challenge: ChallengeType,
    factory: StreamFactory,
    main: ByteStream,
    buffer: Vec<u8>,
    payload: Option<String>,
}

impl Encoder {
    /// Creates an encoder with an explicit salt and the default
    /// (captcha) challenge type.
    pub fn new(hash: &str, cid: &str, salt: i32) -> Self {
        Self::with_challenge(hash, cid, salt, ChallengeType::default())
    }

    /// Creates an encoder with an explicit salt and challenge type.
    pub fn with_challenge(hash: &str, cid: &str, salt: i32, challenge: ChallengeType) -> Self {
        let mut factory = StreamFactory::new();
        let main = factory.stream(crate::main_seed(hash, challenge), salt, true);
        Encoder {
            hash: hash.to_owned(),
            cid: cid.to_owned(),
            salt,
            challenge,
            factory,
            main,
            buffer: Vec::new(),
            payload: None,
        }
    }

    /// Creates an encoder whose salt is derived from the given clock.
    pub fn from_clock(hash: &str, cid: &str, clock: &dyn Clock, challenge: ChallengeType) -> Self {
        Self::with_challenge(hash, cid, derive_salt(clock), challenge)
    }

    /// The effective session salt (explicit or clock-derived).
    pub fn salt(&self) -> i32 {
        self.salt
    }

    /// The active challenge type.
    pub fn challenge_type(&self) -> ChallengeType {
        self.challenge
    }

    /// Adds one `(key, value)` entry.
    ///
    /// Entries are accepted when the key is a non-empty string other
    /// than the reserved `"xt1"` and the value serialises to JSON
    /// (strings, finite numbers, booleans, null, or nested JSON).
    /// Anything else is ignored without any observable effect on the
    /// payload. Entries added after [`finish`](Encoder::finish) are
    /// ignored as well.
    pub fn add(&mut self, key: &str, value: impl Into<Value>) {
        if self.payload.is_some() {
            trace!("dropping entry {:?}: session already finished", key);
            return;
        }
        if key.is_empty() {
            trace!("dropping entry with empty key");
            return;
        }
        if key == "xt1" {
            trace!("dropping entry with reserved key");
            return;
        }
        let value: Value = value.into();
        let Some(value_text) = value.to_json_text() else {
            trace!("dropping entry {:?}: value does not serialise", key);
            return;
        };

        let separator = if self.buffer.is_empty() { b'{' } else { b',' };
        self.push(separator);
        let key_text = serde_json::to_string(key).expect("str serialises");
        for &b in key_text.as_bytes() {
            self.push(b);
        }
        self.push(b':');
        for &b in value_text.as_bytes() {
            self.push(b);
        }
    }

    /// Seals the session and produces the payload text.
    ///
    /// Repeat calls re-emit the same text.
    pub fn finish(&mut self) -> String {
        if let Some(payload) = &self.payload {
            return payload.clone();
        }
        let mut cid_stream = self
            .factory
            .stream(crate::cid_seed(&self.cid), self.salt, false);
        let terminator = b'}' ^ self.main.next(true) ^ cid_stream.next(false);
        self.buffer.push(terminator);
        for b in self.buffer.iter_mut() {
            *b ^= cid_stream.next(false);
        }
        let payload = envelope::encode(&self.buffer, self.salt);
        self.payload = Some(payload.clone());
        payload
    }

    /// Switches the challenge type, resetting all session state.
    ///
    /// Seeds are re-derived and previously added entries are discarded.
    pub fn set_challenge_type(&mut self, challenge: ChallengeType) {
        self.challenge = challenge;
        self.factory = StreamFactory::new();
        self.main = self
            .factory
            .stream(crate::main_seed(&self.hash, challenge), self.salt, true);
        self.buffer.clear();
        self.payload = None;
    }

    fn push(&mut self, byte: u8) {
        let mask = self.main.next(false);
        self.buffer.push(byte ^ mask);
    }
}
