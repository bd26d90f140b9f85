//! Salted envelope framing.
//!
//! Packs byte triples into 4-character alphabet groups, XORing every
//! byte with a running countdown seeded from the session salt. The
//! countdown is pre-decremented once per byte on both sides, so encode
//! and decode walk the same sequence.

use super::alphabet::{decode6, encode6};

/// Encodes a byte buffer into payload text.
///
/// Bytes are consumed three at a time; positions past the end of the
/// buffer read as zero. Each triple becomes four characters. When the
/// buffer length is not a multiple of three, `3 - (len mod 3)` trailing
/// characters are removed, leaving two characters for a lone byte and
/// three for a pair.
pub fn encode(data: &[u8], salt: i32) -> String {
    let mut n = salt;
    let mut out = String::with_capacity((data.len() / 3 + 1) * 4);
    let mut i = 0;
    while i < data.len() {
        let mut chunk: i32 = 0;
        for k in 0..3 {
            n = n.wrapping_sub(1);
            let b = data.get(i + k).copied().unwrap_or(0) as i32;
            chunk = (chunk << 8) | ((n ^ b) & 0xFF);
        }
        out.push(encode6(((chunk >> 18) & 63) as u8));
        out.push(encode6(((chunk >> 12) & 63) as u8));
        out.push(encode6(((chunk >> 6) & 63) as u8));
        out.push(encode6((chunk & 63) as u8));
        i += 3;
    }
    let rem = data.len() % 3;
    if rem != 0 {
        out.truncate(out.len() - (3 - rem));
    }
    out
}

/// Decodes payload text back into bytes.
///
/// Characters are consumed four at a time; missing characters in a
/// short final group read as value 0, and all three reconstructed bytes
/// of every group are kept. The output is therefore always a multiple
/// of three bytes long and may run past the originally encoded buffer;
/// callers that know the framing drop the surplus. Characters outside
/// the alphabet read as value 0.
pub fn decode(text: &str, salt: i32) -> Vec<u8> {
    let chars: Vec<char> = text.chars().collect();
    let mut n = salt;
    let mut out = Vec::with_capacity((chars.len() / 4 + 1) * 3);
    let mut i = 0;
    while i < chars.len() {
        let mut chunk: i32 = 0;
        for k in 0..4 {
            let v = chars.get(i + k).copied().map_or(0, decode6);
            chunk = (chunk << 6) | i32::from(v);
        }
        for k in 0..3 {
            n = n.wrapping_sub(1);
            out.push((((chunk >> (16 - 8 * k)) & 0xFF) ^ (n & 0xFF)) as u8);
        }
        i += 4;
    }
    out
}

/// Number of surplus bytes [`decode`] produces for a payload of
/// `wire_len` characters: one per character the encoder removed from
/// the final group.
pub(crate) fn surplus(wire_len: usize) -> usize {
    (4 - wire_len % 4) % 4
}
