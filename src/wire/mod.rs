//! Wire layer: the 6-bit character alphabet and the salted envelope
//! framing that turns an arbitrary byte buffer into payload text.

pub mod alphabet;
pub mod envelope;
