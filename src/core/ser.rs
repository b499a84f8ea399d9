//! Binary wire codec
//!
//! Every consensus entity is written big-endian with variable-length
//! collections prefixed by a `u64` count. Reads are bounds-checked and report
//! a [`DecodeError`]; writes go to an in-memory buffer and cannot fail.

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::crypto::commitment::{BlindingFactor, Commitment, COMMITMENT_SIZE, SECRET_KEY_SIZE};
use crate::crypto::hash::{Hash, HASH_SIZE};

/// Decode errors for malformed wire data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("Invalid {field} length: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Too many {kind}: {count} (max: {max})")]
    TooManyElements {
        kind: &'static str,
        count: u64,
        max: u64,
    },
    #[error("Invalid range proof length: {len} (max: {max})")]
    ProofTooLarge { len: u64, max: usize },
    #[error("Invalid {kind} features: {bits:#04x}")]
    InvalidFeatures { kind: &'static str, bits: u8 },
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
    #[error("Trailing bytes after entity: {0}")]
    TrailingBytes(usize),
    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),
    #[error("Frame too large: {len} bytes (max: {max})")]
    FrameTooLarge { len: u64, max: usize },
    #[error("Invalid magic bytes")]
    InvalidMagic,
}

/// Types that have a canonical wire encoding
pub trait Encode {
    /// Append the wire encoding to `buf`
    fn encode_to<B: BufMut>(&self, buf: &mut B);

    /// Wire encoding as an owned buffer
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }
}

/// Types that can be read back from their wire encoding
pub trait Decode: Sized {
    /// Read one value from the front of `buf`, advancing it
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError>;

    /// Decode a value that must span `bytes` exactly
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = bytes;
        let value = Self::decode_from(&mut buf)?;
        if buf.has_remaining() {
            return Err(DecodeError::TrailingBytes(buf.remaining()));
        }
        Ok(value)
    }
}

fn ensure<B: Buf>(buf: &B, needed: usize) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        return Err(DecodeError::UnexpectedEof {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

pub fn read_u8<B: Buf>(buf: &mut B) -> Result<u8, DecodeError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn read_u64<B: Buf>(buf: &mut B) -> Result<u64, DecodeError> {
    ensure(buf, 8)?;
    Ok(buf.get_u64())
}

pub fn read_i64<B: Buf>(buf: &mut B) -> Result<i64, DecodeError> {
    ensure(buf, 8)?;
    Ok(buf.get_i64())
}

/// Read a fixed-size field
pub fn read_array<B: Buf, const N: usize>(buf: &mut B) -> Result<[u8; N], DecodeError> {
    ensure(buf, N)?;
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

/// Read `len` bytes into a fresh buffer. Callers bound `len` first.
pub fn read_bytes<B: Buf>(buf: &mut B, len: usize) -> Result<Vec<u8>, DecodeError> {
    ensure(buf, len)?;
    let mut out = vec![0u8; len];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

/// Read a collection count and check it against `max` before anything is allocated
pub fn read_count<B: Buf>(buf: &mut B, kind: &'static str, max: u64) -> Result<u64, DecodeError> {
    let count = read_u64(buf)?;
    if count > max {
        return Err(DecodeError::TooManyElements { kind, count, max });
    }
    Ok(count)
}

/// Decode exactly `count` elements.
///
/// The initial reservation is capped by the bytes actually available, so a
/// count that passed the ceiling check still cannot force a large allocation
/// on a short buffer.
pub fn read_list<T: Decode, B: Buf>(
    buf: &mut B,
    count: u64,
    min_element_size: usize,
) -> Result<Vec<T>, DecodeError> {
    let available = buf.remaining() / min_element_size.max(1);
    let mut items = Vec::with_capacity((count as usize).min(available));
    for _ in 0..count {
        items.push(T::decode_from(buf)?);
    }
    Ok(items)
}

impl Encode for Hash {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(self.as_bytes());
    }
}

impl Decode for Hash {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        read_array::<_, HASH_SIZE>(buf).map(Hash)
    }
}

impl Encode for Commitment {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(self.as_bytes());
    }
}

impl Decode for Commitment {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        read_array::<_, COMMITMENT_SIZE>(buf).map(Commitment)
    }
}

impl Encode for BlindingFactor {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.0);
    }
}

impl Decode for BlindingFactor {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        read_array::<_, SECRET_KEY_SIZE>(buf).map(BlindingFactor)
    }
}
