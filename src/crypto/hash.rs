//! Hashing primitives for the ledger
//!
//! Provides the fixed-size [`Hash`] type used for block linkage, Merkle roots
//! and canonical ordering keys, plus the digests behind it. Inputs, kernels
//! and headers are identified by BLAKE2b-256; outputs and proof-of-work
//! targets use SHA-256.

use blake2::digest::consts::U32;
use blake2::Blake2b;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::core::ser::DecodeError;

/// Size of every hash-typed field in bytes
pub const HASH_SIZE: usize = 32;

/// A 32-byte digest
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash(pub [u8; HASH_SIZE]);

impl Hash {
    /// The all-zero hash, used for the genesis previous-block field
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    /// Build a hash from a slice, rejecting anything that is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let array: [u8; HASH_SIZE] =
            bytes
                .try_into()
                .map_err(|_| DecodeError::InvalidLength {
                    field: "hash",
                    expected: HASH_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Hash(array))
    }

    /// Parse a hex-encoded hash
    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        let bytes = hex::decode(s).map_err(|_| DecodeError::InvalidLength {
            field: "hash",
            expected: HASH_SIZE,
            actual: s.len() / 2,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

type Blake2b256 = Blake2b<U32>;

/// Computes BLAKE2b with a 32-byte digest
pub fn blake2b_256(data: &[u8]) -> Hash {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    Hash(hasher.finalize().into())
}

/// Computes SHA-256 of the input data
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash(hasher.finalize().into())
}

/// Computes SHA-256 over several byte slices as if they were concatenated
pub fn sha256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}

/// Checks if a hash meets the difficulty target
/// The hash must have `difficulty` leading zero bits
pub fn meets_difficulty(hash: &[u8], difficulty: u32) -> bool {
    let required_zeros = difficulty as usize / 8;
    let remaining_bits = difficulty as usize % 8;

    if required_zeros > hash.len() || (required_zeros == hash.len() && remaining_bits > 0) {
        return false;
    }

    // Check full zero bytes
    for byte in hash.iter().take(required_zeros) {
        if *byte != 0 {
            return false;
        }
    }

    // Check remaining bits
    if remaining_bits > 0 {
        let mask = 0xFF << (8 - remaining_bits);
        if hash[required_zeros] & mask != 0 {
            return false;
        }
    }

    true
}
