//! Proof-of-work object carried by block headers
//!
//! The header treats the proof as opaque: it reads the edge-bit width, hashes
//! the serialized proof for block identity, and hands verification to a
//! [`PowVerifier`]. A verifier must bind the proof to the header it was found
//! for, since the header hash covers only the proof bytes.

use bytes::{Buf, BufMut};
use thiserror::Error;

use super::hash::{meets_difficulty, sha256_concat};
use crate::core::ser::{read_u64, read_u8, Decode, DecodeError, Encode};

/// Number of nonces (cycle edges) in a proof
pub const PROOF_SIZE: usize = 42;

/// Serialized size of a proof
pub const POW_ENCODED_SIZE: usize = 8 + 1 + PROOF_SIZE * 8;

/// Proof-of-work verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PowError {
    #[error("Invalid edge bits: {0}")]
    InvalidEdgeBits(u8),
    #[error("Proof nonces are not strictly ascending")]
    UnsortedNonces,
    #[error("Nonce {nonce} out of range for {edge_bits} edge bits")]
    NonceOutOfRange { nonce: u64, edge_bits: u8 },
    #[error("Difficulty {difficulty} below minimum {min}")]
    InsufficientDifficulty { difficulty: u64, min: u64 },
    #[error("Proof does not meet difficulty target {0}")]
    TargetNotMet(u64),
    #[error("No proof found for difficulty {0}")]
    Exhausted(u64),
}

/// The proof-of-work attached to a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOfWork {
    /// Target difficulty claimed by the header
    pub difficulty: u64,
    /// Graph size exponent the proof was found on
    pub edge_bits: u8,
    /// Cycle edge indices, strictly ascending
    pub nonces: [u64; PROOF_SIZE],
}

impl ProofOfWork {
    pub fn new(difficulty: u64, edge_bits: u8, nonces: [u64; PROOF_SIZE]) -> Self {
        Self {
            difficulty,
            edge_bits,
            nonces,
        }
    }

    pub fn edge_bits(&self) -> u8 {
        self.edge_bits
    }
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self {
            difficulty: 0,
            edge_bits: 0,
            nonces: [0u64; PROOF_SIZE],
        }
    }
}

impl Encode for ProofOfWork {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64(self.difficulty);
        buf.put_u8(self.edge_bits);
        for nonce in &self.nonces {
            buf.put_u64(*nonce);
        }
    }
}

impl Decode for ProofOfWork {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let difficulty = read_u64(buf)?;
        let edge_bits = read_u8(buf)?;
        let mut nonces = [0u64; PROOF_SIZE];
        for nonce in nonces.iter_mut() {
            *nonce = read_u64(buf)?;
        }
        Ok(Self {
            difficulty,
            edge_bits,
            nonces,
        })
    }
}

/// Full verification of a proof against the header bytes it commits to
pub trait PowVerifier: Send + Sync {
    fn verify(&self, pre_pow: &[u8], pow: &ProofOfWork, edge_bits: u8) -> Result<(), PowError>;
}

/// Hash-target proof of work.
///
/// Checks the proof's structure against its edge-bit width and requires
/// `sha256(pre_pow || pow)` to have `difficulty` leading zero bits. Because
/// the pre-pow header bytes are hashed in, a proof found for one header does
/// not verify for another.
#[derive(Debug, Clone, Copy)]
pub struct TargetVerifier {
    pub min_difficulty: u64,
}

impl TargetVerifier {
    pub fn new(min_difficulty: u64) -> Self {
        Self { min_difficulty }
    }

    fn check_structure(pow: &ProofOfWork, edge_bits: u8) -> Result<(), PowError> {
        if edge_bits == 0 || edge_bits >= 64 {
            return Err(PowError::InvalidEdgeBits(edge_bits));
        }
        let limit = 1u64 << edge_bits;
        if pow.nonces.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(PowError::UnsortedNonces);
        }
        if let Some(nonce) = pow.nonces.iter().find(|n| **n >= limit) {
            return Err(PowError::NonceOutOfRange {
                nonce: *nonce,
                edge_bits,
            });
        }
        Ok(())
    }

    fn meets_target(pre_pow: &[u8], pow: &ProofOfWork) -> bool {
        let hash = sha256_concat(&[pre_pow, &pow.encode()]);
        let bits = u32::try_from(pow.difficulty).unwrap_or(u32::MAX);
        meets_difficulty(hash.as_bytes(), bits)
    }

    /// Search for a proof over `pre_pow` (find a valid nonce window)
    pub fn mine(
        &self,
        pre_pow: &[u8],
        edge_bits: u8,
        difficulty: u64,
    ) -> Result<(ProofOfWork, u64), PowError> {
        if edge_bits == 0 || edge_bits >= 64 {
            return Err(PowError::InvalidEdgeBits(edge_bits));
        }
        let last_start = (1u64 << edge_bits).saturating_sub(PROOF_SIZE as u64);
        let mut attempts = 0u64;

        for start in 0..=last_start {
            attempts += 1;
            let mut nonces = [0u64; PROOF_SIZE];
            for (i, nonce) in nonces.iter_mut().enumerate() {
                *nonce = start + i as u64;
            }
            let pow = ProofOfWork::new(difficulty, edge_bits, nonces);
            if Self::meets_target(pre_pow, &pow) {
                return Ok((pow, attempts));
            }
        }

        Err(PowError::Exhausted(difficulty))
    }
}

impl PowVerifier for TargetVerifier {
    fn verify(&self, pre_pow: &[u8], pow: &ProofOfWork, edge_bits: u8) -> Result<(), PowError> {
        Self::check_structure(pow, edge_bits)?;

        if pow.difficulty < self.min_difficulty {
            return Err(PowError::InsufficientDifficulty {
                difficulty: pow.difficulty,
                min: self.min_difficulty,
            });
        }

        if !Self::meets_target(pre_pow, pow) {
            return Err(PowError::TargetNotMet(pow.difficulty));
        }

        Ok(())
    }
}
