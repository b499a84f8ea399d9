//! Range proofs
//!
//! The validation core treats a range proof as an opaque blob checked by a
//! [`RangeProofVerifier`]. [`DigestRangeProver`] is a development prover: it
//! binds a proof to its commitment but hides nothing and proves nothing about
//! the value. Networks that need confidentiality plug a bulletproof verifier
//! in behind the same trait.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

use super::commitment::Commitment;
use super::hash::sha256_concat;

/// Largest range proof accepted on the wire
pub const MAX_PROOF_SIZE: usize = 5134;

/// An opaque range proof
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RangeProof(pub Vec<u8>);

impl RangeProof {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RangeProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RangeProof({} bytes)", self.0.len())
    }
}

/// Verifies that a commitment hides a value in `[0, 2^64)`
pub trait RangeProofVerifier: Send + Sync {
    fn verify(&self, commit: &Commitment, proof: &RangeProof) -> bool;
}

const DIGEST_PROOF_DOMAIN: &[u8] = b"mw-ledger/range-proof/v1";
const SALT_SIZE: usize = 32;

/// Salted digest proofs: `salt || sha256(domain || commit || salt)`
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestRangeProver;

impl DigestRangeProver {
    pub fn new() -> Self {
        Self
    }

    /// Produce a proof for `commit`
    pub fn prove(&self, commit: &Commitment) -> RangeProof {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);

        let digest = sha256_concat(&[DIGEST_PROOF_DOMAIN, commit.as_bytes(), &salt]);
        let mut proof = Vec::with_capacity(SALT_SIZE + digest.0.len());
        proof.extend_from_slice(&salt);
        proof.extend_from_slice(digest.as_bytes());
        RangeProof(proof)
    }
}

impl RangeProofVerifier for DigestRangeProver {
    fn verify(&self, commit: &Commitment, proof: &RangeProof) -> bool {
        if proof.len() != SALT_SIZE + 32 {
            return false;
        }
        let (salt, digest) = proof.0.split_at(SALT_SIZE);
        sha256_concat(&[DIGEST_PROOF_DOMAIN, commit.as_bytes(), salt]).as_bytes() == digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::commitment::{BlindingFactor, Committer};

    fn commitment(value: u64) -> Commitment {
        Committer::new()
            .commit(value, &BlindingFactor::random())
            .unwrap()
    }

    #[test]
    fn test_proof_verifies_for_its_commitment() {
        let prover = DigestRangeProver::new();
        let commit = commitment(100);
        let proof = prover.prove(&commit);

        assert!(proof.len() <= MAX_PROOF_SIZE);
        assert!(prover.verify(&commit, &proof));
    }

    #[test]
    fn test_proof_rejected_for_other_commitment() {
        let prover = DigestRangeProver::new();
        let proof = prover.prove(&commitment(1));
        assert!(!prover.verify(&commitment(1), &proof));
    }

    #[test]
    fn test_corrupted_proof_rejected() {
        let prover = DigestRangeProver::new();
        let commit = commitment(9);
        let mut proof = prover.prove(&commit);
        proof.0[40] ^= 0x01;
        assert!(!prover.verify(&commit, &proof));

        proof.0.pop();
        assert!(!prover.verify(&commit, &proof));
    }
}
