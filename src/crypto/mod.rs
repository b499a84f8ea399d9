//! Cryptographic services for the ledger
//!
//! This module provides:
//! - SHA-256 hashing
//! - Pedersen commitments over secp256k1
//! - Kernel excess signatures (ECDSA)
//! - Range proofs behind a verifier trait
//! - Proof of work

pub mod commitment;
pub mod hash;
pub mod keys;
pub mod pow;
pub mod rangeproof;

pub use commitment::{BlindingFactor, Commitment, CommitmentError, Committer};
pub use hash::{blake2b_256, meets_difficulty, sha256, Hash, HASH_SIZE};
pub use keys::{kernel_message, sign_message, verify_signature, KeyError, KeyPair};
pub use pow::{PowError, PowVerifier, ProofOfWork, TargetVerifier, PROOF_SIZE};
pub use rangeproof::{DigestRangeProver, RangeProof, RangeProofVerifier, MAX_PROOF_SIZE};
