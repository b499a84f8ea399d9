//! Transaction outputs
//!
//! An output is a new spendable value: a Pedersen commitment plus a range
//! proof showing the hidden amount is not negative. Output identity covers
//! the features and commitment only, so a proof can be replaced without
//! changing which output it is.

use bitflags::bitflags;
use bytes::{Buf, BufMut};

use super::error::ValidationError;
use super::list::SortKey;
use super::ser::{read_bytes, read_u64, read_u8, Decode, DecodeError, Encode};
use crate::crypto::commitment::{Commitment, COMMITMENT_SIZE};
use crate::crypto::hash::{sha256, Hash};
use crate::crypto::rangeproof::{RangeProof, MAX_PROOF_SIZE};

/// Smallest possible encoded output (empty proof)
pub const OUTPUT_MIN_SIZE: usize = 1 + COMMITMENT_SIZE + 8;

bitflags! {
    /// Options for block validation
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct OutputFeatures: u8 {
        /// Output is a coinbase output, must not be spent until maturity
        const COINBASE = 1 << 0;
    }
}

impl OutputFeatures {
    pub fn is_coinbase(&self) -> bool {
        self.contains(OutputFeatures::COINBASE)
    }
}

impl Decode for OutputFeatures {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let bits = read_u8(buf)?;
        OutputFeatures::from_bits(bits).ok_or(DecodeError::InvalidFeatures {
            kind: "output",
            bits,
        })
    }
}

/// A new output created by a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Whether this is a coinbase or a regular transaction output
    pub features: OutputFeatures,
    /// Homomorphic commitment to the output's value
    pub commit: Commitment,
    /// Proof that the committed value is in range
    pub proof: RangeProof,
}

impl Output {
    pub fn new(features: OutputFeatures, commit: Commitment, proof: RangeProof) -> Self {
        Self {
            features,
            commit,
            proof,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.features.is_coinbase()
    }

    /// Features and commitment, without the proof
    pub fn encode_without_proof(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + COMMITMENT_SIZE);
        buf.put_u8(self.features.bits());
        self.commit.encode_to(&mut buf);
        buf
    }

    /// Hash of the serialized output, excluding the range proof
    pub fn hash(&self) -> Hash {
        sha256(&self.encode_without_proof())
    }

    /// Per-output rules. Value ranges are enforced by block-level range-proof
    /// verification, so there is nothing to check here yet.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl SortKey for Output {
    fn sort_key(&self) -> Hash {
        self.hash()
    }
}

impl Encode for Output {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        assert!(
            self.proof.len() <= MAX_PROOF_SIZE,
            "range proof of {} bytes exceeds the wire maximum",
            self.proof.len()
        );
        buf.put_u8(self.features.bits());
        self.commit.encode_to(buf);
        buf.put_u64(self.proof.len() as u64);
        buf.put_slice(self.proof.as_bytes());
    }
}

impl Decode for Output {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let features = OutputFeatures::decode_from(buf)?;
        let commit = Commitment::decode_from(buf)?;

        let proof_len = read_u64(buf)?;
        if proof_len > MAX_PROOF_SIZE as u64 {
            return Err(DecodeError::ProofTooLarge {
                len: proof_len,
                max: MAX_PROOF_SIZE,
            });
        }
        let proof = RangeProof(read_bytes(buf, proof_len as usize)?);

        Ok(Self {
            features,
            commit,
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_util::{output, random_commitment};

    #[test]
    fn test_output_round_trip_preserves_proof() {
        let (output, _) = output(25, OutputFeatures::empty());
        let bytes = output.encode();

        assert_eq!(bytes.len(), OUTPUT_MIN_SIZE + output.proof.len());
        let decoded = Output::decode(&bytes).unwrap();
        assert_eq!(decoded, output);
        assert_eq!(decoded.proof.as_bytes(), output.proof.as_bytes());
    }

    #[test]
    fn test_hash_excludes_proof() {
        let (mut output, _) = output(25, OutputFeatures::COINBASE);
        let before = output.hash();

        output.proof.0[0] ^= 0xFF;
        assert_eq!(output.hash(), before);

        output.features = OutputFeatures::empty();
        assert_ne!(output.hash(), before);
    }

    #[test]
    fn test_hash_vector() {
        let output = Output::new(
            OutputFeatures::COINBASE,
            Commitment([0x08; COMMITMENT_SIZE]),
            RangeProof(vec![0xAA; 16]),
        );
        assert_eq!(
            output.hash().to_hex(),
            "ffb9d7024290bb8cbfa0ba11ed2da51e3657e4cfa357992088f50cc42101897d"
        );
    }

    #[test]
    fn test_oversized_proof_rejected_before_read() {
        let mut bytes = Vec::new();
        bytes.put_u8(0);
        random_commitment().encode_to(&mut bytes);
        bytes.put_u64(MAX_PROOF_SIZE as u64 + 1);
        // No proof bytes follow: the length alone must be enough to reject

        assert_eq!(
            Output::decode(&bytes),
            Err(DecodeError::ProofTooLarge {
                len: MAX_PROOF_SIZE as u64 + 1,
                max: MAX_PROOF_SIZE
            })
        );
    }

    #[test]
    fn test_unknown_feature_bits_rejected() {
        let (output, _) = output(1, OutputFeatures::empty());
        let mut bytes = output.encode();
        bytes[0] = 0x80;
        assert_eq!(
            Output::decode(&bytes),
            Err(DecodeError::InvalidFeatures {
                kind: "output",
                bits: 0x80
            })
        );
    }

    #[test]
    #[should_panic(expected = "exceeds the wire maximum")]
    fn test_encoding_oversized_proof_panics() {
        let output = Output::new(
            OutputFeatures::empty(),
            random_commitment(),
            RangeProof(vec![0u8; MAX_PROOF_SIZE + 1]),
        );
        let _ = output.encode();
    }
}
