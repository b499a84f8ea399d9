//! Transaction inputs
//!
//! An input names the commitment of a previously created output that the
//! transaction spends. Its identity is the hash of its full encoding.

use bytes::{Buf, BufMut};

use super::error::ValidationError;
use super::list::SortKey;
use super::output::OutputFeatures;
use super::ser::{Decode, DecodeError, Encode};
use crate::crypto::commitment::{Commitment, COMMITMENT_SIZE};
use crate::crypto::hash::{blake2b_256, Hash};

/// Encoded size of an input
pub const INPUT_SIZE: usize = 1 + COMMITMENT_SIZE;

/// A reference to the output being spent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
    /// Features of the output being spent
    pub features: OutputFeatures,
    /// Commitment of the output being spent
    pub commit: Commitment,
}

impl Input {
    pub fn new(features: OutputFeatures, commit: Commitment) -> Self {
        Self { features, commit }
    }

    /// Hash of the serialized input
    pub fn hash(&self) -> Hash {
        blake2b_256(&self.encode())
    }

    /// Inputs carry no standalone consensus rule; spending checks belong to the UTXO layer
    pub fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl SortKey for Input {
    fn sort_key(&self) -> Hash {
        self.hash()
    }
}

impl Encode for Input {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.features.bits());
        self.commit.encode_to(buf);
    }
}

impl Decode for Input {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let features = OutputFeatures::decode_from(buf)?;
        let commit = Commitment::decode_from(buf)?;
        Ok(Self { features, commit })
    }
}
