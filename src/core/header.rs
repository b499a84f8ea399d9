//! Block header
//!
//! The header's identity is the hash of its proof of work. Every other field
//! reaches that hash only through the proof, which must commit to the pre-pow
//! header bytes (see [`PowVerifier`](crate::crypto::pow::PowVerifier)).

use bytes::{Buf, BufMut};
use chrono::{DateTime, Duration, SubsecRound, TimeZone, Utc};

use super::consensus::ValidationContext;
use super::error::ValidationError;
use super::ser::{read_i64, read_u64, Decode, DecodeError, Encode};
use crate::crypto::commitment::{BlindingFactor, Commitment, SECRET_KEY_SIZE};
use crate::crypto::hash::{blake2b_256, Hash, HASH_SIZE};
use crate::crypto::pow::{PowError, ProofOfWork, TargetVerifier, POW_ENCODED_SIZE};

/// Encoded size of a header without its proof of work
pub const HEADER_PRE_POW_SIZE: usize = 8 + 8 + 5 * HASH_SIZE + SECRET_KEY_SIZE + 8 + 8 + 8;

/// Encoded size of a full header
pub const HEADER_SIZE: usize = HEADER_PRE_POW_SIZE + POW_ENCODED_SIZE;

/// Block header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHeader {
    /// Height of this block since the genesis block (height 0)
    pub height: u64,
    /// Hash of the block previous to this in the chain
    pub previous: Hash,
    /// Root hash of the header MMR at the previous header
    pub previous_root: Hash,
    /// Timestamp at which the block was built, whole seconds
    pub timestamp: DateTime<Utc>,
    /// Merkle root of the UTXO set
    pub utxo_root: Hash,
    /// Merkle root of all range proofs in the UTXO set
    pub range_proof_root: Hash,
    /// Merkle root of all transaction kernels in the chain
    pub kernel_root: Hash,
    /// Nonce used while building the block
    pub nonce: u64,
    /// Total accumulated sum of kernel offsets since genesis
    pub total_kernel_offset: BlindingFactor,
    /// Total accumulated sum of kernel commitments since genesis.
    /// Kept in memory only, it is not part of the wire encoding.
    pub total_kernel_sum: Commitment,
    /// Total size of the output MMR after applying this block
    pub output_mmr_size: u64,
    /// Total size of the kernel MMR after applying this block
    pub kernel_mmr_size: u64,
    /// Proof of work and related
    pub pow: ProofOfWork,
}

impl BlockHeader {
    /// A header at `height` on top of `previous`, stamped `timestamp`
    pub fn new(height: u64, previous: Hash, timestamp: DateTime<Utc>) -> Self {
        Self {
            height,
            previous,
            timestamp: timestamp.trunc_subsecs(0),
            ..Default::default()
        }
    }

    /// Header identity: the hash of the proof-of-work bytes
    pub fn hash(&self) -> Hash {
        blake2b_256(&self.encode_pow())
    }

    /// Difficulty claimed by the proof of work
    pub fn difficulty(&self) -> u64 {
        self.pow.difficulty
    }

    /// All fields the proof of work commits to
    pub fn encode_without_pow(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_PRE_POW_SIZE);
        self.write_pre_pow(&mut buf);
        buf
    }

    pub fn encode_pow(&self) -> Vec<u8> {
        self.pow.encode()
    }

    fn write_pre_pow<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64(self.height);
        buf.put_i64(self.timestamp.timestamp());
        self.previous.encode_to(buf);
        self.previous_root.encode_to(buf);
        self.utxo_root.encode_to(buf);
        self.range_proof_root.encode_to(buf);
        self.kernel_root.encode_to(buf);
        self.total_kernel_offset.encode_to(buf);
        buf.put_u64(self.output_mmr_size);
        buf.put_u64(self.kernel_mmr_size);
        buf.put_u64(self.nonce);
    }

    /// Validate against the current wall clock
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
        self.validate_at(ctx, Utc::now())
    }

    /// Validate as if the local clock read `now`
    pub fn validate_at(
        &self,
        ctx: &ValidationContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let params = ctx.params;

        let ahead = Duration::seconds(params.future_time_limit_secs().min(i64::from(u32::MAX)));
        let limit = now
            .checked_add_signed(ahead)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if self.timestamp > limit {
            return Err(ValidationError::TimestampTooFarInFuture {
                timestamp: self.timestamp,
                limit,
            });
        }

        // Secondary proofs have their own fixed size; only primary ones face the floor
        let edge_bits = self.pow.edge_bits();
        let is_primary = edge_bits != params.second_pow_edge_bits;
        if is_primary && edge_bits < params.min_edge_bits {
            return Err(ValidationError::CuckooSizeTooSmall {
                edge_bits,
                min: params.min_edge_bits,
            });
        }

        ctx.pow
            .verify(&self.encode_without_pow(), &self.pow, edge_bits)
            .map_err(|e| {
                log::debug!("Header {} failed proof of work: {}", self.height, e);
                ValidationError::InvalidProofOfWork(e)
            })
    }

    /// Find a proof of work for the current header fields.
    ///
    /// Any later change to a pre-pow field invalidates the proof.
    pub fn mine(
        &mut self,
        verifier: &TargetVerifier,
        edge_bits: u8,
        difficulty: u64,
    ) -> Result<u64, PowError> {
        let (pow, attempts) = verifier.mine(&self.encode_without_pow(), edge_bits, difficulty)?;
        self.pow = pow;
        log::info!(
            "Mined header {} after {} attempts: {}",
            self.height,
            attempts,
            self.hash()
        );
        Ok(attempts)
    }
}

impl Encode for BlockHeader {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        self.write_pre_pow(buf);
        self.pow.encode_to(buf);
    }
}

impl Decode for BlockHeader {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let height = read_u64(buf)?;
        let secs = read_i64(buf)?;
        let timestamp = Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or(DecodeError::InvalidTimestamp(secs))?;
        let previous = Hash::decode_from(buf)?;
        let previous_root = Hash::decode_from(buf)?;
        let utxo_root = Hash::decode_from(buf)?;
        let range_proof_root = Hash::decode_from(buf)?;
        let kernel_root = Hash::decode_from(buf)?;
        let total_kernel_offset = BlindingFactor::decode_from(buf)?;
        let output_mmr_size = read_u64(buf)?;
        let kernel_mmr_size = read_u64(buf)?;
        let nonce = read_u64(buf)?;
        let pow = ProofOfWork::decode_from(buf)?;

        Ok(Self {
            height,
            previous,
            previous_root,
            timestamp,
            utxo_root,
            range_proof_root,
            kernel_root,
            nonce,
            total_kernel_offset,
            total_kernel_sum: Commitment::default(),
            output_mmr_size,
            kernel_mmr_size,
            pow,
        })
    }
}
