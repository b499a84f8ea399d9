//! Consensus validation errors

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::crypto::commitment::{Commitment, CommitmentError};
use crate::crypto::pow::PowError;

/// A consensus rule a header, block or transaction failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid block time {timestamp}: later than {limit}")]
    TimestampTooFarInFuture {
        timestamp: DateTime<Utc>,
        limit: DateTime<Utc>,
    },
    #[error("Cuckoo size too small: {edge_bits} (min: {min})")]
    CuckooSizeTooSmall { edge_bits: u8, min: u8 },
    #[error("Invalid proof of work: {0}")]
    InvalidProofOfWork(#[from] PowError),
    #[error("Block has no outputs or no kernels")]
    EmptyBlock,
    #[error("Block inputs are not sorted")]
    UnsortedInputs,
    #[error("Block outputs are not sorted")]
    UnsortedOutputs,
    #[error("Block kernels are not sorted")]
    UnsortedKernels,
    #[error("Too many coinbase outputs (max: {max})")]
    TooManyCoinbaseOutputs { max: usize },
    #[error("Too many coinbase kernels (max: {max})")]
    TooManyCoinbaseKernels { max: usize },
    #[error("Range proof verification failed for {commit}")]
    InvalidRangeProof { commit: Commitment },
    #[error("Kernel signature isn't valid for excess {excess}")]
    InvalidKernelSignature { excess: Commitment },
    #[error("Kernel excesses do not balance the output and input commitments")]
    KernelSumMismatch,
    #[error("Commitment error: {0}")]
    Commitment(#[from] CommitmentError),
}
