//! mw-ledger: the block and transaction validation core of a MimbleWimble-style ledger
//!
//! This crate provides:
//! - A big-endian wire codec for inputs, outputs, kernels, headers, blocks and transactions
//! - Canonical hash ordering of block contents
//! - Consensus validation: timestamps, proof of work, coinbase quotas, range proofs
//!   and kernel excess signatures
//! - Pedersen commitments and kernel signatures over secp256k1
//! - Transaction aggregation with cut-through
//! - A framing codec for transports
//!
//! # Example
//!
//! ```rust
//! use mw_ledger::core::{ConsensusParams, ValidationContext};
//! use mw_ledger::crypto::DigestRangeProver;
//!
//! let params = ConsensusParams { min_difficulty: 4, ..Default::default() };
//! let block = mw_ledger::cli::build_demo_block(&params, 60).unwrap();
//!
//! let prover = DigestRangeProver::new();
//! let pow = params.pow_verifier();
//! let ctx = ValidationContext::new(&params, &prover, &pow);
//! assert!(block.validate(&ctx).is_ok());
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod network;

// Re-export commonly used types
pub use crate::core::{
    Block, BlockHeader, ConsensusParams, Decode, DecodeError, Encode, Input, Output, Transaction,
    TxKernel, ValidationContext, ValidationError,
};
pub use crate::crypto::{Commitment, Committer, Hash, KeyPair};
pub use crate::network::{Message, MessageCodec};
