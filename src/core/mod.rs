//! Core ledger components
//!
//! This module contains the consensus data model:
//! - Wire codec shared by every entity
//! - Inputs, outputs and kernels
//! - Hash-ordered element lists
//! - Block headers and blocks with their validation rules
//! - Transactions and aggregation
//! - Consensus parameters

pub mod block;
pub mod consensus;
pub mod error;
pub mod header;
pub mod input;
pub mod kernel;
pub mod list;
pub mod output;
pub mod ser;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_util;

pub use block::Block;
pub use consensus::{
    ConfigError, ConsensusParams, ValidationContext, BLOCK_TIME_SEC, DEFAULT_MIN_DIFFICULTY,
    DEFAULT_MIN_EDGE_BITS, FUTURE_TIME_LIMIT_BLOCKS, MAX_BLOCK_COINBASE_KERNELS,
    MAX_BLOCK_COINBASE_OUTPUTS, MAX_BLOCK_ELEMENTS, SECOND_POW_EDGE_BITS,
};
pub use error::ValidationError;
pub use header::{BlockHeader, HEADER_PRE_POW_SIZE, HEADER_SIZE};
pub use input::{Input, INPUT_SIZE};
pub use kernel::{KernelFeatures, TxKernel, KERNEL_SIZE};
pub use list::{HashList, InputList, OutputList, SortKey, TxKernelList};
pub use output::{Output, OutputFeatures, OUTPUT_MIN_SIZE};
pub use ser::{Decode, DecodeError, Encode};
pub use transaction::Transaction;
