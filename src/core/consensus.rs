//! Consensus parameters and the validation context
//!
//! Defaults match the values every node on the network must agree on. A
//! parameter file only exists so test and development networks can loosen
//! them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::crypto::pow::{PowVerifier, TargetVerifier};
use crate::crypto::rangeproof::RangeProofVerifier;

// =============================================================================
// Consensus Constants
// =============================================================================

/// Target seconds between blocks
pub const BLOCK_TIME_SEC: u64 = 60;

/// How many block intervals a header timestamp may run ahead of local time
pub const FUTURE_TIME_LIMIT_BLOCKS: u64 = 12;

/// Smallest edge-bit width accepted for a primary proof of work
pub const DEFAULT_MIN_EDGE_BITS: u8 = 31;

/// Edge-bit width reserved for the secondary proof of work
pub const SECOND_POW_EDGE_BITS: u8 = 29;

/// Maximum coinbase outputs in one block
pub const MAX_BLOCK_COINBASE_OUTPUTS: usize = 1;

/// Maximum coinbase kernels in one block
pub const MAX_BLOCK_COINBASE_KERNELS: usize = 1;

/// Ceiling on each declared collection count when decoding
pub const MAX_BLOCK_ELEMENTS: u64 = 1_000_000;

/// Default proof-of-work difficulty floor (leading zero bits)
pub const DEFAULT_MIN_DIFFICULTY: u64 = 10;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Consensus parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParams {
    pub block_time_sec: u64,
    pub future_time_limit_blocks: u64,
    pub min_edge_bits: u8,
    pub second_pow_edge_bits: u8,
    pub max_coinbase_outputs: usize,
    pub max_coinbase_kernels: usize,
    pub min_difficulty: u64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            block_time_sec: BLOCK_TIME_SEC,
            future_time_limit_blocks: FUTURE_TIME_LIMIT_BLOCKS,
            min_edge_bits: DEFAULT_MIN_EDGE_BITS,
            second_pow_edge_bits: SECOND_POW_EDGE_BITS,
            max_coinbase_outputs: MAX_BLOCK_COINBASE_OUTPUTS,
            max_coinbase_kernels: MAX_BLOCK_COINBASE_KERNELS,
            min_difficulty: DEFAULT_MIN_DIFFICULTY,
        }
    }
}

impl ConsensusParams {
    /// Load parameters from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let params: ConsensusParams = serde_json::from_str(&data)?;
        params.validate()?;
        log::debug!("Loaded consensus parameters from {:?}", path);
        Ok(params)
    }

    /// Reject values no network could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_time_sec == 0 {
            return Err(ConfigError::InvalidParameter(
                "block_time_sec must be positive".into(),
            ));
        }
        if self.future_time_limit_secs() > i64::from(u32::MAX) {
            return Err(ConfigError::InvalidParameter(
                "future time limit overflows".into(),
            ));
        }
        if self.min_edge_bits == 0 || self.min_edge_bits >= 64 {
            return Err(ConfigError::InvalidParameter(format!(
                "min_edge_bits out of range: {}",
                self.min_edge_bits
            )));
        }
        if self.second_pow_edge_bits == 0 || self.second_pow_edge_bits >= 64 {
            return Err(ConfigError::InvalidParameter(format!(
                "second_pow_edge_bits out of range: {}",
                self.second_pow_edge_bits
            )));
        }
        if self.max_coinbase_outputs == 0 || self.max_coinbase_kernels == 0 {
            return Err(ConfigError::InvalidParameter(
                "coinbase quotas must allow at least one".into(),
            ));
        }
        Ok(())
    }

    /// How far ahead of local time a header may be stamped, in seconds
    pub fn future_time_limit_secs(&self) -> i64 {
        let secs = self
            .block_time_sec
            .saturating_mul(self.future_time_limit_blocks);
        i64::try_from(secs).unwrap_or(i64::MAX)
    }

    /// The proof-of-work verifier matching these parameters
    pub fn pow_verifier(&self) -> TargetVerifier {
        TargetVerifier::new(self.min_difficulty)
    }
}

/// Everything block and header validation consults besides the entity itself
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub params: &'a ConsensusParams,
    pub range_proofs: &'a dyn RangeProofVerifier,
    pub pow: &'a dyn PowVerifier,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        params: &'a ConsensusParams,
        range_proofs: &'a dyn RangeProofVerifier,
        pow: &'a dyn PowVerifier,
    ) -> Self {
        Self {
            params,
            range_proofs,
            pow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let params = ConsensusParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.future_time_limit_secs(), 720);
        assert_eq!(params.max_coinbase_outputs, 1);
        assert_eq!(params.max_coinbase_kernels, 1);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"min_edge_bits": 19, "min_difficulty": 2}}"#).unwrap();

        let params = ConsensusParams::load(file.path()).unwrap();
        assert_eq!(params.min_edge_bits, 19);
        assert_eq!(params.min_difficulty, 2);
        assert_eq!(params.block_time_sec, BLOCK_TIME_SEC);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"block_time_sec": 0}}"#).unwrap();

        assert!(matches!(
            ConsensusParams::load(file.path()),
            Err(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            ConsensusParams::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
