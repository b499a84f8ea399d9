//! CLI commands for the ledger core
//!
//! Implements the command handlers behind the `mwledger` binary.

use chrono::Utc;
use std::fs;
use std::path::Path;

use crate::core::ser::{Decode, Encode};
use crate::core::{
    Block, BlockHeader, ConsensusParams, Input, KernelFeatures, Output, OutputFeatures,
    Transaction, TxKernel, ValidationContext,
};
use crate::crypto::{BlindingFactor, Committer, DigestRangeProver, Hash, KeyPair};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load consensus parameters from `path`, or the defaults
pub fn load_params(path: Option<&Path>) -> CliResult<ConsensusParams> {
    match path {
        Some(path) => Ok(ConsensusParams::load(path)?),
        None => Ok(ConsensusParams::default()),
    }
}

fn read_block(path: &Path) -> CliResult<Block> {
    let bytes = fs::read(path)?;
    let block = Block::decode(&bytes)?;
    log::debug!("Decoded {} bytes from {:?}", bytes.len(), path);
    Ok(block)
}

fn new_output(
    committer: &Committer,
    prover: &DigestRangeProver,
    value: u64,
    blind: &BlindingFactor,
    features: OutputFeatures,
) -> CliResult<Output> {
    let commit = committer.commit(value, blind)?;
    Ok(Output::new(features, commit, prover.prove(&commit)))
}

/// Build a mined sample block: one balanced spend plus a coinbase of `reward`
pub fn build_demo_block(params: &ConsensusParams, reward: u64) -> CliResult<Block> {
    let committer = Committer::new();
    let prover = DigestRangeProver::new();
    let fee = 2;

    // 100 in, 60 + 38 out, 2 to fees
    let input_blind = BlindingFactor::random();
    let input = Input::new(
        OutputFeatures::empty(),
        committer.commit(100, &input_blind)?,
    );
    let change_blind = BlindingFactor::random();
    let payment_blind = BlindingFactor::random();
    let change = new_output(&committer, &prover, 60, &change_blind, OutputFeatures::empty())?;
    let payment = new_output(&committer, &prover, 38, &payment_blind, OutputFeatures::empty())?;

    let offset = BlindingFactor::random();
    let excess = change_blind
        .add(&payment_blind)?
        .sub(&input_blind)?
        .sub(&offset)?;
    let excess_key = excess.to_secret_key()?.ok_or("kernel excess is zero")?;
    let kernel = TxKernel::new_signed(KernelFeatures::empty(), fee, 0, &excess_key);

    let tx = Transaction::new(
        offset,
        vec![input].into(),
        vec![change, payment].into(),
        vec![kernel].into(),
    );
    tx.verify_kernel_sums(&committer)?;

    let coinbase_key = KeyPair::generate();
    let coinbase_output = new_output(
        &committer,
        &prover,
        reward,
        &coinbase_key.blinding_factor(),
        OutputFeatures::COINBASE,
    )?;
    let coinbase_kernel =
        TxKernel::new_signed(KernelFeatures::COINBASE, 0, 0, &coinbase_key.secret_key);

    let header = BlockHeader::new(1, Hash::ZERO, Utc::now());
    let mut block = Block::from_transactions(header, vec![tx], coinbase_output, coinbase_kernel)?;
    block.header.mine(
        &params.pow_verifier(),
        params.min_edge_bits,
        params.min_difficulty,
    )?;
    Ok(block)
}

/// Write a mined sample block to `output`
pub fn cmd_demo(params: &ConsensusParams, output: &Path, reward: u64) -> CliResult<()> {
    println!("⛏️  Building sample block (difficulty {})...", params.min_difficulty);
    let block = build_demo_block(params, reward)?;
    let bytes = block.encode();
    fs::write(output, &bytes)?;

    println!("✅ Block written to {:?}", output);
    println!("   ├─ Hash: {}", block.hash());
    println!("   ├─ Size: {} bytes", bytes.len());
    println!("   └─ Fees: {}", block.total_fees());
    Ok(())
}

/// Decode a block file and print a summary
pub fn cmd_inspect(path: &Path) -> CliResult<()> {
    let block = read_block(path)?;
    let header = &block.header;

    println!("🧱 Block {}", block.hash());
    println!("   ├─ Height: {}", header.height);
    println!("   ├─ Previous: {}", header.previous);
    println!(
        "   ├─ Timestamp: {}",
        header.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "   ├─ Proof of work: {} edge bits, difficulty {}",
        header.pow.edge_bits(),
        header.difficulty()
    );
    println!("   ├─ Kernel offset: {}", header.total_kernel_offset.to_hex());
    println!("   ├─ Inputs: {}", block.inputs.len());
    println!("   ├─ Outputs: {}", block.outputs.len());
    println!("   ├─ Kernels: {}", block.kernels.len());
    println!("   └─ Fees: {}", block.total_fees());

    for output in block.outputs.iter() {
        let kind = if output.is_coinbase() { "coinbase" } else { "plain" };
        println!(
            "      output {} ({}, {} byte proof)",
            output.commit,
            kind,
            output.proof.len()
        );
    }
    for kernel in block.kernels.iter() {
        println!(
            "      kernel {} (fee {}, lock height {})",
            kernel.excess, kernel.fee, kernel.lock_height
        );
    }
    Ok(())
}

/// Printed after a successful validation: range proofs were only checked
/// by the digest prover, which binds a proof to its commitment but says
/// nothing about the committed value
pub const DEV_RANGE_PROOF_NOTE: &str =
    "⚠️  Range proofs checked with the development digest verifier, not a zero-knowledge range proof";

/// Validate a decoded block and describe the outcome, one line per entry
pub fn validation_report(params: &ConsensusParams, block: &Block) -> CliResult<Vec<String>> {
    let prover = DigestRangeProver::new();
    let pow = params.pow_verifier();
    let ctx = ValidationContext::new(params, &prover, &pow);

    block.validate(&ctx)?;
    Ok(vec![
        "✅ Block is valid!".to_string(),
        DEV_RANGE_PROOF_NOTE.to_string(),
    ])
}

/// Decode a block file and run full consensus validation
pub fn cmd_validate(params: &ConsensusParams, path: &Path) -> CliResult<()> {
    let block = read_block(path)?;

    println!("🔍 Validating block {}...", block.hash());
    match validation_report(params, &block) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            Ok(())
        }
        Err(e) => {
            println!("❌ Block validation FAILED: {}", e);
            Err(e)
        }
    }
}

/// Print the effective consensus parameters as JSON
pub fn cmd_params(params: &ConsensusParams) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(params)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> ConsensusParams {
        ConsensusParams {
            min_difficulty: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_demo_block_validates() {
        let params = test_params();
        let block = build_demo_block(&params, 60).unwrap();

        let prover = DigestRangeProver::new();
        let pow = params.pow_verifier();
        let ctx = ValidationContext::new(&params, &prover, &pow);
        assert!(block.validate(&ctx).is_ok());
        assert_eq!(block.total_fees(), 2);
    }

    #[test]
    fn test_demo_file_round_trip() {
        let params = test_params();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("block.bin");

        cmd_demo(&params, &path, 60).unwrap();
        cmd_inspect(&path).unwrap();
        cmd_validate(&params, &path).unwrap();
    }

    #[test]
    fn test_validate_rejects_corrupt_file() {
        let params = test_params();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("block.bin");
        cmd_demo(&params, &path, 60).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 1);
        fs::write(&path, &bytes).unwrap();

        assert!(cmd_validate(&params, &path).is_err());
    }

    #[test]
    fn test_report_discloses_development_verifier() {
        let params = test_params();
        let block = build_demo_block(&params, 60).unwrap();

        let lines = validation_report(&params, &block).unwrap();
        assert!(lines.iter().any(|l| l == DEV_RANGE_PROOF_NOTE));
        assert!(DEV_RANGE_PROOF_NOTE.contains("development digest verifier"));
    }

    #[test]
    fn test_missing_params_file() {
        assert!(load_params(Some(Path::new("/nonexistent/params.json"))).is_err());
        assert_eq!(load_params(None).unwrap(), ConsensusParams::default());
    }
}
