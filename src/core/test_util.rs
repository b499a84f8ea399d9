//! Fixtures shared by the unit tests

use chrono::Utc;

use super::block::Block;
use super::consensus::{ConsensusParams, ValidationContext};
use super::header::BlockHeader;
use super::input::Input;
use super::kernel::{KernelFeatures, TxKernel};
use super::output::{Output, OutputFeatures};
use super::transaction::Transaction;
use crate::crypto::commitment::{BlindingFactor, Commitment, Committer};
use crate::crypto::hash::Hash;
use crate::crypto::keys::KeyPair;
use crate::crypto::pow::TargetVerifier;
use crate::crypto::rangeproof::DigestRangeProver;

/// Consensus parameters plus the bundled verifiers
pub struct Fixture {
    pub params: ConsensusParams,
    pub prover: DigestRangeProver,
    pub pow: TargetVerifier,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_params(ConsensusParams::default())
    }

    pub fn with_params(params: ConsensusParams) -> Self {
        let pow = params.pow_verifier();
        Self {
            params,
            prover: DigestRangeProver::new(),
            pow,
        }
    }

    pub fn ctx(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.params, &self.prover, &self.pow)
    }
}

pub fn random_commitment() -> Commitment {
    Committer::new()
        .commit(0, &BlindingFactor::random())
        .unwrap()
}

/// A range-proved output and the blinding factor that opens it
pub fn output(value: u64, features: OutputFeatures) -> (Output, BlindingFactor) {
    let blind = BlindingFactor::random();
    let commit = Committer::new().commit(value, &blind).unwrap();
    let proof = DigestRangeProver::new().prove(&commit);
    (Output::new(features, commit, proof), blind)
}

/// Coinbase output and its matching kernel
pub fn coinbase(value: u64) -> (Output, TxKernel) {
    let key = KeyPair::generate();
    let commit = Committer::new()
        .commit(value, &key.blinding_factor())
        .unwrap();
    let proof = DigestRangeProver::new().prove(&commit);
    let output = Output::new(OutputFeatures::COINBASE, commit, proof);
    let kernel = TxKernel::new_signed(KernelFeatures::COINBASE, 0, 0, &key.secret_key);
    (output, kernel)
}

/// A kernel signed by a fresh key
pub fn signed_kernel(features: KernelFeatures, fee: u64) -> TxKernel {
    TxKernel::new_signed(features, fee, 0, &KeyPair::generate().secret_key)
}

/// A sorted transaction spending the given `(value, blind)` openings into
/// fresh outputs. Returns the openings of the new outputs in the order of
/// `output_values`.
pub fn balanced_transaction(
    spent: &[(u64, BlindingFactor)],
    output_values: &[u64],
    fee: u64,
) -> (Transaction, Vec<(u64, BlindingFactor)>) {
    let committer = Committer::new();
    let total_in: u64 = spent.iter().map(|(value, _)| value).sum();
    let total_out: u64 = output_values.iter().sum();
    assert_eq!(total_in, total_out + fee, "transaction must balance");

    let mut tx = Transaction::empty();
    tx.offset = BlindingFactor::random();
    let mut excess = tx.offset.neg().unwrap();

    for (value, blind) in spent {
        let commit = committer.commit(*value, blind).unwrap();
        tx.inputs.push(Input::new(OutputFeatures::empty(), commit));
        excess = excess.sub(blind).unwrap();
    }

    let mut openings = Vec::with_capacity(output_values.len());
    for value in output_values {
        let (created, blind) = output(*value, OutputFeatures::empty());
        tx.outputs.push(created);
        excess = excess.add(&blind).unwrap();
        openings.push((*value, blind));
    }

    let key = excess.to_secret_key().unwrap().expect("non-zero excess");
    tx.kernels
        .push(TxKernel::new_signed(KernelFeatures::empty(), fee, 0, &key));
    tx.sort();
    (tx, openings)
}

/// A balanced transaction over freshly blinded inputs
pub fn transaction(input_values: &[u64], output_values: &[u64], fee: u64) -> Transaction {
    let spent: Vec<(u64, BlindingFactor)> = input_values
        .iter()
        .map(|value| (*value, BlindingFactor::random()))
        .collect();
    balanced_transaction(&spent, output_values, fee).0
}

/// Mine `header` again at the fixture's minimum size and difficulty
pub fn remine(fixture: &Fixture, header: &mut BlockHeader) {
    header
        .mine(
            &fixture.pow,
            fixture.params.min_edge_bits,
            fixture.params.min_difficulty,
        )
        .unwrap();
}

/// A header stamped now and mined at the fixture's minimums
pub fn mined_header(fixture: &Fixture, height: u64) -> BlockHeader {
    let mut header = BlockHeader::new(height, Hash([height as u8; 32]), Utc::now());
    header.utxo_root = Hash([0x11; 32]);
    header.output_mmr_size = height * 3;
    header.kernel_mmr_size = height * 2;
    remine(fixture, &mut header);
    header
}

/// One spend (50 -> 30 + 15, fee 5) plus a 60 coin coinbase, mined
pub fn valid_block(fixture: &Fixture) -> Block {
    let header = BlockHeader::new(1, Hash([1u8; 32]), Utc::now());
    let tx = transaction(&[50], &[30, 15], 5);
    let (coinbase_output, coinbase_kernel) = coinbase(60);

    let mut block = Block::from_transactions(header, vec![tx], coinbase_output, coinbase_kernel)
        .unwrap();
    remine(fixture, &mut block.header);
    block
}
