//! Block implementation
//!
//! A block is a header plus the cut-through union of its transactions: one
//! list each of inputs, outputs and kernels, in canonical hash order.

use bytes::{Buf, BufMut};
use chrono::{DateTime, Utc};

use super::consensus::{ConsensusParams, ValidationContext, MAX_BLOCK_ELEMENTS};
use super::error::ValidationError;
use super::header::BlockHeader;
use super::input::INPUT_SIZE;
use super::kernel::{TxKernel, KERNEL_SIZE};
use super::list::{InputList, OutputList, TxKernelList};
use super::output::{Output, OUTPUT_MIN_SIZE};
use super::ser::{read_count, Decode, DecodeError, Encode};
use super::transaction::Transaction;
use crate::crypto::commitment::CommitmentError;
use crate::crypto::hash::Hash;
use crate::crypto::rangeproof::RangeProofVerifier;

/// A block in the chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// The header with metadata and commitments to the rest of the data
    pub header: BlockHeader,
    /// List of transaction inputs
    pub inputs: InputList,
    /// List of transaction outputs
    pub outputs: OutputList,
    /// List of transaction kernels (excess and signature)
    pub kernels: TxKernelList,
}

impl Block {
    pub fn new(
        header: BlockHeader,
        inputs: InputList,
        outputs: OutputList,
        kernels: TxKernelList,
    ) -> Self {
        Self {
            header,
            inputs,
            outputs,
            kernels,
        }
    }

    /// Assemble a block from transactions plus the producer's coinbase.
    ///
    /// The transactions are aggregated (with cut-through), their combined
    /// offset is added to the header's running total and every list is
    /// sorted. The header changes, so it must be mined afterwards.
    pub fn from_transactions(
        header: BlockHeader,
        txs: Vec<Transaction>,
        coinbase_output: Output,
        coinbase_kernel: TxKernel,
    ) -> Result<Self, CommitmentError> {
        let aggregate = Transaction::aggregate(txs)?;

        let mut header = header;
        header.total_kernel_offset = header.total_kernel_offset.add(&aggregate.offset)?;

        let Transaction {
            inputs,
            mut outputs,
            mut kernels,
            ..
        } = aggregate;
        outputs.push(coinbase_output);
        kernels.push(coinbase_kernel);

        let mut block = Self::new(header, inputs, outputs, kernels);
        block.sort();
        Ok(block)
    }

    /// Block identity, the header hash
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Put all three lists into canonical order. Producers only; validators
    /// check order and never fix it.
    pub fn sort(&mut self) {
        self.inputs.sort();
        self.outputs.sort();
        self.kernels.sort();
    }

    /// Sum of all kernel fees
    pub fn total_fees(&self) -> u64 {
        self.kernels
            .iter()
            .fold(0u64, |total, kernel| total.saturating_add(kernel.fee))
    }

    pub fn coinbase_output(&self) -> Option<&Output> {
        self.outputs.iter().find(|output| output.is_coinbase())
    }

    /// Full consensus validation against the current wall clock
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
        self.validate_at(ctx, Utc::now())
    }

    /// Full consensus validation as if the local clock read `now`.
    ///
    /// Rules run in a fixed order and the first failure is returned. Kernel
    /// sums and Merkle roots are not checked here.
    pub fn validate_at(
        &self,
        ctx: &ValidationContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let result = self.run_checks(ctx, now);
        match &result {
            Ok(()) => log::debug!(
                "Block {} at height {} is valid",
                self.hash(),
                self.header.height
            ),
            Err(e) => log::warn!(
                "Rejected block {} at height {}: {}",
                self.hash(),
                self.header.height,
                e
            ),
        }
        result
    }

    fn run_checks(
        &self,
        ctx: &ValidationContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        self.header.validate_at(ctx, now)?;

        // Named after the coinbase rule it stands in for, but any output and
        // any kernel satisfy it
        if self.outputs.is_empty() || self.kernels.is_empty() {
            return Err(ValidationError::EmptyBlock);
        }

        self.verify_sorted()?;
        self.verify_coinbase_outputs(ctx.params)?;
        self.verify_range_proofs(ctx.range_proofs)?;
        self.verify_kernels(ctx.params)
    }

    /// All three lists must be in canonical hash order
    pub fn verify_sorted(&self) -> Result<(), ValidationError> {
        if !self.inputs.is_sorted() {
            return Err(ValidationError::UnsortedInputs);
        }
        if !self.outputs.is_sorted() {
            return Err(ValidationError::UnsortedOutputs);
        }
        if !self.kernels.is_sorted() {
            return Err(ValidationError::UnsortedKernels);
        }
        Ok(())
    }

    fn verify_coinbase_outputs(&self, params: &ConsensusParams) -> Result<(), ValidationError> {
        let mut coinbase_count = 0usize;
        for output in self.outputs.iter().filter(|o| o.is_coinbase()) {
            coinbase_count += 1;
            if coinbase_count > params.max_coinbase_outputs {
                return Err(ValidationError::TooManyCoinbaseOutputs {
                    max: params.max_coinbase_outputs,
                });
            }
            output.validate()?;
        }
        Ok(())
    }

    /// Check every output's range proof. Any failing commitment may be
    /// reported when several fail.
    pub fn verify_range_proofs(
        &self,
        verifier: &dyn RangeProofVerifier,
    ) -> Result<(), ValidationError> {
        #[cfg(feature = "parallel")]
        let failed = {
            use rayon::prelude::*;
            self.outputs
                .as_slice()
                .par_iter()
                .find_any(|output| !verifier.verify(&output.commit, &output.proof))
        };

        #[cfg(not(feature = "parallel"))]
        let failed = self
            .outputs
            .iter()
            .find(|output| !verifier.verify(&output.commit, &output.proof));

        match failed {
            Some(output) => Err(ValidationError::InvalidRangeProof {
                commit: output.commit,
            }),
            None => Ok(()),
        }
    }

    /// Coinbase kernel quota plus the excess signature of every kernel
    fn verify_kernels(&self, params: &ConsensusParams) -> Result<(), ValidationError> {
        let mut coinbase_count = 0usize;
        for kernel in self.kernels.iter() {
            if kernel.is_coinbase() {
                coinbase_count += 1;
                if coinbase_count > params.max_coinbase_kernels {
                    return Err(ValidationError::TooManyCoinbaseKernels {
                        max: params.max_coinbase_kernels,
                    });
                }
            }
            kernel.validate()?;
        }
        Ok(())
    }
}

impl Encode for Block {
    /// Lists are written in canonical order whatever their in-memory order
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        self.header.encode_to(buf);
        buf.put_u64(self.inputs.len() as u64);
        buf.put_u64(self.outputs.len() as u64);
        buf.put_u64(self.kernels.len() as u64);
        self.inputs.encode_items(buf);
        self.outputs.encode_items(buf);
        self.kernels.encode_items(buf);
    }
}

impl Decode for Block {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let header = BlockHeader::decode_from(buf)?;

        let input_count = read_count(buf, "inputs", MAX_BLOCK_ELEMENTS)?;
        let output_count = read_count(buf, "outputs", MAX_BLOCK_ELEMENTS)?;
        let kernel_count = read_count(buf, "kernels", MAX_BLOCK_ELEMENTS)?;

        let inputs = InputList::decode_items(buf, input_count, INPUT_SIZE)?;
        let outputs = OutputList::decode_items(buf, output_count, OUTPUT_MIN_SIZE)?;
        let kernels = TxKernelList::decode_items(buf, kernel_count, KERNEL_SIZE)?;

        Ok(Self {
            header,
            inputs,
            outputs,
            kernels,
        })
    }
}
