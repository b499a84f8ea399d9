//! Transactions
//!
//! A transaction is the unit a block producer merges. It carries no
//! block-scope rules of its own; producers aggregate transactions, cut
//! through matching input/output pairs and emit the result as a block.

use bytes::{Buf, BufMut};
use std::collections::HashSet;

use super::consensus::MAX_BLOCK_ELEMENTS;
use super::error::ValidationError;
use super::input::INPUT_SIZE;
use super::kernel::KERNEL_SIZE;
use super::list::{InputList, OutputList, TxKernelList};
use super::output::OUTPUT_MIN_SIZE;
use super::ser::{read_count, Decode, DecodeError, Encode};
use crate::crypto::commitment::{BlindingFactor, Commitment, CommitmentError, Committer};

/// A transaction before aggregation into a block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// The "k2" kernel offset
    pub offset: BlindingFactor,
    /// Set of inputs spent by the transaction
    pub inputs: InputList,
    /// Set of outputs the transaction produces
    pub outputs: OutputList,
    /// The kernels for this transaction
    pub kernels: TxKernelList,
}

impl Transaction {
    pub fn new(
        offset: BlindingFactor,
        inputs: InputList,
        outputs: OutputList,
        kernels: TxKernelList,
    ) -> Self {
        Self {
            offset,
            inputs,
            outputs,
            kernels,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Total fee declared by the kernels
    pub fn fee(&self) -> u64 {
        self.kernels
            .iter()
            .fold(0u64, |total, kernel| total.saturating_add(kernel.fee))
    }

    /// Put all three collections into canonical order
    pub fn sort(&mut self) {
        self.inputs.sort();
        self.outputs.sort();
        self.kernels.sort();
    }

    /// Merge transactions into one, summing offsets and cutting through
    /// outputs spent within the set
    pub fn aggregate(txs: Vec<Transaction>) -> Result<Transaction, CommitmentError> {
        let count = txs.len();
        let mut aggregate = Transaction::empty();

        for tx in txs {
            aggregate.offset = aggregate.offset.add(&tx.offset)?;
            aggregate.inputs.extend(tx.inputs);
            aggregate.outputs.extend(tx.outputs);
            aggregate.kernels.extend(tx.kernels);
        }

        let removed = aggregate.cut_through();
        aggregate.sort();
        log::debug!(
            "Aggregated {} transactions, cut through {} outputs",
            count,
            removed
        );
        Ok(aggregate)
    }

    /// Drop every input that spends an output created in this same
    /// transaction, together with that output. Returns the number of pairs
    /// removed. Both sides of the commitment sum lose the same term, so
    /// kernel sums still balance.
    pub fn cut_through(&mut self) -> usize {
        let spent: HashSet<Commitment> = self.inputs.iter().map(|input| input.commit).collect();
        let matched: HashSet<Commitment> = self
            .outputs
            .iter()
            .map(|output| output.commit)
            .filter(|commit| spent.contains(commit))
            .collect();

        if matched.is_empty() {
            return 0;
        }

        self.inputs.retain(|input| !matched.contains(&input.commit));
        self.outputs.retain(|output| !matched.contains(&output.commit));
        matched.len()
    }

    /// Check that no value was created or destroyed:
    /// `sum(outputs) - sum(inputs) + fee*H == sum(excess) + offset*G`
    pub fn verify_kernel_sums(&self, committer: &Committer) -> Result<(), ValidationError> {
        let mut positive: Vec<Commitment> = self.outputs.iter().map(|o| o.commit).collect();
        let fee = self.fee();
        if fee > 0 {
            positive.push(committer.commit_value(fee)?);
        }
        let negative: Vec<Commitment> = self.inputs.iter().map(|i| i.commit).collect();
        let io_sum = committer.sum(&positive, &negative)?;

        let mut excesses: Vec<Commitment> = self.kernels.iter().map(|k| k.excess).collect();
        if !self.offset.is_zero() {
            excesses.push(committer.commit(0, &self.offset)?);
        }
        let kernel_sum = committer.sum(&excesses, &[])?;

        if io_sum != kernel_sum {
            return Err(ValidationError::KernelSumMismatch);
        }
        Ok(())
    }
}

impl Encode for Transaction {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        self.offset.encode_to(buf);
        buf.put_u64(self.inputs.len() as u64);
        buf.put_u64(self.outputs.len() as u64);
        buf.put_u64(self.kernels.len() as u64);
        self.inputs.encode_items(buf);
        self.outputs.encode_items(buf);
        self.kernels.encode_items(buf);
    }
}

impl Decode for Transaction {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let offset = BlindingFactor::decode_from(buf)?;
        let input_count = read_count(buf, "inputs", MAX_BLOCK_ELEMENTS)?;
        let output_count = read_count(buf, "outputs", MAX_BLOCK_ELEMENTS)?;
        let kernel_count = read_count(buf, "kernels", MAX_BLOCK_ELEMENTS)?;

        Ok(Self {
            offset,
            inputs: InputList::decode_items(buf, input_count, INPUT_SIZE)?,
            outputs: OutputList::decode_items(buf, output_count, OUTPUT_MIN_SIZE)?,
            kernels: TxKernelList::decode_items(buf, kernel_count, KERNEL_SIZE)?,
        })
    }
}
