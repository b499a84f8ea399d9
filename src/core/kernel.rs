//! Transaction kernels
//!
//! A kernel proves that a transaction's commitments sum to zero net of the
//! fee. The excess is the leftover blinding factor times `G`, which makes it a
//! public key; the owner signs the fee and lock height with the matching
//! private key. A valid signature shows no value was created (no residue on
//! `H`) and that the signer holds the blinding factors.

use bitflags::bitflags;
use bytes::{Buf, BufMut};
use secp256k1::SecretKey;

use super::error::ValidationError;
use super::list::SortKey;
use super::ser::{read_array, read_u64, read_u8, Decode, DecodeError, Encode};
use crate::crypto::commitment::{Commitment, COMMITMENT_SIZE};
use crate::crypto::hash::{blake2b_256, Hash};
use crate::crypto::keys::{kernel_message, verify_signature, KeyPair, SIGNATURE_SIZE};

/// Encoded size of a kernel
pub const KERNEL_SIZE: usize = 1 + 8 + 8 + COMMITMENT_SIZE + SIGNATURE_SIZE;

bitflags! {
    /// Options for a kernel's structure or use
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct KernelFeatures: u8 {
        /// Kernel matching a coinbase output
        const COINBASE = 1 << 0;
    }
}

impl KernelFeatures {
    pub fn is_coinbase(&self) -> bool {
        self.contains(KernelFeatures::COINBASE)
    }
}

impl Decode for KernelFeatures {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let bits = read_u8(buf)?;
        KernelFeatures::from_bits(bits).ok_or(DecodeError::InvalidFeatures {
            kind: "kernel",
            bits,
        })
    }
}

/// Proof that a (sub)transaction sums to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxKernel {
    pub features: KernelFeatures,
    /// Fee originally included in the transaction this proof is for
    pub fee: u64,
    /// This kernel is not valid earlier than `lock_height`
    pub lock_height: u64,
    /// Remainder of the sum of all transaction commitments, a valid public
    /// key when the amounts balance
    pub excess: Commitment,
    /// Signature over the fee and lock height by the excess key
    pub excess_sig: [u8; SIGNATURE_SIZE],
}

impl TxKernel {
    /// Build a kernel signed with `excess_key`; the excess is `excess_key * G`
    pub fn new_signed(
        features: KernelFeatures,
        fee: u64,
        lock_height: u64,
        excess_key: &SecretKey,
    ) -> Self {
        let key_pair = KeyPair::from_secret_key(*excess_key);
        let excess_sig = key_pair.sign(&kernel_message(fee, lock_height));
        Self {
            features,
            fee,
            lock_height,
            excess: key_pair.excess(),
            excess_sig,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.features.is_coinbase()
    }

    /// Hash of the serialized kernel
    pub fn hash(&self) -> Hash {
        blake2b_256(&self.encode())
    }

    /// Verify the excess signature over `(fee, lock_height)`
    pub fn validate(&self) -> Result<(), ValidationError> {
        let message = kernel_message(self.fee, self.lock_height);
        match verify_signature(&self.excess, &message, &self.excess_sig) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(ValidationError::InvalidKernelSignature {
                excess: self.excess,
            }),
        }
    }
}

impl SortKey for TxKernel {
    fn sort_key(&self) -> Hash {
        self.hash()
    }
}

impl Encode for TxKernel {
    fn encode_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.features.bits());
        buf.put_u64(self.fee);
        buf.put_u64(self.lock_height);
        self.excess.encode_to(buf);
        buf.put_slice(&self.excess_sig);
    }
}

impl Decode for TxKernel {
    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let features = KernelFeatures::decode_from(buf)?;
        let fee = read_u64(buf)?;
        let lock_height = read_u64(buf)?;
        let excess = Commitment::decode_from(buf)?;
        let excess_sig = read_array::<_, SIGNATURE_SIZE>(buf)?;
        Ok(Self {
            features,
            fee,
            lock_height,
            excess,
            excess_sig,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_kernel(fee: u64, lock_height: u64) -> TxKernel {
        TxKernel::new_signed(
            KernelFeatures::empty(),
            fee,
            lock_height,
            &KeyPair::generate().secret_key,
        )
    }

    #[test]
    fn test_signed_kernel_validates() {
        let kernel = signed_kernel(7, 100);
        assert_eq!(kernel.validate(), Ok(()));
    }

    #[test]
    fn test_mutated_fee_breaks_signature() {
        let mut kernel = signed_kernel(7, 100);
        kernel.fee = 8;
        assert_eq!(
            kernel.validate(),
            Err(ValidationError::InvalidKernelSignature {
                excess: kernel.excess
            })
        );
    }

    #[test]
    fn test_mutated_lock_height_breaks_signature() {
        let mut kernel = signed_kernel(7, 100);
        kernel.lock_height = 0;
        assert!(kernel.validate().is_err());
    }

    #[test]
    fn test_foreign_excess_breaks_signature() {
        let mut kernel = signed_kernel(1, 0);
        kernel.excess = KeyPair::generate().excess();
        assert!(kernel.validate().is_err());
    }

    #[test]
    fn test_hash_vector() {
        let kernel = TxKernel {
            features: KernelFeatures::COINBASE,
            fee: 2,
            lock_height: 3,
            excess: Commitment([0x09; COMMITMENT_SIZE]),
            excess_sig: [0x07; SIGNATURE_SIZE],
        };
        assert_eq!(
            kernel.hash().to_hex(),
            "2fe257f9984e1468eabe196df3a32bd1613691d89c5311991ec28b725fecc29d"
        );
    }

    #[test]
    fn test_kernel_layout_and_round_trip() {
        let kernel = TxKernel::new_signed(
            KernelFeatures::COINBASE,
            0x0102,
            0x0304,
            &KeyPair::generate().secret_key,
        );
        let bytes = kernel.encode();

        assert_eq!(bytes.len(), KERNEL_SIZE);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..9], &0x0102u64.to_be_bytes());
        assert_eq!(&bytes[9..17], &0x0304u64.to_be_bytes());
        assert_eq!(&bytes[17..50], kernel.excess.as_bytes());
        assert_eq!(&bytes[50..], &kernel.excess_sig);

        let decoded = TxKernel::decode(&bytes).unwrap();
        assert_eq!(decoded, kernel);
        assert_eq!(decoded.hash(), kernel.hash());
        assert_eq!(decoded.validate(), Ok(()));
    }
}
