//! Pedersen commitments over secp256k1
//!
//! A commitment to `value` with blinding factor `r` is the point
//! `r*G + value*H`, where `H` is a nothing-up-my-sleeve generator with no
//! known discrete log relative to `G`. Commitments are homomorphic, so the
//! balance of a transaction can be checked without learning any amount.

use rand::rngs::OsRng;
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use std::fmt;
use thiserror::Error;

/// Size of a serialized commitment (compressed point)
pub const COMMITMENT_SIZE: usize = 33;

/// Size of a blinding factor / kernel offset
pub const SECRET_KEY_SIZE: usize = 32;

/// Compressed encoding of the value generator `H`: `lift_x(sha256(G))`
const GENERATOR_H: [u8; COMMITMENT_SIZE] = [
    0x02, 0x50, 0x92, 0x9b, 0x74, 0xc1, 0xa0, 0x49, 0x54, 0xb7, 0x8b, 0x4b, 0x60, 0x35, 0xe9, 0x7a,
    0x5e, 0x07, 0x8a, 0x5a, 0x0f, 0x28, 0xec, 0x96, 0xd5, 0x47, 0xbf, 0xee, 0x9a, 0xce, 0x80, 0x3a,
    0xc0,
];

/// Errors from commitment arithmetic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("Invalid commitment: {0}")]
    InvalidCommitment(String),
    #[error("Invalid blinding factor")]
    InvalidBlindingFactor,
    #[error("Commitment to zero value with zero blinding factor")]
    ZeroCommitment,
    #[error("Commitment sum is the point at infinity or empty")]
    InvalidSum,
}

/// An opaque Pedersen commitment
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment(pub [u8; COMMITMENT_SIZE]);

impl Commitment {
    pub fn as_bytes(&self) -> &[u8; COMMITMENT_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Interpret the commitment as a secp256k1 public key
    pub fn to_public_key(&self) -> Result<PublicKey, CommitmentError> {
        PublicKey::from_slice(&self.0)
            .map_err(|e| CommitmentError::InvalidCommitment(e.to_string()))
    }

    pub fn from_public_key(key: &PublicKey) -> Self {
        Commitment(key.serialize())
    }
}

impl Default for Commitment {
    fn default() -> Self {
        Commitment([0u8; COMMITMENT_SIZE])
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

/// A 32-byte blinding factor. Unlike a secret key, zero is a legal value
/// (an empty kernel offset).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlindingFactor(pub [u8; SECRET_KEY_SIZE]);

impl BlindingFactor {
    pub const ZERO: BlindingFactor = BlindingFactor([0u8; SECRET_KEY_SIZE]);

    /// A fresh uniformly random blinding factor
    pub fn random() -> Self {
        let key = SecretKey::new(&mut OsRng);
        BlindingFactor(key.secret_bytes())
    }

    pub fn from_secret_key(key: &SecretKey) -> Self {
        BlindingFactor(key.secret_bytes())
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// The blinding factor as a secret key, or `None` when it is zero
    pub fn to_secret_key(&self) -> Result<Option<SecretKey>, CommitmentError> {
        if self.is_zero() {
            return Ok(None);
        }
        SecretKey::from_slice(&self.0)
            .map(Some)
            .map_err(|_| CommitmentError::InvalidBlindingFactor)
    }

    /// Scalar addition modulo the curve order
    pub fn add(&self, other: &BlindingFactor) -> Result<BlindingFactor, CommitmentError> {
        let Some(key) = self.to_secret_key()? else {
            return Ok(*other);
        };
        if other.is_zero() {
            return Ok(*self);
        }
        let tweak =
            Scalar::from_be_bytes(other.0).map_err(|_| CommitmentError::InvalidBlindingFactor)?;
        let sum = key
            .add_tweak(&tweak)
            .map_err(|_| CommitmentError::InvalidBlindingFactor)?;
        Ok(BlindingFactor(sum.secret_bytes()))
    }

    /// Additive inverse modulo the curve order
    pub fn neg(&self) -> Result<BlindingFactor, CommitmentError> {
        match self.to_secret_key()? {
            Some(key) => Ok(BlindingFactor(key.negate().secret_bytes())),
            None => Ok(BlindingFactor::ZERO),
        }
    }

    /// `self - other`. A difference of zero comes back as [`BlindingFactor::ZERO`].
    pub fn sub(&self, other: &BlindingFactor) -> Result<BlindingFactor, CommitmentError> {
        if self == other {
            return Ok(BlindingFactor::ZERO);
        }
        self.add(&other.neg()?)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for BlindingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlindingFactor({})", self.to_hex())
    }
}

/// Creates and combines commitments
pub struct Committer {
    secp: Secp256k1<secp256k1::All>,
    generator_h: PublicKey,
}

impl Committer {
    pub fn new() -> Self {
        let generator_h =
            PublicKey::from_slice(&GENERATOR_H).expect("generator H is a valid curve point");
        Self {
            secp: Secp256k1::new(),
            generator_h,
        }
    }

    /// Commit to `value` with blinding factor `blind`: `blind*G + value*H`
    pub fn commit(&self, value: u64, blind: &BlindingFactor) -> Result<Commitment, CommitmentError> {
        let mut points = Vec::with_capacity(2);
        if let Some(key) = blind.to_secret_key()? {
            points.push(PublicKey::from_secret_key(&self.secp, &key));
        }
        if value > 0 {
            points.push(self.value_point(value)?);
        }
        match points.as_slice() {
            [] => Err(CommitmentError::ZeroCommitment),
            [single] => Ok(Commitment::from_public_key(single)),
            _ => self.combine(&points),
        }
    }

    /// `value*H` with no blinding, as used for the fee term of a kernel sum
    pub fn commit_value(&self, value: u64) -> Result<Commitment, CommitmentError> {
        self.commit(value, &BlindingFactor::ZERO)
    }

    /// Sum `positive` commitments and subtract `negative` ones
    pub fn sum(
        &self,
        positive: &[Commitment],
        negative: &[Commitment],
    ) -> Result<Commitment, CommitmentError> {
        let mut points = Vec::with_capacity(positive.len() + negative.len());
        for commit in positive {
            points.push(commit.to_public_key()?);
        }
        for commit in negative {
            points.push(commit.to_public_key()?.negate(&self.secp));
        }
        self.combine(&points)
    }

    fn value_point(&self, value: u64) -> Result<PublicKey, CommitmentError> {
        let mut scalar = [0u8; 32];
        scalar[24..].copy_from_slice(&value.to_be_bytes());
        let scalar =
            Scalar::from_be_bytes(scalar).map_err(|_| CommitmentError::InvalidBlindingFactor)?;
        self.generator_h
            .mul_tweak(&self.secp, &scalar)
            .map_err(|e| CommitmentError::InvalidCommitment(e.to_string()))
    }

    fn combine(&self, points: &[PublicKey]) -> Result<Commitment, CommitmentError> {
        if points.is_empty() {
            return Err(CommitmentError::InvalidSum);
        }
        let refs: Vec<&PublicKey> = points.iter().collect();
        PublicKey::combine_keys(&refs)
            .map(|key| Commitment::from_public_key(&key))
            .map_err(|_| CommitmentError::InvalidSum)
    }
}

impl Default for Committer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitments_are_homomorphic() {
        let committer = Committer::new();
        let r1 = BlindingFactor::random();
        let r2 = BlindingFactor::random();

        let c1 = committer.commit(30, &r1).unwrap();
        let c2 = committer.commit(12, &r2).unwrap();
        let total = committer.commit(42, &r1.add(&r2).unwrap()).unwrap();

        assert_eq!(committer.sum(&[c1, c2], &[]).unwrap(), total);
        assert_eq!(committer.sum(&[total], &[c2]).unwrap(), c1);
    }

    #[test]
    fn test_zero_commitment_rejected() {
        let committer = Committer::new();
        assert_eq!(
            committer.commit(0, &BlindingFactor::ZERO),
            Err(CommitmentError::ZeroCommitment)
        );
    }

    #[test]
    fn test_hiding_requires_blinding() {
        let committer = Committer::new();
        let a = committer.commit(5, &BlindingFactor::random()).unwrap();
        let b = committer.commit(5, &BlindingFactor::random()).unwrap();
        assert_ne!(a, b);
        assert_eq!(committer.commit_value(5).unwrap(), committer.commit_value(5).unwrap());
    }

    #[test]
    fn test_cancelling_sum_is_rejected() {
        let committer = Committer::new();
        let c = committer.commit(7, &BlindingFactor::random()).unwrap();
        assert_eq!(committer.sum(&[c], &[c]), Err(CommitmentError::InvalidSum));
    }

    #[test]
    fn test_blinding_factor_zero_is_identity() {
        let r = BlindingFactor::random();
        assert_eq!(r.add(&BlindingFactor::ZERO).unwrap(), r);
        assert_eq!(BlindingFactor::ZERO.add(&r).unwrap(), r);
    }

    #[test]
    fn test_blinding_factor_sub() {
        let committer = Committer::new();
        let r1 = BlindingFactor::random();
        let r2 = BlindingFactor::random();
        let diff = r1.sub(&r2).unwrap();

        assert_eq!(diff.add(&r2).unwrap(), r1);
        assert_eq!(r1.sub(&r1).unwrap(), BlindingFactor::ZERO);

        let c1 = committer.commit(0, &r1).unwrap();
        let c2 = committer.commit(0, &r2).unwrap();
        assert_eq!(
            committer.sum(&[c1], &[c2]).unwrap(),
            committer.commit(0, &diff).unwrap()
        );
    }
}
