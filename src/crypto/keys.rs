//! ECDSA signing for transaction kernels
//!
//! A kernel's excess is a commitment to zero, `r*G`, so it doubles as a
//! secp256k1 public key. Whoever knows `r` can sign the kernel message; a
//! valid signature therefore proves the transaction creates no value.

use rand::rngs::OsRng;
use secp256k1::{ecdsa, Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::commitment::{BlindingFactor, Commitment};
use super::hash::sha256_concat;

/// Size of a compact ECDSA signature
pub const SIGNATURE_SIZE: usize = 64;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// The public key viewed as a commitment to zero (a kernel excess)
    pub fn excess(&self) -> Commitment {
        Commitment::from_public_key(&self.public_key)
    }

    /// The secret key as a blinding factor
    pub fn blinding_factor(&self) -> BlindingFactor {
        BlindingFactor::from_secret_key(&self.secret_key)
    }

    /// Sign a 32-byte message digest with the private key
    pub fn sign(&self, message: &[u8; 32]) -> [u8; SIGNATURE_SIZE] {
        sign_message(&self.secret_key, message)
    }
}

/// The message a kernel signs. Only the fee and lock height are committed to;
/// the excess is the verification key.
pub fn kernel_message(fee: u64, lock_height: u64) -> [u8; 32] {
    sha256_concat(&[&fee.to_be_bytes(), &lock_height.to_be_bytes()]).0
}

/// Sign a message digest with a secret key, returning a compact signature
pub fn sign_message(secret_key: &SecretKey, message: &[u8; 32]) -> [u8; SIGNATURE_SIZE] {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest(*message);
    secp.sign_ecdsa(&message, secret_key).serialize_compact()
}

/// Verify a compact signature against a commitment used as a public key.
///
/// Returns `Ok(false)` for a well-formed signature that does not verify and
/// an error when the key or signature bytes are malformed.
pub fn verify_signature(
    public_key: &Commitment,
    message: &[u8; 32],
    signature: &[u8; SIGNATURE_SIZE],
) -> Result<bool, KeyError> {
    let secp = Secp256k1::verification_only();
    let public_key =
        PublicKey::from_slice(public_key.as_bytes()).map_err(|_| KeyError::InvalidPublicKey)?;
    let sig = ecdsa::Signature::from_compact(signature).map_err(|_| KeyError::InvalidSignature)?;
    let message = Message::from_digest(*message);

    Ok(secp.verify_ecdsa(&message, &sig, &public_key).is_ok())
}
