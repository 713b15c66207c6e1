//! Signature scheme traits.

use crate::Result;
use rand_core::CryptoRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Stateful digital signature trait.
///
/// Hash-based schemes such as XMSS own a finite supply of one-time keys.
/// Every call to [`sign`](StatefulSigner::sign) consumes one of them and
/// advances the signing key, which is why the key is taken by exclusive
/// reference. Callers are responsible for serializing access to a signing
/// key and for persisting its advanced state before a signature is released.
///
/// # Example
///
/// ```ignore
/// use kestrel_core::StatefulSigner;
///
/// let (mut sk, pk) = MyScheme::keygen(&mut rng)?;
/// let sig = MyScheme::sign(&mut sk, message)?;
/// MyScheme::verify(&pk, message, &sig)?;
/// ```
pub trait StatefulSigner {
    /// Signing key (private key together with its traversal state).
    type SigningKey: Zeroize + ZeroizeOnDrop;

    /// Verification key (public key).
    type VerificationKey: Clone;

    /// Signature produced by signing.
    type Signature: Clone;

    /// Size of the encoded secret key in bytes (without traversal state).
    ///
    /// A persisted signing key also carries its traversal state and is
    /// longer; schemes expose that length separately.
    const SIGNING_KEY_SIZE: usize;

    /// Size of the verification key in bytes.
    const VERIFICATION_KEY_SIZE: usize;

    /// Size of the signature in bytes.
    const SIGNATURE_SIZE: usize;

    /// Total number of signatures a single key pair can produce.
    const MAX_SIGNATURES: u64;

    /// Generate a new key pair.
    ///
    /// # Arguments
    ///
    /// * `rng` - A cryptographically secure random number generator.
    ///
    /// # Returns
    ///
    /// A tuple of (signing_key, verification_key).
    fn keygen(rng: &mut impl CryptoRng) -> Result<(Self::SigningKey, Self::VerificationKey)>;

    /// Sign a message, consuming one one-time key.
    ///
    /// The signing key is advanced before the signature is returned. Once
    /// all one-time keys are used this returns [`Error::KeyExhausted`](crate::Error::KeyExhausted).
    fn sign(sk: &mut Self::SigningKey, message: &[u8]) -> Result<Self::Signature>;

    /// Verify a signature.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the signature is valid, `Err(Error::VerificationFailed)` otherwise.
    fn verify(
        pk: &Self::VerificationKey,
        message: &[u8],
        signature: &Self::Signature,
    ) -> Result<()>;

    /// Number of signatures the signing key can still produce.
    fn remaining_signatures(sk: &Self::SigningKey) -> u64;
}
