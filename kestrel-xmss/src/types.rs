//! Key type wrapper macro for registered XMSS and XMSS-MT parameter sets.
//!
//! Each registered OID gets its own module with SigningKey, VerificationKey
//! and Signature newtypes bound to that parameter set, and a marker type
//! implementing [`kestrel_core::StatefulSigner`].

/// Generate the key types and the `StatefulSigner` implementation for one
/// registered parameter set.
///
/// `signing_key` is [`crate::XmssSigningKey`] or [`crate::XmssMtSigningKey`],
/// `verify_fn` the matching verification function. Attributes listed in
/// `keygen_test` are put on the tests that generate a full key.
macro_rules! define_xmss_variant {
    (
        module: $module:ident,
        variant_name: $variant_name:ident,
        name: $name:literal,
        params: $params:expr,
        signing_key: $signing_key:ident,
        verify_fn: $verify_fn:ident,
        hash_type: $hash_type:ty,
        n: $n:expr,
        sk_size: $sk_size:expr,
        pk_size: $pk_size:expr,
        sig_size: $sig_size:expr,
        max_signatures: $max_signatures:expr,
        keygen_test: [$($test_attr:meta),*]
    ) => {
        #[doc = concat!("`", stringify!($variant_name), "` key types.")]
        pub mod $module {
            use crate::params::Params;
            use crate::sign::{PublicKey, Signature as RawSignature};
            use crate::{$signing_key, $verify_fn};

            use core::fmt;
            use kestrel_core::{Result, StatefulSigner};
            use rand_core::CryptoRng;
            use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

            #[cfg(not(feature = "std"))]
            use alloc::vec::Vec;

            const N: usize = $n;

            /// Parameter set of this variant.
            pub const PARAMS: Params = match $params {
                Ok(params) => params,
                Err(_) => panic!("unregistered parameter set"),
            };

            /// Signing key: secret key together with its traversal state.
            pub struct SigningKey($signing_key<$hash_type, N>);

            impl SigningKey {
                /// Import a signing context exported by [`Self::to_bytes`].
                pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                    $signing_key::from_bytes(PARAMS, bytes).map(Self)
                }

                /// Export the full signing context (secret key and BDS state).
                ///
                /// Persist this after every signature, before releasing it.
                pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
                    self.0.to_bytes()
                }

                /// Get the corresponding verification key.
                pub fn verification_key(&self) -> VerificationKey {
                    VerificationKey(self.0.public_key())
                }

                /// Next leaf index to be used.
                pub fn index(&self) -> u64 {
                    self.0.index()
                }

                /// BDS retain parameter of this key.
                pub fn bds_k(&self) -> u32 {
                    self.0.bds_k()
                }

                /// Length of [`Self::to_bytes`] for this key.
                pub fn exported_size(&self) -> usize {
                    $signing_key::<$hash_type, N>::exported_size(&PARAMS, self.bds_k())
                }
            }

            impl fmt::Debug for SigningKey {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Debug::fmt(&self.0, f)
                }
            }

            impl Zeroize for SigningKey {
                fn zeroize(&mut self) {
                    self.0.zeroize();
                }
            }

            impl ZeroizeOnDrop for SigningKey {}

            /// Verification key (public key).
            #[derive(Clone, Debug, PartialEq, Eq)]
            pub struct VerificationKey(PublicKey<N>);

            impl VerificationKey {
                /// Decode `OID || root || SEED`.
                pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                    PublicKey::from_bytes(PARAMS, bytes).map(Self)
                }

                /// Encode as `OID || root || SEED`.
                pub fn to_bytes(&self) -> Vec<u8> {
                    self.0.to_bytes()
                }
            }

            /// Signature.
            #[derive(Clone, Debug, PartialEq, Eq)]
            pub struct Signature(RawSignature);

            impl Signature {
                /// Create a signature from bytes.
                pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                    RawSignature::from_bytes(PARAMS, bytes).map(Self)
                }

                /// Get the signature bytes.
                pub fn to_bytes(&self) -> &[u8] {
                    self.0.to_bytes()
                }

                /// Leaf index the signature was made with.
                pub fn index(&self) -> u64 {
                    self.0.index()
                }
            }

            impl AsRef<[u8]> for Signature {
                fn as_ref(&self) -> &[u8] {
                    self.0.as_ref()
                }
            }

            #[doc = concat!("`", stringify!($variant_name), "` algorithm marker type.")]
            #[allow(non_camel_case_types)]
            pub struct $variant_name;

            impl $variant_name {
                /// Generate a key pair with BDS retain parameter `bds_k`.
                ///
                /// Larger even values up to the tree height keep more nodes
                /// and make signing cheaper; outputs do not depend on it.
                pub fn keygen_with_bds_k(
                    bds_k: u32,
                    rng: &mut impl CryptoRng,
                ) -> Result<(SigningKey, VerificationKey)> {
                    let (sk, pk) = $signing_key::generate(PARAMS, bds_k, rng)?;
                    Ok((SigningKey(sk), VerificationKey(pk)))
                }

                /// Length of an exported signing key with retain parameter
                /// `bds_k`.
                ///
                /// This is what persistent storage must hold. It exceeds
                /// `SIGNING_KEY_SIZE`, which counts the RFC 8391 secret key only.
                pub fn exported_key_size(bds_k: u32) -> usize {
                    $signing_key::<$hash_type, N>::exported_size(&PARAMS, bds_k)
                }
            }

            impl StatefulSigner for $variant_name {
                type SigningKey = SigningKey;
                type VerificationKey = VerificationKey;
                type Signature = Signature;

                const SIGNING_KEY_SIZE: usize = PARAMS.secret_key_bytes();
                const VERIFICATION_KEY_SIZE: usize = PARAMS.public_key_bytes();
                const SIGNATURE_SIZE: usize = PARAMS.signature_bytes();
                const MAX_SIGNATURES: u64 = PARAMS.max_signatures();

                fn keygen(
                    rng: &mut impl CryptoRng,
                ) -> Result<(Self::SigningKey, Self::VerificationKey)> {
                    Self::keygen_with_bds_k(0, rng)
                }

                fn sign(sk: &mut Self::SigningKey, message: &[u8]) -> Result<Self::Signature> {
                    sk.0.sign(message).map(Signature)
                }

                fn verify(
                    pk: &Self::VerificationKey,
                    message: &[u8],
                    signature: &Self::Signature,
                ) -> Result<()> {
                    $verify_fn::<$hash_type, N>(&pk.0, message, &signature.0)
                }

                fn remaining_signatures(sk: &Self::SigningKey) -> u64 {
                    sk.0.remaining_signatures()
                }
            }

            #[cfg(test)]
            mod tests {
                use super::*;
                use kestrel_core::Error;
                use rand::SeedableRng;
                use rand_chacha::ChaCha20Rng;

                #[test]
                fn test_key_sizes() {
                    assert_eq!($variant_name::SIGNING_KEY_SIZE, $sk_size);
                    assert_eq!($variant_name::VERIFICATION_KEY_SIZE, $pk_size);
                    assert_eq!($variant_name::SIGNATURE_SIZE, $sig_size);
                    assert_eq!($variant_name::MAX_SIGNATURES, $max_signatures);
                    assert_eq!(PARAMS.name(), Some($name));
                    assert!($variant_name::exported_key_size(0) > $sk_size);
                    assert!($variant_name::exported_key_size(2) > $sk_size);
                }

                #[test]
                fn test_malformed_inputs_rejected() {
                    assert!(VerificationKey::from_bytes(&[0u8; $pk_size - 1]).is_err());
                    assert!(Signature::from_bytes(&[0u8; 3]).is_err());
                    assert!(SigningKey::from_bytes(&[0u8; $sk_size]).is_err());
                }

                #[test]
                $(#[$test_attr])*
                fn test_keygen_sign_verify() {
                    let mut rng = ChaCha20Rng::seed_from_u64(42);
                    let (mut sk, pk) = $variant_name::keygen(&mut rng).unwrap();

                    let message = concat!("Hello, ", stringify!($variant_name), "!").as_bytes();
                    let signature = $variant_name::sign(&mut sk, message).unwrap();

                    assert_eq!(signature.to_bytes().len(), $sig_size);
                    assert_eq!(signature.index(), 0);
                    assert!($variant_name::verify(&pk, message, &signature).is_ok());
                    assert_eq!(
                        $variant_name::verify(&pk, b"Wrong message", &signature),
                        Err(Error::VerificationFailed)
                    );
                    assert_eq!(
                        $variant_name::remaining_signatures(&sk),
                        $max_signatures - 1
                    );

                    let pk_restored = VerificationKey::from_bytes(&pk.to_bytes()).unwrap();
                    assert_eq!(pk, pk_restored);
                    let sig_restored = Signature::from_bytes(signature.as_ref()).unwrap();
                    assert!($variant_name::verify(&pk_restored, message, &sig_restored).is_ok());
                }

                #[test]
                $(#[$test_attr])*
                fn test_signing_key_export() {
                    let mut rng = ChaCha20Rng::seed_from_u64(7);
                    let (mut sk, pk) = $variant_name::keygen(&mut rng).unwrap();
                    $variant_name::sign(&mut sk, b"first").unwrap();

                    let exported = sk.to_bytes();
                    assert_eq!(exported.len(), sk.exported_size());
                    assert_eq!(exported.len(), $variant_name::exported_key_size(0));
                    let mut restored = SigningKey::from_bytes(&exported).unwrap();
                    assert_eq!(restored.verification_key(), pk);
                    assert_eq!(restored.index(), 1);

                    let a = $variant_name::sign(&mut sk, b"second").unwrap();
                    let b = $variant_name::sign(&mut restored, b"second").unwrap();
                    assert_eq!(a, b);
                    assert_eq!(b.index(), 1);
                }
            }
        }

        #[allow(non_camel_case_types)]
        pub use $module::$variant_name;
    };
}

pub(crate) use define_xmss_variant;
