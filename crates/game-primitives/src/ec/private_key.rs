//! secp256k1 private key.
//!
//! Wraps a k256 signing key and adds the scalar arithmetic needed for
//! hierarchical (BIP32-style) child key derivation.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::{PrimeField, ScalarPrimitive};
use k256::{Scalar, Secp256k1};
use rand::rngs::OsRng;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key for signing and key derivation.
///
/// Wraps a k256 `SigningKey`. WIF serialization lives on `KeyPair`,
/// which carries the network that selects the version byte.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key from the OS RNG.
    pub fn random() -> Self {
        PrivateKey { inner: SigningKey::random(&mut OsRng) }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// Fails if the scalar is zero or not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|e| PrimitivesError::InvalidKey(e.to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)
            .map_err(|e| PrimitivesError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte message hash with deterministic RFC6979 nonces.
    ///
    /// Produces a low-S normalized signature.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// Add a scalar tweak to this key, modulo the curve order.
    ///
    /// This is the child-key step of hierarchical derivation:
    /// `child = (tweak + parent) mod n`. Fails if the tweak is not a
    /// canonical scalar or the sum is zero; callers treat that as an
    /// invalid derivation and advance to the next index.
    pub fn add_tweak(&self, tweak: &[u8; 32]) -> Result<PrivateKey, PrimitivesError> {
        let tweak_scalar = canonical_scalar(tweak)?;
        let sum = self.to_scalar() + tweak_scalar;
        let primitive: ScalarPrimitive<Secp256k1> = sum.into();
        let bytes = primitive.to_bytes();
        Self::from_bytes(&bytes)
    }

    /// Access the underlying k256 `SigningKey`.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }

    /// The scalar representation of this key.
    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        // Overwrite the scalar's byte representation.
        let mut bytes = self.inner.to_bytes();
        bytes.zeroize();
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

/// Parse a 32-byte big-endian value as a canonical scalar (< curve order).
pub(crate) fn canonical_scalar(bytes: &[u8; 32]) -> Result<Scalar, PrimitivesError> {
    let repr = k256::FieldBytes::from(*bytes);
    Option::<Scalar>::from(Scalar::from_repr(repr))
        .ok_or_else(|| PrimitivesError::InvalidKey("scalar not below curve order".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_roundtrip() {
        let key_bytes: [u8; 32] =
            hex::decode("eaf02ca348c524e6392655ba4d29603cd1a7347d9d65cfe93ce1ebffdca22694")
                .unwrap()
                .try_into()
                .unwrap();
        let priv_key = PrivateKey::from_bytes(&key_bytes).unwrap();
        assert_eq!(priv_key.to_bytes(), key_bytes);
        assert_eq!(
            priv_key.to_hex(),
            "eaf02ca348c524e6392655ba4d29603cd1a7347d9d65cfe93ce1ebffdca22694"
        );
    }

    #[test]
    fn test_rejects_zero_and_order() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        let order =
            hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141")
                .unwrap();
        assert!(PrivateKey::from_bytes(&order).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 16]).is_err());
    }

    #[test]
    fn test_from_invalid_hex() {
        assert!(PrivateKey::from_hex("").is_err());
        assert!(PrivateKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let priv_key = PrivateKey::random();
        let hash = crate::hash::sha256(b"message to sign");
        let sig = priv_key.sign(&hash).unwrap();
        assert!(priv_key.public_key().verify(&hash, &sig));
    }

    #[test]
    fn test_add_tweak() {
        let one = {
            let mut b = [0u8; 32];
            b[31] = 1;
            b
        };
        let two = {
            let mut b = [0u8; 32];
            b[31] = 2;
            b
        };
        let key = PrivateKey::from_bytes(&one).unwrap();
        let tweaked = key.add_tweak(&two).unwrap();
        assert_eq!(tweaked.to_bytes()[31], 3);
    }

    #[test]
    fn test_add_tweak_rejects_non_canonical() {
        let key = PrivateKey::random();
        assert!(key.add_tweak(&[0xff; 32]).is_err());
    }
}
