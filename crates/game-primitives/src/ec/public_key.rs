//! secp256k1 public key.
//!
//! Supports compressed/uncompressed SEC1 serialization, Hash160 for
//! address derivation, point-tweak arithmetic for hierarchical
//! derivation, and ECDSA verification.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::Group;
use k256::{AffinePoint, ProjectivePoint};
use std::fmt;

use crate::ec::private_key::canonical_scalar;
use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes.
const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes.
const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from raw SEC1 bytes.
    ///
    /// Accepts both compressed (33-byte) and uncompressed (65-byte)
    /// encodings; fails with `InvalidPoint` when the bytes do not decode
    /// to a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPoint(
                "public key bytes are empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPoint(e.to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize in compressed SEC1 format (33 bytes).
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed SEC1 format (65 bytes).
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Compressed key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Hash160 of the compressed key: RIPEMD160(SHA256(bytes)).
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify an ECDSA signature against a message hash.
    ///
    /// Returns `false` for any invalid signature; never errors.
    pub fn verify(&self, hash: &[u8], sig: &Signature) -> bool {
        sig.verify(hash, self)
    }

    /// Add `G * tweak` to this public point.
    ///
    /// The public half of hierarchical child derivation: the tweaked
    /// point for a non-hardened child can be computed without any private
    /// material. Fails if the tweak is not a canonical scalar or the
    /// resulting point is the identity.
    pub fn add_tweak(&self, tweak: &[u8; 32]) -> Result<PublicKey, PrimitivesError> {
        let tweak_scalar = canonical_scalar(tweak)?;
        let result = self.to_projective_point()? + ProjectivePoint::GENERATOR * tweak_scalar;
        if bool::from(result.is_identity()) {
            return Err(PrimitivesError::InvalidPoint(
                "tweaked point is the identity".to_string(),
            ));
        }
        let encoded = result.to_affine().to_encoded_point(true);
        PublicKey::from_bytes(encoded.as_bytes())
    }

    /// Construct from a k256 `VerifyingKey`.
    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    /// Convert to a k256 `ProjectivePoint` for EC arithmetic.
    pub(crate) fn to_projective_point(&self) -> Result<ProjectivePoint, PrimitivesError> {
        let encoded = self.inner.to_encoded_point(false);
        let ct_option = AffinePoint::from_encoded_point(&encoded);
        Option::<AffinePoint>::from(ct_option)
            .map(ProjectivePoint::from)
            .ok_or_else(|| PrimitivesError::InvalidPoint("point not on curve".to_string()))
    }

    /// Access the underlying k256 `VerifyingKey`.
    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::private_key::PrivateKey;

    #[test]
    fn test_parse_compressed_and_uncompressed() {
        let compressed =
            hex::decode("02484c9d8950be897a073880defc2da6fce55a6f810fb51b8761d8dce2ef7bc818")
                .unwrap();
        let pk = PublicKey::from_bytes(&compressed).unwrap();
        assert_eq!(pk.to_compressed().to_vec(), compressed);

        let uncompressed = pk.to_uncompressed();
        let pk2 = PublicKey::from_bytes(&uncompressed).unwrap();
        assert_eq!(pk, pk2);
    }

    #[test]
    fn test_rejects_invalid_points() {
        // Empty, wrong prefix, x not on curve.
        assert!(PublicKey::from_bytes(&[]).is_err());
        assert!(PublicKey::from_bytes(&[0x05]).is_err());
        let mut bad = [0x02u8; 33];
        bad[1..].copy_from_slice(&[0xff; 32]);
        assert!(PublicKey::from_bytes(&bad).is_err());
    }

    #[test]
    fn test_display_is_compressed_hex() {
        let hex_str = "03e41eb9436ab4be78fd30bd93d9f461696e7e10737acdda6162db3d1d0befe0b6";
        let pk = PublicKey::from_hex(hex_str).unwrap();
        assert_eq!(format!("{}", pk), hex_str);
    }

    #[test]
    fn test_tweak_matches_private_tweak() {
        // pub(priv + t) == pub(priv) + G*t
        let priv_key = PrivateKey::random();
        let tweak = crate::hash::sha256(b"tweak bytes");
        let tweaked_priv = priv_key.add_tweak(&tweak).unwrap();
        let tweaked_pub = priv_key.public_key().add_tweak(&tweak).unwrap();
        assert_eq!(tweaked_priv.public_key(), tweaked_pub);
    }
}
