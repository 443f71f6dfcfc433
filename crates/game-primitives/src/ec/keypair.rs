//! Network-aware EC key pair.
//!
//! `KeyPair` binds a private/public key pair to a `Network` and carries
//! the compression preference, which together determine every
//! human-readable form derived from it: WIF export and the serialized
//! public key that address hashing operates on. A pair may be
//! public-only, in which case signing and WIF export fail with
//! `PrivateKeyRequired`.

use crate::base58;
use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::network::Network;
use crate::PrimitivesError;

/// Compression flag byte appended to the WIF payload.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 key pair bound to a network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    private: Option<PrivateKey>,
    public: PublicKey,
    /// The network whose version bytes govern WIF and address encodings.
    pub network: Network,
    /// Whether the public key serializes in compressed form.
    pub compressed: bool,
}

impl KeyPair {
    /// Create a pair from an existing private key.
    pub fn from_private_key(private: PrivateKey, network: Network) -> Self {
        let public = private.public_key();
        KeyPair { private: Some(private), public, network, compressed: true }
    }

    /// Create a pair from a raw 32-byte private scalar.
    ///
    /// Fails with `InvalidKey` if the scalar is zero or not below the
    /// curve order.
    pub fn from_private_scalar(bytes: &[u8], network: Network) -> Result<Self, PrimitivesError> {
        let private = PrivateKey::from_bytes(bytes)?;
        Ok(Self::from_private_key(private, network))
    }

    /// Generate a pair from OS entropy.
    pub fn random(network: Network) -> Self {
        Self::from_private_key(PrivateKey::random(), network)
    }

    /// Decode a WIF string under the given network.
    ///
    /// The payload is `[version][32-byte scalar][optional 0x01 flag]`;
    /// the version byte must equal `network.wif`.
    pub fn from_wif(wif: &str, network: Network) -> Result<Self, PrimitivesError> {
        let payload = base58::check_decode(wif)?;

        let compressed = match payload.len() {
            34 => {
                if payload[33] != COMPRESS_MAGIC {
                    return Err(PrimitivesError::InvalidWif(
                        "invalid compression flag".to_string(),
                    ));
                }
                true
            }
            33 => false,
            n => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "invalid payload length {}",
                    n
                )));
            }
        };

        network.check_wif_version(payload[0])?;

        let private = PrivateKey::from_bytes(&payload[1..33])?;
        let public = private.public_key();
        Ok(KeyPair { private: Some(private), public, network, compressed })
    }

    /// Create a public-only pair from SEC1 public key bytes.
    ///
    /// Fails with `InvalidPoint` if the bytes do not decode to a curve
    /// point.
    pub fn from_public_key(bytes: &[u8], network: Network) -> Result<Self, PrimitivesError> {
        let compressed = bytes.len() == 33;
        let public = PublicKey::from_bytes(bytes)?;
        Ok(KeyPair { private: None, public, network, compressed })
    }

    /// Wrap an existing public key as a watch-only pair.
    pub fn from_public(public: PublicKey, network: Network) -> Self {
        KeyPair { private: None, public, network, compressed: true }
    }

    /// Encode the private key as a WIF string for this pair's network.
    pub fn to_wif(&self) -> Result<String, PrimitivesError> {
        let private = self.private.as_ref().ok_or(PrimitivesError::PrivateKeyRequired)?;

        let mut payload = Vec::with_capacity(34);
        payload.push(self.network.wif);
        payload.extend_from_slice(&private.to_bytes());
        if self.compressed {
            payload.push(COMPRESS_MAGIC);
        }
        Ok(base58::check_encode(&payload))
    }

    /// Sign a 32-byte message hash deterministically (RFC6979, low-S).
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        let private = self.private.as_ref().ok_or(PrimitivesError::PrivateKeyRequired)?;
        private.sign(hash)
    }

    /// Verify a signature against a message hash.
    ///
    /// Never errors; malformed signatures verify as `false`.
    pub fn verify(&self, hash: &[u8], sig: &Signature) -> bool {
        self.public.verify(hash, sig)
    }

    /// The public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// The private key, if present.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private.as_ref()
    }

    /// True when no private scalar is held.
    pub fn is_watch_only(&self) -> bool {
        self.private.is_none()
    }

    /// The public key serialized per this pair's compression preference.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.public.to_compressed().to_vec()
        } else {
            self.public.to_uncompressed().to_vec()
        }
    }

    /// Hash160 of the serialized public key.
    ///
    /// This is the 20-byte hash embedded in pay-to-public-key-hash
    /// scripts and addresses.
    pub fn public_key_hash(&self) -> [u8; 20] {
        hash160(&self.public_key_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;
    use crate::network::{MAINNET, TESTNET};

    // WIF from the integration fixtures; compressed, mainnet.
    const FIXED_WIF: &str = "Rfr6XJJb7jj2n6hcJH7eJyJEy7nnXm6Z161d2wFdXjTP7so6PMDo";

    #[test]
    fn test_wif_roundtrip() {
        let pair = KeyPair::from_wif(FIXED_WIF, MAINNET).unwrap();
        assert!(pair.compressed);
        assert!(!pair.is_watch_only());
        assert_eq!(pair.to_wif().unwrap(), FIXED_WIF);
    }

    #[test]
    fn test_wif_brainwallet_scalar() {
        // sha256 of the phrase is the scalar behind FIXED_WIF.
        let scalar = sha256(b"correct horse battery staple");
        let pair = KeyPair::from_private_scalar(&scalar, MAINNET).unwrap();
        assert_eq!(pair.to_wif().unwrap(), FIXED_WIF);
    }

    #[test]
    fn test_wif_wrong_network() {
        assert!(matches!(
            KeyPair::from_wif(FIXED_WIF, TESTNET),
            Err(PrimitivesError::InvalidNetwork { .. })
        ));
    }

    #[test]
    fn test_wif_bad_checksum() {
        let mut wif = FIXED_WIF.to_string();
        wif.pop();
        wif.push('1');
        assert!(KeyPair::from_wif(&wif, MAINNET).is_err());
    }

    #[test]
    fn test_from_private_scalar_rejects_invalid() {
        assert!(KeyPair::from_private_scalar(&[0u8; 32], MAINNET).is_err());
        assert!(KeyPair::from_private_scalar(&[1u8; 31], MAINNET).is_err());
    }

    #[test]
    fn test_public_only_pair() {
        let full = KeyPair::from_wif(FIXED_WIF, MAINNET).unwrap();
        let watch =
            KeyPair::from_public_key(&full.public_key_bytes(), MAINNET).unwrap();

        assert!(watch.is_watch_only());
        assert_eq!(watch.public_key_hash(), full.public_key_hash());
        assert!(matches!(watch.to_wif(), Err(PrimitivesError::PrivateKeyRequired)));

        let hash = sha256(b"needs a private key");
        assert!(matches!(watch.sign(&hash), Err(PrimitivesError::PrivateKeyRequired)));
    }

    #[test]
    fn test_from_public_key_rejects_garbage() {
        assert!(matches!(
            KeyPair::from_public_key(&[0x09; 33], MAINNET),
            Err(PrimitivesError::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_sign_verify_cross_keys() {
        let a = KeyPair::random(MAINNET);
        let b = KeyPair::random(MAINNET);
        let hash = sha256(b"some digest");
        let sig = a.sign(&hash).unwrap();
        assert!(a.verify(&hash, &sig));
        assert!(!b.verify(&hash, &sig));
    }
}
