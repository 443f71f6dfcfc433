//! ECDSA signature with DER serialization and RFC6979 deterministic nonces.
//!
//! Supports strict DER encoding/decoding, low-S normalization, and
//! signature verification that never errors on malformed input.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// The secp256k1 curve order N.
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// Half of the secp256k1 curve order, used for low-S normalization.
const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

fn malformed(what: &str) -> PrimitivesError {
    PrimitivesError::InvalidSignature(format!("malformed signature: {what}"))
}

/// An ECDSA signature with R and S components.
///
/// Components are 32-byte big-endian integers, so ordinary array
/// comparison is numeric comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S arrays.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// The R component.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The S component.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Parse a DER-encoded ECDSA signature.
    ///
    /// Expected layout: `0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>`.
    /// Rejects zero or out-of-range R and S.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < 8 || bytes[0] != 0x30 {
            return Err(malformed("missing header"));
        }
        let declared = bytes[1] as usize;
        if declared < 6 || declared + 2 > bytes.len() {
            return Err(malformed("bad length"));
        }

        let (r, rest) = read_der_int(&bytes[2..declared + 2])?;
        let (s, _) = read_der_int(rest)?;

        if r == [0u8; 32] || s == [0u8; 32] {
            return Err(malformed("zero integer"));
        }
        if r >= CURVE_ORDER || s >= CURVE_ORDER {
            return Err(malformed("integer exceeds curve order"));
        }
        Ok(Signature { r, s })
    }

    /// Serialize in DER format with low-S normalization.
    pub fn to_der(&self) -> Vec<u8> {
        let s = if self.s > HALF_ORDER { order_minus(&self.s) } else { self.s };

        let mut body = Vec::with_capacity(70);
        push_der_int(&mut body, &self.r);
        push_der_int(&mut body, &s);

        let mut out = Vec::with_capacity(body.len() + 2);
        out.push(0x30);
        out.push(body.len() as u8);
        out.extend_from_slice(&body);
        out
    }

    /// Normalize an arbitrary-length hash to exactly 32 bytes.
    ///
    /// Pads shorter hashes with leading zeros, truncates longer ones.
    fn normalize_hash(hash: &[u8]) -> [u8; 32] {
        let mut padded = [0u8; 32];
        if hash.len() >= 32 {
            padded.copy_from_slice(&hash[..32]);
        } else {
            padded[32 - hash.len()..].copy_from_slice(hash);
        }
        padded
    }

    /// Sign a message hash with RFC6979 deterministic nonces.
    ///
    /// The same key and hash always produce the same low-S signature.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let padded = Self::normalize_hash(hash);
        let (k256_sig, _recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(&padded)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let (r_bytes, s_bytes) = k256_sig.split_bytes();
        let mut sig = Signature { r: r_bytes.into(), s: s_bytes.into() };
        if sig.s > HALF_ORDER {
            sig.s = order_minus(&sig.s);
        }
        Ok(sig)
    }

    /// Verify this signature against a message hash and public key.
    ///
    /// Returns `false` rather than erroring for malformed R/S values.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        let k256_sig = match ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };

        let padded = Self::normalize_hash(hash);
        pub_key
            .verifying_key()
            .verify_prehash(&padded, &k256_sig)
            .is_ok()
    }
}

/// Read one DER integer, returning its value left-padded to 32 bytes
/// and the remaining input.
fn read_der_int(data: &[u8]) -> Result<([u8; 32], &[u8]), PrimitivesError> {
    if data.len() < 2 || data[0] != 0x02 {
        return Err(malformed("missing integer marker"));
    }
    let len = data[1] as usize;
    if len == 0 || data.len() < 2 + len {
        return Err(malformed("bad integer length"));
    }
    let (mut int, rest) = data[2..].split_at(len);
    while int.len() > 1 && int[0] == 0 {
        int = &int[1..];
    }
    if int.len() > 32 {
        return Err(malformed("integer wider than 32 bytes"));
    }
    let mut out = [0u8; 32];
    out[32 - int.len()..].copy_from_slice(int);
    Ok((out, rest))
}

/// Append one DER integer: leading zeros stripped, a 0x00 pad byte
/// added when the high bit is set.
fn push_der_int(out: &mut Vec<u8>, val: &[u8; 32]) {
    let mut start = 0;
    while start < 31 && val[start] == 0 {
        start += 1;
    }
    let pad = (val[start] & 0x80 != 0) as u8;
    out.push(0x02);
    out.push((32 - start) as u8 + pad);
    if pad == 1 {
        out.push(0x00);
    }
    out.extend_from_slice(&val[start..]);
}

/// Compute N - val where N is the secp256k1 curve order.
fn order_minus(val: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = 0u16;
    for i in (0..32).rev() {
        let diff = (CURVE_ORDER[i] as u16).wrapping_sub(val[i] as u16 + borrow);
        out[i] = diff as u8;
        borrow = (diff >> 8) & 1;
    }
    out
}
