//! Payment templates.
//!
//! A `Payment` names a standard locking pattern and the data it commits
//! to. Templates compose: a script-hash payment wraps a redeem
//! template, a witness-script-hash payment wraps a witness template.
//! Recognition from raw script bytes recovers only what the script
//! itself carries, so the wrapped template is optional on the hashed
//! variants.

use game_primitives::hash::{hash160, sha256};
use game_primitives::{Network, PublicKey};

use crate::address::Address;
use crate::opcodes::*;
use crate::script::Script;
use crate::ScriptError;

/// A standard payment template with its committed data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payment {
    /// Pay to the hash160 of a public key.
    P2pkh {
        /// hash160 of the recipient public key.
        pubkey_hash: [u8; 20],
    },
    /// Pay to the hash160 of a redeem script.
    P2sh {
        /// hash160 of the redeem script.
        script_hash: [u8; 20],
        /// The wrapped template, when known.
        redeem: Option<Box<Payment>>,
    },
    /// Bare m-of-n multisig. Key order is signature order.
    P2ms {
        /// Required signature count.
        m: u8,
        /// SEC1-serialized candidate keys in script order. Each entry
        /// keeps the encoding (compressed or uncompressed) the script
        /// commits to.
        pubkeys: Vec<Vec<u8>>,
    },
    /// Version-0 witness pay-to-public-key-hash.
    P2wpkh {
        /// hash160 of the compressed public key.
        pubkey_hash: [u8; 20],
    },
    /// Version-0 witness pay-to-script-hash.
    P2wsh {
        /// sha256 of the witness script.
        program: [u8; 32],
        /// The wrapped template, when known.
        witness: Option<Box<Payment>>,
    },
    /// Provably unspendable OP_RETURN data carrier.
    Embed {
        /// The pushed payloads following OP_RETURN.
        pushes: Vec<Vec<u8>>,
    },
}

impl Payment {
    // ---- constructors ----

    /// Pay-to-public-key-hash for a key (compressed encoding).
    pub fn p2pkh(pubkey: &PublicKey) -> Payment {
        Payment::P2pkh { pubkey_hash: pubkey.hash160() }
    }

    /// Pay-to-public-key-hash for an already-computed hash.
    pub fn p2pkh_from_hash(pubkey_hash: [u8; 20]) -> Payment {
        Payment::P2pkh { pubkey_hash }
    }

    /// Bare m-of-n multisig over the given keys (compressed encoding),
    /// order preserved.
    pub fn p2ms(m: u8, pubkeys: Vec<PublicKey>) -> Result<Payment, ScriptError> {
        Self::p2ms_encoded(m, pubkeys.iter().map(|k| k.to_compressed().to_vec()).collect())
    }

    /// Bare m-of-n multisig over already-serialized keys.
    ///
    /// Each entry's encoding is kept as given, so a script built from
    /// uncompressed keys regenerates byte for byte.
    pub fn p2ms_encoded(m: u8, pubkeys: Vec<Vec<u8>>) -> Result<Payment, ScriptError> {
        let n = pubkeys.len();
        if m == 0 || m as usize > n || n > 16 {
            return Err(ScriptError::InvalidMultisig { m: m as usize, n });
        }
        for key in &pubkeys {
            PublicKey::from_bytes(key)?;
        }
        Ok(Payment::P2ms { m, pubkeys })
    }

    /// Script-hash wrapping of a redeem template.
    ///
    /// Wrapping another script-hash template is rejected: the outer
    /// hash would commit to an unspendable inner script.
    pub fn p2sh(redeem: Payment) -> Result<Payment, ScriptError> {
        if matches!(redeem, Payment::P2sh { .. }) {
            return Err(ScriptError::NestedScriptHash);
        }
        let script_hash = hash160(redeem.output_script().as_bytes());
        Ok(Payment::P2sh { script_hash, redeem: Some(Box::new(redeem)) })
    }

    /// Witness pay-to-public-key-hash for a key (compressed encoding).
    pub fn p2wpkh(pubkey: &PublicKey) -> Payment {
        Payment::P2wpkh { pubkey_hash: pubkey.hash160() }
    }

    /// Witness script-hash wrapping of a witness template.
    ///
    /// Witness templates cannot nest other witness templates.
    pub fn p2wsh(witness: Payment) -> Result<Payment, ScriptError> {
        if matches!(witness, Payment::P2wpkh { .. } | Payment::P2wsh { .. }) {
            return Err(ScriptError::WitnessInWitness);
        }
        let program = sha256(witness.output_script().as_bytes());
        Ok(Payment::P2wsh { program, witness: Some(Box::new(witness)) })
    }

    /// OP_RETURN data carrier for the given payloads.
    pub fn embed(pushes: Vec<Vec<u8>>) -> Payment {
        Payment::Embed { pushes }
    }

    // ---- recognition ----

    /// Classify a locking script into its template.
    ///
    /// Hashed variants come back without their wrapped template, since
    /// the script only carries the hash.
    pub fn from_output_script(script: &Script) -> Result<Payment, ScriptError> {
        if let Some(pubkey_hash) = script.public_key_hash() {
            return Ok(Payment::P2pkh { pubkey_hash });
        }
        if let Some(script_hash) = script.script_hash() {
            return Ok(Payment::P2sh { script_hash, redeem: None });
        }
        if script.is_p2wpkh() {
            let mut pubkey_hash = [0u8; 20];
            pubkey_hash.copy_from_slice(&script.as_bytes()[2..]);
            return Ok(Payment::P2wpkh { pubkey_hash });
        }
        if script.is_p2wsh() {
            let mut program = [0u8; 32];
            program.copy_from_slice(&script.as_bytes()[2..]);
            return Ok(Payment::P2wsh { program, witness: None });
        }
        if script.is_multisig() {
            let chunks = script.chunks()?;
            let m = decode_small_int(chunks[0].op).unwrap_or(0);
            let mut pubkeys = Vec::with_capacity(chunks.len() - 3);
            for chunk in &chunks[1..chunks.len() - 2] {
                let data = chunk.data.as_deref().unwrap_or(&[]);
                PublicKey::from_bytes(data)?;
                pubkeys.push(data.to_vec());
            }
            return Ok(Payment::P2ms { m, pubkeys });
        }
        if script.is_data_out() {
            let chunks = script.chunks()?;
            let mut pushes = Vec::new();
            for chunk in &chunks[1..] {
                match &chunk.data {
                    Some(data) => pushes.push(data.clone()),
                    None => return Err(ScriptError::UnknownTemplate),
                }
            }
            return Ok(Payment::Embed { pushes });
        }
        Err(ScriptError::UnknownTemplate)
    }

    // ---- output ----

    /// The locking script for this template.
    pub fn output_script(&self) -> Script {
        let mut script = Script::new();
        match self {
            Payment::P2pkh { pubkey_hash } => {
                script.0.push(OP_DUP);
                script.0.push(OP_HASH160);
                script.0.push(OP_DATA_20);
                script.0.extend_from_slice(pubkey_hash);
                script.0.push(OP_EQUALVERIFY);
                script.0.push(OP_CHECKSIG);
            }
            Payment::P2sh { script_hash, .. } => {
                script.0.push(OP_HASH160);
                script.0.push(OP_DATA_20);
                script.0.extend_from_slice(script_hash);
                script.0.push(OP_EQUAL);
            }
            Payment::P2ms { m, pubkeys } => {
                // m and n are validated at construction; encode_small_int
                // cannot fail for 1..=16, and key pushes fit a single
                // length byte.
                script.0.push(encode_small_int(*m).unwrap_or(OP_0));
                for key in pubkeys {
                    let _ = script.append_push_data(key);
                }
                script.0.push(encode_small_int(pubkeys.len() as u8).unwrap_or(OP_0));
                script.0.push(OP_CHECKMULTISIG);
            }
            Payment::P2wpkh { pubkey_hash } => {
                script.0.push(OP_0);
                script.0.push(OP_DATA_20);
                script.0.extend_from_slice(pubkey_hash);
            }
            Payment::P2wsh { program, .. } => {
                script.0.push(OP_0);
                script.0.push(OP_DATA_32);
                script.0.extend_from_slice(program);
            }
            Payment::Embed { pushes } => {
                script.0.push(OP_RETURN);
                for push in pushes {
                    // Payload sizes are caller-controlled and small for
                    // standard relay; oversized pushes cannot occur from
                    // the public constructors.
                    let _ = script.append_push_data(push);
                }
            }
        }
        script
    }

    /// The redeem script for a script-hash payment with a known
    /// wrapped template.
    pub fn redeem_script(&self) -> Option<Script> {
        match self {
            Payment::P2sh { redeem: Some(inner), .. } => Some(inner.output_script()),
            _ => None,
        }
    }

    /// The witness script for a witness-script-hash payment with a
    /// known wrapped template.
    pub fn witness_script(&self) -> Option<Script> {
        match self {
            Payment::P2wsh { witness: Some(inner), .. } => Some(inner.output_script()),
            _ => None,
        }
    }

    /// The base58 address for this template on the given network.
    ///
    /// Witness programs, bare multisig, and data carriers have no
    /// base58 form and return `NoAddressForm`.
    pub fn address(&self, network: Network) -> Result<Address, ScriptError> {
        match self {
            Payment::P2pkh { pubkey_hash } => {
                Ok(Address::from_public_key_hash(*pubkey_hash, network))
            }
            Payment::P2sh { script_hash, .. } => {
                Ok(Address::from_script_hash(*script_hash, network))
            }
            _ => Err(ScriptError::NoAddressForm),
        }
    }
}
