//! The Script type.
//!
//! A thin newtype over raw script bytes with hex and ASM codecs,
//! push-building helpers, and the classification predicates the payment
//! template engine and transaction builder rely on.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// A script: locking (output) or unlocking (input) program bytes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Script(pub Vec<u8>);

impl Script {
    /// An empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Wrap raw script bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Parse a hex-encoded script.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ScriptError::MalformedScript(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Parse a space-separated ASM string.
    ///
    /// Tokens starting with `OP_` are opcode names; anything else is a
    /// hex push payload.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for token in asm.split_whitespace() {
            if token.starts_with("OP_") {
                let op = string_to_opcode(token).ok_or_else(|| {
                    ScriptError::MalformedScript(format!("unknown opcode '{}'", token))
                })?;
                script.0.push(op);
            } else {
                let data = hex::decode(token)
                    .map_err(|e| ScriptError::MalformedScript(e.to_string()))?;
                script.append_push_data(&data)?;
            }
        }
        Ok(script)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// A copy of the raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.clone()
    }

    /// Hex encoding of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Render as a space-separated ASM string.
    pub fn to_asm(&self) -> Result<String, ScriptError> {
        let chunks = self.chunks()?;
        Ok(chunks
            .iter()
            .map(ScriptChunk::to_asm_string)
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Decode into structured chunks.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    /// Byte length of the script.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a data push with the correct length prefix.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append a bare opcode.
    ///
    /// Pushdata prefixes are rejected here; use `append_push_data`.
    pub fn append_opcode(&mut self, op: u8) -> Result<(), ScriptError> {
        if (OP_DATA_1..=OP_PUSHDATA4).contains(&op) {
            return Err(ScriptError::MalformedScript(format!(
                "opcode {:#04x} is a push prefix, not a bare opcode",
                op
            )));
        }
        self.0.push(op);
        Ok(())
    }

    // ---- classification ----

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn is_p2pkh(&self) -> bool {
        self.0.len() == 25
            && self.0[0] == OP_DUP
            && self.0[1] == OP_HASH160
            && self.0[2] == OP_DATA_20
            && self.0[23] == OP_EQUALVERIFY
            && self.0[24] == OP_CHECKSIG
    }

    /// `OP_HASH160 <20 bytes> OP_EQUAL`
    pub fn is_p2sh(&self) -> bool {
        self.0.len() == 23
            && self.0[0] == OP_HASH160
            && self.0[1] == OP_DATA_20
            && self.0[22] == OP_EQUAL
    }

    /// `OP_0 <20 bytes>` — version-0 witness public-key-hash program.
    pub fn is_p2wpkh(&self) -> bool {
        self.0.len() == 22 && self.0[0] == OP_0 && self.0[1] == OP_DATA_20
    }

    /// `OP_0 <32 bytes>` — version-0 witness script-hash program.
    pub fn is_p2wsh(&self) -> bool {
        self.0.len() == 34 && self.0[0] == OP_0 && self.0[1] == OP_DATA_32
    }

    /// `OP_m <pubkey>... OP_n OP_CHECKMULTISIG`
    pub fn is_multisig(&self) -> bool {
        let chunks = match self.chunks() {
            Ok(c) => c,
            Err(_) => return false,
        };
        if chunks.len() < 4 {
            return false;
        }
        let n_keys = chunks.len() - 3;
        let m = match decode_small_int(chunks[0].op) {
            Some(m) if m >= 1 => m as usize,
            _ => return false,
        };
        let n = match decode_small_int(chunks[chunks.len() - 2].op) {
            Some(n) => n as usize,
            None => return false,
        };
        if chunks[chunks.len() - 1].op != OP_CHECKMULTISIG {
            return false;
        }
        if m > n || n != n_keys || n > 16 {
            return false;
        }
        chunks[1..1 + n_keys].iter().all(|c| {
            matches!(c.data.as_ref().map(Vec::len), Some(33) | Some(65))
        })
    }

    /// Starts with OP_RETURN: provably unspendable data carrier.
    pub fn is_data_out(&self) -> bool {
        !self.0.is_empty() && self.0[0] == OP_RETURN
    }

    // ---- extraction ----

    /// The 20-byte hash embedded in a P2PKH locking script.
    pub fn public_key_hash(&self) -> Option<[u8; 20]> {
        if !self.is_p2pkh() {
            return None;
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[3..23]);
        Some(hash)
    }

    /// The 20-byte hash embedded in a P2SH locking script.
    pub fn script_hash(&self) -> Option<[u8; 20]> {
        if !self.is_p2sh() {
            return None;
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[2..22]);
        Some(hash)
    }

    /// The witness program bytes of a version-0 witness script.
    pub fn witness_program(&self) -> Option<&[u8]> {
        if self.is_p2wpkh() || self.is_p2wsh() {
            Some(&self.0[2..])
        } else {
            None
        }
    }

    /// A copy with every OP_CODESEPARATOR occurrence removed.
    ///
    /// Required when a script becomes the subscript of a legacy
    /// signature hash.
    pub fn without_code_separators(&self) -> Script {
        match self.chunks() {
            Ok(chunks) => {
                let mut out = Script::new();
                for chunk in chunks {
                    if chunk.op == OP_CODESEPARATOR && chunk.data.is_none() {
                        continue;
                    }
                    match chunk.data {
                        // Re-encoding preserves the original prefix width
                        // only for minimal pushes; subscripts in practice
                        // are standard templates, which are minimal.
                        Some(data) => {
                            let _ = out.append_push_data(&data);
                        }
                        None => out.0.push(chunk.op),
                    }
                }
                out
            }
            // An undecodable script is passed through untouched.
            Err(_) => self.clone(),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
