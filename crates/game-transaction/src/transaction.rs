//! The transaction wire structure.
//!
//! Serialization covers both the legacy layout and the extended layout
//! with the 0x00 marker / 0x01 flag pair and per-input witness stacks.
//! The transaction id is always the double SHA-256 of the legacy
//! serialization, so adding or stripping witness data never changes it.

use std::fmt;

use game_primitives::chainhash::{double_hash, Hash};
use game_primitives::util::{ByteReader, ByteWriter, VarInt};

use crate::input::TxInput;
use crate::output::TxOutput;
use crate::TransactionError;

/// Witness serialization marker byte.
const WITNESS_MARKER: u8 = 0x00;
/// Witness serialization flag byte.
const WITNESS_FLAG: u8 = 0x01;

/// A transaction: version, inputs, outputs, lock time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Format version, signed on the wire.
    pub version: u32,
    /// Inputs being spent.
    pub inputs: Vec<TxInput>,
    /// Outputs being created.
    pub outputs: Vec<TxOutput>,
    /// Earliest time or height the transaction is valid.
    pub lock_time: u32,
}

impl Transaction {
    /// An empty version-2 transaction.
    pub fn new() -> Self {
        Transaction { version: 2, inputs: Vec::new(), outputs: Vec::new(), lock_time: 0 }
    }

    /// True when any input carries witness items.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(TxInput::has_witness)
    }

    /// Serialize in wire format.
    ///
    /// The extended layout with witness stacks is used whenever any
    /// input carries witness items.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize(self.has_witness())
    }

    /// Serialize in the legacy layout, witness data omitted.
    pub fn to_legacy_bytes(&self) -> Vec<u8> {
        self.serialize(false)
    }

    fn serialize(&self, with_witness: bool) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_u32_le(self.version);

        if with_witness {
            writer.write_u8(WITNESS_MARKER);
            writer.write_u8(WITNESS_FLAG);
        }

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        if with_witness {
            for input in &self.inputs {
                writer.write_varint(VarInt::from(input.witness.len()));
                for item in &input.witness {
                    writer.write_var_bytes(item);
                }
            }
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    /// Parse a transaction, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_u32_le()?;

        let mut input_count = reader.read_varint()?.value() as usize;
        let mut has_witness = false;
        if input_count == 0 {
            // Zero inputs cannot occur, so this is the witness marker.
            let flag = reader.read_u8()?;
            if flag != WITNESS_FLAG {
                return Err(TransactionError::MalformedTransaction(format!(
                    "unexpected witness flag {:#04x}",
                    flag
                )));
            }
            has_witness = true;
            input_count = reader.read_varint()?.value() as usize;
        }

        // Counts are untrusted; cap pre-allocation by the bytes left.
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining()));
        for _ in 0..input_count {
            inputs.push(TxInput::read_from(&mut reader)?);
        }

        let output_count = reader.read_varint()?.value() as usize;
        let mut outputs = Vec::with_capacity(output_count.min(reader.remaining()));
        for _ in 0..output_count {
            outputs.push(TxOutput::read_from(&mut reader)?);
        }

        if has_witness {
            let mut any = false;
            for input in &mut inputs {
                let item_count = reader.read_varint()?.value() as usize;
                any |= item_count > 0;
                let mut witness = Vec::with_capacity(item_count.min(reader.remaining()));
                for _ in 0..item_count {
                    let len = reader.read_varint()?.value() as usize;
                    witness.push(reader.read_bytes(len)?.to_vec());
                }
                input.witness = witness;
            }
            if !any {
                return Err(TransactionError::MalformedTransaction(
                    "witness flag set but no witness items present".to_string(),
                ));
            }
        }

        let lock_time = reader.read_u32_le()?;
        if reader.remaining() != 0 {
            return Err(TransactionError::MalformedTransaction(format!(
                "{} trailing bytes",
                reader.remaining()
            )));
        }

        Ok(Transaction { version, inputs, outputs, lock_time })
    }

    /// Parse from hex.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::MalformedTransaction(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Hex encoding of the wire serialization.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The transaction id: double SHA-256 of the legacy serialization.
    pub fn txid(&self) -> Hash {
        double_hash(&self.to_legacy_bytes())
    }

    /// Total byte length of the wire serialization.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
