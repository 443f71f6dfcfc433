//! Transaction inputs.

use game_primitives::chainhash::Hash;
use game_primitives::util::{ByteReader, ByteWriter};
use game_script::Script;

use crate::TransactionError;

/// Sequence value marking an input as final.
pub const DEFAULT_SEQUENCE: u32 = 0xffff_ffff;

/// A reference to a previous output plus the script that spends it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// Transaction id of the previous output, internal byte order.
    pub prev_txid: Hash,
    /// Output index within the previous transaction.
    pub vout: u32,
    /// Unlocking script.
    pub script_sig: Script,
    /// Sequence number.
    pub sequence: u32,
    /// Witness stack items; empty for non-witness spends.
    pub witness: Vec<Vec<u8>>,
}

impl TxInput {
    /// An unsigned input spending `prev_txid:vout`.
    pub fn new(prev_txid: Hash, vout: u32) -> Self {
        TxInput {
            prev_txid,
            vout,
            script_sig: Script::new(),
            sequence: DEFAULT_SEQUENCE,
            witness: Vec::new(),
        }
    }

    /// True when this input carries witness items.
    pub fn has_witness(&self) -> bool {
        !self.witness.is_empty()
    }

    /// Serialize the non-witness fields.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(self.prev_txid.as_bytes());
        writer.write_u32_le(self.vout);
        writer.write_var_bytes(self.script_sig.as_bytes());
        writer.write_u32_le(self.sequence);
    }

    /// Parse the non-witness fields.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let prev_txid = Hash::from_bytes(reader.read_bytes(32)?)?;
        let vout = reader.read_u32_le()?;
        let script_len = reader.read_varint()?.value() as usize;
        let script_sig = Script::from_bytes(reader.read_bytes(script_len)?);
        let sequence = reader.read_u32_le()?;
        Ok(TxInput { prev_txid, vout, script_sig, sequence, witness: Vec::new() })
    }
}
