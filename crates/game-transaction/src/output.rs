//! Transaction outputs.

use game_primitives::util::{ByteReader, ByteWriter};
use game_script::Script;

use crate::TransactionError;

/// An amount locked under a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount in base units.
    pub value: u64,
    /// Locking script.
    pub script_pubkey: Script,
}

impl TxOutput {
    /// An output paying `value` to `script_pubkey`.
    pub fn new(value: u64, script_pubkey: Script) -> Self {
        TxOutput { value, script_pubkey }
    }

    /// Serialize in wire format.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.value);
        writer.write_var_bytes(self.script_pubkey.as_bytes());
    }

    /// Parse from wire format.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let value = reader.read_u64_le()?;
        let script_len = reader.read_varint()?.value() as usize;
        let script_pubkey = Script::from_bytes(reader.read_bytes(script_len)?);
        Ok(TxOutput { value, script_pubkey })
    }
}
