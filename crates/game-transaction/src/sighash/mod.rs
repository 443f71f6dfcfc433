//! Signature hashing.
//!
//! Two digest algorithms: the legacy construction that rewrites a copy
//! of the transaction around the signed input, and the BIP143
//! construction used for version-0 witness spends, which additionally
//! commits to the spent output value.

use game_primitives::hash::sha256d;
use game_primitives::util::ByteWriter;
use game_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Sign all outputs.
pub const SIGHASH_ALL: u8 = 0x01;
/// Sign no outputs.
pub const SIGHASH_NONE: u8 = 0x02;
/// Sign only the output paired with the signed input.
pub const SIGHASH_SINGLE: u8 = 0x03;
/// Combine with the above to commit to the signed input alone.
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Defined digest for the out-of-range legacy cases.
const UINT256_ONE: [u8; 32] = {
    let mut one = [0u8; 32];
    one[31] = 0x01;
    one
};

impl Transaction {
    /// Legacy signature hash for `input_index` against `subscript`.
    ///
    /// OP_CODESEPARATOR occurrences are removed from the subscript
    /// before it is substituted at the signed input. Out-of-range input
    /// or SIGHASH_SINGLE output indices yield the defined constant
    /// digest instead of an error.
    pub fn signature_hash(
        &self,
        input_index: usize,
        subscript: &Script,
        hash_type: u8,
    ) -> [u8; 32] {
        if input_index >= self.inputs.len() {
            return UINT256_ONE;
        }
        let subscript = subscript.without_code_separators();

        let mut tx = self.clone();
        match hash_type & 0x1f {
            SIGHASH_NONE => {
                tx.outputs.clear();
                zero_other_sequences(&mut tx, input_index);
            }
            SIGHASH_SINGLE => {
                if input_index >= self.outputs.len() {
                    return UINT256_ONE;
                }
                tx.outputs.truncate(input_index + 1);
                for output in &mut tx.outputs[..input_index] {
                    output.value = u64::MAX;
                    output.script_pubkey = Script::new();
                }
                zero_other_sequences(&mut tx, input_index);
            }
            _ => {}
        }

        if hash_type & SIGHASH_ANYONECANPAY != 0 {
            let mut input = tx.inputs[input_index].clone();
            input.script_sig = subscript;
            tx.inputs = vec![input];
        } else {
            for input in &mut tx.inputs {
                input.script_sig = Script::new();
            }
            tx.inputs[input_index].script_sig = subscript;
        }

        let mut bytes = tx.to_legacy_bytes();
        bytes.extend_from_slice(&(hash_type as u32).to_le_bytes());
        sha256d(&bytes)
    }

    /// BIP143 signature hash for a version-0 witness spend.
    ///
    /// `script_code` is the witness script, or the implied P2PKH script
    /// for P2WPKH spends; `value` is the amount of the spent output.
    pub fn witness_signature_hash(
        &self,
        input_index: usize,
        script_code: &Script,
        value: u64,
        hash_type: u8,
    ) -> Result<[u8; 32], TransactionError> {
        let input = self.inputs.get(input_index).ok_or(
            TransactionError::InputIndexOutOfRange {
                index: input_index,
                len: self.inputs.len(),
            },
        )?;

        let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;
        let base = hash_type & 0x1f;

        let hash_prevouts = if anyone_can_pay {
            [0u8; 32]
        } else {
            let mut writer = ByteWriter::new();
            for inp in &self.inputs {
                writer.write_bytes(inp.prev_txid.as_bytes());
                writer.write_u32_le(inp.vout);
            }
            sha256d(writer.as_bytes())
        };

        let hash_sequence =
            if anyone_can_pay || base == SIGHASH_NONE || base == SIGHASH_SINGLE {
                [0u8; 32]
            } else {
                let mut writer = ByteWriter::new();
                for inp in &self.inputs {
                    writer.write_u32_le(inp.sequence);
                }
                sha256d(writer.as_bytes())
            };

        let hash_outputs = if base != SIGHASH_NONE && base != SIGHASH_SINGLE {
            let mut writer = ByteWriter::new();
            for output in &self.outputs {
                output.write_to(&mut writer);
            }
            sha256d(writer.as_bytes())
        } else if base == SIGHASH_SINGLE && input_index < self.outputs.len() {
            let mut writer = ByteWriter::new();
            self.outputs[input_index].write_to(&mut writer);
            sha256d(writer.as_bytes())
        } else {
            [0u8; 32]
        };

        let mut writer = ByteWriter::new();
        writer.write_u32_le(self.version);
        writer.write_bytes(&hash_prevouts);
        writer.write_bytes(&hash_sequence);
        writer.write_bytes(input.prev_txid.as_bytes());
        writer.write_u32_le(input.vout);
        writer.write_var_bytes(script_code.as_bytes());
        writer.write_u64_le(value);
        writer.write_u32_le(input.sequence);
        writer.write_bytes(&hash_outputs);
        writer.write_u32_le(self.lock_time);
        writer.write_u32_le(hash_type as u32);
        Ok(sha256d(writer.as_bytes()))
    }
}

fn zero_other_sequences(tx: &mut Transaction, input_index: usize) {
    for (i, input) in tx.inputs.iter_mut().enumerate() {
        if i != input_index {
            input.sequence = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_primitives::{PublicKey, Signature};
    use game_script::Payment;

    // Three P2PKH inputs, each script_sig carrying [signature, pubkey].
    const THREE_INPUT_HEX: &str = "010000000321c5f7e7bc98b3feda84aad36a5c99a02bcb8823a2f3eccbcd5da209698b5c20000000006b48304502210099e021772830207cf7c55b69948d3b16b4dcbf1f55a9cd80ebf8221a169735f9022064d33f11d62cd28240b3862afc0b901adc9f231c7124dd19bdb30367b61964c50121032b4c06c06c3ec0b7fa29519dfa5aae193ee2cc35ca127f29f14ec605d62fb63dffffffff8a75ce85441ddb3f342708ee33cc8ed418b07d9ba9e0e7c4e1cccfe9f52d8a88000000006946304302207916c23dae212c95a920423902fa44e939fb3d542f4478a7b46e9cde53705800021f0d74e9504146e404c1b8f9cba4dff2d4782e3075491c9ed07ce4a7d1c4461a01210216c92abe433106491bdeb4a261226f20f5a4ac86220cc6e37655aac6bf3c1f2affffffffdfef93f69fe32e944fad79fa8f882b3a155d80383252348caba1a77a5abbf7ef000000006b483045022100faa6e9ca289b46c64764a624c59ac30d9abcf1d4a04c4de9089e67cbe0d300a502206930afa683f6807502de5c2431bf9a1fd333c8a2910a76304df0f3d23d83443f0121039e05da8b8ea4f9868ecebb25998c7701542986233f4401799551fbecf316b18fffffffff01ff4b0000000000001976a9146c86476d1d85cd60116cd122a274e6a570a5a35c88acc96d0700";

    #[test]
    fn test_recomputed_digests_verify_embedded_signatures() {
        let tx = Transaction::from_hex(THREE_INPUT_HEX).unwrap();
        let pubkeys = [
            "032b4c06c06c3ec0b7fa29519dfa5aae193ee2cc35ca127f29f14ec605d62fb63d",
            "0216c92abe433106491bdeb4a261226f20f5a4ac86220cc6e37655aac6bf3c1f2a",
            "039e05da8b8ea4f9868ecebb25998c7701542986233f4401799551fbecf316b18f",
        ];

        for (i, pubkey_hex) in pubkeys.iter().enumerate() {
            let pubkey = PublicKey::from_hex(pubkey_hex).unwrap();
            let chunks = tx.inputs[i].script_sig.chunks().unwrap();
            assert_eq!(chunks.len(), 2, "input {} script shape", i);

            let sig_bytes = chunks[0].data.as_ref().unwrap();
            let (der, hash_type) = sig_bytes.split_at(sig_bytes.len() - 1);
            assert_eq!(hash_type[0], SIGHASH_ALL);
            assert_eq!(chunks[1].data.as_deref(), Some(&pubkey.to_compressed()[..]));

            let subscript = Payment::p2pkh(&pubkey).output_script();
            let digest = tx.signature_hash(i, &subscript, hash_type[0]);
            let signature = Signature::from_der(der).unwrap();
            assert!(pubkey.verify(&digest, &signature), "input {} signature", i);
        }
    }

    #[test]
    fn test_out_of_range_input_yields_constant() {
        let tx = Transaction::from_hex(THREE_INPUT_HEX).unwrap();
        let digest = tx.signature_hash(9, &Script::new(), SIGHASH_ALL);
        assert_eq!(digest, UINT256_ONE);
    }

    #[test]
    fn test_single_past_outputs_yields_constant() {
        let tx = Transaction::from_hex(THREE_INPUT_HEX).unwrap();
        // Three inputs, one output: inputs 1 and 2 have no paired output.
        let subscript = Script::from_hex("76a9146c86476d1d85cd60116cd122a274e6a570a5a35c88ac").unwrap();
        assert_eq!(tx.signature_hash(1, &subscript, SIGHASH_SINGLE), UINT256_ONE);
        assert_ne!(tx.signature_hash(0, &subscript, SIGHASH_SINGLE), UINT256_ONE);
    }

    #[test]
    fn test_none_ignores_outputs() {
        let mut tx = Transaction::from_hex(THREE_INPUT_HEX).unwrap();
        let subscript = Script::from_hex("76a9146c86476d1d85cd60116cd122a274e6a570a5a35c88ac").unwrap();
        let before = tx.signature_hash(0, &subscript, SIGHASH_NONE);
        tx.outputs[0].value += 1;
        assert_eq!(tx.signature_hash(0, &subscript, SIGHASH_NONE), before);
        assert_ne!(tx.signature_hash(0, &subscript, SIGHASH_ALL), before);
    }

    #[test]
    fn test_anyonecanpay_ignores_other_inputs() {
        let mut tx = Transaction::from_hex(THREE_INPUT_HEX).unwrap();
        let subscript = Script::from_hex("76a9146c86476d1d85cd60116cd122a274e6a570a5a35c88ac").unwrap();
        let flags = SIGHASH_ALL | SIGHASH_ANYONECANPAY;
        let before = tx.signature_hash(0, &subscript, flags);
        tx.inputs[1].sequence = 7;
        assert_eq!(tx.signature_hash(0, &subscript, flags), before);
        assert_ne!(tx.signature_hash(0, &subscript, SIGHASH_ALL), before);
    }

    #[test]
    fn test_bip143_p2wpkh_reference_digest() {
        // Native P2WPKH example from the BIP143 specification.
        let tx = Transaction::from_hex(
            "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f\
             0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57\
             b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85\
             c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2\
             f0167faa815988ac11000000",
        )
        .unwrap();

        let script_code =
            Script::from_hex("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
        let digest = tx
            .witness_signature_hash(1, &script_code, 600_000_000, SIGHASH_ALL)
            .unwrap();
        assert_eq!(
            hex::encode(digest),
            "c37af31116d1b27caf68aae9e3ac82f1477929014d5b917657d0eb49478cb670"
        );
    }

    #[test]
    fn test_bip143_out_of_range_input() {
        let tx = Transaction::from_hex(THREE_INPUT_HEX).unwrap();
        assert!(matches!(
            tx.witness_signature_hash(3, &Script::new(), 0, SIGHASH_ALL),
            Err(TransactionError::InputIndexOutOfRange { index: 3, len: 3 })
        ));
    }
}
