//! Staged transaction construction and signing.
//!
//! `TransactionBuilder` accumulates inputs and outputs, then collects
//! signatures per input before `build()` assembles the final unlocking
//! scripts and witness stacks. Inputs may be signed in any order, and a
//! multisig input accepts one signature per call until its threshold is
//! met, so several parties can sign the same builder state in turn.

use game_primitives::chainhash::Hash;
use game_primitives::hash::{hash160, sha256};
use game_primitives::{KeyPair, Network, PublicKey};
use game_script::{opcodes::OP_0, Address, Payment, Script};

use crate::input::{TxInput, DEFAULT_SEQUENCE};
use crate::output::TxOutput;
use crate::sighash::SIGHASH_ALL;
use crate::transaction::Transaction;
use crate::TransactionError;

/// How a signature reaches the final transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Placement {
    /// `<sig> <pubkey>` in the unlocking script.
    KeyScript,
    /// `OP_0 <sig>...` in the unlocking script.
    MultisigScript,
    /// `[sig, pubkey]` witness stack.
    KeyWitness,
    /// `[dummy, sig..., script]` witness stack.
    MultisigWitness,
}

/// Signing state of one input, fixed by the first `sign` call.
#[derive(Clone, Debug)]
struct SigningContext {
    placement: Placement,
    hash_type: u8,
    /// Template keys in script order; single-key templates hold the
    /// signer's key.
    pubkeys: Vec<PublicKey>,
    /// Signatures (DER plus hash-type byte) slotted by template key.
    signatures: Vec<Option<Vec<u8>>>,
    /// Required signature count.
    threshold: usize,
    /// Script the digest commits to.
    script_code: Script,
    /// Serialized signer key for the key placements.
    pubkey_bytes: Vec<u8>,
    /// Spent value, needed by the witness digest.
    value: u64,
    /// Redeem script bytes pushed as the last unlocking-script element.
    redeem_push: Option<Vec<u8>>,
    /// Witness script bytes appended as the last witness item.
    witness_push: Option<Vec<u8>>,
}

#[derive(Clone, Debug)]
struct BuilderInput {
    prev_txid: Hash,
    vout: u32,
    sequence: u32,
    prev_out_script: Option<Script>,
    context: Option<SigningContext>,
}

/// Builds and signs a transaction for one network.
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    network: Network,
    version: u32,
    lock_time: u32,
    inputs: Vec<BuilderInput>,
    outputs: Vec<TxOutput>,
}

impl TransactionBuilder {
    /// A builder with no inputs or outputs, version 2, lock time 0.
    pub fn new(network: Network) -> Self {
        TransactionBuilder {
            network,
            version: 2,
            lock_time: 0,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the transaction version.
    pub fn set_version(&mut self, version: u32) -> &mut Self {
        self.version = version;
        self
    }

    /// Set the lock time.
    pub fn set_lock_time(&mut self, lock_time: u32) -> &mut Self {
        self.lock_time = lock_time;
        self
    }

    /// Add an input spending `txid:vout`, with the txid in display hex.
    ///
    /// Returns the input index.
    pub fn add_input(&mut self, txid: &str, vout: u32) -> Result<usize, TransactionError> {
        let prev_txid = Hash::from_hex(txid)?;
        Ok(self.add_input_raw(prev_txid, vout, DEFAULT_SEQUENCE, None))
    }

    /// Add an input with an explicit sequence and, when known, the
    /// script of the output being spent.
    pub fn add_input_raw(
        &mut self,
        prev_txid: Hash,
        vout: u32,
        sequence: u32,
        prev_out_script: Option<Script>,
    ) -> usize {
        self.inputs.push(BuilderInput {
            prev_txid,
            vout,
            sequence,
            prev_out_script,
            context: None,
        });
        self.inputs.len() - 1
    }

    /// Add an output paying `value` to a base58 address.
    ///
    /// Returns the output index.
    pub fn add_output(&mut self, address: &str, value: u64) -> Result<usize, TransactionError> {
        let address = Address::from_string(address, self.network)?;
        Ok(self.add_output_script(address.to_output_script(), value))
    }

    /// Add an output paying `value` to an explicit locking script.
    pub fn add_output_script(&mut self, script: Script, value: u64) -> usize {
        self.outputs.push(TxOutput::new(value, script));
        self.outputs.len() - 1
    }

    /// Sign `input_index` with `keypair`.
    ///
    /// `redeem_script` is required for script-hash spends and
    /// `witness_script` for witness script-hash spends; `value` (the
    /// amount of the spent output) is required for all witness spends.
    /// The first call on an input fixes its script shape and hash type
    /// (defaulting to SIGHASH_ALL); later calls add signatures for the
    /// remaining multisig keys and must pass the same hash type, or
    /// none.
    pub fn sign(
        &mut self,
        input_index: usize,
        keypair: &KeyPair,
        redeem_script: Option<&Script>,
        hash_type: Option<u8>,
        value: Option<u64>,
        witness_script: Option<&Script>,
    ) -> Result<(), TransactionError> {
        if input_index >= self.inputs.len() {
            return Err(TransactionError::InputIndexOutOfRange {
                index: input_index,
                len: self.inputs.len(),
            });
        }

        if self.inputs[input_index].context.is_none() {
            let context = self.resolve_context(
                input_index,
                keypair,
                redeem_script,
                hash_type.unwrap_or(SIGHASH_ALL),
                value,
                witness_script,
            )?;
            self.inputs[input_index].context = Some(context);
        }

        let unsigned = self.unsigned_transaction();
        let ctx = self.inputs[input_index]
            .context
            .as_mut()
            .ok_or(TransactionError::UnsignableScript { input: input_index })?;

        if let Some(requested) = hash_type {
            if requested != ctx.hash_type {
                return Err(TransactionError::InconsistentHashType {
                    input: input_index,
                    fixed: ctx.hash_type,
                    requested,
                });
            }
        }

        let digest = match ctx.placement {
            Placement::KeyWitness | Placement::MultisigWitness => unsigned
                .witness_signature_hash(
                    input_index,
                    &ctx.script_code,
                    ctx.value,
                    ctx.hash_type,
                )?,
            _ => unsigned.signature_hash(input_index, &ctx.script_code, ctx.hash_type),
        };

        let slot = ctx
            .pubkeys
            .iter()
            .position(|k| k == keypair.public_key())
            .ok_or(TransactionError::KeyNotInTemplate { input: input_index })?;
        if ctx.signatures[slot].is_some() {
            return Err(TransactionError::AlreadySigned { input: input_index });
        }

        let mut encoded = keypair.sign(&digest)?.to_der();
        encoded.push(ctx.hash_type);
        ctx.signatures[slot] = Some(encoded);
        Ok(())
    }

    /// Assemble the signed transaction.
    ///
    /// Fails with `IncompleteSignatures` when any input is unsigned or
    /// a multisig input is below its threshold.
    pub fn build(&self) -> Result<Transaction, TransactionError> {
        let mut tx = self.unsigned_transaction();

        for (i, input) in self.inputs.iter().enumerate() {
            let ctx = input.context.as_ref().ok_or(
                TransactionError::IncompleteSignatures { input: i, have: 0, need: 1 },
            )?;
            let collected: Vec<&Vec<u8>> = ctx.signatures.iter().flatten().collect();
            if collected.len() < ctx.threshold {
                return Err(TransactionError::IncompleteSignatures {
                    input: i,
                    have: collected.len(),
                    need: ctx.threshold,
                });
            }

            let slot = &mut tx.inputs[i];
            match ctx.placement {
                Placement::KeyScript => {
                    let mut script = Script::new();
                    script.append_push_data(collected[0])?;
                    script.append_push_data(&ctx.pubkey_bytes)?;
                    if let Some(redeem) = &ctx.redeem_push {
                        script.append_push_data(redeem)?;
                    }
                    slot.script_sig = script;
                }
                Placement::MultisigScript => {
                    let mut script = Script::new();
                    script.append_opcode(OP_0)?;
                    for sig in collected.iter().take(ctx.threshold) {
                        script.append_push_data(sig)?;
                    }
                    if let Some(redeem) = &ctx.redeem_push {
                        script.append_push_data(redeem)?;
                    }
                    slot.script_sig = script;
                }
                Placement::KeyWitness => {
                    let mut witness =
                        vec![collected[0].clone(), ctx.pubkey_bytes.clone()];
                    if let Some(ws) = &ctx.witness_push {
                        witness.push(ws.clone());
                    }
                    slot.witness = witness;
                    slot.script_sig = wrapper_script(ctx)?;
                }
                Placement::MultisigWitness => {
                    let mut witness = vec![Vec::new()];
                    for sig in collected.iter().take(ctx.threshold) {
                        witness.push((*sig).clone());
                    }
                    if let Some(ws) = &ctx.witness_push {
                        witness.push(ws.clone());
                    }
                    slot.witness = witness;
                    slot.script_sig = wrapper_script(ctx)?;
                }
            }
        }

        Ok(tx)
    }

    /// The transaction with empty unlocking scripts, as digested.
    fn unsigned_transaction(&self) -> Transaction {
        Transaction {
            version: self.version,
            inputs: self
                .inputs
                .iter()
                .map(|input| TxInput {
                    prev_txid: input.prev_txid,
                    vout: input.vout,
                    script_sig: Script::new(),
                    sequence: input.sequence,
                    witness: Vec::new(),
                })
                .collect(),
            outputs: self.outputs.clone(),
            lock_time: self.lock_time,
        }
    }

    /// Work out the signing shape of an input from the scripts at hand.
    fn resolve_context(
        &self,
        input_index: usize,
        keypair: &KeyPair,
        redeem_script: Option<&Script>,
        hash_type: u8,
        value: Option<u64>,
        witness_script: Option<&Script>,
    ) -> Result<SigningContext, TransactionError> {
        let input = &self.inputs[input_index];
        let prev_out = input.prev_out_script.as_ref();

        if let Some(redeem) = redeem_script {
            if let Some(prev) = prev_out {
                let expected = prev.script_hash().ok_or(
                    TransactionError::UnsignableScript { input: input_index },
                )?;
                if expected != hash160(redeem.as_bytes()) {
                    return Err(TransactionError::UnsignableScript { input: input_index });
                }
            }
            return self.resolve_redeem(
                input_index,
                keypair,
                redeem,
                hash_type,
                value,
                witness_script,
            );
        }

        if let Some(ws) = witness_script {
            // Direct P2WSH spend.
            if let Some(prev) = prev_out {
                match prev.witness_program() {
                    Some(program) if program == sha256(ws.as_bytes()) => {}
                    _ => return Err(TransactionError::UnsignableScript { input: input_index }),
                }
            }
            return self.witness_script_context(
                input_index, keypair, ws, hash_type, value, None,
            );
        }

        match prev_out {
            None => {
                // No information: assume a key spend of the signer's own
                // public key hash, the common wallet case.
                Ok(self.key_context(
                    keypair,
                    hash_type,
                    Placement::KeyScript,
                    Payment::p2pkh_from_hash(keypair.public_key_hash()).output_script(),
                    0,
                    None,
                    None,
                ))
            }
            Some(prev) if prev.is_p2pkh() => {
                if prev.public_key_hash() != Some(keypair.public_key_hash()) {
                    return Err(TransactionError::KeyNotInTemplate { input: input_index });
                }
                Ok(self.key_context(
                    keypair,
                    hash_type,
                    Placement::KeyScript,
                    prev.clone(),
                    0,
                    None,
                    None,
                ))
            }
            Some(prev) if prev.is_p2wpkh() => {
                if prev.witness_program() != Some(&keypair.public_key_hash()[..]) {
                    return Err(TransactionError::KeyNotInTemplate { input: input_index });
                }
                let value =
                    value.ok_or(TransactionError::MissingValue { input: input_index })?;
                Ok(self.key_context(
                    keypair,
                    hash_type,
                    Placement::KeyWitness,
                    Payment::p2pkh_from_hash(keypair.public_key_hash()).output_script(),
                    value,
                    None,
                    None,
                ))
            }
            Some(prev) if prev.is_multisig() => {
                let (threshold, pubkeys) = multisig_parts(prev)?;
                Ok(SigningContext {
                    placement: Placement::MultisigScript,
                    hash_type,
                    signatures: vec![None; pubkeys.len()],
                    pubkeys,
                    threshold,
                    script_code: prev.clone(),
                    pubkey_bytes: Vec::new(),
                    value: 0,
                    redeem_push: None,
                    witness_push: None,
                })
            }
            Some(prev) if prev.is_p2sh() => {
                Err(TransactionError::MissingRedeemScript { input: input_index })
            }
            Some(prev) if prev.is_p2wsh() => {
                Err(TransactionError::MissingWitnessScript { input: input_index })
            }
            Some(_) => Err(TransactionError::UnsignableScript { input: input_index }),
        }
    }

    /// Signing shape for a P2SH spend once the redeem script is known.
    fn resolve_redeem(
        &self,
        input_index: usize,
        keypair: &KeyPair,
        redeem: &Script,
        hash_type: u8,
        value: Option<u64>,
        witness_script: Option<&Script>,
    ) -> Result<SigningContext, TransactionError> {
        let redeem_bytes = redeem.to_bytes();

        if redeem.is_multisig() {
            let (threshold, pubkeys) = multisig_parts(redeem)?;
            return Ok(SigningContext {
                placement: Placement::MultisigScript,
                hash_type,
                signatures: vec![None; pubkeys.len()],
                pubkeys,
                threshold,
                script_code: redeem.clone(),
                pubkey_bytes: Vec::new(),
                value: 0,
                redeem_push: Some(redeem_bytes),
                witness_push: None,
            });
        }

        if redeem.is_p2wpkh() {
            if redeem.witness_program() != Some(&keypair.public_key_hash()[..]) {
                return Err(TransactionError::KeyNotInTemplate { input: input_index });
            }
            let value = value.ok_or(TransactionError::MissingValue { input: input_index })?;
            return Ok(self.key_context(
                keypair,
                hash_type,
                Placement::KeyWitness,
                Payment::p2pkh_from_hash(keypair.public_key_hash()).output_script(),
                value,
                Some(redeem_bytes),
                None,
            ));
        }

        if redeem.is_p2wsh() {
            let ws = witness_script
                .ok_or(TransactionError::MissingWitnessScript { input: input_index })?;
            match redeem.witness_program() {
                Some(program) if program == sha256(ws.as_bytes()) => {}
                _ => return Err(TransactionError::UnsignableScript { input: input_index }),
            }
            return self.witness_script_context(
                input_index,
                keypair,
                ws,
                hash_type,
                value,
                Some(redeem_bytes),
            );
        }

        if redeem.is_p2pkh() {
            if redeem.public_key_hash() != Some(keypair.public_key_hash()) {
                return Err(TransactionError::KeyNotInTemplate { input: input_index });
            }
            return Ok(self.key_context(
                keypair,
                hash_type,
                Placement::KeyScript,
                redeem.clone(),
                0,
                Some(redeem_bytes),
                None,
            ));
        }

        Err(TransactionError::UnsignableScript { input: input_index })
    }

    /// Signing shape for a witness-script spend, wrapped or direct.
    fn witness_script_context(
        &self,
        input_index: usize,
        keypair: &KeyPair,
        witness_script: &Script,
        hash_type: u8,
        value: Option<u64>,
        redeem_push: Option<Vec<u8>>,
    ) -> Result<SigningContext, TransactionError> {
        let value = value.ok_or(TransactionError::MissingValue { input: input_index })?;
        let ws_bytes = witness_script.to_bytes();

        if witness_script.is_multisig() {
            let (threshold, pubkeys) = multisig_parts(witness_script)?;
            return Ok(SigningContext {
                placement: Placement::MultisigWitness,
                hash_type,
                signatures: vec![None; pubkeys.len()],
                pubkeys,
                threshold,
                script_code: witness_script.clone(),
                pubkey_bytes: Vec::new(),
                value,
                redeem_push,
                witness_push: Some(ws_bytes),
            });
        }

        if witness_script.is_p2pkh() {
            if witness_script.public_key_hash() != Some(keypair.public_key_hash()) {
                return Err(TransactionError::KeyNotInTemplate { input: input_index });
            }
            // Stacks [sig, pubkey, script]; the script item comes from
            // witness_push.
            return Ok(self.key_context(
                keypair,
                hash_type,
                Placement::KeyWitness,
                witness_script.clone(),
                value,
                redeem_push,
                Some(ws_bytes),
            ));
        }

        Err(TransactionError::UnsignableScript { input: input_index })
    }

    /// One-key context with the signer as the sole template key.
    #[allow(clippy::too_many_arguments)]
    fn key_context(
        &self,
        keypair: &KeyPair,
        hash_type: u8,
        placement: Placement,
        script_code: Script,
        value: u64,
        redeem_push: Option<Vec<u8>>,
        witness_push: Option<Vec<u8>>,
    ) -> SigningContext {
        SigningContext {
            placement,
            hash_type,
            pubkeys: vec![keypair.public_key().clone()],
            signatures: vec![None],
            threshold: 1,
            script_code,
            pubkey_bytes: keypair.public_key_bytes(),
            value,
            redeem_push,
            witness_push,
        }
    }
}

/// The unlocking script of a wrapped witness spend: a single push of
/// the redeem script, or empty for a native witness spend.
fn wrapper_script(ctx: &SigningContext) -> Result<Script, TransactionError> {
    let mut script = Script::new();
    if let Some(redeem) = &ctx.redeem_push {
        script.append_push_data(redeem)?;
    }
    Ok(script)
}

fn multisig_parts(script: &Script) -> Result<(usize, Vec<PublicKey>), TransactionError> {
    match Payment::from_output_script(script)? {
        Payment::P2ms { m, pubkeys } => {
            let mut keys = Vec::with_capacity(pubkeys.len());
            for bytes in &pubkeys {
                keys.push(PublicKey::from_bytes(bytes)?);
            }
            Ok((m as usize, keys))
        }
        _ => Err(TransactionError::MalformedTransaction(
            "expected a multisig script".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sighash::{SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_NONE};
    use game_primitives::{Signature, MAINNET};

    const ALICE_WIF: &str = "Rc2TdoSek9nB5mVGgy41AGm6ARdyDykRQVYYsWChoFvUChA6BUpA";
    const BOB_WIF: &str = "RZYGrLNbJE4xs3ZigGKcq5YUze4Qv5QiE5Xt9H9EVTxPCQ7YnpvR";

    const ONE_TO_ONE_HEX: &str = "0100000001e2b65c27277e305bfe82c7dc86a23bcb6fb59bf5a5db31c2c505dcd863f071d1000000006a47304402200572c9674dab171e64f91aa9ff0757458838ff13505be8d14f43e088979d5eff0220474f5ddd12e1ef63089f235b705c5234c01c690903d819423794f427a78ddc1c012102484c9d8950be897a073880defc2da6fce55a6f810fb51b8761d8dce2ef7bc818ffffffff01e069f902000000001976a914e10c5d2235a634b329673fe2498197b4cb033f9c88ac00000000";

    const TWO_TO_TWO_HEX: &str = "0100000002e2b65c27277e305bfe82c7dc86a23bcb6fb59bf5a5db31c2c505dcd863f071d1000000006a47304402203ca9b284f54513094536566ee5b09fdfa787242700d3be1c5a174856656d3d65022042bb3f936736d18f481f9f3ad61cb999194c053d0f141d938a6301c0c6694ae5012102484c9d8950be897a073880defc2da6fce55a6f810fb51b8761d8dce2ef7bc818ffffffffdf117d208875b582770ee783561026d83d6d90866185614501337d0a791e0e5f000000006a47304402202b35d354e193951f09289b81158113f2d149ff40e89d4df163de0c5c19f979e2022060152480f5b1c127bec99b4176b12de80a329c26a1749bb3677a0cc9606207c601210388b16ad109195fd487b51f4d5acbc7460b2d8ab874be2f9f8bb025773b2eedc5ffffffff02e03fee05000000001976a9148c9daf6be074f513ec93f43175fd35053226ebf988ac302dfa02000000001976a914e10c5d2235a634b329673fe2498197b4cb033f9c88ac00000000";

    #[test]
    fn test_one_to_one_vector() {
        let alice = KeyPair::from_wif(ALICE_WIF, MAINNET).unwrap();

        let mut builder = TransactionBuilder::new(MAINNET);
        builder.set_version(1);
        builder
            .add_input("d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2", 0)
            .unwrap();
        builder.add_output("GeMsGLjh1XygKgTQ5eKfazj8KTJamZ3CLw", 49_900_000).unwrap();
        builder.sign(0, &alice, None, None, None, None).unwrap();

        assert_eq!(builder.build().unwrap().to_hex(), ONE_TO_ONE_HEX);
    }

    #[test]
    fn test_two_to_two_vector_signed_out_of_order() {
        let alice = KeyPair::from_wif(ALICE_WIF, MAINNET).unwrap();
        let bob = KeyPair::from_wif(BOB_WIF, MAINNET).unwrap();

        let mut builder = TransactionBuilder::new(MAINNET);
        builder.set_version(1);
        builder
            .add_input("d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2", 0)
            .unwrap();
        builder
            .add_input("5f0e1e790a7d33014561856186906d3dd826105683e70e7782b57588207d11df", 0)
            .unwrap();
        builder.add_output("GWfRv9RBGauU1tuYqfRPu2pSEnxFt8pE84", 99_500_000).unwrap();
        builder.add_output("GeMsGLjh1XygKgTQ5eKfazj8KTJamZ3CLw", 49_950_000).unwrap();

        // Bob signs his input first even though it is the second one.
        builder.sign(1, &bob, None, None, None, None).unwrap();
        builder.sign(0, &alice, None, None, None, None).unwrap();

        assert_eq!(builder.build().unwrap().to_hex(), TWO_TO_TWO_HEX);
    }

    #[test]
    fn test_unsigned_input_fails_build() {
        let mut builder = TransactionBuilder::new(MAINNET);
        builder
            .add_input("d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2", 0)
            .unwrap();
        builder.add_output("GeMsGLjh1XygKgTQ5eKfazj8KTJamZ3CLw", 1_000).unwrap();
        assert!(matches!(
            builder.build(),
            Err(TransactionError::IncompleteSignatures { input: 0, .. })
        ));
    }

    fn two_of_three() -> (Vec<KeyPair>, Script) {
        let pairs: Vec<KeyPair> = (1u8..=3)
            .map(|i| KeyPair::from_private_scalar(&[i; 32], MAINNET).unwrap())
            .collect();
        let pubkeys = pairs.iter().map(|p| p.public_key().clone()).collect();
        let redeem = Payment::p2ms(2, pubkeys).unwrap().output_script();
        (pairs, redeem)
    }

    fn multisig_builder(redeem: &Script) -> TransactionBuilder {
        let prev_out = Payment::p2sh(
            Payment::from_output_script(redeem).unwrap(),
        )
        .unwrap()
        .output_script();

        let mut builder = TransactionBuilder::new(MAINNET);
        builder.add_input_raw(
            Hash::from_hex("d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2")
                .unwrap(),
            0,
            DEFAULT_SEQUENCE,
            Some(prev_out),
        );
        builder.add_output("GeMsGLjh1XygKgTQ5eKfazj8KTJamZ3CLw", 10_000).unwrap();
        builder
    }

    #[test]
    fn test_p2sh_multisig_two_party_signing() {
        let (pairs, redeem) = two_of_three();
        let mut builder = multisig_builder(&redeem);

        builder.sign(0, &pairs[0], Some(&redeem), None, None, None).unwrap();
        assert!(matches!(
            builder.build(),
            Err(TransactionError::IncompleteSignatures { input: 0, have: 1, need: 2 })
        ));

        builder.sign(0, &pairs[2], Some(&redeem), None, None, None).unwrap();
        let tx = builder.build().unwrap();

        // OP_0 <sig> <sig> <redeem>
        let chunks = tx.inputs[0].script_sig.chunks().unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].op, OP_0);
        assert_eq!(chunks[3].data.as_deref(), Some(redeem.as_bytes()));

        // Signatures sit in template key order and verify against the
        // recomputed digest.
        let digest = tx.signature_hash(0, &redeem, SIGHASH_ALL);
        for (chunk, pair) in chunks[1..3].iter().zip([&pairs[0], &pairs[2]]) {
            let sig_bytes = chunk.data.as_ref().unwrap();
            let (der, tail) = sig_bytes.split_at(sig_bytes.len() - 1);
            assert_eq!(tail[0], SIGHASH_ALL);
            let sig = Signature::from_der(der).unwrap();
            assert!(pair.public_key().verify(&digest, &sig));
        }
    }

    #[test]
    fn test_multisig_rejects_outside_key_and_double_sign() {
        let (pairs, redeem) = two_of_three();
        let stranger = KeyPair::from_private_scalar(&[9u8; 32], MAINNET).unwrap();
        let mut builder = multisig_builder(&redeem);

        assert!(matches!(
            builder.sign(0, &stranger, Some(&redeem), None, None, None),
            Err(TransactionError::KeyNotInTemplate { input: 0 })
        ));

        builder.sign(0, &pairs[1], Some(&redeem), None, None, None).unwrap();
        assert!(matches!(
            builder.sign(0, &pairs[1], Some(&redeem), None, None, None),
            Err(TransactionError::AlreadySigned { input: 0 })
        ));
    }

    #[test]
    fn test_multisig_rejects_mismatched_hash_type() {
        let (pairs, redeem) = two_of_three();
        let mut builder = multisig_builder(&redeem);

        builder.sign(0, &pairs[0], Some(&redeem), None, None, None).unwrap();
        assert!(matches!(
            builder.sign(0, &pairs[1], Some(&redeem), Some(SIGHASH_NONE), None, None),
            Err(TransactionError::InconsistentHashType {
                input: 0,
                fixed: SIGHASH_ALL,
                requested: SIGHASH_NONE,
            })
        ));

        // Restating the fixed hash type explicitly is fine.
        builder.sign(0, &pairs[1], Some(&redeem), Some(SIGHASH_ALL), None, None).unwrap();
        builder.build().unwrap();
    }

    #[test]
    fn test_p2sh_without_redeem_script_fails() {
        let (pairs, redeem) = two_of_three();
        let mut builder = multisig_builder(&redeem);
        assert!(matches!(
            builder.sign(0, &pairs[0], None, None, None, None),
            Err(TransactionError::MissingRedeemScript { input: 0 })
        ));
    }

    #[test]
    fn test_p2sh_p2wpkh_spend_shape() {
        let alice = KeyPair::from_wif(ALICE_WIF, MAINNET).unwrap();
        let redeem = Payment::p2wpkh(alice.public_key()).output_script();
        let prev_out = Payment::p2sh(Payment::p2wpkh(alice.public_key()))
            .unwrap()
            .output_script();

        let mut builder = TransactionBuilder::new(MAINNET);
        builder.add_input_raw(
            Hash::from_hex("d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2")
                .unwrap(),
            0,
            DEFAULT_SEQUENCE,
            Some(prev_out),
        );
        builder.add_output("GeMsGLjh1XygKgTQ5eKfazj8KTJamZ3CLw", 40_000).unwrap();

        // Value is mandatory for the witness digest.
        assert!(matches!(
            builder.sign(0, &alice, Some(&redeem), None, None, None),
            Err(TransactionError::MissingValue { input: 0 })
        ));

        builder.sign(0, &alice, Some(&redeem), None, Some(50_000), None).unwrap();
        let tx = builder.build().unwrap();

        // script_sig is a single push of the witness program.
        let chunks = tx.inputs[0].script_sig.chunks().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data.as_deref(), Some(redeem.as_bytes()));

        // Witness stack carries [signature, pubkey] and verifies.
        assert_eq!(tx.inputs[0].witness.len(), 2);
        let script_code = Payment::p2pkh(alice.public_key()).output_script();
        let digest = tx
            .witness_signature_hash(0, &script_code, 50_000, SIGHASH_ALL)
            .unwrap();
        let sig_bytes = &tx.inputs[0].witness[0];
        let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1]).unwrap();
        assert!(alice.public_key().verify(&digest, &sig));
        assert_eq!(tx.inputs[0].witness[1], alice.public_key_bytes());

        // Round-trips through the witness serialization.
        assert_eq!(Transaction::from_hex(&tx.to_hex()).unwrap(), tx);
    }

    #[test]
    fn test_p2wsh_multisig_witness_stack() {
        let (pairs, witness_script) = two_of_three();
        let prev_out =
            Payment::p2wsh(Payment::from_output_script(&witness_script).unwrap())
                .unwrap()
                .output_script();

        let mut builder = TransactionBuilder::new(MAINNET);
        builder.add_input_raw(
            Hash::from_hex("d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2")
                .unwrap(),
            0,
            DEFAULT_SEQUENCE,
            Some(prev_out),
        );
        builder.add_output("GeMsGLjh1XygKgTQ5eKfazj8KTJamZ3CLw", 10_000).unwrap();

        builder
            .sign(0, &pairs[0], None, None, Some(20_000), Some(&witness_script))
            .unwrap();
        builder
            .sign(0, &pairs[1], None, None, Some(20_000), Some(&witness_script))
            .unwrap();
        let tx = builder.build().unwrap();

        // [dummy, sig, sig, witness script], empty script_sig.
        assert!(tx.inputs[0].script_sig.is_empty());
        assert_eq!(tx.inputs[0].witness.len(), 4);
        assert!(tx.inputs[0].witness[0].is_empty());
        assert_eq!(tx.inputs[0].witness[3], witness_script.to_bytes());

        let digest = tx
            .witness_signature_hash(0, &witness_script, 20_000, SIGHASH_ALL)
            .unwrap();
        for (item, pair) in tx.inputs[0].witness[1..3].iter().zip(&pairs[..2]) {
            let sig = Signature::from_der(&item[..item.len() - 1]).unwrap();
            assert!(pair.public_key().verify(&digest, &sig));
        }
    }

    #[test]
    fn test_custom_hash_type_is_recorded() {
        let alice = KeyPair::from_wif(ALICE_WIF, MAINNET).unwrap();
        let flags = SIGHASH_ALL | SIGHASH_ANYONECANPAY;

        let mut builder = TransactionBuilder::new(MAINNET);
        builder
            .add_input("d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2", 0)
            .unwrap();
        builder.add_output("GeMsGLjh1XygKgTQ5eKfazj8KTJamZ3CLw", 1_000).unwrap();
        builder.sign(0, &alice, None, Some(flags), None, None).unwrap();

        let tx = builder.build().unwrap();
        let chunks = tx.inputs[0].script_sig.chunks().unwrap();
        let sig_bytes = chunks[0].data.as_ref().unwrap();
        assert_eq!(*sig_bytes.last().unwrap(), flags);

        let subscript = Payment::p2pkh(alice.public_key()).output_script();
        let digest = tx.signature_hash(0, &subscript, flags);
        let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1]).unwrap();
        assert!(alice.public_key().verify(&digest, &sig));
    }

    #[test]
    fn test_wrong_address_network_rejected() {
        let mut builder = TransactionBuilder::new(MAINNET);
        // A testnet-style address must not pass mainnet validation.
        assert!(builder.add_output("mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn", 1_000).is_err());
    }
}
