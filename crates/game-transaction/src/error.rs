use game_primitives::PrimitivesError;
use game_script::ScriptError;

/// Error type for transaction parsing, signature hashing, and building.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("input index {index} out of range for {len} inputs")]
    InputIndexOutOfRange { index: usize, len: usize },

    #[error("input {input} spends a script-hash output but no redeem script was given")]
    MissingRedeemScript { input: usize },

    #[error("input {input} spends a witness script-hash output but no witness script was given")]
    MissingWitnessScript { input: usize },

    #[error("input {input} needs the previous output value for witness signing")]
    MissingValue { input: usize },

    #[error("input {input} does not match any signable script template")]
    UnsignableScript { input: usize },

    #[error("signing key is not among the template keys of input {input}")]
    KeyNotInTemplate { input: usize },

    #[error("input {input} already carries a signature from this key")]
    AlreadySigned { input: usize },

    #[error("input {input} was signed with hash type {fixed:#04x}, cannot re-sign with {requested:#04x}")]
    InconsistentHashType { input: usize, fixed: u8, requested: u8 },

    #[error("input {input} has {have} of {need} required signatures")]
    IncompleteSignatures { input: usize, have: usize, need: usize },

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
