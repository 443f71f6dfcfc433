use game_primitives::PrimitivesError;

/// Error type for script parsing, address handling, and the payment
/// template engine.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("malformed script: {0}")]
    MalformedScript(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("push data exceeds protocol limits")]
    DataTooBig,

    #[error("invalid multisig parameters: m={m}, n={n}")]
    InvalidMultisig { m: usize, n: usize },

    #[error("witness template cannot nest another witness template")]
    WitnessInWitness,

    #[error("script-hash redeem cannot be another script-hash template")]
    NestedScriptHash,

    #[error("script does not match any known payment template")]
    UnknownTemplate,

    #[error("template has no address form")]
    NoAddressForm,

    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
