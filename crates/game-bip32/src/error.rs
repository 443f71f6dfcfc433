use game_primitives::PrimitivesError;

/// Error type for hierarchical deterministic key derivation.
#[derive(Debug, thiserror::Error)]
pub enum Bip32Error {
    #[error("seed must be 16 to 64 bytes, got {got}")]
    InvalidSeedLength { got: usize },

    #[error("derived scalar is invalid; skip to the next index")]
    InvalidDerivation,

    #[error("derivation depth exceeds 255")]
    DepthExceeded,

    #[error("child index {index} is out of range")]
    InvalidChildIndex { index: u32 },

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("extended key version {version:#010x} does not belong to {network}")]
    InvalidNetwork { version: u32, network: &'static str },

    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
