//! Hierarchical deterministic (BIP32) key derivation for the
//! GameCredits SDK.
//!
//! [`HDNode`] derives child key pairs from a seed or a parent node,
//! supports hardened and normal derivation, watch-only (neutered)
//! trees, and the versioned base58check extended-key format.

pub mod node;

mod error;

pub use error::Bip32Error;
pub use node::{HDNode, HARDENED_OFFSET};
