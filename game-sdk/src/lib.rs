#![deny(missing_docs)]

//! GameCredits SDK - Complete SDK.
//!
//! Re-exports all GameCredits SDK components for convenient
//! single-crate usage.

pub use game_bip32 as bip32;
pub use game_primitives as primitives;
pub use game_script as script;
pub use game_transaction as transaction;
