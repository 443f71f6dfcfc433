//! Script handling for the GameCredits SDK.
//!
//! Provides the [`Script`] type with chunk-level decoding and ASM
//! rendering, base58 [`Address`] handling, and the [`Payment`] template
//! engine covering the standard locking patterns: P2PKH, P2SH, bare
//! multisig, version-0 witness programs, and OP_RETURN data carriers.

pub mod address;
pub mod chunk;
pub mod opcodes;
pub mod payments;
pub mod script;

mod error;

pub use address::{Address, AddressKind};
pub use chunk::ScriptChunk;
pub use error::ScriptError;
pub use payments::Payment;
pub use script::Script;
