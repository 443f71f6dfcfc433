//! Transaction model, signature hashing, and builder for the
//! GameCredits SDK.
//!
//! [`Transaction`] covers the wire format, including the extended
//! witness layout, and both signature-hash constructions.
//! [`TransactionBuilder`] assembles and signs spends of the standard
//! payment templates, with partial-signature support for multisig.

pub mod builder;
pub mod input;
pub mod output;
pub mod sighash;
pub mod transaction;

mod error;

pub use builder::TransactionBuilder;
pub use error::TransactionError;
pub use input::{TxInput, DEFAULT_SEQUENCE};
pub use output::TxOutput;
pub use sighash::{SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_NONE, SIGHASH_SINGLE};
pub use transaction::Transaction;
