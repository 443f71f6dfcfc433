/// GameCredits SDK - cryptographic and encoding primitives.
///
/// Hash functions, Base58Check, the binary wire-format reader/writer,
/// transaction-hash display type, network parameters, and secp256k1
/// key primitives.

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod base58;
pub mod network;
pub mod ec;

mod error;
pub use error::PrimitivesError;
pub use network::{Network, Bip32Versions, MAINNET, TESTNET};
pub use ec::{KeyPair, PrivateKey, PublicKey, Signature};
