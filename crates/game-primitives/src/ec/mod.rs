//! Elliptic curve key primitives over secp256k1.

pub mod private_key;
pub mod public_key;
pub mod signature;
pub mod keypair;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
pub use keypair::KeyPair;
