//! Base58Check addresses.
//!
//! An address is a versioned 20-byte hash: the version byte selects
//! between pay-to-public-key-hash and pay-to-script-hash on a given
//! network. Witness programs have no base58 form here.

use std::fmt;

use game_primitives::base58;
use game_primitives::hash::hash160;
use game_primitives::{Network, PublicKey};

use crate::opcodes::*;
use crate::script::Script;
use crate::ScriptError;

/// Which locking template an address version byte selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    /// The hash is a public key hash (P2PKH).
    PubKeyHash,
    /// The hash is a redeem script hash (P2SH).
    ScriptHash,
}

/// A decoded base58 address bound to its network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    hash: [u8; 20],
    kind: AddressKind,
    network: Network,
}

impl Address {
    /// Parse a base58check string, validating its version byte against
    /// the given network.
    pub fn from_string(s: &str, network: Network) -> Result<Self, ScriptError> {
        let payload = base58::check_decode(s)
            .map_err(|e| ScriptError::InvalidAddress(e.to_string()))?;
        if payload.len() != 21 {
            return Err(ScriptError::InvalidAddress(format!(
                "expected 21 payload bytes, got {}",
                payload.len()
            )));
        }
        let kind = if network.classify_address_version(payload[0])? {
            AddressKind::PubKeyHash
        } else {
            AddressKind::ScriptHash
        };
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok(Address { hash, kind, network })
    }

    /// The P2PKH address for an already-hashed public key.
    pub fn from_public_key_hash(hash: [u8; 20], network: Network) -> Self {
        Address { hash, kind: AddressKind::PubKeyHash, network }
    }

    /// The P2PKH address of a public key (compressed encoding).
    pub fn from_public_key(key: &PublicKey, network: Network) -> Self {
        Address::from_public_key_hash(key.hash160(), network)
    }

    /// The P2SH address for an already-hashed redeem script.
    pub fn from_script_hash(hash: [u8; 20], network: Network) -> Self {
        Address { hash, kind: AddressKind::ScriptHash, network }
    }

    /// The P2SH address of a redeem script.
    pub fn from_redeem_script(script: &Script, network: Network) -> Self {
        Address::from_script_hash(hash160(script.as_bytes()), network)
    }

    /// The 20-byte hash this address commits to.
    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// Whether this is a key-hash or script-hash address.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// The network this address belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The locking script paying to this address.
    pub fn to_output_script(&self) -> Script {
        let mut script = Script::new();
        match self.kind {
            AddressKind::PubKeyHash => {
                script.0.push(OP_DUP);
                script.0.push(OP_HASH160);
                script.0.push(OP_DATA_20);
                script.0.extend_from_slice(&self.hash);
                script.0.push(OP_EQUALVERIFY);
                script.0.push(OP_CHECKSIG);
            }
            AddressKind::ScriptHash => {
                script.0.push(OP_HASH160);
                script.0.push(OP_DATA_20);
                script.0.extend_from_slice(&self.hash);
                script.0.push(OP_EQUAL);
            }
        }
        script
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = match self.kind {
            AddressKind::PubKeyHash => self.network.pub_key_hash,
            AddressKind::ScriptHash => self.network.script_hash,
        };
        let mut payload = Vec::with_capacity(21);
        payload.push(version);
        payload.extend_from_slice(&self.hash);
        write!(f, "{}", base58::check_encode(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_primitives::{KeyPair, MAINNET, TESTNET};

    const FIXED_WIF: &str = "Rfr6XJJb7jj2n6hcJH7eJyJEy7nnXm6Z161d2wFdXjTP7so6PMDo";
    const FIXED_ADDRESS: &str = "GUxv3azjjrP95Wax5yaVBqnCTb6wqBbJfx";

    #[test]
    fn test_address_from_public_key() {
        let pair = KeyPair::from_wif(FIXED_WIF, MAINNET).unwrap();
        let addr = Address::from_public_key(pair.public_key(), MAINNET);
        assert_eq!(addr.to_string(), FIXED_ADDRESS);
        assert_eq!(addr.kind(), AddressKind::PubKeyHash);
    }

    #[test]
    fn test_address_string_roundtrip() {
        let addr = Address::from_string(FIXED_ADDRESS, MAINNET).unwrap();
        assert_eq!(addr.to_string(), FIXED_ADDRESS);
        assert_eq!(addr.kind(), AddressKind::PubKeyHash);
    }

    #[test]
    fn test_script_hash_address_roundtrip() {
        let addr = Address::from_string("38m61DPrgKTeFhStfnHoteqPxgCoLdTXhP", MAINNET).unwrap();
        assert_eq!(addr.kind(), AddressKind::ScriptHash);
        assert_eq!(addr.to_string(), "38m61DPrgKTeFhStfnHoteqPxgCoLdTXhP");
    }

    #[test]
    fn test_wrong_network_rejected() {
        assert!(Address::from_string(FIXED_ADDRESS, TESTNET).is_err());
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let mut s = FIXED_ADDRESS.to_string();
        s.replace_range(10..11, if &s[10..11] == "x" { "y" } else { "x" });
        assert!(Address::from_string(&s, MAINNET).is_err());
    }

    #[test]
    fn test_output_script_shapes() {
        let addr = Address::from_string(FIXED_ADDRESS, MAINNET).unwrap();
        let script = addr.to_output_script();
        assert!(script.is_p2pkh());
        assert_eq!(script.public_key_hash().unwrap(), *addr.hash());

        let sh = Address::from_string("38m61DPrgKTeFhStfnHoteqPxgCoLdTXhP", MAINNET).unwrap();
        let script = sh.to_output_script();
        assert!(script.is_p2sh());
        assert_eq!(script.script_hash().unwrap(), *sh.hash());
    }
}
