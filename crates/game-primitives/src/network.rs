//! Network parameter sets.
//!
//! Per-network constants for every human-readable encoding the SDK
//! produces: address version bytes, WIF prefix, extended-key version
//! bytes, and the signed-message prefix. Threaded explicitly through
//! key, address, and builder constructors so multiple networks can
//! coexist in one process.

use crate::PrimitivesError;

/// Extended-key (BIP32) version byte pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bip32Versions {
    /// Version prefix for public extended keys.
    pub public: u32,
    /// Version prefix for private extended keys.
    pub private: u32,
}

/// Immutable parameter set for one network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Network {
    /// Short name used in error messages.
    pub name: &'static str,
    /// Prefix prepended to signed messages.
    pub message_prefix: &'static str,
    /// Extended-key version bytes.
    pub bip32: Bip32Versions,
    /// Version byte for pay-to-public-key-hash addresses.
    pub pub_key_hash: u8,
    /// Version byte for pay-to-script-hash addresses.
    pub script_hash: u8,
    /// Version byte for WIF private keys.
    pub wif: u8,
}

/// GameCredits main network. Addresses start with 'G', script-hash
/// addresses with '3', compressed WIF keys with 'R'.
pub const MAINNET: Network = Network {
    name: "gamecredits",
    message_prefix: "\x1cGameCredits Signed Message:\n",
    bip32: Bip32Versions { public: 0x0488b21e, private: 0x0488ade4 },
    pub_key_hash: 0x26,
    script_hash: 0x05,
    wif: 0xa6,
};

/// GameCredits test network (Bitcoin-compatible testnet version bytes).
pub const TESTNET: Network = Network {
    name: "gamecredits-testnet",
    message_prefix: "\x1cGameCredits Signed Message:\n",
    bip32: Bip32Versions { public: 0x043587cf, private: 0x04358394 },
    pub_key_hash: 0x6f,
    script_hash: 0xc4,
    wif: 0xef,
};

impl Network {
    /// Check a version byte against this network's WIF prefix.
    pub fn check_wif_version(&self, version: u8) -> Result<(), PrimitivesError> {
        if version != self.wif {
            return Err(PrimitivesError::InvalidNetwork { version, network: self.name });
        }
        Ok(())
    }

    /// Classify an address version byte under this network.
    ///
    /// Returns `true` for the pubkey-hash byte, `false` for the
    /// script-hash byte, and an error for anything else.
    pub fn classify_address_version(&self, version: u8) -> Result<bool, PrimitivesError> {
        if version == self.pub_key_hash {
            Ok(true)
        } else if version == self.script_hash {
            Ok(false)
        } else {
            Err(PrimitivesError::InvalidNetwork { version, network: self.name })
        }
    }
}
