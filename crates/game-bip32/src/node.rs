//! Hierarchical deterministic key nodes.
//!
//! A node couples a key pair with a chain code and its position in the
//! derivation tree. Child nodes derive from the parent by mixing the
//! chain code, serialized key, and child index through HMAC-SHA512 and
//! tweaking the parent scalar (or point, for watch-only nodes) by the
//! resulting delta.

use game_primitives::base58;
use game_primitives::ec::{KeyPair, PrivateKey, PublicKey};
use game_primitives::hash::sha512_hmac;
use game_primitives::{Network, PrimitivesError};
use game_script::Address;

use crate::Bip32Error;

/// Index offset at which derivation switches to hardened mode.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key for stretching a seed into the master node.
const MASTER_SECRET: &[u8] = b"Bitcoin seed";

/// Serialized extended-key payload length before the checksum.
const EXTENDED_KEY_LEN: usize = 78;

/// A node in a BIP32 derivation tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HDNode {
    keypair: KeyPair,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    index: u32,
}

impl HDNode {
    /// Stretch a seed into the master node.
    ///
    /// The seed must be 16 to 64 bytes.
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self, Bip32Error> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(Bip32Error::InvalidSeedLength { got: seed.len() });
        }
        let stretched = sha512_hmac(MASTER_SECRET, seed);
        let private = PrivateKey::from_bytes(&stretched[..32])?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&stretched[32..]);
        Ok(HDNode {
            keypair: KeyPair::from_private_key(private, network),
            chain_code,
            depth: 0,
            parent_fingerprint: [0; 4],
            index: 0,
        })
    }

    /// Derive the child node at `index`.
    ///
    /// Indices at or above [`HARDENED_OFFSET`] derive in hardened mode,
    /// which requires the private scalar. In the cryptographically
    /// negligible case the derived scalar is invalid this fails with
    /// `InvalidDerivation`; callers should skip to the next index.
    pub fn derive(&self, index: u32) -> Result<HDNode, Bip32Error> {
        let depth = self.depth.checked_add(1).ok_or(Bip32Error::DepthExceeded)?;

        let mut data = Vec::with_capacity(37);
        if index >= HARDENED_OFFSET {
            let private = self
                .keypair
                .private_key()
                .ok_or(PrimitivesError::PrivateKeyRequired)?;
            data.push(0x00);
            data.extend_from_slice(&private.to_bytes());
        } else {
            data.extend_from_slice(&self.keypair.public_key().to_compressed());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let mixed = sha512_hmac(&self.chain_code, &data);
        let mut delta = [0u8; 32];
        delta.copy_from_slice(&mixed[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&mixed[32..]);

        let keypair = match self.keypair.private_key() {
            Some(private) => {
                let child = private
                    .add_tweak(&delta)
                    .map_err(|_| Bip32Error::InvalidDerivation)?;
                KeyPair::from_private_key(child, self.keypair.network)
            }
            None => {
                let child = self
                    .keypair
                    .public_key()
                    .add_tweak(&delta)
                    .map_err(|_| Bip32Error::InvalidDerivation)?;
                KeyPair::from_public(child, self.keypair.network)
            }
        };

        Ok(HDNode {
            keypair,
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            index,
        })
    }

    /// Derive the hardened child at `index` (below [`HARDENED_OFFSET`]).
    pub fn derive_hardened(&self, index: u32) -> Result<HDNode, Bip32Error> {
        if index >= HARDENED_OFFSET {
            return Err(Bip32Error::InvalidChildIndex { index });
        }
        self.derive(index + HARDENED_OFFSET)
    }

    /// Walk a slash-separated derivation path.
    ///
    /// A leading `m` is accepted only on a master node; a trailing
    /// apostrophe marks a step hardened.
    pub fn derive_path(&self, path: &str) -> Result<HDNode, Bip32Error> {
        let mut steps = path.split('/').peekable();

        if steps.peek() == Some(&"m") {
            if self.depth != 0 || self.parent_fingerprint != [0; 4] {
                return Err(Bip32Error::InvalidPath(
                    "path starting with 'm' requires a master node".to_string(),
                ));
            }
            steps.next();
        }

        let mut node = self.clone();
        for step in steps {
            let (digits, hardened) = match step.strip_suffix('\'') {
                Some(digits) => (digits, true),
                None => (step, false),
            };
            let index: u32 = digits
                .parse()
                .map_err(|_| Bip32Error::InvalidPath(format!("bad step '{}'", step)))?;
            if index >= HARDENED_OFFSET {
                return Err(Bip32Error::InvalidPath(format!("step '{}' out of range", step)));
            }
            node = if hardened { node.derive_hardened(index)? } else { node.derive(index)? };
        }
        Ok(node)
    }

    /// A copy of this node with the private scalar stripped.
    pub fn neutered(&self) -> HDNode {
        HDNode {
            keypair: KeyPair::from_public(
                self.keypair.public_key().clone(),
                self.keypair.network,
            ),
            chain_code: self.chain_code,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            index: self.index,
        }
    }

    /// True when this node holds no private scalar.
    pub fn is_neutered(&self) -> bool {
        self.keypair.is_watch_only()
    }

    /// hash160 of the compressed public key.
    pub fn identifier(&self) -> [u8; 20] {
        self.keypair.public_key().hash160()
    }

    /// First four bytes of the identifier.
    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    /// Serialize as a versioned base58check extended key.
    pub fn to_base58(&self) -> String {
        let network = self.keypair.network;
        let version = match self.keypair.private_key() {
            Some(_) => network.bip32.private,
            None => network.bip32.public,
        };

        let mut payload = Vec::with_capacity(EXTENDED_KEY_LEN);
        payload.extend_from_slice(&version.to_be_bytes());
        payload.push(self.depth);
        payload.extend_from_slice(&self.parent_fingerprint);
        payload.extend_from_slice(&self.index.to_be_bytes());
        payload.extend_from_slice(&self.chain_code);
        match self.keypair.private_key() {
            Some(private) => {
                payload.push(0x00);
                payload.extend_from_slice(&private.to_bytes());
            }
            None => payload.extend_from_slice(&self.keypair.public_key().to_compressed()),
        }
        base58::check_encode(&payload)
    }

    /// Parse a base58check extended key under the given network.
    pub fn from_base58(s: &str, network: Network) -> Result<Self, Bip32Error> {
        let payload = base58::check_decode(s)?;
        if payload.len() != EXTENDED_KEY_LEN {
            return Err(Bip32Error::InvalidExtendedKey(format!(
                "expected {} payload bytes, got {}",
                EXTENDED_KEY_LEN,
                payload.len()
            )));
        }

        let version = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let is_private = if version == network.bip32.private {
            true
        } else if version == network.bip32.public {
            false
        } else {
            return Err(Bip32Error::InvalidNetwork { version, network: network.name });
        };

        let depth = payload[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&payload[5..9]);
        let index = u32::from_be_bytes([payload[9], payload[10], payload[11], payload[12]]);
        if depth == 0 && (parent_fingerprint != [0; 4] || index != 0) {
            return Err(Bip32Error::InvalidExtendedKey(
                "master node must have zero parent fingerprint and index".to_string(),
            ));
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&payload[13..45]);

        let keypair = if is_private {
            if payload[45] != 0x00 {
                return Err(Bip32Error::InvalidExtendedKey(
                    "private key must be zero-padded".to_string(),
                ));
            }
            let private = PrivateKey::from_bytes(&payload[46..])?;
            KeyPair::from_private_key(private, network)
        } else {
            KeyPair::from_public(PublicKey::from_bytes(&payload[45..])?, network)
        };

        Ok(HDNode { keypair, chain_code, depth, parent_fingerprint, index })
    }

    /// The P2PKH address of this node's public key.
    pub fn address(&self) -> Address {
        Address::from_public_key_hash(self.identifier(), self.keypair.network)
    }

    /// The private key as a WIF string.
    pub fn to_wif(&self) -> Result<String, PrimitivesError> {
        self.keypair.to_wif()
    }

    /// The key pair at this node.
    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// The public key at this node.
    pub fn public_key(&self) -> &PublicKey {
        self.keypair.public_key()
    }

    /// The chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Distance from the master node.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// The child index this node was derived at.
    pub fn index(&self) -> u32 {
        self.index
    }
}
