use proptest::prelude::*;

use game_primitives::ec::{KeyPair, PrivateKey};
use game_primitives::chainhash::Hash;
use game_primitives::hash::sha256;
use game_primitives::util::{ByteReader, VarInt};
use game_primitives::MAINNET;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wif_roundtrip(seed in prop::array::uniform32(any::<u8>())) {
        // Not all 32-byte arrays are valid private keys (must be < curve order, nonzero).
        if PrivateKey::from_bytes(&seed).is_ok() {
            let pair = KeyPair::from_private_scalar(&seed, MAINNET).unwrap();
            let wif = pair.to_wif().unwrap();
            let pair2 = KeyPair::from_wif(&wif, MAINNET).unwrap();
            prop_assert_eq!(pair.public_key_hash(), pair2.public_key_hash());
            prop_assert_eq!(pair2.to_wif().unwrap(), wif);
        }
    }

    #[test]
    fn sign_verify_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let sig = pk.sign(&hash).unwrap();
            prop_assert!(pk.public_key().verify(&hash, &sig));
        }
    }

    #[test]
    fn signature_does_not_verify_altered_hash(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 1..256),
        flip in 0usize..32
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let mut hash = sha256(&msg);
            let sig = pk.sign(&hash).unwrap();
            hash[flip] ^= 0x01;
            prop_assert!(!pk.public_key().verify(&hash, &sig));
        }
    }

    #[test]
    fn txid_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let parsed = Hash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(parsed, hash);
    }

    #[test]
    fn varint_roundtrip(value in any::<u64>()) {
        let bytes = VarInt(value).to_bytes();
        let mut reader = ByteReader::new(&bytes);
        prop_assert_eq!(reader.read_varint().unwrap(), VarInt(value));
        prop_assert_eq!(reader.remaining(), 0);
    }
}
