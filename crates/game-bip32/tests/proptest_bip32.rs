use proptest::prelude::*;

use game_bip32::HDNode;
use game_primitives::MAINNET;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn extended_key_roundtrip(seed in prop::collection::vec(any::<u8>(), 16..=64)) {
        let root = HDNode::from_seed(&seed, MAINNET).unwrap();
        let restored = HDNode::from_base58(&root.to_base58(), MAINNET).unwrap();
        prop_assert_eq!(restored.address(), root.address());
        prop_assert_eq!(restored.to_wif().unwrap(), root.to_wif().unwrap());
    }

    #[test]
    fn neutered_derivation_matches_full(
        seed in prop::collection::vec(any::<u8>(), 16..=64),
        index in 0u32..0x8000_0000
    ) {
        let root = HDNode::from_seed(&seed, MAINNET).unwrap();
        let full = root.derive(index).unwrap();
        let watch = root.neutered().derive(index).unwrap();
        prop_assert_eq!(watch.address(), full.address());
        prop_assert!(watch.is_neutered());
        prop_assert!(!full.is_neutered());
    }

    #[test]
    fn hardened_from_neutered_fails(
        seed in prop::collection::vec(any::<u8>(), 16..=64),
        index in 0u32..0x8000_0000
    ) {
        let root = HDNode::from_seed(&seed, MAINNET).unwrap();
        prop_assert!(root.neutered().derive_hardened(index).is_err());
    }
}
