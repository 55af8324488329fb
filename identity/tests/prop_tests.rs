use proptest::prelude::*;

use agij_crypto::{merkle_leaf, merkle_proof, merkle_root};
use agij_identity::{AuthorizationCache, IdentityRegistry, VerificationPath};
use agij_types::{Address, Hash256, Role, Timestamp};

proptest! {
    /// Every member of a merkle allow-list verifies with its own proof and label.
    #[test]
    fn merkle_members_verify(size in 1u64..40, pick in any::<prop::sample::Index>(), label in "[a-z]{0,12}") {
        let members: Vec<Address> = (1..=size).map(Address::from_low_u64).collect();
        let leaves: Vec<Hash256> = members.iter().map(|a| merkle_leaf(a, &label)).collect();
        let mut registry = IdentityRegistry::new();
        registry.set_merkle_root(Role::Agent, merkle_root(&leaves)).unwrap();

        let index = pick.index(members.len());
        let proof = merkle_proof(&leaves, index).unwrap();
        let outcome = registry.verify(Role::Agent, &members[index], &label, &proof);
        prop_assert!(outcome.authorized);
        prop_assert_eq!(outcome.path, Some(VerificationPath::Merkle));
    }

    /// An outsider cannot reuse a member's proof.
    #[test]
    fn outsiders_cannot_borrow_proofs(size in 2u64..40, pick in any::<prop::sample::Index>()) {
        let members: Vec<Address> = (1..=size).map(Address::from_low_u64).collect();
        let leaves: Vec<Hash256> = members.iter().map(|a| merkle_leaf(a, "x")).collect();
        let mut registry = IdentityRegistry::new();
        registry.set_merkle_root(Role::Validator, merkle_root(&leaves)).unwrap();

        let index = pick.index(members.len());
        let proof = merkle_proof(&leaves, index).unwrap();
        let outsider = Address::from_low_u64(size + 1);
        prop_assert!(!registry.is_authorized(Role::Validator, &outsider, "x", &proof));
    }

    /// A cached entry is a hit strictly before its expiry and a miss from then on.
    #[test]
    fn cache_expiry_is_exact(duration in 1u64..10_000, stored in 0u64..1_000_000, offset in 0u64..20_000) {
        let mut cache = AuthorizationCache::new(duration);
        let address = Address::from_low_u64(9);
        cache.store(Role::Agent, address, Timestamp::new(stored));
        let hit = cache.lookup(Role::Agent, &address, Timestamp::new(stored + offset));
        prop_assert_eq!(hit.is_some(), offset < duration);
    }
}
