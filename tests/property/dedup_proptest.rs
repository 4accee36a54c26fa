//! Property-based tests for change-feed de-duplication

use std::collections::HashSet;

use proptest::prelude::*;
use uuid::Uuid;

use chatbloom::client::DedupCache;

fn ids(max: usize) -> impl Strategy<Value = Vec<Uuid>> {
    // Draw from a small pool so repeats are common.
    (prop::collection::vec(any::<u128>(), 1..8), prop::collection::vec(any::<prop::sample::Index>(), 0..max))
        .prop_map(|(pool, picks)| {
            picks
                .into_iter()
                .map(|pick| Uuid::from_u128(pool[pick.index(pool.len())]))
                .collect()
        })
}

proptest! {
    #[test]
    fn test_each_id_observed_once(deliveries in ids(64)) {
        let mut cache = DedupCache::new();
        let mut seen = HashSet::new();

        for id in &deliveries {
            prop_assert_eq!(cache.observe(*id), seen.insert(*id));
        }
        prop_assert_eq!(cache.len(), seen.len());
    }

    #[test]
    fn test_forget_allows_redelivery(deliveries in ids(32)) {
        let mut cache = DedupCache::new();
        for id in &deliveries {
            cache.observe(*id);
        }
        for id in &deliveries {
            cache.forget(*id);
            prop_assert!(!cache.contains(*id));
            prop_assert!(cache.observe(*id));
        }
    }
}
