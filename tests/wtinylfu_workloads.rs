// ==============================================
// END-TO-END WORKLOAD TESTS (integration)
// ==============================================
//
// Exercises the public cache surface the way a caller would: fills, scans,
// hot working sets, and the loader path. Structural assertions live in the
// unit tests next to the policy; these suites only observe behavior that is
// visible through the public API.

use wtinylfu::policy::wtinylfu::WTinyLfuCache;

// ==============================================
// Fill Then Hit
// ==============================================

mod fill_then_hit {
    use super::*;

    #[test]
    fn every_inserted_key_is_readable_at_capacity() {
        let mut cache = WTinyLfuCache::new(1024);
        for key in 0..1024u64 {
            cache.insert(key, key * 3);
        }

        assert_eq!(cache.len(), 1024);
        for key in 0..1024u64 {
            let value = cache.get(&key);
            assert_eq!(value.as_deref(), Some(&(key * 3)), "key {key}");
        }
        assert_eq!(cache.hit_count(), 1024);
        assert_eq!(cache.miss_count(), 0);
    }

    #[test]
    fn lookup_beyond_the_fill_misses() {
        let mut cache = WTinyLfuCache::new(100);
        for key in 0..100u64 {
            cache.insert(key, key);
        }
        assert_eq!(cache.get(&200), None);
        assert_eq!(cache.miss_count(), 1);
    }
}

// ==============================================
// Scan Resistance
// ==============================================

mod scan_resistance {
    use super::*;

    #[test]
    fn frequent_keys_survive_a_one_pass_scan() {
        let mut cache = WTinyLfuCache::new(1024);
        for key in 0..1024u64 {
            cache.insert(key, key);
        }

        // Establish a frequent range.
        for key in 100..120u64 {
            for _ in 0..10 {
                assert!(cache.get(&key).is_some());
            }
        }

        // Scan a window of fresh keys through the cache.
        for key in 1024..2028u64 {
            cache.insert(key, key);
        }

        for key in 100..120u64 {
            assert!(cache.contains(&key), "frequent key {key} was evicted");
        }
        assert!(cache.len() <= cache.capacity());
    }

    #[test]
    fn repeated_scans_do_not_displace_the_working_set() {
        let mut cache = WTinyLfuCache::new(200);
        for key in 0..200u64 {
            cache.insert(key, key);
        }
        // Working set: hit it enough to promote and build frequency.
        for _ in 0..5 {
            for key in 0..40u64 {
                cache.get(&key);
            }
        }

        for scan in 0..3u64 {
            for i in 0..500u64 {
                cache.insert(10_000 + scan * 500 + i, i);
            }
        }

        let survivors = (0..40u64).filter(|key| cache.contains(key)).count();
        assert!(
            survivors >= 36,
            "working set should survive scans, only {survivors}/40 remained"
        );
    }
}

// ==============================================
// Skewed Workload Accounting
// ==============================================

mod accounting {
    use super::*;

    #[test]
    fn hot_keys_dominate_the_hit_count() {
        let mut cache = WTinyLfuCache::new(64);
        // Deterministic skew: key stream where 0..16 recur constantly and
        // the tail is one-shot.
        for round in 0..100u64 {
            for hot in 0..16u64 {
                cache.get_or_insert_with(hot, |k| *k);
            }
            cache.get_or_insert_with(1000 + round, |k| *k);
        }

        let total = cache.hit_count() + cache.miss_count();
        assert_eq!(total, 100 * 17);
        // 16 hot keys fit comfortably in 64 slots: after the first round
        // every hot access is a hit.
        assert!(cache.hit_count() >= 99 * 16);
        for hot in 0..16u64 {
            assert!(cache.contains(&hot));
        }
    }

    #[test]
    fn counters_reset_with_clear() {
        let mut cache = WTinyLfuCache::new(16);
        cache.insert(1u64, 1);
        cache.get(&1);
        cache.get(&2);
        cache.clear();

        assert_eq!(cache.hit_count(), 0);
        assert_eq!(cache.miss_count(), 0);
        assert!(cache.is_empty());
    }
}

// ==============================================
// Loader Path
// ==============================================

mod loader_path {
    use super::*;

    #[test]
    fn loader_backfills_misses_and_serves_hits() {
        let mut cache = WTinyLfuCache::new(32);
        let mut loads = 0u32;

        for _ in 0..3 {
            for key in 0..8u64 {
                let value = cache.get_or_insert_with(key, |k| {
                    loads += 1;
                    format!("value-{k}")
                });
                assert_eq!(*value, format!("value-{key}"));
            }
        }

        assert_eq!(loads, 8, "each key loads exactly once");
        assert_eq!(cache.miss_count(), 8);
        assert_eq!(cache.hit_count(), 16);
    }

    #[test]
    fn failed_loads_are_retried_on_the_next_lookup() {
        let mut cache: WTinyLfuCache<u64, u64> = WTinyLfuCache::new(8);
        let mut attempts = 0u32;

        let first: Result<_, &str> = cache.try_get_or_insert_with(1, |_| {
            attempts += 1;
            Err("transient failure")
        });
        assert!(first.is_err());
        assert!(!cache.contains(&1));

        let second: Result<_, &str> = cache.try_get_or_insert_with(1, |k| {
            attempts += 1;
            Ok(k + 41)
        });
        assert_eq!(*second.unwrap(), 42);
        assert_eq!(attempts, 2);
    }
}

// ==============================================
// Shared Value Handles
// ==============================================

mod shared_handles {
    use super::*;

    #[test]
    fn handles_survive_eviction_of_their_entry() {
        let mut cache = WTinyLfuCache::new(4);
        cache.insert(1u64, String::from("pinned"));
        let handle = cache.get(&1).expect("just inserted");

        // Push enough traffic through to evict key 1.
        for key in 100..200u64 {
            cache.insert(key, format!("filler {key}"));
        }

        assert_eq!(*handle, "pinned");
    }

    #[test]
    fn two_gets_share_one_allocation() {
        let mut cache = WTinyLfuCache::new(8);
        cache.insert(1u64, vec![1, 2, 3]);

        let a = cache.get(&1).expect("present");
        let b = cache.get(&1).expect("present");
        assert!(std::sync::Arc::ptr_eq(&a, &b));
    }
}
