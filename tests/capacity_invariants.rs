// ==============================================
// CAPACITY INVARIANT TESTS (integration)
// ==============================================
//
// Verifies the sizing arithmetic and capacity validation that every other
// behavior depends on: the 1% window floor, the window/main split, and
// trimming after a resize.

use wtinylfu::error::ConfigError;
use wtinylfu::policy::wtinylfu::WTinyLfuCache;

// ==============================================
// Zero-Capacity Behavior
// ==============================================

mod zero_capacity {
    use super::*;

    #[test]
    fn constructor_rejects_zero() {
        let err: ConfigError = WTinyLfuCache::<u64, u64>::try_new(0).unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn resize_rejects_zero_and_changes_nothing() {
        let mut cache: WTinyLfuCache<u64, u64> = WTinyLfuCache::new(8);
        cache.insert(1, 1);

        assert!(cache.change_capacity(0).is_err());
        assert_eq!(cache.capacity(), 8);
        assert!(cache.contains(&1));
    }
}

// ==============================================
// Window Sizing
// ==============================================

mod window_sizing {
    use super::*;

    #[test]
    fn window_gets_one_percent_with_a_floor_of_one() {
        let expectations = [
            (1usize, 1usize),
            (50, 1),
            (100, 1),
            (101, 2),
            (1000, 10),
            (1024, 11),
        ];
        for (total, window) in expectations {
            let cache: WTinyLfuCache<u64, u64> = WTinyLfuCache::new(total);
            assert_eq!(cache.window_capacity(), window, "total {total}");
            assert_eq!(cache.main_capacity(), total - window, "total {total}");
        }
    }

    #[test]
    fn sub_capacities_always_sum_to_the_requested_total() {
        for total in 1..=500usize {
            let cache: WTinyLfuCache<u64, u64> = WTinyLfuCache::new(total);
            assert_eq!(
                cache.window_capacity() + cache.main_capacity(),
                cache.capacity(),
                "total {total}"
            );
            assert_eq!(cache.capacity(), total, "total {total}");
        }
    }
}

// ==============================================
// Resize Behavior
// ==============================================

mod resize {
    use super::*;

    #[test]
    fn occupancy_respects_capacity_after_every_resize() {
        let mut cache = WTinyLfuCache::new(128);
        for key in 0..128u64 {
            cache.insert(key, key);
        }

        for new_capacity in [64usize, 16, 3, 1, 200, 7] {
            cache.change_capacity(new_capacity).unwrap();
            assert_eq!(cache.capacity(), new_capacity);
            assert!(
                cache.len() <= new_capacity,
                "len {} exceeds capacity {new_capacity}",
                cache.len()
            );

            // The cache keeps working at the new size.
            cache.insert(u64::MAX - new_capacity as u64, 0);
            assert!(cache.len() <= new_capacity);
        }
    }

    #[test]
    fn growing_never_drops_entries() {
        let mut cache = WTinyLfuCache::new(16);
        for key in 0..16u64 {
            cache.insert(key, key);
        }
        let before = cache.len();

        cache.change_capacity(1024).unwrap();
        assert_eq!(cache.len(), before);
        for key in 0..16u64 {
            assert!(cache.contains(&key), "key {key} lost during grow");
        }
    }

    #[test]
    fn repeated_shrink_to_one_leaves_at_most_one_entry() {
        let mut cache = WTinyLfuCache::new(64);
        for key in 0..64u64 {
            cache.insert(key, key);
        }
        cache.change_capacity(1).unwrap();
        assert!(cache.len() <= 1);

        cache.insert(999, 999);
        assert!(cache.contains(&999));
        assert_eq!(cache.len(), 1);
    }
}
