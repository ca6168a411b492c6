use salted_bloom_rs::{BloomConfigBuilder, BloomFilter, FilterKey};
use std::sync::Arc;
use std::thread;

// Helper function to create a basic filter for testing
fn create_test_filter(capacity: u64, fpr: f64) -> BloomFilter {
    let config = BloomConfigBuilder::default()
        .capacity(capacity)
        .false_positive_rate(fpr)
        .build()
        .expect("Failed to build test config");

    BloomFilter::new(config).expect("Failed to create test filter")
}

// Helper function to generate consistent test data
fn generate_test_items(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("test_item_{i:06}")).collect()
}

#[cfg(test)]
mod basic_operations_tests {
    use super::*;

    #[test]
    fn test_add_and_contains() {
        let filter = create_test_filter(4, 0.01);

        filter.add("hello");
        filter.add("user");
        filter.add("home");

        assert!(!filter.contains("users"), "never-added key should be absent");
        assert!(filter.contains("user"));
        assert!(filter.contains("hello"));
        assert!(filter.contains("home"));
    }

    #[test]
    fn test_multiple_insertions() {
        let filter = create_test_filter(1000, 0.01);
        let test_items = generate_test_items(10);

        for item in &test_items {
            filter.add(item);
        }

        for item in &test_items {
            assert!(
                filter.contains(item),
                "No false negatives allowed for item: {item}"
            );
        }
    }

    #[test]
    fn test_duplicate_insertions() {
        let filter = create_test_filter(1000, 0.01);

        for _ in 0..5 {
            filter.add("duplicate_item");
        }

        assert!(filter.contains("duplicate_item"));
    }

    #[test]
    fn test_empty_key() {
        let filter = create_test_filter(1000, 0.01);

        filter.add(&b""[..]);
        assert!(filter.contains(&b""[..]));
    }

    #[test]
    fn test_typed_keys() {
        let filter = create_test_filter(1000, 0.01);

        filter.add(12345i64);
        filter.add(300u64);
        filter.add(&b"raw bytes"[..]);

        assert!(filter.contains(12345i64));
        assert!(filter.contains(300u64));
        assert!(filter.contains(&b"raw bytes"[..]));

        // An i64 and a u64 of the same magnitude encode differently, so the
        // signed twin of an added unsigned key stays absent.
        assert!(!filter.contains(300i64));
    }

    #[test]
    fn test_rendered_fallback_keys() {
        #[derive(Debug)]
        struct Endpoint {
            host: &'static str,
            port: u16,
        }

        let filter = create_test_filter(1000, 0.01);
        let endpoint = Endpoint {
            host: "localhost",
            port: 8080,
        };

        filter.add(FilterKey::render(&endpoint));
        assert!(filter.contains(FilterKey::render(&endpoint)));
    }

    #[test]
    fn test_empty_filter_behavior() {
        let filter = create_test_filter(1000, 0.01);

        assert!(!filter.contains("anything"));
        assert!(filter.bit_count() >= 1);
        assert!(filter.hash_rounds() >= 1);
    }
}

#[cfg(test)]
mod behavioral_guarantees_tests {
    use super::*;

    #[test]
    fn test_no_false_negatives_guarantee() {
        let filter = create_test_filter(1000, 0.01);
        let test_items = generate_test_items(100);

        for item in &test_items {
            filter.add(item);
        }

        for (i, item) in test_items.iter().enumerate() {
            assert!(
                filter.contains(item),
                "FALSE NEGATIVE detected for item {i}: {item}"
            );
        }
    }

    #[test]
    fn test_false_positive_rate_measurement() {
        let filter = create_test_filter(1000, 0.00001);

        for i in 0..1000 {
            filter.add(format!("member_{i:04}").as_str());
        }

        // Probe with a disjoint key space. At a 1e-5 design rate even a
        // generous bound of 1% observed is far above expectation.
        let false_positives = (0..1000)
            .filter(|i| filter.contains(format!("stranger_{i:04}").as_str()))
            .count();

        assert!(
            false_positives < 10,
            "False positive rate is too high: {false_positives}/1000"
        );
    }

    #[test]
    fn test_over_capacity_degrades_smoothly() {
        let capacity = 100;
        let filter = create_test_filter(capacity, 0.1);
        let test_items = generate_test_items(capacity as usize * 2);

        for item in &test_items {
            filter.add(item);
        }

        // Past design capacity the false positive rate worsens, but every
        // inserted item is still found.
        for item in &test_items {
            assert!(
                filter.contains(item),
                "item should be found even beyond capacity: {item}"
            );
        }
    }

    #[test]
    fn test_independent_filters_have_independent_salts() {
        // Two filters with identical parameters draw fresh salts, so their
        // dumps differ even with identical contents.
        let a = create_test_filter(1000, 0.01);
        let b = create_test_filter(1000, 0.01);

        let mut dump_a = Vec::new();
        let mut dump_b = Vec::new();
        a.dump(&mut dump_a).expect("dump should succeed");
        b.dump(&mut dump_b).expect("dump should succeed");

        assert_ne!(dump_a, dump_b);
    }
}

#[cfg(test)]
mod copy_tests {
    use super::*;

    #[test]
    fn test_copy_to_matches_source() {
        let src = create_test_filter(1000, 0.01);
        let test_items = generate_test_items(50);
        for item in &test_items {
            src.add(item);
        }

        let dst = create_test_filter(10, 0.5);
        src.copy_to(&dst);

        let mut src_dump = Vec::new();
        let mut dst_dump = Vec::new();
        src.dump(&mut src_dump).expect("dump should succeed");
        dst.dump(&mut dst_dump).expect("dump should succeed");
        assert_eq!(src_dump, dst_dump, "replica dump must be byte-identical");

        for item in &test_items {
            assert_eq!(src.contains(item), dst.contains(item));
            assert!(dst.contains(item));
        }
    }

    #[test]
    fn test_copy_to_replaces_destination_configuration() {
        let src = create_test_filter(1000, 0.01);
        let dst = create_test_filter(10, 0.5);

        src.copy_to(&dst);

        assert_eq!(dst.capacity(), 1000);
        assert_eq!(dst.false_positive_rate(), 0.01);
        assert_eq!(dst.bit_count(), src.bit_count());
        assert_eq!(dst.hash_rounds(), src.hash_rounds());
    }

    #[test]
    fn test_copy_is_deep() {
        let src = create_test_filter(1000, 0.01);
        src.add("shared");

        let dst = create_test_filter(1000, 0.01);
        src.copy_to(&dst);

        dst.add("only_in_copy");
        assert!(dst.contains("only_in_copy"));
        assert!(src.contains("shared"));
    }

    #[test]
    fn test_self_copy_is_noop() {
        let filter = create_test_filter(1000, 0.01);
        filter.add("value");

        filter.copy_to(&filter);
        assert!(filter.contains("value"));
    }
}

#[cfg(test)]
mod thread_safety_tests {
    use super::*;

    #[test]
    fn test_concurrent_adds() {
        let filter = Arc::new(create_test_filter(10_000, 0.01));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    for i in 0..100 {
                        filter.add(format!("thread_{t}_item_{i:03}").as_str());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread should complete");
        }

        for t in 0..8 {
            for i in 0..100 {
                let item = format!("thread_{t}_item_{i:03}");
                assert!(
                    filter.contains(item.as_str()),
                    "item added by thread {t} must be found: {item}"
                );
            }
        }
    }

    #[test]
    fn test_concurrent_reads() {
        let filter = Arc::new(create_test_filter(10_000, 0.01));
        let test_items = generate_test_items(100);

        for item in &test_items {
            filter.add(item);
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let filter = Arc::clone(&filter);
                let items = test_items.clone();
                thread::spawn(move || {
                    for item in &items {
                        assert!(filter.contains(item));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread should complete");
        }
    }

    #[test]
    fn test_mixed_readers_and_writers() {
        let filter = Arc::new(create_test_filter(10_000, 0.01));

        let writer = {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                for i in 0..500 {
                    filter.add(format!("mixed_{i:04}").as_str());
                }
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    // Readers race the writer; the only invariant during the
                    // race is that contains never panics or blocks forever.
                    for i in 0..500 {
                        let _ = filter.contains(format!("mixed_{i:04}").as_str());
                    }
                })
            })
            .collect();

        writer.join().expect("writer should complete");
        for handle in readers {
            handle.join().expect("reader should complete");
        }

        for i in 0..500 {
            assert!(filter.contains(format!("mixed_{i:04}").as_str()));
        }
    }
}
