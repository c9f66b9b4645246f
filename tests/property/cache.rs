//! Property-based tests for the bounded LRU cache

use fixtree::cache::BoundedCache;
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Get(u8),
    Put(u8, u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..16).prop_map(Op::Get),
        (0u8..16, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
    ]
}

/// Test the cache against a simple recency-list model
#[test]
fn test_lru_matches_model() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(1usize..6, prop::collection::vec(op_strategy(), 0..64)),
            |(capacity, ops)| {
                let cache = BoundedCache::new(capacity);
                // Front is most recently used
                let mut model: VecDeque<(u8, u32)> = VecDeque::new();

                for op in ops {
                    match op {
                        Op::Get(key) => {
                            let expected = model.iter().position(|(k, _)| *k == key).map(|i| {
                                let entry = model.remove(i).unwrap();
                                model.push_front(entry);
                                entry.1
                            });
                            prop_assert_eq!(cache.get(&key), expected);
                        }
                        Op::Put(key, value) => {
                            if let Some(i) = model.iter().position(|(k, _)| *k == key) {
                                model.remove(i);
                            }
                            model.push_front((key, value));
                            let evicted = if model.len() > capacity {
                                model.pop_back().map(|(k, _)| k)
                            } else {
                                None
                            };
                            prop_assert_eq!(cache.put(key, value), evicted);
                        }
                    }
                    prop_assert!(cache.len() <= capacity);
                    prop_assert_eq!(cache.len(), model.len());
                }

                let recency: Vec<u8> = model.iter().map(|(k, _)| *k).collect();
                prop_assert_eq!(cache.keys_by_recency(), recency);
                Ok(())
            },
        )
        .unwrap();
}
