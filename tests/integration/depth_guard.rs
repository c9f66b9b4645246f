//! Integration tests for the recursion depth guard

use super::test_utils::{catalog, td};
use fixtree::error::GenerationError;
use fixtree::generation::FixtureGenerator;
use fixtree::node::NodeContext;
use fixtree::value::Value;

fn generator(seed: u64, max_depth: usize) -> FixtureGenerator {
    FixtureGenerator::new(
        NodeContext::builder(catalog())
            .seed(seed)
            .max_depth(max_depth)
            .null_inject(0.0)
            .build(),
    )
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Object { fields, .. } => 1 + fields.iter().map(|(_, v)| depth(v)).max().unwrap_or(0),
        _ => 0,
    }
}

/// Test that nullable recursion terminates in nulls at the limit
#[test]
fn test_nullable_recursion_bottoms_out() {
    let tree = generator(1, 2).sample(&td("Tree")).unwrap();
    assert_eq!(depth(&tree), 2);
    let left = tree.field("left").unwrap();
    assert!(left.field("left").unwrap().is_null());
    assert!(left.field("right").unwrap().is_null());
}

/// Test that mandatory recursion exhausts the retry budget
#[test]
fn test_mandatory_recursion_exhausts() {
    let err = generator(1, 5)
        .with_retry_budget(3)
        .sample_valid(&td("Loop"))
        .unwrap_err();
    match err {
        GenerationError::RetryExhausted { attempts, failure } => {
            assert_eq!(attempts, 3);
            assert!(failure.violated_paths.contains("$.next.next.next.next.next"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Test that containers are empty at the limit instead of failing
#[test]
fn test_containers_empty_at_limit() {
    let orders = generator(2, 1).sample(&td("List<List<i32>>")).unwrap();
    for inner in orders.as_list().unwrap() {
        assert!(inner.as_list().unwrap().is_empty());
    }
}
