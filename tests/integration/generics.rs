//! Integration tests for generic type bindings

use super::test_utils::{generator, td};
use fixtree::error::GenerationError;
use fixtree::value::Value;

/// Test that type parameters are bound through nested containers
#[test]
fn test_page_of_orders() {
    for seed in 0..8 {
        let page = generator(seed).sample(&td("Page<Order>")).unwrap();
        assert_eq!(page.type_name(), Some("Page<Order>"));
        assert!(matches!(page.field("total"), Some(Value::UInt(_))));
        for item in page.field("items").and_then(Value::as_list).unwrap() {
            assert_eq!(item.type_name(), Some("Order"));
        }
    }
}

/// Test that differently bound instantiations are generated independently
#[test]
fn test_distinct_bindings() {
    let page = generator(2).sample(&td("Page<Page<i32>>")).unwrap();
    for inner in page.field("items").and_then(Value::as_list).unwrap() {
        assert_eq!(inner.type_name(), Some("Page<i32>"));
        for leaf in inner.field("items").and_then(Value::as_list).unwrap() {
            assert!(matches!(leaf, Value::Int(_)));
        }
    }
}

/// Test that a wrong number of type arguments is rejected
#[test]
fn test_arity_mismatch() {
    let err = generator(1).sample(&td("Page<i32, i32>")).unwrap_err();
    assert!(
        matches!(err, GenerationError::ConstructionAmbiguity { .. }),
        "{:?}",
        err
    );
}

/// Test maps, sets, options and fixed arrays together
#[test]
fn test_builtin_containers() {
    let g = generator(6);
    let map = g.sample(&td("Map<string, Line>")).unwrap();
    let keys: Vec<&Value> = map.as_map().unwrap().iter().map(|(k, _)| k).collect();
    for (i, key) in keys.iter().enumerate() {
        assert!(!keys[i + 1..].contains(key), "duplicate key {:?}", key);
    }

    let set = g.sample(&td("Set<bool>")).unwrap();
    assert!(set.as_list().unwrap().len() <= 2);

    let array = g.sample(&td("[u8; 4]")).unwrap();
    assert_eq!(array.as_list().unwrap().len(), 4);

    let option = g.sample(&td("Option<i64>")).unwrap();
    assert!(option.is_null() || option.as_i64().is_some());
}
