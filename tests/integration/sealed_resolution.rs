//! Integration tests for sealed hierarchy resolution

use super::test_utils::{catalog, generator, td};
use fixtree::catalog::{TypeCatalog, TypeDef};
use fixtree::error::GenerationError;
use std::collections::BTreeSet;

/// Test that sealed roots resolve to concrete leaves across nested levels
#[test]
fn test_sealed_root_resolves_to_leaves() {
    let mut seen = BTreeSet::new();
    for seed in 0..64 {
        let value = generator(seed).sample(&td("Shape")).unwrap();
        let name = value.type_name().unwrap().to_string();
        assert!(
            ["Circle", "Square", "Triangle"].contains(&name.as_str()),
            "unexpected concrete type {}",
            name
        );
        seen.insert(name);
    }
    // Polygon is sealed itself and never appears as an instance
    assert!(!seen.contains("Polygon"));
    assert_eq!(seen.len(), 3, "every leaf should be reachable: {:?}", seen);
}

/// Test that sealed elements inside containers resolve independently
#[test]
fn test_sealed_elements_in_list() {
    let value = generator(5).sample(&td("List<Shape>")).unwrap();
    for item in value.as_list().unwrap() {
        assert!(item.type_name().is_some());
        assert_ne!(item.type_name(), Some("Shape"));
    }
}

/// Test that a sealed cycle is rejected when the catalog is built
#[test]
fn test_sealed_cycle_rejected() {
    let catalog = TypeCatalog::new()
        .with(
            "A",
            TypeDef::Sealed {
                params: vec![],
                permits: vec![td("B")],
            },
        )
        .with(
            "B",
            TypeDef::Sealed {
                params: vec![],
                permits: vec![td("A")],
            },
        );
    match catalog.validate().unwrap_err() {
        GenerationError::ConstructionAmbiguity { reason, .. } => {
            assert!(reason.contains("abstract type cycle"), "{}", reason);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(super::test_utils::catalog().validate().is_ok());
}
