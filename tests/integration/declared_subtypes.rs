//! Integration tests for tagged unions with declared subtypes

use super::test_utils::{catalog, generator, td};
use fixtree::catalog::DeclaredSubtype;
use fixtree::generation::FixtureGenerator;
use fixtree::node::NodeContext;
use fixtree::resolver::{matchers, DeclaredSubtypeResolver};
use fixtree::value::Value;

fn tag_of(value: &Value) -> &str {
    value.field("kind").and_then(Value::as_str).unwrap()
}

/// Test that each instance carries the discriminator of its concrete subtype
#[test]
fn test_discriminator_matches_subtype() {
    for seed in 0..32 {
        let value = generator(seed).sample(&td("Event")).unwrap();
        match value.type_name() {
            Some("Click") => assert_eq!(tag_of(&value), "click"),
            Some("Scroll") => assert_eq!(tag_of(&value), "scroll"),
            other => panic!("unexpected subtype {:?}", other),
        }
    }
}

/// Test that the discriminator is the leading field
#[test]
fn test_discriminator_leads_fields() {
    let value = generator(3).sample(&td("Event")).unwrap();
    match value {
        Value::Object { fields, .. } => assert_eq!(fields[0].0, "kind"),
        other => panic!("expected object, got {:?}", other),
    }
}

/// Test that an explicit registry overrides the catalog's subtypes
#[test]
fn test_registered_subtypes_override_catalog() {
    let resolver = DeclaredSubtypeResolver::new().register(
        "Event",
        "type",
        vec![DeclaredSubtype {
            tag: "only-scroll".to_string(),
            ty: td("Scroll"),
        }],
    );
    let context = NodeContext::builder(catalog())
        .seed(8)
        .register_resolver(matchers::raw("Event"), resolver)
        .build();
    let value = FixtureGenerator::new(context).sample(&td("Event")).unwrap();
    assert_eq!(value.type_name(), Some("Scroll"));
    assert_eq!(value.field("type").and_then(Value::as_str), Some("only-scroll"));
}
