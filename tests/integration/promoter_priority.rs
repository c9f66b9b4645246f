//! Integration tests for promoter and resolver ordering

use super::test_utils::{catalog, generator, td};
use fixtree::catalog::{DeclaredSubtype, FieldDef, TypeCatalog, TypeDef};
use fixtree::error::{GenerationError, ResolutionError};
use fixtree::generation::FixtureGenerator;
use fixtree::node::{
    FnPromoter, Node, NodeCandidate, NodeContext, NodePromoters, PassthroughPromoter,
};
use fixtree::resolver::{matchers, ConcreteTypeResolver};
use fixtree::value::Value;

fn zoo() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            "Animal",
            TypeDef::Interface {
                implementation: Some(td("Cat")),
            },
        )
        .with(
            "Cat",
            TypeDef::Object {
                params: vec![],
                fields: vec![FieldDef::new("lives", td("u8"))],
            },
        )
        .with(
            "Dog",
            TypeDef::Object {
                params: vec![],
                fields: vec![FieldDef::new("good", td("bool"))],
            },
        )
        .with(
            "Pen",
            TypeDef::Object {
                params: vec![],
                fields: vec![FieldDef::new("animal", td("Animal"))],
            },
        )
}

struct AlwaysDog;

impl ConcreteTypeResolver for AlwaysDog {
    fn resolve(
        &self,
        candidate: &NodeCandidate,
        _context: &NodeContext,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        Ok(vec![candidate.retyped(td("Dog"))])
    }
}

fn qty_as_string() -> FnPromoter {
    FnPromoter::new(
        "qty-as-string",
        |candidate, _| candidate.name.as_deref() == Some("qty"),
        |candidate, context| Ok(Node::from_candidate(candidate, td("string"), context)),
    )
}

fn animal_of(context: std::sync::Arc<NodeContext>) -> Value {
    let pen = FixtureGenerator::new(context).sample(&td("Pen")).unwrap();
    pen.field("animal").cloned().unwrap()
}

/// Test that a promoter inserted first takes precedence over the defaults
#[test]
fn test_front_promoter_wins() {
    let context = NodeContext::builder(catalog())
        .seed(4)
        .insert_promoter_first(qty_as_string())
        .build();
    assert_eq!(context.promoters().labels()[0], "qty-as-string");

    let line = FixtureGenerator::new(context).sample(&td("Line")).unwrap();
    assert!(matches!(line.field("qty"), Some(Value::Str(_))));
    assert!(matches!(
        generator(4).sample(&td("Line")).unwrap().field("qty"),
        Some(Value::UInt(_))
    ));
}

/// Test that a promoter pushed last never sees candidates the passthrough accepts
#[test]
fn test_back_promoter_is_shadowed() {
    let context = NodeContext::builder(catalog())
        .seed(4)
        .push_promoter(qty_as_string())
        .build();
    assert_eq!(
        context.promoters().labels(),
        vec!["concrete", "interface", "passthrough", "qty-as-string"]
    );
    let line = FixtureGenerator::new(context).sample(&td("Line")).unwrap();
    assert_eq!(line, generator(4).sample(&td("Line")).unwrap());
}

/// Test the interface mapping precedence: resolver, then mapping, then catalog
#[test]
fn test_interface_resolution_order() {
    let declared = NodeContext::builder(zoo()).seed(1).build();
    assert_eq!(animal_of(declared).type_name(), Some("Cat"));

    let mapped = NodeContext::builder(zoo())
        .seed(1)
        .interface_mapping(|_| Some(td("Dog")))
        .build();
    assert_eq!(animal_of(mapped).type_name(), Some("Dog"));

    let resolved = NodeContext::builder(zoo())
        .seed(1)
        .interface_mapping(|_| Some(td("Cat")))
        .register_resolver(matchers::raw("Animal"), AlwaysDog)
        .build();
    assert_eq!(animal_of(resolved).type_name(), Some("Dog"));
}

/// Test that an interface without an implementation is a resolution error
#[test]
fn test_unmapped_interface_fails() {
    let context = NodeContext::builder(zoo())
        .seed(1)
        .interface_mapping(|_| None)
        .build();
    let err = FixtureGenerator::new(context)
        .sample_valid(&td("Pen"))
        .unwrap_err();
    assert!(matches!(err, GenerationError::Resolution(_)), "{:?}", err);
}

/// Test that the first accepting promoter of an explicit chain handles a candidate
#[test]
fn test_explicit_chain_first_match_wins() {
    let never = FnPromoter::new(
        "never",
        |_, _| false,
        |candidate, _| {
            Err(GenerationError::ConstructionAmbiguity {
                type_name: candidate.ty.to_string(),
                reason: "never promotes".to_string(),
            })
        },
    );
    let animal = FnPromoter::new(
        "animal",
        |candidate, _| candidate.ty == td("Animal"),
        |candidate, context| Ok(Node::from_candidate(candidate, td("Dog"), context)),
    );
    let chain = NodePromoters::new()
        .push(never)
        .push(animal)
        .push(PassthroughPromoter);
    let context = NodeContext::builder(zoo()).seed(2).promoters(chain).build();
    assert_eq!(
        context.promoters().labels(),
        vec!["never", "animal", "passthrough"]
    );

    let pen = FixtureGenerator::new(context).sample(&td("Pen")).unwrap();
    assert_eq!(pen.type_name(), Some("Pen"));
    let animal = pen.field("animal").unwrap();
    assert_eq!(animal.type_name(), Some("Dog"));
    assert!(matches!(animal.field("good"), Some(Value::Bool(_))));
}

/// Test that an interface implemented by a sealed type resolves to a leaf
#[test]
fn test_interface_mapped_to_sealed_type() {
    let catalog = zoo()
        .with(
            "Animal",
            TypeDef::Interface {
                implementation: Some(td("Pet")),
            },
        )
        .with(
            "Pet",
            TypeDef::Sealed {
                params: vec![],
                permits: vec![td("Dog"), td("Cat")],
            },
        );
    assert!(catalog.validate().is_ok());

    let mut seen = std::collections::BTreeSet::new();
    for seed in 0..32 {
        let context = NodeContext::builder(catalog.clone()).seed(seed).build();
        let value = FixtureGenerator::new(context).sample(&td("Animal")).unwrap();
        let name = value.type_name().unwrap().to_string();
        assert!(name == "Dog" || name == "Cat", "unexpected type {}", name);
        seen.insert(name);
    }
    assert_eq!(seen.len(), 2, "{:?}", seen);
}

/// Test that promotion which keeps revisiting a type at one path fails cleanly
#[test]
fn test_promotion_cycle_is_resolution_error() {
    // Built without validation so the cycle reaches sampling.
    let tagged = TypeCatalog::new()
        .with(
            "S",
            TypeDef::Sealed {
                params: vec![],
                permits: vec![td("P")],
            },
        )
        .with(
            "P",
            TypeDef::Polymorphic {
                property: "type".to_string(),
                subtypes: vec![DeclaredSubtype {
                    tag: "s".to_string(),
                    ty: td("S"),
                }],
            },
        );
    assert!(tagged.validate().is_err());
    let err = FixtureGenerator::new(NodeContext::builder(tagged).seed(1).build())
        .sample(&td("S"))
        .unwrap_err();
    match err {
        GenerationError::Resolution(ResolutionError::PromotionCycle { type_name, path, trail }) => {
            assert_eq!(type_name, "S");
            assert_eq!(path, "$");
            assert_eq!(trail, "S -> P -> S");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let mapped = TypeCatalog::new()
        .with(
            "Animal",
            TypeDef::Interface {
                implementation: Some(td("Pet")),
            },
        )
        .with(
            "Pet",
            TypeDef::Sealed {
                params: vec![],
                permits: vec![td("Animal")],
            },
        );
    let err = FixtureGenerator::new(NodeContext::builder(mapped).seed(1).build())
        .sample_valid(&td("Animal"))
        .unwrap_err();
    assert!(
        matches!(
            err,
            GenerationError::Resolution(ResolutionError::PromotionCycle { .. })
        ),
        "{:?}",
        err
    );
}
