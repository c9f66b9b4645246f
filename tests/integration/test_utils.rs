//! Shared catalogs and helpers for integration tests

use fixtree::catalog::TypeCatalog;
use fixtree::generation::FixtureGenerator;
use fixtree::node::NodeContext;
use fixtree::types::TypeDescriptor;

/// Orders, shapes, events and a recursive tree.
pub const SHOP_CATALOG: &str = r#"
[types.Order]
kind = "object"
fields = [
    { name = "id", type = "uuid" },
    { name = "status", type = "Status" },
    { name = "lines", type = "List<Line>" },
    { name = "note", type = "string", nullable = true },
]

[types.Line]
kind = "record"
components = [
    { name = "sku", type = "string" },
    { name = "qty", type = "u16" },
]

[types.Status]
kind = "enum"
variants = ["open", "paid", "shipped"]

[types.Shape]
kind = "sealed"
permits = ["Circle", "Polygon"]

[types.Polygon]
kind = "sealed"
permits = ["Square", "Triangle"]

[types.Circle]
kind = "object"
fields = [{ name = "radius", type = "f64" }]

[types.Square]
kind = "object"
fields = [{ name = "side", type = "f64" }]

[types.Triangle]
kind = "object"
fields = [{ name = "a", type = "f64" }, { name = "b", type = "f64" }, { name = "c", type = "f64" }]

[types.Event]
kind = "polymorphic"
property = "kind"
subtypes = [
    { tag = "click", type = "Click" },
    { tag = "scroll", type = "Scroll" },
]

[types.Click]
kind = "object"
fields = [{ name = "x", type = "i32" }, { name = "y", type = "i32" }]

[types.Scroll]
kind = "object"
fields = [{ name = "delta", type = "i32" }]

[types.Page]
kind = "object"
params = ["T"]
fields = [
    { name = "items", type = "List<T>" },
    { name = "total", type = "u32" },
]

[types.Tree]
kind = "object"
fields = [
    { name = "label", type = "string" },
    { name = "left", type = "Tree", nullable = true },
    { name = "right", type = "Tree", nullable = true },
]

[types.Loop]
kind = "object"
fields = [{ name = "next", type = "Loop" }]
"#;

pub fn catalog() -> TypeCatalog {
    TypeCatalog::from_toml_str(SHOP_CATALOG).unwrap()
}

pub fn td(expr: &str) -> TypeDescriptor {
    TypeDescriptor::parse(expr).unwrap()
}

pub fn generator(seed: u64) -> FixtureGenerator {
    FixtureGenerator::new(NodeContext::builder(catalog()).seed(seed).build())
}
