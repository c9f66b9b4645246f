//! Type Catalog
//!
//! The neutral description of user types that the engine traverses. A catalog is
//! what an external metadata reader produces; it can also be written by hand in
//! TOML:
//!
//! ```toml
//! [types.Order]
//! kind = "object"
//! fields = [
//!     { name = "id", type = "uuid" },
//!     { name = "lines", type = "List<Line>" },
//!     { name = "note", type = "string", nullable = true },
//! ]
//!
//! [types.Shape]
//! kind = "sealed"
//! permits = ["Circle", "Polygon"]
//! ```
//!
//! Primitives (`bool`, `i32`, `string`, `uuid`, `date`, ...) and the containers
//! `List`, `Set`, `Map`, `Option` and `[T; N]` are built in.

use crate::error::{GenerationError, ResolutionError};
use crate::types::{RawType, TypeDescriptor, LIST, MAP, OPTION, SET};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Terminal value kinds handed to the leaf value producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Unit,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    Uuid,
    Date,
    DateTime,
}

impl LeafKind {
    /// Built-in leaf for a raw type name.
    pub fn from_builtin(name: &str) -> Option<Self> {
        let kind = match name {
            "unit" | "()" => LeafKind::Unit,
            "bool" => LeafKind::Bool,
            "i8" => LeafKind::I8,
            "i16" => LeafKind::I16,
            "i32" => LeafKind::I32,
            "i64" => LeafKind::I64,
            "u8" => LeafKind::U8,
            "u16" => LeafKind::U16,
            "u32" => LeafKind::U32,
            "u64" => LeafKind::U64,
            "f32" => LeafKind::F32,
            "f64" => LeafKind::F64,
            "char" => LeafKind::Char,
            "string" | "String" => LeafKind::String,
            "uuid" => LeafKind::Uuid,
            "date" => LeafKind::Date,
            "datetime" => LeafKind::DateTime,
            _ => return None,
        };
        Some(kind)
    }
}

/// A named, typed position inside an object or record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub nullable: bool,
}

impl FieldDef {
    pub fn new(name: &str, ty: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            ty,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// One alternative of a declared-subtype (tagged union) type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredSubtype {
    pub tag: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

fn default_discriminator() -> String {
    "type".to_string()
}

/// User type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    /// Object with named fields.
    Object {
        #[serde(default)]
        params: Vec<String>,
        #[serde(default)]
        fields: Vec<FieldDef>,
    },
    /// Record-like type assembled positionally from its components.
    Record {
        #[serde(default)]
        params: Vec<String>,
        components: Vec<FieldDef>,
    },
    Enum {
        variants: Vec<String>,
    },
    /// Abstract type resolved by the interface promoter's mapping.
    Interface {
        #[serde(default)]
        implementation: Option<TypeDescriptor>,
    },
    /// Closed hierarchy over its permitted subtypes.
    Sealed {
        #[serde(default)]
        params: Vec<String>,
        permits: Vec<TypeDescriptor>,
    },
    /// Tagged union over declared subtypes.
    Polymorphic {
        #[serde(default = "default_discriminator")]
        property: String,
        #[serde(default)]
        subtypes: Vec<DeclaredSubtype>,
    },
}

/// Structural view of a descriptor, built-in or catalog-defined.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Leaf(LeafKind),
    Enum(&'a [String]),
    Object {
        params: &'a [String],
        fields: &'a [FieldDef],
    },
    Record {
        params: &'a [String],
        components: &'a [FieldDef],
    },
    /// `List<T>` / `Set<T>`.
    Sequence { unique: bool },
    /// `Map<K, V>`.
    Mapping,
    /// `[T; N]`.
    Array(usize),
    /// `Option<T>`.
    Optional,
    Interface(Option<&'a TypeDescriptor>),
    Sealed {
        params: &'a [String],
        permits: &'a [TypeDescriptor],
    },
    Polymorphic {
        property: &'a str,
        subtypes: &'a [DeclaredSubtype],
    },
}

impl<'a> Shape<'a> {
    /// Abstract shapes must be promoted to a concrete type before assembly.
    pub fn is_abstract(&self) -> bool {
        matches!(
            self,
            Shape::Interface(_) | Shape::Sealed { .. } | Shape::Polymorphic { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Shape::Leaf(_) => "leaf",
            Shape::Enum(_) => "enum",
            Shape::Object { .. } => "object",
            Shape::Record { .. } => "record",
            Shape::Sequence { .. } => "sequence",
            Shape::Mapping => "mapping",
            Shape::Array(_) => "array",
            Shape::Optional => "optional",
            Shape::Interface(_) => "interface",
            Shape::Sealed { .. } => "sealed",
            Shape::Polymorphic { .. } => "polymorphic",
        }
    }
}

/// Bind a definition's type parameters to a descriptor's generic arguments.
pub fn bind_params<'a>(
    params: &'a [String],
    ty: &'a TypeDescriptor,
) -> Result<BTreeMap<&'a str, &'a TypeDescriptor>, GenerationError> {
    if params.len() != ty.args().len() {
        return Err(GenerationError::ConstructionAmbiguity {
            type_name: ty.to_string(),
            reason: format!(
                "declares {} type parameter(s) but {} were bound",
                params.len(),
                ty.args().len()
            ),
        });
    }
    Ok(params
        .iter()
        .map(String::as_str)
        .zip(ty.args().iter())
        .collect())
}

/// Catalog of user type definitions keyed by raw type name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeCatalog {
    #[serde(default)]
    types: BTreeMap<String, TypeDef>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style definition.
    pub fn with(mut self, name: &str, def: TypeDef) -> Self {
        self.define(name, def);
        self
    }

    pub fn define(&mut self, name: &str, def: TypeDef) -> &mut Self {
        self.types.insert(name.to_string(), def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, GenerationError> {
        let catalog: TypeCatalog = toml::from_str(source)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, GenerationError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reject definitions that could never be assembled unambiguously.
    pub fn validate(&self) -> Result<(), GenerationError> {
        for (name, def) in &self.types {
            let named: Option<&[FieldDef]> = match def {
                TypeDef::Object { fields, .. } => Some(fields),
                TypeDef::Record { components, .. } => Some(components),
                _ => None,
            };
            if let Some(fields) = named {
                let mut seen = BTreeSet::new();
                for field in fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(GenerationError::ConstructionAmbiguity {
                            type_name: name.clone(),
                            reason: format!("duplicate field '{}'", field.name),
                        });
                    }
                }
            }
            if let TypeDef::Enum { variants } = def {
                if variants.is_empty() {
                    return Err(GenerationError::ConstructionAmbiguity {
                        type_name: name.clone(),
                        reason: "enum declares no variants".to_string(),
                    });
                }
            }
        }
        self.check_abstract_cycles()
    }

    /// An abstract type may not resolve back to itself through permitted
    /// subtypes, declared subtypes or interface implementations.
    fn check_abstract_cycles(&self) -> Result<(), GenerationError> {
        let mut done: BTreeSet<&str> = BTreeSet::new();
        for name in self.types.keys() {
            let mut on_stack = Vec::new();
            self.visit_abstract(name, &mut on_stack, &mut done)?;
        }
        Ok(())
    }

    fn visit_abstract<'a>(
        &'a self,
        name: &'a str,
        on_stack: &mut Vec<&'a str>,
        done: &mut BTreeSet<&'a str>,
    ) -> Result<(), GenerationError> {
        if done.contains(name) {
            return Ok(());
        }
        if on_stack.contains(&name) {
            on_stack.push(name);
            return Err(GenerationError::ConstructionAmbiguity {
                type_name: name.to_string(),
                reason: format!("abstract type cycle: {}", on_stack.join(" -> ")),
            });
        }
        let targets: Vec<&TypeDescriptor> = match self.types.get(name) {
            Some(TypeDef::Sealed { permits, .. }) => permits.iter().collect(),
            Some(TypeDef::Polymorphic { subtypes, .. }) => subtypes.iter().map(|s| &s.ty).collect(),
            Some(TypeDef::Interface {
                implementation: Some(implementation),
            }) => vec![implementation],
            _ => Vec::new(),
        };
        on_stack.push(name);
        for target in targets {
            if let Some(child) = target.name() {
                self.visit_abstract(child, on_stack, done)?;
            }
        }
        on_stack.pop();
        done.insert(name);
        Ok(())
    }

    /// Structural shape of a descriptor.
    pub fn shape<'a>(&'a self, ty: &TypeDescriptor) -> Result<Shape<'a>, ResolutionError> {
        let name = match ty.raw() {
            RawType::Array(len) => {
                expect_arity(ty, 1)?;
                return Ok(Shape::Array(*len));
            }
            RawType::Named(name) => name.as_ref(),
        };

        match name {
            LIST | SET => {
                expect_arity(ty, 1)?;
                return Ok(Shape::Sequence {
                    unique: name == SET,
                });
            }
            MAP => {
                expect_arity(ty, 2)?;
                return Ok(Shape::Mapping);
            }
            OPTION => {
                expect_arity(ty, 1)?;
                return Ok(Shape::Optional);
            }
            _ => {}
        }

        if let Some(kind) = LeafKind::from_builtin(name) {
            return Ok(Shape::Leaf(kind));
        }

        let def = self
            .types
            .get(name)
            .ok_or_else(|| ResolutionError::UnknownType(ty.to_string()))?;
        Ok(match def {
            TypeDef::Object { params, fields } => Shape::Object { params, fields },
            TypeDef::Record { params, components } => Shape::Record { params, components },
            TypeDef::Enum { variants } => Shape::Enum(variants),
            TypeDef::Interface { implementation } => Shape::Interface(implementation.as_ref()),
            TypeDef::Sealed { params, permits } => Shape::Sealed { params, permits },
            TypeDef::Polymorphic { property, subtypes } => Shape::Polymorphic { property, subtypes },
        })
    }
}

fn expect_arity(ty: &TypeDescriptor, arity: usize) -> Result<(), ResolutionError> {
    if ty.args().len() == arity {
        Ok(())
    } else {
        Err(ResolutionError::InvalidTypeExpression {
            expr: ty.to_string(),
            reason: format!("expects {} type argument(s)", arity),
        })
    }
}
