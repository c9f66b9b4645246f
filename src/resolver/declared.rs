//! Declared-subtype (tagged union) resolution.

use crate::catalog::{DeclaredSubtype, Shape};
use crate::error::{GenerationError, ResolutionError};
use crate::node::{NodeCandidate, NodeContext, DISCRIMINATOR_PROPERTY, DISCRIMINATOR_TAG};
use crate::resolver::ConcreteTypeResolver;
use crate::seed::Decision;
use crate::types::TypeDescriptor;
use rand::Rng;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct SubtypeRegistry {
    property: String,
    subtypes: Vec<DeclaredSubtype>,
}

/// Picks one declared subtype of a polymorphic position.
///
/// The chosen candidate keeps the position's name and carries the
/// discriminator property and tag as metadata, so assembly can emit the tag.
#[derive(Debug, Clone, Default)]
pub struct DeclaredSubtypeResolver {
    registry: BTreeMap<String, SubtypeRegistry>,
    catalog_fallback: bool,
}

impl DeclaredSubtypeResolver {
    /// Resolver backed only by explicitly registered subtypes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that falls back to the catalog's polymorphic definitions.
    pub fn from_catalog() -> Self {
        Self {
            registry: BTreeMap::new(),
            catalog_fallback: true,
        }
    }

    /// Register the subtypes of `raw_name`, discriminated by `property`.
    pub fn register(mut self, raw_name: &str, property: &str, subtypes: Vec<DeclaredSubtype>) -> Self {
        self.registry.insert(
            raw_name.to_string(),
            SubtypeRegistry {
                property: property.to_string(),
                subtypes,
            },
        );
        self
    }

    fn lookup<'a>(
        &'a self,
        ty: &TypeDescriptor,
        context: &'a NodeContext,
    ) -> Result<(&'a str, &'a [DeclaredSubtype]), ResolutionError> {
        if let Some(registry) = ty.name().and_then(|name| self.registry.get(name)) {
            return Ok((registry.property.as_str(), registry.subtypes.as_slice()));
        }
        if self.catalog_fallback {
            if let Ok(Shape::Polymorphic { property, subtypes }) = context.shape(ty) {
                return Ok((property, subtypes));
            }
        }
        Err(ResolutionError::MissingSubtypeRegistry(ty.to_string()))
    }
}

impl ConcreteTypeResolver for DeclaredSubtypeResolver {
    fn resolve(
        &self,
        candidate: &NodeCandidate,
        context: &NodeContext,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        let (property, subtypes) = self.lookup(&candidate.ty, context)?;
        if subtypes.is_empty() {
            return Err(ResolutionError::EmptySubtypeRegistry(candidate.ty.to_string()).into());
        }

        let mut rng = context.rng(candidate.attempt, &candidate.path, Decision::Subtype);
        let chosen = &subtypes[rng.gen_range(0..subtypes.len())];

        Ok(vec![candidate
            .retyped(chosen.ty.clone())
            .with_metadata(DISCRIMINATOR_PROPERTY, property)
            .with_metadata(DISCRIMINATOR_TAG, &chosen.tag)])
    }
}
