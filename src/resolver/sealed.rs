//! Sealed hierarchy resolution.

use crate::cache::BoundedCache;
use crate::catalog::{bind_params, Shape, TypeCatalog};
use crate::error::{GenerationError, ResolutionError};
use crate::node::{NodeCandidate, NodeContext};
use crate::resolver::ConcreteTypeResolver;
use crate::types::TypeDescriptor;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Resolves a sealed type to the set of concrete types reachable through its
/// permitted subtypes. Nested sealed types are flattened; only leaves are kept.
///
/// Resolutions are memoized per root descriptor.
pub struct SealedResolver {
    cache: BoundedCache<TypeDescriptor, Arc<BTreeSet<TypeDescriptor>>>,
}

impl SealedResolver {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    /// Concrete leaves of `ty`, in descriptor order.
    pub fn resolve_types(
        &self,
        ty: &TypeDescriptor,
        catalog: &TypeCatalog,
    ) -> Result<Arc<BTreeSet<TypeDescriptor>>, GenerationError> {
        self.cache.get_or_try_insert_with(ty.clone(), || {
            let mut leaves = BTreeSet::new();
            let mut visited = BTreeSet::new();
            collect_leaves(ty, catalog, &mut leaves, &mut visited)?;
            if leaves.is_empty() {
                return Err(ResolutionError::EmptySealedHierarchy(ty.to_string()).into());
            }
            debug!(sealed = %ty, leaves = leaves.len(), "Resolved sealed hierarchy");
            Ok(Arc::new(leaves))
        })
    }

    /// Each concrete leaf of `ty` paired with its own candidates.
    pub fn expand(
        &self,
        ty: &TypeDescriptor,
        context: &NodeContext,
    ) -> Result<Vec<(TypeDescriptor, Arc<[NodeCandidate]>)>, GenerationError> {
        self.resolve_types(ty, context.catalog())?
            .iter()
            .map(|leaf| Ok((leaf.clone(), context.candidates(leaf)?)))
            .collect()
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn collect_leaves(
    ty: &TypeDescriptor,
    catalog: &TypeCatalog,
    leaves: &mut BTreeSet<TypeDescriptor>,
    visited: &mut BTreeSet<TypeDescriptor>,
) -> Result<(), GenerationError> {
    if !visited.insert(ty.clone()) {
        return Ok(());
    }
    match catalog.shape(ty)? {
        Shape::Sealed { params, permits } => {
            let bindings = bind_params(params, ty)?;
            for permit in permits {
                collect_leaves(&permit.substitute(&bindings), catalog, leaves, visited)?;
            }
        }
        _ => {
            leaves.insert(ty.clone());
        }
    }
    Ok(())
}

impl ConcreteTypeResolver for SealedResolver {
    fn resolve(
        &self,
        candidate: &NodeCandidate,
        context: &NodeContext,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        Ok(self
            .resolve_types(&candidate.ty, context.catalog())?
            .iter()
            .map(|leaf| candidate.retyped(leaf.clone()))
            .collect())
    }
}
