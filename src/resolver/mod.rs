//! Concrete type resolution
//!
//! Abstract positions (sealed hierarchies, tagged unions, or anything a caller
//! registers a matcher for) are replaced by one concrete candidate before they
//! are expanded. Resolvers enumerate the concrete options; the promoter picks
//! one with the position's seed and sends it back through the promoter chain.

pub mod declared;
pub mod sealed;

pub use declared::DeclaredSubtypeResolver;
pub use sealed::SealedResolver;

use crate::catalog::Shape;
use crate::error::GenerationError;
use crate::node::{Node, NodeCandidate, NodeContext, NodePromoter};
use crate::seed::Decision;
use crate::types::TypeDescriptor;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Predicate selecting the types a resolver is responsible for.
pub type TypeMatcher = Arc<dyn Fn(&TypeDescriptor, &Shape<'_>) -> bool + Send + Sync>;

/// Wrap a closure as a [`TypeMatcher`].
pub fn matcher<F>(predicate: F) -> TypeMatcher
where
    F: Fn(&TypeDescriptor, &Shape<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(predicate)
}

/// Common matchers.
pub mod matchers {
    use super::{matcher, TypeMatcher};
    use crate::catalog::Shape;

    /// Sealed hierarchies declared in the catalog.
    pub fn sealed() -> TypeMatcher {
        matcher(|_, shape| matches!(shape, Shape::Sealed { .. }))
    }

    /// Tagged unions declared in the catalog.
    pub fn polymorphic() -> TypeMatcher {
        matcher(|_, shape| matches!(shape, Shape::Polymorphic { .. }))
    }

    /// Any descriptor with the given raw type name, whatever its bindings.
    pub fn raw(name: &str) -> TypeMatcher {
        let name = name.to_string();
        matcher(move |ty, _| ty.name() == Some(name.as_str()))
    }
}

/// Enumerates the concrete candidates that may stand in for a candidate.
pub trait ConcreteTypeResolver: Send + Sync {
    /// Concrete candidates for `candidate`'s position. Each keeps the
    /// position's name, nullability and placement.
    fn resolve(
        &self,
        candidate: &NodeCandidate,
        context: &NodeContext,
    ) -> Result<Vec<NodeCandidate>, GenerationError>;
}

/// Promoter that consults registered `(matcher, resolver)` pairs in order.
#[derive(Clone, Default)]
pub struct ConcreteTypePromoter {
    resolvers: Vec<(TypeMatcher, Arc<dyn ConcreteTypeResolver>)>,
}

impl ConcreteTypePromoter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sealed hierarchies and catalog tagged unions.
    pub fn with_defaults(cache_capacity: usize) -> Self {
        Self::new()
            .push(matchers::sealed(), SealedResolver::new(cache_capacity))
            .push(matchers::polymorphic(), DeclaredSubtypeResolver::from_catalog())
    }

    pub fn push<R: ConcreteTypeResolver + 'static>(mut self, matcher: TypeMatcher, resolver: R) -> Self {
        self.resolvers.push((matcher, Arc::new(resolver)));
        self
    }

    pub fn insert_first_shared(
        mut self,
        matcher: TypeMatcher,
        resolver: Arc<dyn ConcreteTypeResolver>,
    ) -> Self {
        self.resolvers.insert(0, (matcher, resolver));
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    fn find(
        &self,
        candidate: &NodeCandidate,
        context: &NodeContext,
    ) -> Option<&Arc<dyn ConcreteTypeResolver>> {
        let shape = context.shape(&candidate.ty).ok()?;
        self.resolvers
            .iter()
            .find(|(matches, _)| matches(&candidate.ty, &shape))
            .map(|(_, resolver)| resolver)
    }
}

impl NodePromoter for ConcreteTypePromoter {
    fn can_promote(&self, candidate: &NodeCandidate, context: &NodeContext) -> bool {
        self.find(candidate, context).is_some()
    }

    fn promote(
        &self,
        candidate: &NodeCandidate,
        context: &Arc<NodeContext>,
    ) -> Result<Node, GenerationError> {
        let resolver = self
            .find(candidate, context)
            .ok_or_else(|| GenerationError::ConstructionAmbiguity {
                type_name: candidate.ty.to_string(),
                reason: "no concrete type resolver matches".to_string(),
            })?;

        let options = resolver.resolve(candidate, context)?;
        let chosen = match options.len() {
            0 => {
                return Err(GenerationError::ConstructionAmbiguity {
                    type_name: candidate.ty.to_string(),
                    reason: "resolver produced no concrete type".to_string(),
                })
            }
            1 => &options[0],
            len => {
                let mut rng = context.rng(candidate.attempt, &candidate.path, Decision::Subtype);
                &options[rng.gen_range(0..len)]
            }
        };

        debug!(
            path = %candidate.path,
            from = %candidate.ty,
            to = %chosen.ty,
            options = options.len(),
            "Resolved concrete type"
        );

        if chosen.ty == candidate.ty {
            Ok(Node::from_candidate(chosen, chosen.ty.clone(), context))
        } else {
            context.promote(&candidate.reentry(chosen)?)
        }
    }

    fn label(&self) -> &str {
        "concrete"
    }
}
