//! Node promoters
//!
//! A promoter turns a candidate into a concrete `Node`. Promoters form an
//! ordered chain and the first one whose `can_promote` accepts a candidate
//! handles it, so registration order is a priority list.

use crate::catalog::Shape;
use crate::error::{GenerationError, ResolutionError};
use crate::node::candidate::NodeCandidate;
use crate::node::context::NodeContext;
use crate::node::Node;
use crate::types::TypeDescriptor;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Resolver from a candidate to a concrete node.
pub trait NodePromoter: Send + Sync {
    /// Whether this promoter handles `candidate`. Defaults to always.
    fn can_promote(&self, _candidate: &NodeCandidate, _context: &NodeContext) -> bool {
        true
    }

    fn promote(
        &self,
        candidate: &NodeCandidate,
        context: &Arc<NodeContext>,
    ) -> Result<Node, GenerationError>;

    /// Short label for diagnostics.
    fn label(&self) -> &str {
        "custom"
    }
}

/// Lowest-priority fallback: a node of the candidate's own type.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughPromoter;

impl NodePromoter for PassthroughPromoter {
    fn promote(
        &self,
        candidate: &NodeCandidate,
        context: &Arc<NodeContext>,
    ) -> Result<Node, GenerationError> {
        Ok(Node::from_candidate(candidate, candidate.ty.clone(), context))
    }

    fn label(&self) -> &str {
        "passthrough"
    }
}

type InterfaceMapping = dyn Fn(&TypeDescriptor) -> Option<TypeDescriptor> + Send + Sync;

/// Replaces interface-typed candidates with an implementation type.
pub struct InterfacePromoter {
    mapping: Option<Box<InterfaceMapping>>,
}

impl InterfacePromoter {
    /// Map interfaces with a caller-supplied function.
    pub fn new<F>(mapping: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> Option<TypeDescriptor> + Send + Sync + 'static,
    {
        Self {
            mapping: Some(Box::new(mapping)),
        }
    }

    /// Map interfaces to the implementation declared in the catalog.
    pub fn declared() -> Self {
        Self { mapping: None }
    }

    fn implementation(
        &self,
        ty: &TypeDescriptor,
        context: &NodeContext,
    ) -> Result<TypeDescriptor, GenerationError> {
        let mapped = match &self.mapping {
            Some(mapping) => mapping(ty),
            None => match context.catalog().shape(ty)? {
                Shape::Interface(declared) => declared.cloned(),
                _ => None,
            },
        };
        mapped.ok_or_else(|| ResolutionError::NoImplementation(ty.to_string()).into())
    }
}

impl NodePromoter for InterfacePromoter {
    fn can_promote(&self, candidate: &NodeCandidate, context: &NodeContext) -> bool {
        matches!(
            context.catalog().shape(&candidate.ty),
            Ok(Shape::Interface(_))
        )
    }

    fn promote(
        &self,
        candidate: &NodeCandidate,
        context: &Arc<NodeContext>,
    ) -> Result<Node, GenerationError> {
        let implementation = self.implementation(&candidate.ty, context)?;
        trace!(
            path = %candidate.path,
            interface = %candidate.ty,
            implementation = %implementation,
            "Mapped interface to implementation"
        );
        if implementation == candidate.ty {
            return Ok(Node::from_candidate(candidate, implementation, context));
        }
        context.promote(&candidate.reentry(&candidate.retyped(implementation))?)
    }

    fn label(&self) -> &str {
        "interface"
    }
}

type CandidatePredicate = dyn Fn(&NodeCandidate, &NodeContext) -> bool + Send + Sync;
type PromoteFn =
    dyn Fn(&NodeCandidate, &Arc<NodeContext>) -> Result<Node, GenerationError> + Send + Sync;

/// Promoter assembled from a predicate and a handler.
pub struct FnPromoter {
    label: String,
    predicate: Box<CandidatePredicate>,
    promote: Box<PromoteFn>,
}

impl FnPromoter {
    pub fn new<P, F>(label: &str, predicate: P, promote: F) -> Self
    where
        P: Fn(&NodeCandidate, &NodeContext) -> bool + Send + Sync + 'static,
        F: Fn(&NodeCandidate, &Arc<NodeContext>) -> Result<Node, GenerationError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            label: label.to_string(),
            predicate: Box::new(predicate),
            promote: Box::new(promote),
        }
    }
}

impl NodePromoter for FnPromoter {
    fn can_promote(&self, candidate: &NodeCandidate, context: &NodeContext) -> bool {
        (self.predicate)(candidate, context)
    }

    fn promote(
        &self,
        candidate: &NodeCandidate,
        context: &Arc<NodeContext>,
    ) -> Result<Node, GenerationError> {
        (self.promote)(candidate, context)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Ordered promoter chain; the first promoter that accepts a candidate wins.
#[derive(Clone, Default)]
pub struct NodePromoters {
    promoters: Vec<Arc<dyn NodePromoter>>,
}

impl NodePromoters {
    /// An empty chain. Every promotion through it fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the lowest priority.
    pub fn push<P: NodePromoter + 'static>(self, promoter: P) -> Self {
        self.push_shared(Arc::new(promoter))
    }

    pub fn push_shared(mut self, promoter: Arc<dyn NodePromoter>) -> Self {
        self.promoters.push(promoter);
        self
    }

    /// Insert at the highest priority.
    pub fn insert_first<P: NodePromoter + 'static>(mut self, promoter: P) -> Self {
        self.promoters.insert(0, Arc::new(promoter));
        self
    }

    pub fn len(&self) -> usize {
        self.promoters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promoters.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.promoters.iter().map(|p| p.label()).collect()
    }

    /// Promote through the first accepting promoter.
    pub fn promote(
        &self,
        candidate: &NodeCandidate,
        context: &Arc<NodeContext>,
    ) -> Result<Node, GenerationError> {
        let promoter = self
            .promoters
            .iter()
            .find(|p| p.can_promote(candidate, context))
            .ok_or_else(|| ResolutionError::NoPromoter {
                type_name: candidate.ty.to_string(),
                name: candidate.display_name().to_string(),
            })?;
        trace!(
            path = %candidate.path,
            ty = %candidate.ty,
            promoter = promoter.label(),
            "Promoting candidate"
        );
        promoter.promote(candidate, context)
    }
}

impl fmt::Debug for NodePromoters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.labels()).finish()
    }
}
