//! Node graph
//!
//! A `Node` is one position in the instance tree: a concrete type, the name it
//! was reached under and the shared context. Children are never stored. Every
//! call to [`Node::children`] regenerates candidates (memoized by type) and
//! re-runs promotion, so a later attempt can choose different subtypes and
//! container sizes from the same root.

pub mod candidate;
pub mod context;
pub mod path;
pub mod promoter;

pub use candidate::{
    CandidateGenerator, CandidateGenerators, FnCandidateGenerator, NodeCandidate,
    DISCRIMINATOR_PROPERTY, DISCRIMINATOR_TAG,
};
pub use context::{NodeContext, NodeContextBuilder};
pub use path::{NodePath, PathSegment};
pub use promoter::{FnPromoter, InterfacePromoter, NodePromoter, NodePromoters, PassthroughPromoter};

use crate::catalog::Shape;
use crate::error::{GenerationError, ResolutionError};
use crate::seed::Decision;
use crate::types::TypeDescriptor;
use crate::value::Value;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{instrument, trace};

/// A concrete position in the instance tree.
#[derive(Debug, Clone)]
pub struct Node {
    ty: TypeDescriptor,
    name: Option<String>,
    path: NodePath,
    nullable: bool,
    metadata: BTreeMap<String, String>,
    attempt: u32,
    context: Arc<NodeContext>,
}

impl Node {
    /// Root node of `ty` for attempt 0.
    pub fn root(ty: TypeDescriptor, context: Arc<NodeContext>) -> Self {
        Self {
            ty,
            name: None,
            path: NodePath::root(),
            nullable: false,
            metadata: BTreeMap::new(),
            attempt: 0,
            context,
        }
    }

    /// Node of type `ty` occupying the candidate's position.
    pub fn from_candidate(
        candidate: &NodeCandidate,
        ty: TypeDescriptor,
        context: &Arc<NodeContext>,
    ) -> Self {
        Self {
            ty,
            name: candidate.name.clone(),
            path: candidate.path.clone(),
            nullable: candidate.nullable,
            metadata: candidate.metadata.clone(),
            attempt: candidate.attempt,
            context: Arc::clone(context),
        }
    }

    /// The same position for a different attempt.
    pub fn at_attempt(&self, attempt: u32) -> Self {
        Self {
            attempt,
            ..self.clone()
        }
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn context(&self) -> &Arc<NodeContext> {
        &self.context
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    fn at_depth_limit(&self) -> bool {
        self.depth() >= self.context.max_depth()
    }

    fn rng(&self, decision: Decision) -> ChaCha8Rng {
        self.context.rng(self.attempt, &self.path, decision)
    }

    /// Element count for this attempt. Zero at the depth limit.
    pub fn container_size(&self) -> usize {
        if self.at_depth_limit() {
            return 0;
        }
        let seed = self
            .context
            .derive_seed(self.attempt, &self.path, Decision::Size);
        self.context.size_resolver().resolve_size(&self.ty, seed)
    }

    /// Concrete children for this attempt, freshly promoted.
    ///
    /// Containers repeat their candidates once per element, each element at
    /// `path[i]`. Other shapes place each candidate once.
    pub fn children(&self) -> Result<Vec<Node>, GenerationError> {
        let shape = self.context.shape(&self.ty)?;
        let candidates = self.context.candidates(&self.ty)?;

        if matches!(shape, Shape::Mapping) && candidates.len() != 2 {
            return Err(GenerationError::ConstructionAmbiguity {
                type_name: self.ty.to_string(),
                reason: format!(
                    "map entries need a key and a value candidate, got {}",
                    candidates.len()
                ),
            });
        }

        match shape {
            Shape::Sequence { .. } | Shape::Mapping => {
                let size = self.container_size();
                let mut children = Vec::with_capacity(size * candidates.len());
                for index in 0..size {
                    let element = self.path.index(index);
                    for candidate in candidates.iter() {
                        children.push(self.place(candidate, &element)?);
                    }
                }
                Ok(children)
            }
            _ => candidates
                .iter()
                .map(|candidate| self.place(candidate, &self.path))
                .collect(),
        }
    }

    fn place(&self, candidate: &NodeCandidate, base: &NodePath) -> Result<Node, GenerationError> {
        let path = match &candidate.segment {
            Some(segment) => base.join(segment.clone()),
            None => base.clone(),
        };
        self.context.promote(&candidate.placed(path, self.attempt))
    }

    /// Sample this node and its subtree, assembling bottom-up.
    #[instrument(level = "trace", skip(self), fields(path = %self.path, ty = %self.ty))]
    pub fn sample(&self) -> Result<Value, GenerationError> {
        if self.nullable
            && (self.at_depth_limit()
                || self
                    .rng(Decision::Null)
                    .gen_bool(self.context.null_inject()))
        {
            trace!(path = %self.path, "Injected null");
            return Ok(Value::Null);
        }

        match self.context.shape(&self.ty)? {
            Shape::Leaf(kind) => {
                let mut rng = self.rng(Decision::Leaf);
                self.context
                    .leaf_producer()
                    .produce(&self.ty, kind, &self.path, &mut rng)
            }
            Shape::Enum(variants) => {
                if variants.is_empty() {
                    return Err(GenerationError::ConstructionAmbiguity {
                        type_name: self.ty.to_string(),
                        reason: "enum declares no variants".to_string(),
                    });
                }
                let pick = self.rng(Decision::Leaf).gen_range(0..variants.len());
                Ok(Value::Str(variants[pick].clone()))
            }
            Shape::Object { .. } | Shape::Record { .. } => self.sample_object(),
            Shape::Sequence { unique } => {
                let mut items = Vec::new();
                for child in self.children()? {
                    let item = child.sample()?;
                    if !unique || !items.contains(&item) {
                        items.push(item);
                    }
                }
                Ok(Value::List(items))
            }
            Shape::Mapping => {
                let children = self.children()?;
                let mut entries: Vec<(Value, Value)> = Vec::with_capacity(children.len() / 2);
                for pair in children.chunks_exact(2) {
                    let key = pair[0].sample()?;
                    if entries.iter().any(|(existing, _)| *existing == key) {
                        continue;
                    }
                    entries.push((key, pair[1].sample()?));
                }
                Ok(Value::Map(entries))
            }
            Shape::Array(len) => {
                if len > 0 && self.at_depth_limit() {
                    return Err(self.recursion_limit());
                }
                let items = self
                    .children()?
                    .iter()
                    .map(Node::sample)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(items))
            }
            Shape::Optional => match self.children()?.first() {
                Some(child) => child.sample(),
                None => Ok(Value::Null),
            },
            Shape::Interface(_) | Shape::Sealed { .. } | Shape::Polymorphic { .. } => {
                Err(ResolutionError::UnresolvedAbstract {
                    type_name: self.ty.to_string(),
                    path: self.path.to_string(),
                }
                .into())
            }
        }
    }

    fn sample_object(&self) -> Result<Value, GenerationError> {
        if self.at_depth_limit() {
            return Err(self.recursion_limit());
        }

        let mut fields = Vec::new();
        for child in self.children()? {
            let name = child.name().unwrap_or_default().to_string();
            fields.push((name, child.sample()?));
        }

        // Tagged-union subtypes carry their tag as a leading field
        if let (Some(property), Some(tag)) = (
            self.metadata.get(DISCRIMINATOR_PROPERTY),
            self.metadata.get(DISCRIMINATOR_TAG),
        ) {
            if !fields.iter().any(|(name, _)| name == property) {
                fields.insert(0, (property.clone(), Value::Str(tag.clone())));
            }
        }

        Ok(Value::Object {
            type_name: self.ty.to_string(),
            fields,
        })
    }

    fn recursion_limit(&self) -> GenerationError {
        GenerationError::RecursionLimit {
            type_name: self.ty.to_string(),
            path: self.path.to_string(),
            max_depth: self.context.max_depth(),
        }
    }
}
