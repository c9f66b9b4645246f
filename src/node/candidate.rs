//! Node candidates and the candidate generator chain
//!
//! A candidate is a proposed child position: a type, a name, and the path step
//! from its parent. Generators enumerate candidates from a type's shape without
//! deciding how any of them will be generated; that is the promoters' job.

use crate::catalog::{bind_params, FieldDef, Shape, TypeCatalog};
use crate::error::{GenerationError, ResolutionError};
use crate::node::path::{NodePath, PathSegment};
use crate::types::TypeDescriptor;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Metadata key naming the discriminator property of a tagged union.
pub const DISCRIMINATOR_PROPERTY: &str = "discriminator.property";
/// Metadata key carrying the chosen discriminator tag.
pub const DISCRIMINATOR_TAG: &str = "discriminator.tag";

/// A proposed child position, not yet bound to a generation strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeCandidate {
    pub ty: TypeDescriptor,
    pub name: Option<String>,
    pub nullable: bool,
    pub metadata: BTreeMap<String, String>,
    /// Step from the parent node; `None` for positions that share the parent's
    /// path (container elements, whose index is added at placement).
    pub segment: Option<PathSegment>,
    /// Full path, filled in when the parent places the candidate.
    pub path: NodePath,
    /// Generation attempt the candidate was placed for.
    pub attempt: u32,
    /// Types already promoted at this path before reaching this type.
    pub trail: Vec<TypeDescriptor>,
}

impl NodeCandidate {
    pub fn new(ty: TypeDescriptor, name: Option<&str>) -> Self {
        Self {
            ty,
            name: name.map(str::to_string),
            nullable: false,
            metadata: BTreeMap::new(),
            segment: None,
            path: NodePath::root(),
            attempt: 0,
            trail: Vec::new(),
        }
    }

    /// Candidate for a named field; its path step is the field name.
    pub fn field(def: &FieldDef, ty: TypeDescriptor) -> Self {
        let mut candidate = Self::new(ty, Some(def.name.as_str()));
        candidate.nullable = def.nullable;
        candidate.segment = Some(PathSegment::Field(Arc::from(def.name.as_str())));
        candidate
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_segment(mut self, segment: PathSegment) -> Self {
        self.segment = Some(segment);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Same position with a different type; name, metadata and placement kept.
    pub fn retyped(&self, ty: TypeDescriptor) -> Self {
        Self {
            ty,
            ..self.clone()
        }
    }

    /// Fix the candidate at a concrete path for a given attempt.
    pub fn placed(&self, path: NodePath, attempt: u32) -> Self {
        Self {
            path,
            attempt,
            ..self.clone()
        }
    }

    /// `next` re-entering the promoter chain at this candidate's position.
    /// The current type is appended to the trail; revisiting any type on it
    /// is a cycle.
    pub fn reentry(&self, next: &NodeCandidate) -> Result<Self, ResolutionError> {
        let mut trail = self.trail.clone();
        trail.push(self.ty.clone());
        if trail.contains(&next.ty) {
            let mut names: Vec<String> = trail.iter().map(ToString::to_string).collect();
            names.push(next.ty.to_string());
            return Err(ResolutionError::PromotionCycle {
                type_name: next.ty.to_string(),
                path: self.path.to_string(),
                trail: names.join(" -> "),
            });
        }
        Ok(Self {
            trail,
            ..next.clone()
        })
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Enumerates the child positions of types of a particular shape.
pub trait CandidateGenerator: Send + Sync {
    /// Whether this generator handles `ty`.
    fn applies(&self, ty: &TypeDescriptor, shape: &Shape<'_>) -> bool;

    /// Child candidates of `ty`, in a stable order. Must be a pure function of
    /// its inputs.
    fn generate_candidates(
        &self,
        ty: &TypeDescriptor,
        shape: &Shape<'_>,
    ) -> Result<Vec<NodeCandidate>, GenerationError>;
}

/// Fields of an object, with generic parameters substituted.
#[derive(Debug, Default)]
pub struct ObjectFieldsGenerator;

impl CandidateGenerator for ObjectFieldsGenerator {
    fn applies(&self, _ty: &TypeDescriptor, shape: &Shape<'_>) -> bool {
        matches!(shape, Shape::Object { .. })
    }

    fn generate_candidates(
        &self,
        ty: &TypeDescriptor,
        shape: &Shape<'_>,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        match shape {
            Shape::Object { params, fields } => named_candidates(ty, params, fields),
            _ => Ok(Vec::new()),
        }
    }
}

/// Components of a record, in declaration order.
#[derive(Debug, Default)]
pub struct RecordComponentsGenerator;

impl CandidateGenerator for RecordComponentsGenerator {
    fn applies(&self, _ty: &TypeDescriptor, shape: &Shape<'_>) -> bool {
        matches!(shape, Shape::Record { .. })
    }

    fn generate_candidates(
        &self,
        ty: &TypeDescriptor,
        shape: &Shape<'_>,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        match shape {
            Shape::Record { params, components } => named_candidates(ty, params, components),
            _ => Ok(Vec::new()),
        }
    }
}

fn named_candidates(
    ty: &TypeDescriptor,
    params: &[String],
    fields: &[FieldDef],
) -> Result<Vec<NodeCandidate>, GenerationError> {
    let bindings = bind_params(params, ty)?;
    let mut seen = std::collections::BTreeSet::new();
    fields
        .iter()
        .map(|field| {
            if !seen.insert(field.name.as_str()) {
                return Err(GenerationError::ConstructionAmbiguity {
                    type_name: ty.to_string(),
                    reason: format!("duplicate field '{}'", field.name),
                });
            }
            Ok(NodeCandidate::field(field, field.ty.substitute(&bindings)))
        })
        .collect()
}

/// Element of a single-element container (`List`, `Set`) or of `Option`.
#[derive(Debug, Default)]
pub struct ElementGenerator;

impl CandidateGenerator for ElementGenerator {
    fn applies(&self, _ty: &TypeDescriptor, shape: &Shape<'_>) -> bool {
        matches!(shape, Shape::Sequence { .. } | Shape::Optional)
    }

    fn generate_candidates(
        &self,
        ty: &TypeDescriptor,
        shape: &Shape<'_>,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        let element = type_arg(ty, 0)?;
        Ok(match shape {
            Shape::Optional => vec![NodeCandidate::new(element, Some("value")).nullable(true)],
            _ => vec![NodeCandidate::new(element, Some("element"))],
        })
    }
}

/// Key and value of a key/value container.
#[derive(Debug, Default)]
pub struct EntryGenerator;

impl CandidateGenerator for EntryGenerator {
    fn applies(&self, _ty: &TypeDescriptor, shape: &Shape<'_>) -> bool {
        matches!(shape, Shape::Mapping)
    }

    fn generate_candidates(
        &self,
        ty: &TypeDescriptor,
        _shape: &Shape<'_>,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        Ok(vec![
            NodeCandidate::new(type_arg(ty, 0)?, Some("key"))
                .with_segment(PathSegment::Field(Arc::from("key"))),
            NodeCandidate::new(type_arg(ty, 1)?, Some("value"))
                .with_segment(PathSegment::Field(Arc::from("value"))),
        ])
    }
}

/// Every slot of a fixed-arity array.
#[derive(Debug, Default)]
pub struct ArrayGenerator;

impl CandidateGenerator for ArrayGenerator {
    fn applies(&self, _ty: &TypeDescriptor, shape: &Shape<'_>) -> bool {
        matches!(shape, Shape::Array(_))
    }

    fn generate_candidates(
        &self,
        ty: &TypeDescriptor,
        shape: &Shape<'_>,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        let len = match shape {
            Shape::Array(len) => *len,
            _ => 0,
        };
        let element = type_arg(ty, 0)?;
        Ok((0..len)
            .map(|i| {
                let name = format!("[{}]", i);
                NodeCandidate::new(element.clone(), Some(name.as_str()))
                    .with_segment(PathSegment::Index(i))
            })
            .collect())
    }
}

/// Terminal types have no children. Abstract types have none either until a
/// promoter replaces them with a concrete type.
#[derive(Debug, Default)]
pub struct TerminalGenerator;

impl CandidateGenerator for TerminalGenerator {
    fn applies(&self, _ty: &TypeDescriptor, shape: &Shape<'_>) -> bool {
        matches!(shape, Shape::Leaf(_) | Shape::Enum(_)) || shape.is_abstract()
    }

    fn generate_candidates(
        &self,
        _ty: &TypeDescriptor,
        _shape: &Shape<'_>,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        Ok(Vec::new())
    }
}

fn type_arg(ty: &TypeDescriptor, index: usize) -> Result<TypeDescriptor, GenerationError> {
    ty.arg(index).cloned().ok_or_else(|| {
        ResolutionError::InvalidTypeExpression {
            expr: ty.to_string(),
            reason: format!("missing type argument {}", index),
        }
        .into()
    })
}

type ShapePredicate = dyn Fn(&TypeDescriptor, &Shape<'_>) -> bool + Send + Sync;
type CandidateFn =
    dyn Fn(&TypeDescriptor, &Shape<'_>) -> Result<Vec<NodeCandidate>, GenerationError> + Send + Sync;

/// Generator assembled from a predicate and a generator function.
pub struct FnCandidateGenerator {
    predicate: Box<ShapePredicate>,
    generate: Box<CandidateFn>,
}

impl FnCandidateGenerator {
    pub fn new<P, G>(predicate: P, generate: G) -> Self
    where
        P: Fn(&TypeDescriptor, &Shape<'_>) -> bool + Send + Sync + 'static,
        G: Fn(&TypeDescriptor, &Shape<'_>) -> Result<Vec<NodeCandidate>, GenerationError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            generate: Box::new(generate),
        }
    }
}

impl CandidateGenerator for FnCandidateGenerator {
    fn applies(&self, ty: &TypeDescriptor, shape: &Shape<'_>) -> bool {
        (self.predicate)(ty, shape)
    }

    fn generate_candidates(
        &self,
        ty: &TypeDescriptor,
        shape: &Shape<'_>,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        (self.generate)(ty, shape)
    }
}

/// Ordered candidate generator chain; the first applicable generator wins.
#[derive(Clone, Default)]
pub struct CandidateGenerators {
    generators: Vec<Arc<dyn CandidateGenerator>>,
}

impl CandidateGenerators {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects, records, element containers, key/value containers, arrays and
    /// terminals, in that order.
    pub fn defaults() -> Self {
        Self::new()
            .push(ObjectFieldsGenerator)
            .push(RecordComponentsGenerator)
            .push(ElementGenerator)
            .push(EntryGenerator)
            .push(ArrayGenerator)
            .push(TerminalGenerator)
    }

    /// Append at the lowest priority.
    pub fn push<G: CandidateGenerator + 'static>(mut self, generator: G) -> Self {
        self.generators.push(Arc::new(generator));
        self
    }

    /// Insert at the highest priority.
    pub fn insert_first<G: CandidateGenerator + 'static>(mut self, generator: G) -> Self {
        self.generators.insert(0, Arc::new(generator));
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Candidates of `ty` from the first applicable generator.
    pub fn generate(
        &self,
        ty: &TypeDescriptor,
        catalog: &TypeCatalog,
    ) -> Result<Vec<NodeCandidate>, GenerationError> {
        let shape = catalog.shape(ty)?;
        let generator = self
            .generators
            .iter()
            .find(|g| g.applies(ty, &shape))
            .ok_or_else(|| ResolutionError::NoCandidateGenerator(ty.to_string()))?;
        generator.generate_candidates(ty, &shape)
    }
}

impl fmt::Debug for CandidateGenerators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateGenerators")
            .field("len", &self.generators.len())
            .finish()
    }
}
