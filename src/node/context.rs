//! Node Context
//!
//! Immutable traversal configuration shared by reference across a whole node
//! tree: the session seed, the ordered promoter and candidate generator chains,
//! the type catalog, the external value collaborators and the shared candidate
//! cache. Nothing here changes after `build()`.

use crate::cache::BoundedCache;
use crate::catalog::{Shape, TypeCatalog};
use crate::error::{GenerationError, ResolutionError};
use crate::leaf::{ContainerSizeResolver, LeafValueProducer, RangeSizeResolver, SeededLeafProducer};
use crate::node::candidate::{CandidateGenerator, CandidateGenerators, NodeCandidate};
use crate::node::path::NodePath;
use crate::node::promoter::{InterfacePromoter, NodePromoter, NodePromoters, PassthroughPromoter};
use crate::node::Node;
use crate::resolver::{ConcreteTypePromoter, ConcreteTypeResolver, TypeMatcher};
use crate::seed::{self, Decision};
use crate::types::TypeDescriptor;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_NULL_INJECT: f64 = 0.2;
pub const DEFAULT_MAX_DEPTH: usize = 16;
pub const DEFAULT_CACHE_CAPACITY: usize = 2048;

/// Shared memo of candidate lists keyed by type.
pub type CandidateCache = BoundedCache<TypeDescriptor, Arc<[NodeCandidate]>>;

/// Immutable, shared traversal context.
#[derive(Clone)]
pub struct NodeContext {
    seed: u64,
    promoters: NodePromoters,
    candidate_generators: CandidateGenerators,
    catalog: Arc<TypeCatalog>,
    sizes: Arc<dyn ContainerSizeResolver>,
    leaves: Arc<dyn LeafValueProducer>,
    null_inject: f64,
    max_depth: usize,
    candidate_cache: Arc<CandidateCache>,
}

impl NodeContext {
    pub fn builder(catalog: TypeCatalog) -> NodeContextBuilder {
        NodeContextBuilder::new(catalog)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn promoters(&self) -> &NodePromoters {
        &self.promoters
    }

    pub fn candidate_generators(&self) -> &CandidateGenerators {
        &self.candidate_generators
    }

    pub fn null_inject(&self) -> f64 {
        self.null_inject
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn size_resolver(&self) -> &dyn ContainerSizeResolver {
        self.sizes.as_ref()
    }

    pub fn leaf_producer(&self) -> &dyn LeafValueProducer {
        self.leaves.as_ref()
    }

    pub fn candidate_cache(&self) -> &Arc<CandidateCache> {
        &self.candidate_cache
    }

    pub fn shape<'a>(&'a self, ty: &TypeDescriptor) -> Result<Shape<'a>, ResolutionError> {
        self.catalog.shape(ty)
    }

    /// Same configuration under a different session seed.
    pub fn reseeded(&self, seed: u64) -> NodeContext {
        NodeContext {
            seed,
            ..self.clone()
        }
    }

    /// Candidates of `ty`, memoized in the shared cache.
    pub fn candidates(&self, ty: &TypeDescriptor) -> Result<Arc<[NodeCandidate]>, GenerationError> {
        self.candidate_cache.get_or_try_insert_with(ty.clone(), || {
            self.candidate_generators
                .generate(ty, &self.catalog)
                .map(Arc::from)
        })
    }

    /// Promote a placed candidate through the promoter chain.
    pub fn promote(self: &Arc<Self>, candidate: &NodeCandidate) -> Result<Node, GenerationError> {
        self.promoters.promote(candidate, self)
    }

    /// Seed for one decision at one position of one attempt.
    pub fn derive_seed(&self, attempt: u32, path: &NodePath, decision: Decision) -> u64 {
        seed::derive_seed(self.seed, attempt, path, decision)
    }

    pub fn rng(&self, attempt: u32, path: &NodePath, decision: Decision) -> ChaCha8Rng {
        seed::rng_for(self.seed, attempt, path, decision)
    }
}

impl fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeContext")
            .field("seed", &self.seed)
            .field("promoters", &self.promoters)
            .field("candidate_generators", &self.candidate_generators)
            .field("types", &self.catalog.len())
            .field("null_inject", &self.null_inject)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Builder for [`NodeContext`].
///
/// Unless replaced wholesale with [`promoters`](Self::promoters), the promoter
/// chain is: promoters added with `insert_promoter_first` (most recent first),
/// the concrete-type promoter (registered resolvers, then sealed and declared
/// subtype defaults), the interface promoter, passthrough, then promoters added
/// with `push_promoter`.
pub struct NodeContextBuilder {
    seed: Option<u64>,
    catalog: TypeCatalog,
    front_promoters: Vec<Arc<dyn NodePromoter>>,
    back_promoters: Vec<Arc<dyn NodePromoter>>,
    promoter_chain: Option<NodePromoters>,
    resolvers: Vec<(TypeMatcher, Arc<dyn ConcreteTypeResolver>)>,
    interface_promoter: Option<InterfacePromoter>,
    candidate_generators: CandidateGenerators,
    sizes: Arc<dyn ContainerSizeResolver>,
    leaves: Arc<dyn LeafValueProducer>,
    null_inject: f64,
    max_depth: usize,
    cache_capacity: usize,
    candidate_cache: Option<Arc<CandidateCache>>,
}

impl NodeContextBuilder {
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            seed: None,
            catalog,
            front_promoters: Vec::new(),
            back_promoters: Vec::new(),
            promoter_chain: None,
            resolvers: Vec::new(),
            interface_promoter: None,
            candidate_generators: CandidateGenerators::defaults(),
            sizes: Arc::new(RangeSizeResolver::default()),
            leaves: Arc::new(SeededLeafProducer::default()),
            null_inject: DEFAULT_NULL_INJECT,
            max_depth: DEFAULT_MAX_DEPTH,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            candidate_cache: None,
        }
    }

    /// Pin the session seed. Without one, a fresh seed is drawn at build time.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Register a promoter ahead of every other promoter.
    pub fn insert_promoter_first<P: NodePromoter + 'static>(mut self, promoter: P) -> Self {
        self.front_promoters.insert(0, Arc::new(promoter));
        self
    }

    /// Register a promoter after the defaults. It only sees candidates the
    /// passthrough promoter declines, which by default is none.
    pub fn push_promoter<P: NodePromoter + 'static>(mut self, promoter: P) -> Self {
        self.back_promoters.push(Arc::new(promoter));
        self
    }

    /// Replace the whole promoter chain.
    pub fn promoters(mut self, chain: NodePromoters) -> Self {
        self.promoter_chain = Some(chain);
        self
    }

    /// Register a concrete type resolver for types accepted by `matcher`.
    /// Registered resolvers take priority over the sealed and declared defaults.
    pub fn register_resolver<R: ConcreteTypeResolver + 'static>(
        mut self,
        matcher: TypeMatcher,
        resolver: R,
    ) -> Self {
        self.resolvers.push((matcher, Arc::new(resolver)));
        self
    }

    /// Map interfaces to implementations with `mapping` instead of the catalog.
    pub fn interface_mapping<F>(mut self, mapping: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> Option<TypeDescriptor> + Send + Sync + 'static,
    {
        self.interface_promoter = Some(InterfacePromoter::new(mapping));
        self
    }

    pub fn insert_candidate_generator_first<G: CandidateGenerator + 'static>(
        mut self,
        generator: G,
    ) -> Self {
        self.candidate_generators = self.candidate_generators.insert_first(generator);
        self
    }

    pub fn push_candidate_generator<G: CandidateGenerator + 'static>(mut self, generator: G) -> Self {
        self.candidate_generators = self.candidate_generators.push(generator);
        self
    }

    /// Replace the whole candidate generator chain.
    pub fn candidate_generators(mut self, chain: CandidateGenerators) -> Self {
        self.candidate_generators = chain;
        self
    }

    pub fn size_resolver<S: ContainerSizeResolver + 'static>(mut self, sizes: S) -> Self {
        self.sizes = Arc::new(sizes);
        self
    }

    pub fn leaf_producer<L: LeafValueProducer + 'static>(mut self, leaves: L) -> Self {
        self.leaves = Arc::new(leaves);
        self
    }

    /// Probability that a nullable position is null, clamped to `[0, 1]`.
    pub fn null_inject(mut self, probability: f64) -> Self {
        self.null_inject = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Capacity of the candidate cache created at build time.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Share an existing candidate cache with other sessions.
    ///
    /// Only share a cache between contexts whose candidate generator chains
    /// and catalogs agree.
    pub fn shared_candidate_cache(mut self, cache: Arc<CandidateCache>) -> Self {
        self.candidate_cache = Some(cache);
        self
    }

    pub fn build(self) -> Arc<NodeContext> {
        let promoters = match self.promoter_chain {
            Some(chain) => chain,
            None => {
                let mut concrete = ConcreteTypePromoter::with_defaults(self.cache_capacity);
                for (matcher, resolver) in self.resolvers.into_iter().rev() {
                    concrete = concrete.insert_first_shared(matcher, resolver);
                }
                let mut chain = NodePromoters::new();
                for promoter in self.front_promoters {
                    chain = chain.push_shared(promoter);
                }
                chain = chain
                    .push(concrete)
                    .push(
                        self.interface_promoter
                            .unwrap_or_else(InterfacePromoter::declared),
                    )
                    .push(PassthroughPromoter);
                for promoter in self.back_promoters {
                    chain = chain.push_shared(promoter);
                }
                chain
            }
        };

        let seed = self.seed.unwrap_or_else(seed::entropy_seed);
        let candidate_cache = self
            .candidate_cache
            .unwrap_or_else(|| Arc::new(BoundedCache::new(self.cache_capacity)));

        Arc::new(NodeContext {
            seed,
            promoters,
            candidate_generators: self.candidate_generators,
            catalog: Arc::new(self.catalog),
            sizes: self.sizes,
            leaves: self.leaves,
            null_inject: self.null_inject,
            max_depth: self.max_depth,
            candidate_cache,
        })
    }
}
