//! Fixture generation
//!
//! `FixtureGenerator` is the session facade: it owns the shared context, the
//! external validator and the retry budget, and runs the sample/validate loop.

use crate::catalog::TypeCatalog;
use crate::config::{GenerationConfig, DEFAULT_RETRY_BUDGET};
use crate::error::GenerationError;
use crate::node::{Node, NodeCandidate, NodeContext, NodePath};
use crate::types::TypeDescriptor;
use crate::validate::{AcceptAll, ValidateWithRetry, ValidationFailure, Validator};
use crate::value::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A validated instance and the number of attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampled {
    pub value: Value,
    pub attempts: u32,
}

/// Generates fixture instances for one session.
#[derive(Clone)]
pub struct FixtureGenerator {
    context: Arc<NodeContext>,
    validator: Arc<dyn Validator>,
    retry_budget: u32,
}

impl FixtureGenerator {
    /// Generator over `context` that accepts every instance.
    pub fn new(context: Arc<NodeContext>) -> Self {
        Self {
            context,
            validator: Arc::new(AcceptAll),
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    /// Generator configured from `config` over `catalog`.
    pub fn from_config(config: &GenerationConfig, catalog: TypeCatalog) -> Self {
        Self::new(config.context_builder(catalog).build()).with_retry_budget(config.retry_budget)
    }

    pub fn with_validator<V: Validator + 'static>(self, validator: V) -> Self {
        self.with_shared_validator(Arc::new(validator))
    }

    pub fn with_shared_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    /// Attempts per `sample_valid` call; at least one.
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget.max(1);
        self
    }

    /// Same configuration under a different session seed.
    pub fn reseeded(&self, seed: u64) -> Self {
        Self {
            context: Arc::new(self.context.reseeded(seed)),
            ..self.clone()
        }
    }

    pub fn context(&self) -> &Arc<NodeContext> {
        &self.context
    }

    pub fn seed(&self) -> u64 {
        self.context.seed()
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Root node of `ty` for `attempt`, promoted through the promoter chain
    /// like any other position, so abstract roots resolve per attempt.
    pub fn root(&self, ty: &TypeDescriptor, attempt: u32) -> Result<Node, GenerationError> {
        let candidate = NodeCandidate::new(ty.clone(), None).placed(NodePath::root(), attempt);
        self.context.promote(&candidate)
    }

    /// One unvalidated sample (attempt 0).
    pub fn sample(&self, ty: &TypeDescriptor) -> Result<Value, GenerationError> {
        self.sample_attempt(ty, 0)
    }

    /// One unvalidated sample for a specific attempt index.
    pub fn sample_attempt(&self, ty: &TypeDescriptor, attempt: u32) -> Result<Value, GenerationError> {
        self.root(ty, attempt)?.sample()
    }

    /// Sample until the validator accepts an instance.
    ///
    /// Attempt `n` resamples the root with attempt index `n`, so each
    /// retry draws new values while staying reproducible from the seed.
    /// Depth-limit failures count as failed attempts; resolution and
    /// construction errors abort immediately.
    ///
    /// # Returns
    /// The first accepted instance, or `RetryExhausted` carrying the last
    /// failure once the budget is spent. An invalid instance is never returned.
    #[instrument(skip(self, ty), fields(ty = %ty, seed = self.context.seed()))]
    pub fn sample_valid(&self, ty: &TypeDescriptor) -> Result<Sampled, GenerationError> {
        let mut validation = ValidateWithRetry::new(Arc::clone(&self.validator));

        for attempt in 0..self.retry_budget {
            match self.root(ty, attempt).and_then(|root| root.sample()) {
                Ok(value) => {
                    if validation.try_validate(&value) {
                        debug!(attempt, "Instance accepted");
                        return Ok(Sampled {
                            value,
                            attempts: attempt + 1,
                        });
                    }
                }
                Err(err) if err.is_recoverable() => {
                    debug!(attempt, error = %err, "Attempt failed, resampling");
                    validation.mark_failure(ValidationFailure::from_generation(&err));
                }
                Err(err) => return Err(err),
            }
        }

        let failure = validation
            .consume_failure()
            .unwrap_or_else(|| ValidationFailure::new("no attempt produced a valid instance"));
        warn!(
            attempts = self.retry_budget,
            failure = %failure,
            "Retry budget exhausted"
        );
        Err(GenerationError::RetryExhausted {
            attempts: self.retry_budget,
            failure,
        })
    }

    /// `count` validated instances. Instance `i` is drawn under session seed
    /// `seed + i`, so the batch is reproducible and its members independent.
    pub fn sample_many(&self, ty: &TypeDescriptor, count: usize) -> Result<Vec<Value>, GenerationError> {
        let base = self.seed();
        let values = (0..count as u64)
            .map(|i| {
                let generator = if i == 0 { self.clone() } else { self.reseeded(base.wrapping_add(i)) };
                generator.sample_valid(ty).map(|sampled| sampled.value)
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!(ty = %ty, count = values.len(), seed = base, "Sampled fixtures");
        Ok(values)
    }
}

impl std::fmt::Debug for FixtureGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureGenerator")
            .field("context", &self.context)
            .field("retry_budget", &self.retry_budget)
            .finish()
    }
}
