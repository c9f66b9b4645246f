//! Configuration System
//!
//! Layered configuration for generation sessions: merge-policy defaults, the
//! user's global file, workspace files and `FIXTREE__*` environment variables,
//! in increasing priority. Validated before use.

use crate::catalog::TypeCatalog;
use crate::leaf::{
    PooledLeafProducer, RangeSizeResolver, SeededLeafProducer, DEFAULT_MAX_CONTAINER_SIZE,
    DEFAULT_MAX_STRING_LEN, DEFAULT_MIN_CONTAINER_SIZE,
};
use crate::logging::LoggingConfig;
use crate::node::context::{
    NodeContextBuilder, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DEPTH, DEFAULT_NULL_INJECT,
};
use crate::types::TypeDescriptor;
use crate::value::Value;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

pub const DEFAULT_RETRY_BUDGET: u32 = 100;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtreeConfig {
    /// Generation session settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for one generation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Session seed; a fresh one is drawn per session when unset.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Attempts before giving up on a validator.
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    /// Probability that a nullable position is null.
    #[serde(default = "default_null_inject")]
    pub null_inject: f64,

    #[serde(default = "default_min_container_size")]
    pub min_container_size: usize,

    #[serde(default = "default_max_container_size")]
    pub max_container_size: usize,

    #[serde(default = "default_max_string_len")]
    pub max_string_len: usize,

    /// Deepest path a non-leaf node may expand at.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_cache_capacity")]
    pub candidate_cache_capacity: usize,

    #[serde(default = "default_cache_capacity")]
    pub sequence_cache_capacity: usize,
}

fn default_retry_budget() -> u32 {
    DEFAULT_RETRY_BUDGET
}

fn default_null_inject() -> f64 {
    DEFAULT_NULL_INJECT
}

fn default_min_container_size() -> usize {
    DEFAULT_MIN_CONTAINER_SIZE
}

fn default_max_container_size() -> usize {
    DEFAULT_MAX_CONTAINER_SIZE
}

fn default_max_string_len() -> usize {
    DEFAULT_MAX_STRING_LEN
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            retry_budget: default_retry_budget(),
            null_inject: default_null_inject(),
            min_container_size: default_min_container_size(),
            max_container_size: default_max_container_size(),
            max_string_len: default_max_string_len(),
            max_depth: default_max_depth(),
            candidate_cache_capacity: default_cache_capacity(),
            sequence_cache_capacity: default_cache_capacity(),
        }
    }
}

impl GenerationConfig {
    /// Validate generation settings
    pub fn validate(&self) -> Result<(), String> {
        if self.retry_budget == 0 {
            return Err("retry_budget must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.null_inject) {
            return Err(format!(
                "null_inject must be within [0, 1], got {}",
                self.null_inject
            ));
        }
        if self.min_container_size > self.max_container_size {
            return Err(format!(
                "min_container_size ({}) exceeds max_container_size ({})",
                self.min_container_size, self.max_container_size
            ));
        }
        if self.candidate_cache_capacity == 0 || self.sequence_cache_capacity == 0 {
            return Err("cache capacities must be at least 1".to_string());
        }
        Ok(())
    }

    /// Context builder carrying these settings.
    pub fn context_builder(&self, catalog: TypeCatalog) -> NodeContextBuilder {
        self.context_builder_with_pools(catalog, std::iter::empty())
    }

    /// Context builder whose leaves of each pooled type are drawn from the
    /// given values. Pools share a materialization cache of
    /// `sequence_cache_capacity` entries.
    pub fn context_builder_with_pools<I>(&self, catalog: TypeCatalog, pools: I) -> NodeContextBuilder
    where
        I: IntoIterator<Item = (TypeDescriptor, Vec<Value>)>,
    {
        let leaves = pools
            .into_iter()
            .fold(self.pooled_leaf_producer(), |producer, (ty, values)| {
                producer.with_pool(ty, values)
            });
        let builder = NodeContextBuilder::new(catalog)
            .null_inject(self.null_inject)
            .max_depth(self.max_depth)
            .cache_capacity(self.candidate_cache_capacity)
            .size_resolver(RangeSizeResolver::new(
                self.min_container_size,
                self.max_container_size,
            ))
            .leaf_producer(leaves);
        match self.seed {
            Some(seed) => builder.seed(seed),
            None => builder,
        }
    }

    /// Pooled leaf producer sized by `sequence_cache_capacity`, falling back to
    /// seeded leaves of at most `max_string_len` characters.
    pub fn pooled_leaf_producer(&self) -> PooledLeafProducer {
        PooledLeafProducer::new(
            SeededLeafProducer::new(self.max_string_len),
            self.sequence_cache_capacity,
        )
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FixtreeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
