//! Error types for the fixtree generation engine.

use crate::validate::ValidationFailure;
use thiserror::Error;

/// Resolution errors: the configured policy chains could not turn a type into
/// something generatable. These are configuration gaps and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("No promoter matched candidate {name} of type {type_name}")]
    NoPromoter { type_name: String, name: String },

    #[error("No candidate generator applies to type {0}")]
    NoCandidateGenerator(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("No declared subtype registry for polymorphic type {0}")]
    MissingSubtypeRegistry(String),

    #[error("Declared subtype registry for {0} is empty")]
    EmptySubtypeRegistry(String),

    #[error("Sealed type {0} permits no concrete subtypes")]
    EmptySealedHierarchy(String),

    #[error("No implementation mapped for interface {0}")]
    NoImplementation(String),

    #[error("Abstract type {type_name} reached assembly at {path} without a concrete resolution")]
    UnresolvedAbstract { type_name: String, path: String },

    #[error("Promotion of {type_name} at {path} revisits a type: {trail}")]
    PromotionCycle {
        type_name: String,
        path: String,
        trail: String,
    },

    #[error("Invalid type expression '{expr}': {reason}")]
    InvalidTypeExpression { expr: String, reason: String },
}

/// Errors raised while generating an instance.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Construction of {type_name} is ambiguous: {reason}")]
    ConstructionAmbiguity { type_name: String, reason: String },

    #[error("Recursion limit {max_depth} reached at {path} for non-nullable type {type_name}")]
    RecursionLimit {
        type_name: String,
        path: String,
        max_depth: usize,
    },

    #[error("One-shot sequence #{0} was drained and evicted; raise sequence_cache_capacity")]
    SequenceExhausted(u64),

    #[error("Validation failed after {attempts} attempt(s): {failure}")]
    RetryExhausted {
        attempts: u32,
        failure: ValidationFailure,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GenerationError {
    /// Whether a fresh sample (next attempt) could avoid this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GenerationError::RecursionLimit { .. })
    }
}

impl From<config::ConfigError> for GenerationError {
    fn from(err: config::ConfigError) -> Self {
        GenerationError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for GenerationError {
    fn from(err: toml::de::Error) -> Self {
        GenerationError::ConfigError(format!("Invalid catalog: {}", err))
    }
}
