//! Merge rules: defaults, override order, conflict handling.

use crate::config::DEFAULT_RETRY_BUDGET;
use crate::leaf::{DEFAULT_MAX_CONTAINER_SIZE, DEFAULT_MAX_STRING_LEN, DEFAULT_MIN_CONTAINER_SIZE};
use crate::node::context::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DEPTH, DEFAULT_NULL_INJECT};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// `generation.seed` has no default: an unset seed means a fresh one per session.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("generation.retry_budget", i64::from(DEFAULT_RETRY_BUDGET))?
        .set_default("generation.null_inject", DEFAULT_NULL_INJECT)?
        .set_default("generation.min_container_size", DEFAULT_MIN_CONTAINER_SIZE as i64)?
        .set_default("generation.max_container_size", DEFAULT_MAX_CONTAINER_SIZE as i64)?
        .set_default("generation.max_string_len", DEFAULT_MAX_STRING_LEN as i64)?
        .set_default("generation.max_depth", DEFAULT_MAX_DEPTH as i64)?
        .set_default("generation.candidate_cache_capacity", DEFAULT_CACHE_CAPACITY as i64)?
        .set_default("generation.sequence_cache_capacity", DEFAULT_CACHE_CAPACITY as i64)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
