//! Config loading facade: assembles sources in precedence order and validates.

use super::merge::builder_with_defaults;
use super::sources::{global_file, workspace_file};
use super::FixtreeConfig;
use config::{ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads `FixtreeConfig` from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace
    /// `config/config.toml`, workspace `config/{FIXTREE_ENV}.toml`, then
    /// `FIXTREE__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<FixtreeConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(
            Environment::with_prefix("FIXTREE")
                .separator("__")
                .try_parsing(true),
        );

        let config: FixtreeConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load configuration from a single file on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<FixtreeConfig, ConfigError> {
        let config: FixtreeConfig = builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Self::validated(config)
    }

    /// Path of the global config file, if one can be located.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    /// Defaults only, without reading any source.
    pub fn defaults() -> Result<FixtreeConfig, ConfigError> {
        builder_with_defaults()?.build()?.try_deserialize()
    }

    fn validated(config: FixtreeConfig) -> Result<FixtreeConfig, ConfigError> {
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ConfigError::Message(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        debug!(
            seed = ?config.generation.seed,
            retry_budget = config.generation.retry_budget,
            "Configuration loaded"
        );
        Ok(config)
    }
}
