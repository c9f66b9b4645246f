//! CLI route: single route table and run context. Dispatches to the engine and presentation.

use crate::catalog::{Shape, TypeCatalog};
use crate::config::{ConfigLoader, FixtreeConfig};
use crate::error::GenerationError;
use crate::generation::FixtureGenerator;
use crate::node::CandidateGenerators;
use crate::resolver::sealed::SealedResolver;
use crate::seed::entropy_seed;
use crate::types::TypeDescriptor;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{
    format_candidates_json, format_candidates_text, format_resolution_json,
    format_resolution_text, format_samples,
};
use crate::cli::command_name;

/// Concrete types an abstract type resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub ty: TypeDescriptor,
    pub shape: &'static str,
    pub concrete: Vec<TypeDescriptor>,
}

/// Runtime context for CLI execution: workspace root and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: FixtreeConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, GenerationError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self {
            workspace_root,
            config_path,
            config,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn config(&self) -> &FixtreeConfig {
        &self.config
    }

    /// Execute a command and return its output.
    pub fn execute(&self, command: &Commands) -> Result<String, GenerationError> {
        let started = Instant::now();
        let result = match command {
            Commands::Sample {
                catalog,
                ty,
                seed,
                count,
                pretty,
            } => self.handle_sample(catalog, ty, *seed, *count, *pretty),
            Commands::Resolve {
                catalog,
                ty,
                format,
            } => self.handle_resolve(catalog, ty, *format),
            Commands::Candidates {
                catalog,
                ty,
                format,
            } => self.handle_candidates(catalog, ty, *format),
        };
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn load_catalog(&self, path: &Path) -> Result<TypeCatalog, GenerationError> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };
        TypeCatalog::load(&path)
    }

    fn handle_sample(
        &self,
        catalog: &Path,
        ty: &str,
        seed: Option<u64>,
        count: usize,
        pretty: bool,
    ) -> Result<String, GenerationError> {
        let catalog = self.load_catalog(catalog)?;
        let ty = TypeDescriptor::parse(ty)?;
        let mut settings = self.config.generation.clone();
        // An unseeded session still reports its seed so the run can be replayed
        let seed = seed.or(settings.seed).unwrap_or_else(entropy_seed);
        settings.seed = Some(seed);

        info!(ty = %ty, seed, count, "Sampling fixtures");
        let generator = FixtureGenerator::from_config(&settings, catalog);
        let values = generator.sample_many(&ty, count)?;
        Ok(format_samples(&values, pretty)?)
    }

    fn handle_resolve(
        &self,
        catalog: &Path,
        ty: &str,
        format: OutputFormat,
    ) -> Result<String, GenerationError> {
        let catalog = self.load_catalog(catalog)?;
        let resolution = resolve(
            &catalog,
            &TypeDescriptor::parse(ty)?,
            self.config.generation.candidate_cache_capacity,
        )?;
        Ok(match format {
            OutputFormat::Text => format_resolution_text(&resolution),
            OutputFormat::Json => format_resolution_json(&resolution),
        })
    }

    fn handle_candidates(
        &self,
        catalog: &Path,
        ty: &str,
        format: OutputFormat,
    ) -> Result<String, GenerationError> {
        let catalog = self.load_catalog(catalog)?;
        let descriptor = TypeDescriptor::parse(ty)?;
        let candidates = CandidateGenerators::defaults().generate(&descriptor, &catalog)?;
        let name = descriptor.to_string();
        Ok(match format {
            OutputFormat::Text => format_candidates_text(&name, &candidates),
            OutputFormat::Json => format_candidates_json(&name, &candidates),
        })
    }
}

/// Concrete types reachable from `ty` in one resolution step.
///
/// Sealed types list every concrete leaf of the hierarchy; tagged unions list
/// their declared subtypes; interfaces list their declared implementation.
/// Concrete types resolve to themselves.
pub fn resolve(
    catalog: &TypeCatalog,
    ty: &TypeDescriptor,
    cache_capacity: usize,
) -> Result<Resolution, GenerationError> {
    let shape = catalog.shape(ty)?;
    let concrete = match shape {
        Shape::Sealed { .. } => SealedResolver::new(cache_capacity)
            .resolve_types(ty, catalog)?
            .iter()
            .cloned()
            .collect(),
        Shape::Polymorphic { subtypes, .. } => subtypes.iter().map(|s| s.ty.clone()).collect(),
        Shape::Interface(implementation) => implementation.into_iter().cloned().collect(),
        _ => vec![ty.clone()],
    };
    Ok(Resolution {
        ty: ty.clone(),
        shape: shape.label(),
        concrete,
    })
}
