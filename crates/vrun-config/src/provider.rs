//! Coverage provider resolution.
//!
//! Built-in providers resolve without I/O. A custom provider is a TOML
//! manifest named by `coverage.customProviderModule`, resolved against the
//! project root and read once before the test command starts.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use vrun_core::RunnerError;
use vrun_core::types::CoverageProviderKind;

use crate::config::RunnerConfig;
use crate::paths;

/// Manifest of a custom coverage provider module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageProvider {
    Builtin(CoverageProviderKind),
    Custom {
        module: PathBuf,
        manifest: ProviderManifest,
    },
}

impl CoverageProvider {
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(kind) => kind.as_str(),
            Self::Custom { manifest, .. } => &manifest.name,
        }
    }
}

/// Resolve the provider for this run, or `None` when coverage is off.
pub async fn load_coverage_provider(
    config: &RunnerConfig,
    root: &Path,
) -> Result<Option<CoverageProvider>, RunnerError> {
    let coverage = &config.coverage;
    if !coverage.enabled {
        return Ok(None);
    }
    if coverage.provider.is_builtin() {
        return Ok(Some(CoverageProvider::Builtin(coverage.provider)));
    }

    let module = coverage
        .custom_provider_module
        .as_deref()
        .ok_or(RunnerError::CustomProviderMissing)?;
    let path = paths::resolve(root, Path::new(module));
    let load_error = || RunnerError::CustomProviderLoad { path: path.clone() };

    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "cannot read coverage provider module");
        load_error()
    })?;
    let manifest: ProviderManifest = toml::from_str(&content).map_err(|e| {
        warn!(path = %path.display(), error = %e, "invalid coverage provider module");
        load_error()
    })?;
    if manifest.name.trim().is_empty() {
        warn!(path = %path.display(), "coverage provider module has an empty name");
        return Err(load_error());
    }

    debug!(name = %manifest.name, "loaded custom coverage provider");
    Ok(Some(CoverageProvider::Custom {
        module: path,
        manifest,
    }))
}
