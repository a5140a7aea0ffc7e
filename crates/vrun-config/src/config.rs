use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vrun_core::types::{CoverageProviderKind, Metric, Pool, ProviderIdentity};

/// File name looked up in the working directory when `--config` is omitted.
pub const CONFIG_FILE_NAME: &str = "vrun.toml";

/// On-disk layout: every option lives under the `[test]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub test: RunnerConfig,
}

/// Fully merged runner configuration. Read-only to the validation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Project root, relative to the working directory.
    pub root: PathBuf,
    pub watch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard: Option<ShardSpec>,
    pub inspect: InspectConfig,
    pub file_parallelism: bool,
    pub pool: Pool,
    pub pool_options: PoolOptions,
    pub browser: BrowserConfig,
    pub coverage: CoverageConfig,
    pub fake_timers: FakeTimersConfig,
    /// Directory of blob reports to merge instead of running tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_reports: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workspace: Vec<WorkspaceEntry>,
    /// Workspace entries after glob expansion. Filled by the loader.
    #[serde(skip)]
    pub projects: Vec<ProjectConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            watch: false,
            shard: None,
            inspect: InspectConfig::default(),
            file_parallelism: true,
            pool: Pool::default(),
            pool_options: PoolOptions::default(),
            browser: BrowserConfig::default(),
            coverage: CoverageConfig::default(),
            fake_timers: FakeTimersConfig::default(),
            merge_reports: None,
            workspace: Vec::new(),
            projects: Vec::new(),
        }
    }
}

/// `--shard`, either as `"<index>/<count>"` or `{ index, count }`.
///
/// Kept loose so that malformed values reach the shard validator instead of
/// failing deserialization with a generic serde message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShardSpec {
    Text(String),
    Parts { index: f64, count: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    pub enabled: bool,
    /// Break before the first test file (`--inspect-brk`).
    pub brk: bool,
}

impl InspectConfig {
    pub fn is_active(&self) -> bool {
        self.enabled || self.brk
    }

    /// CLI flag the user turned the debugger on with.
    pub fn flag(&self) -> &'static str {
        if self.brk { "--inspect-brk" } else { "--inspect" }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreadsOptions {
    pub single_thread: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForksOptions {
    pub single_fork: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PoolOptions {
    pub threads: ThreadsOptions,
    pub forks: ForksOptions,
    pub vm_threads: ThreadsOptions,
    pub vm_forks: ForksOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_workers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub enabled: bool,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "preview".to_string(),
            name: None,
        }
    }
}

impl BrowserConfig {
    pub fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::new(self.provider.clone(), self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverageConfig {
    pub enabled: bool,
    pub provider: CoverageProviderKind,
    /// Removed and recreated before each run. Relative to root.
    pub reports_directory: PathBuf,
    pub thresholds: ThresholdsConfig,
    pub clean: bool,
    pub clean_on_rerun: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_provider_module: Option<String>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: CoverageProviderKind::default(),
            reports_directory: PathBuf::from("./coverage"),
            thresholds: ThresholdsConfig::default(),
            clean: true,
            clean_on_rerun: true,
            custom_provider_module: None,
        }
    }
}

/// Global coverage thresholds.
///
/// A positive value is a minimum percentage; a negative value is the maximum
/// number of uncovered items allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThresholdsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<f64>,
    /// Shortcut for setting all four metrics to 100.
    #[serde(rename = "100", skip_serializing_if = "std::ops::Not::not")]
    pub hundred: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub per_file: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_update: bool,
}

impl ThresholdsConfig {
    /// Effective threshold for a metric, with `100 = true` taking precedence.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        if self.hundred {
            return Some(100.0);
        }
        match metric {
            Metric::Lines => self.lines,
            Metric::Functions => self.functions,
            Metric::Statements => self.statements,
            Metric::Branches => self.branches,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Lines => &mut self.lines,
            Metric::Functions => &mut self.functions,
            Metric::Statements => &mut self.statements,
            Metric::Branches => &mut self.branches,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.get(*m).is_none())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FakeTimersConfig {
    pub to_fake: Vec<String>,
}

/// Entry of the `workspace` list: a glob of project directories/config
/// files, or an inline project definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkspaceEntry {
    Pattern(String),
    Project(ProjectConfig),
}

/// Per-project settings that may diverge from the root config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Relative to the directory of the project's config file; absolute
    /// once the workspace is resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserConfig>,
}

impl ProjectConfig {
    /// Browser settings this project actually runs with.
    pub fn effective_browser<'a>(&'a self, root: &'a BrowserConfig) -> &'a BrowserConfig {
        self.browser.as_ref().unwrap_or(root)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

impl RunnerConfig {
    /// Parse a `vrun.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.test)
    }

    /// Locate `vrun.toml` in `dir`, if present.
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let file = ConfigFile { test: self.clone() };
        Ok(toml::to_string_pretty(&file)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
