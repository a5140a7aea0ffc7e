//! Building the merged configuration and the environment of the test command.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use vrun_config::config::ShardSpec;
use vrun_config::{RunnerConfig, ValidationEnv, resolve_projects};

use crate::cli::{ConfigOverrides, ConfigSource};

/// A merged configuration plus the process facts it was loaded under.
#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: RunnerConfig,
    pub env: ValidationEnv,
}

impl LoadedConfig {
    pub fn root(&self) -> PathBuf {
        self.env.resolve_root(&self.config)
    }
}

/// Load the config file (explicit, or `vrun.toml` in the working directory),
/// apply CLI flags and expand workspace entries.
pub(crate) fn load_config(source: &ConfigSource, overrides: &ConfigOverrides) -> Result<LoadedConfig> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let config_file = match &source.config {
        Some(path) => Some(cwd.join(path)),
        None => RunnerConfig::find_config_file(&cwd),
    };

    let mut config = match &config_file {
        Some(path) => RunnerConfig::load(path)?,
        None => {
            debug!("no config file found, using defaults");
            RunnerConfig::default()
        }
    };
    if let Some(root) = &source.root {
        config.root = root.clone();
    }
    overrides.apply(&mut config);

    let env = ValidationEnv::new(cwd, config_file);
    let root = env.resolve_root(&config);
    config.projects = resolve_projects(&config, &root)?;
    Ok(LoadedConfig { config, env })
}

/// Variables describing the validated run, handed to the test command.
pub(crate) fn build_child_env(config: &RunnerConfig, root: &std::path::Path) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("VRUN".to_string(), "1".to_string());
    env.insert("VRUN_ROOT".to_string(), root.display().to_string());
    env.insert("VRUN_POOL".to_string(), config.pool.as_str().to_string());

    if let Some(shard) = config.shard.as_ref().and_then(|s| ShardSpec::resolve(s).ok()) {
        env.insert("VRUN_SHARD".to_string(), shard.to_string());
    }
    if config.coverage.enabled {
        let reports = vrun_config::paths::resolve(root, &config.coverage.reports_directory);
        env.insert("VRUN_COVERAGE_DIR".to_string(), reports.display().to_string());
        env.insert(
            "VRUN_COVERAGE_PROVIDER".to_string(),
            config.coverage.provider.as_str().to_string(),
        );
    }
    if let Some(dir) = &config.merge_reports {
        let dir = vrun_config::paths::resolve(root, dir);
        env.insert("VRUN_MERGE_REPORTS".to_string(), dir.display().to_string());
    }
    if !config.fake_timers.to_fake.is_empty() {
        env.insert("VRUN_FAKE_TIMERS".to_string(), config.fake_timers.to_fake.join(","));
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;

    struct CwdGuard(PathBuf);

    impl CwdGuard {
        fn enter(dir: &Path) -> Self {
            let previous = std::env::current_dir().unwrap();
            std::env::set_current_dir(dir).unwrap();
            Self(previous)
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    #[test]
    #[serial]
    fn test_load_config_from_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().canonicalize().unwrap();
        std::fs::write(
            dir_path.join("vrun.toml"),
            "[test]\nroot = \"app\"\nworkspace = [\"packages/*\"]\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir_path.join("app/packages/web")).unwrap();
        std::fs::write(
            dir_path.join("app/packages/web/vrun.toml"),
            "[test.browser]\nenabled = true\nprovider = \"playwright\"\nname = \"firefox\"\n",
        )
        .unwrap();

        let _cwd = CwdGuard::enter(&dir_path);
        let overrides = ConfigOverrides {
            watch: true,
            ..Default::default()
        };
        let loaded = load_config(&ConfigSource::default(), &overrides).unwrap();

        assert_eq!(loaded.env.config_file, Some(dir_path.join("vrun.toml")));
        assert_eq!(loaded.root(), dir_path.join("app"));
        assert!(loaded.config.watch);
        assert_eq!(loaded.config.projects.len(), 1);
        assert_eq!(loaded.config.projects[0].display_name(), "web");
    }

    #[test]
    #[serial]
    fn test_load_config_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let _cwd = CwdGuard::enter(dir.path());
        let source = ConfigSource {
            root: Some("sub".into()),
            ..Default::default()
        };
        let loaded = load_config(&source, &ConfigOverrides::default()).unwrap();
        assert_eq!(loaded.env.config_file, None);
        assert_eq!(loaded.config.root, PathBuf::from("sub"));
        assert!(loaded.config.projects.is_empty());
    }

    #[test]
    fn test_child_env_defaults() {
        let env = build_child_env(&RunnerConfig::default(), Path::new("/repo"));
        assert_eq!(env["VRUN_ROOT"], "/repo");
        assert_eq!(env["VRUN_POOL"], "forks");
        assert!(!env.contains_key("VRUN_SHARD"));
        assert!(!env.contains_key("VRUN_COVERAGE_DIR"));
    }

    #[test]
    fn test_child_env_describes_run() {
        let mut config = RunnerConfig {
            shard: Some(ShardSpec::Text("2/4".into())),
            merge_reports: Some("blobs".into()),
            ..Default::default()
        };
        config.coverage.enabled = true;
        config.fake_timers.to_fake = vec!["setTimeout".into(), "Date".into()];

        let env = build_child_env(&config, Path::new("/repo"));
        assert_eq!(env["VRUN_SHARD"], "2/4");
        assert_eq!(env["VRUN_COVERAGE_DIR"], "/repo/coverage");
        assert_eq!(env["VRUN_COVERAGE_PROVIDER"], "v8");
        assert_eq!(env["VRUN_MERGE_REPORTS"], "/repo/blobs");
        assert_eq!(env["VRUN_FAKE_TIMERS"], "setTimeout,Date");
    }
}
