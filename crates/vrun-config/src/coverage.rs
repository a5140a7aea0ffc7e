use tracing::debug;
use vrun_core::types::CoverageProviderKind;
use vrun_core::{Diagnostic, RunnerError};

use crate::config::RunnerConfig;
use crate::matrix::{self, CheckTarget};
use crate::paths;
use crate::validate::ValidationEnv;
use crate::workspace::effective_projects;

/// Static provider compatibility: the v8 provider in browser mode needs the
/// canonical automation backend, checked for the root config and then for
/// each workspace project's effective browser.
pub fn validate_coverage_provider(config: &RunnerConfig, _env: &ValidationEnv) -> Vec<Diagnostic> {
    if !config.coverage.enabled {
        return Vec::new();
    }

    if let Some(err) = matrix::check(matrix::COVERAGE_V8, &CheckTarget::root(config)) {
        return vec![err.into()];
    }
    for project in effective_projects(config) {
        let target = CheckTarget {
            config,
            browser: project.effective_browser(&config.browser),
        };
        if let Some(err) = matrix::check(matrix::COVERAGE_V8, &target) {
            debug!(
                project = project.display_name(),
                root = ?project.root,
                "browser incompatible with v8 coverage"
            );
            return vec![err.into()];
        }
    }
    Vec::new()
}

/// The reports directory is wiped before each run; it must never be the
/// project root or the working directory.
pub fn validate_reports_directory(config: &RunnerConfig, env: &ValidationEnv) -> Vec<Diagnostic> {
    if !config.coverage.enabled {
        return Vec::new();
    }
    let root = env.resolve_root(config);
    let reports = paths::resolve(&root, &config.coverage.reports_directory);
    if paths::is_protected(&reports, &[&root, &env.cwd]) {
        return vec![RunnerError::ReportsDirectory { path: reports }.into()];
    }
    Vec::new()
}

/// A custom provider needs a module to load. Runs after the reports
/// directory check so an unsafe directory is reported first.
pub fn validate_custom_provider(config: &RunnerConfig, _env: &ValidationEnv) -> Vec<Diagnostic> {
    let coverage = &config.coverage;
    if coverage.enabled
        && coverage.provider == CoverageProviderKind::Custom
        && coverage.custom_provider_module.is_none()
    {
        return vec![RunnerError::CustomProviderMissing.into()];
    }
    Vec::new()
}

#[cfg(test)]
#[path = "coverage_tests.rs"]
mod tests;
