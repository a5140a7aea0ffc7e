use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use vrun_core::{Diagnostic, RunnerError};

use crate::config::RunnerConfig;
use crate::{coverage, inspect, paths, pool, shard, thresholds, timers, watch};

/// Exit code for any configuration failure, pre- or post-run.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Process facts the validators may consult besides the config itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationEnv {
    /// Working directory the runner was started in.
    pub cwd: PathBuf,
    /// On-disk config file the config was loaded from, if any.
    pub config_file: Option<PathBuf>,
}

impl ValidationEnv {
    pub fn new(cwd: impl Into<PathBuf>, config_file: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            config_file,
        }
    }

    /// Absolute, normalized project root.
    pub fn resolve_root(&self, config: &RunnerConfig) -> PathBuf {
        paths::resolve(&self.cwd, &config.root)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::new("/work/project", None)
    }
}

pub type Validator = fn(&RunnerConfig, &ValidationEnv) -> Vec<Diagnostic>;

/// Pre-flight validators in reporting order.
pub const PREFLIGHT: &[(&str, Validator)] = &[
    ("shard", shard::validate_shard),
    ("inspect", inspect::validate_inspect),
    ("pool", pool::validate_pool),
    ("coverage.provider", coverage::validate_coverage_provider),
    ("coverage.reportsDirectory", coverage::validate_reports_directory),
    ("coverage.customProviderModule", coverage::validate_custom_provider),
    ("coverage.thresholds", thresholds::validate_thresholds_source),
    ("fakeTimers", timers::validate_fake_timers),
    ("watch", watch::validate_watch),
];

/// Non-fatal findings of a passing pre-flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreflightReport {
    pub warnings: Vec<Diagnostic>,
}

/// Run every pre-flight validator in order, stopping at the first fatal
/// diagnostic. Nothing is started or modified either way.
pub fn run_preflight(
    config: &RunnerConfig,
    env: &ValidationEnv,
) -> Result<PreflightReport, RunnerError> {
    let mut report = PreflightReport::default();
    for (name, validator) in PREFLIGHT {
        for diagnostic in validator(config, env) {
            match diagnostic {
                Diagnostic::Fatal(err) => {
                    debug!(validator = name, kind = %err.kind(), "pre-flight rejected config");
                    return Err(err);
                }
                warning => report.warnings.push(warning),
            }
        }
    }
    debug!(warnings = report.warnings.len(), "pre-flight passed");
    Ok(report)
}

/// Write a fatal diagnostic and return the exit code the process should use.
pub fn emit_fatal(err: &RunnerError, out: &mut impl Write) -> i32 {
    writeln!(out, "{}", Diagnostic::Fatal(err.clone()).render()).ok();
    FAILURE_EXIT_CODE
}

pub fn emit_warnings(report: &PreflightReport, out: &mut impl Write) {
    for warning in &report.warnings {
        writeln!(out, "{}", warning.render()).ok();
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
