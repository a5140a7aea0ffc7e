//! Declarative table of cross-option requirements.
//!
//! Each row names the feature it guards, when it applies, what it requires,
//! and the error raised when the requirement is unmet. Validators look rows up
//! by feature; row order within a feature decides which error wins when more
//! than one requirement is violated.

use vrun_core::RunnerError;
use vrun_core::types::{CoverageProviderKind, Pool, ProviderIdentity, coverage_provider_block};

use crate::config::{BrowserConfig, RunnerConfig};

pub const SHARD: &str = "shard";
pub const INSPECT: &str = "inspect";
pub const COVERAGE_V8: &str = "coverage.v8";
pub const FAKE_TIMERS: &str = "fakeTimers.toFake";
pub const MERGE_REPORTS: &str = "mergeReports";

/// Timer primitives that cannot be patched across a process boundary.
pub const CROSS_PROCESS_UNSUPPORTED_TIMERS: &[&str] = &["nextTick"];

/// The configuration a row is evaluated against.
///
/// `browser` is the effective browser of the project being checked, which is
/// the root browser unless a workspace project overrides it.
#[derive(Debug, Clone, Copy)]
pub struct CheckTarget<'a> {
    pub config: &'a RunnerConfig,
    pub browser: &'a BrowserConfig,
}

impl<'a> CheckTarget<'a> {
    pub fn root(config: &'a RunnerConfig) -> Self {
        Self {
            config,
            browser: &config.browser,
        }
    }
}

pub struct CapabilityRequirement {
    pub feature: &'static str,
    pub applies: fn(&CheckTarget<'_>) -> bool,
    pub requires: fn(&CheckTarget<'_>) -> bool,
    pub unmet: fn(&CheckTarget<'_>) -> RunnerError,
}

impl CapabilityRequirement {
    /// `Some(error)` when the row applies and its requirement does not hold.
    pub fn evaluate(&self, target: &CheckTarget<'_>) -> Option<RunnerError> {
        if (self.applies)(target) && !(self.requires)(target) {
            Some((self.unmet)(target))
        } else {
            None
        }
    }
}

impl std::fmt::Debug for CapabilityRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRequirement")
            .field("feature", &self.feature)
            .finish_non_exhaustive()
    }
}

pub static MATRIX: &[CapabilityRequirement] = &[
    CapabilityRequirement {
        feature: SHARD,
        applies: shard_requested,
        requires: not_watching,
        unmet: shard_with_watch_error,
    },
    CapabilityRequirement {
        feature: INSPECT,
        applies: inspect_requested,
        requires: runs_in_single_process,
        unmet: inspect_parallelism_error,
    },
    CapabilityRequirement {
        feature: INSPECT,
        applies: inspect_in_browser,
        requires: browser_is_canonical,
        unmet: inspect_browser_error,
    },
    CapabilityRequirement {
        feature: COVERAGE_V8,
        applies: v8_coverage_in_browser,
        requires: browser_is_canonical,
        unmet: coverage_browser_error,
    },
    CapabilityRequirement {
        feature: FAKE_TIMERS,
        applies: fakes_cross_process_timer,
        requires: pool_shares_runtime,
        unmet: timer_mock_error,
    },
    CapabilityRequirement {
        feature: MERGE_REPORTS,
        applies: merge_requested,
        requires: not_watching,
        unmet: merge_with_watch_error,
    },
    CapabilityRequirement {
        feature: MERGE_REPORTS,
        applies: merge_requested,
        requires: not_sharded,
        unmet: merge_with_shard_error,
    },
];

/// Rows guarding `feature`, in table order.
pub fn requirements(feature: &str) -> impl Iterator<Item = &'static CapabilityRequirement> + '_ {
    MATRIX.iter().filter(move |row| row.feature == feature)
}

/// First unmet requirement of `feature` for `target`.
pub fn check(feature: &str, target: &CheckTarget<'_>) -> Option<RunnerError> {
    requirements(feature).find_map(|row| row.evaluate(target))
}

fn shard_requested(t: &CheckTarget<'_>) -> bool {
    t.config.shard.is_some()
}

fn not_watching(t: &CheckTarget<'_>) -> bool {
    !t.config.watch
}

fn not_sharded(t: &CheckTarget<'_>) -> bool {
    t.config.shard.is_none()
}

fn merge_requested(t: &CheckTarget<'_>) -> bool {
    t.config.merge_reports.is_some()
}

fn inspect_requested(t: &CheckTarget<'_>) -> bool {
    t.config.inspect.is_active()
}

fn inspect_in_browser(t: &CheckTarget<'_>) -> bool {
    t.config.inspect.is_active() && t.browser.enabled
}

fn v8_coverage_in_browser(t: &CheckTarget<'_>) -> bool {
    t.config.coverage.enabled
        && t.config.coverage.provider == CoverageProviderKind::V8
        && t.browser.enabled
}

/// A debugger can attach to exactly one process.
pub fn runs_in_single_process(t: &CheckTarget<'_>) -> bool {
    let config = t.config;
    !config.file_parallelism
        || (config.pool == Pool::Threads && config.pool_options.threads.single_thread)
        || (config.pool == Pool::Forks && config.pool_options.forks.single_fork)
}

fn browser_is_canonical(t: &CheckTarget<'_>) -> bool {
    t.browser.identity().is_canonical()
}

fn pool_shares_runtime(t: &CheckTarget<'_>) -> bool {
    !t.config.pool.is_child_process()
}

/// First entry of `toFake` that cannot be faked in a child process.
pub fn cross_process_unsupported_timer(to_fake: &[String]) -> Option<&str> {
    to_fake
        .iter()
        .map(String::as_str)
        .find(|timer| CROSS_PROCESS_UNSUPPORTED_TIMERS.contains(timer))
}

fn fakes_cross_process_timer(t: &CheckTarget<'_>) -> bool {
    cross_process_unsupported_timer(&t.config.fake_timers.to_fake).is_some()
}

fn shard_with_watch_error(_: &CheckTarget<'_>) -> RunnerError {
    RunnerError::ShardWithWatch
}

fn merge_with_watch_error(_: &CheckTarget<'_>) -> RunnerError {
    RunnerError::MergeWithWatch
}

fn merge_with_shard_error(_: &CheckTarget<'_>) -> RunnerError {
    RunnerError::MergeWithShard
}

fn inspect_parallelism_error(t: &CheckTarget<'_>) -> RunnerError {
    RunnerError::InspectParallelism {
        flag: t.config.inspect.flag(),
    }
}

fn inspect_browser_error(t: &CheckTarget<'_>) -> RunnerError {
    RunnerError::InspectBrowser {
        flag: t.config.inspect.flag(),
        actual: t.browser.identity().to_browser_block(),
        canonical: ProviderIdentity::canonical().to_browser_block(),
    }
}

fn coverage_browser_error(t: &CheckTarget<'_>) -> RunnerError {
    RunnerError::CoverageBrowser {
        actual: t.browser.identity().to_browser_block(),
        canonical: ProviderIdentity::canonical().to_browser_block(),
        alternative: coverage_provider_block(CoverageProviderKind::Istanbul),
    }
}

fn timer_mock_error(t: &CheckTarget<'_>) -> RunnerError {
    let to_fake = &t.config.fake_timers.to_fake;
    RunnerError::TimerMock {
        to_fake: serde_json::to_string(to_fake).unwrap_or_default(),
        primitive: cross_process_unsupported_timer(to_fake)
            .unwrap_or_default()
            .to_string(),
    }
}
