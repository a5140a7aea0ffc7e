use std::path::PathBuf;

use crate::types::{Metric, Percent};

/// Category a diagnostic belongs to, named after the option domain it guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Shard,
    Inspect,
    Pool,
    Coverage,
    CoverageThreshold,
    TimerMock,
    WatchConflict,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Shard => "ShardError",
            Self::Inspect => "InspectError",
            Self::Pool => "PoolError",
            Self::Coverage => "CoverageError",
            Self::CoverageThreshold => "CoverageThresholdError",
            Self::TimerMock => "TimerMockError",
            Self::WatchConflict => "WatchConflictError",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RunnerError {
    #[error("You cannot use --shard option with enabled watch")]
    ShardWithWatch,

    #[error("--shard <count> must be a positive number")]
    ShardCount,

    #[error("--shard <index> must be a positive number less then <count>")]
    ShardIndex,

    #[error(
        "You cannot use {flag} without \"--no-file-parallelism\", \"poolOptions.threads.singleThread\" or \"poolOptions.forks.singleFork\""
    )]
    InspectParallelism { flag: &'static str },

    #[error("{flag} does not work with\n{actual}\n\nUse either:\n{canonical}\n\n...or disable {flag}\n")]
    InspectBrowser {
        flag: &'static str,
        actual: String,
        canonical: String,
    },

    #[error("poolOptions.maxWorkers must be a positive number")]
    PoolMaxWorkers,

    #[error("poolOptions.minWorkers ({min}) and poolOptions.maxWorkers ({max}) must not conflict")]
    PoolWorkerRange { min: u32, max: u32 },

    #[error(
        "coverage.provider \"v8\" does not work with\n{actual}\n\nUse either:\n{canonical}\n\n...or change your coverage provider to:\n{alternative}\n"
    )]
    CoverageBrowser {
        actual: String,
        canonical: String,
        alternative: String,
    },

    #[error("Coverage provider \"custom\" requires \"coverage.customProviderModule\" to be defined")]
    CustomProviderMissing,

    #[error("Failed to load custom CoverageProviderModule from {}", .path.display())]
    CustomProviderLoad { path: PathBuf },

    #[error(
        "You cannot set \"coverage.reportsDirectory\" as {}. Coverage provider needs to be able to remove this directory before test run",
        .path.display()
    )]
    ReportsDirectory { path: PathBuf },

    #[error(
        "Unable to parse thresholds from configuration file: Expected config.test.coverage.thresholds to be an object"
    )]
    ThresholdsSource,

    #[error("Coverage for {metric} ({achieved}%) does not meet global threshold ({required}%)")]
    ThresholdNotMet {
        metric: Metric,
        achieved: Percent,
        required: Percent,
    },

    #[error("Uncovered {metric} ({uncovered}) exceed global threshold ({max})")]
    UncoveredExceeded {
        metric: Metric,
        uncovered: u64,
        max: u64,
    },

    #[error("Coverage for {metric} ({achieved}%) does not meet threshold ({required}%) for {file}")]
    FileThresholdNotMet {
        metric: Metric,
        achieved: Percent,
        required: Percent,
        file: String,
    },

    #[error(
        "vi.useFakeTimers({{ toFake: {to_fake} }}) is not supported in node:child_process. Use --pool=threads if mocking {primitive} is required."
    )]
    TimerMock { to_fake: String, primitive: String },

    #[error("Cannot merge reports with --watch enabled")]
    MergeWithWatch,

    #[error("Cannot merge reports when --shard is used")]
    MergeWithShard,
}

impl RunnerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShardWithWatch | Self::ShardCount | Self::ShardIndex => ErrorKind::Shard,
            Self::InspectParallelism { .. } | Self::InspectBrowser { .. } => ErrorKind::Inspect,
            Self::PoolMaxWorkers | Self::PoolWorkerRange { .. } => ErrorKind::Pool,
            Self::CoverageBrowser { .. }
            | Self::CustomProviderMissing
            | Self::CustomProviderLoad { .. }
            | Self::ReportsDirectory { .. }
            | Self::ThresholdsSource => ErrorKind::Coverage,
            Self::ThresholdNotMet { .. }
            | Self::UncoveredExceeded { .. }
            | Self::FileThresholdNotMet { .. } => ErrorKind::CoverageThreshold,
            Self::TimerMock { .. } => ErrorKind::TimerMock,
            Self::MergeWithWatch | Self::MergeWithShard => ErrorKind::WatchConflict,
        }
    }

    /// Threshold failures are reported after execution; everything else aborts before it.
    pub fn is_post_run(&self) -> bool {
        self.kind() == ErrorKind::CoverageThreshold
    }
}
