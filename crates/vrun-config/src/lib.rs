//! Runner configuration (`vrun.toml`) and the pre-flight validation engine.

pub mod config;
pub mod coverage;
pub mod inspect;
pub mod matrix;
pub mod paths;
pub mod pool;
pub mod provider;
pub mod shard;
pub mod summary;
pub mod thresholds;
pub mod thresholds_source;
pub mod timers;
pub mod validate;
pub mod watch;
pub mod workspace;

pub use config::{CONFIG_FILE_NAME, RunnerConfig, ThresholdsConfig};
pub use provider::{CoverageProvider, load_coverage_provider};
pub use summary::CoverageSummary;
pub use thresholds::{auto_update_thresholds, check_thresholds};
pub use validate::{
    FAILURE_EXIT_CODE, PreflightReport, ValidationEnv, emit_fatal, emit_warnings, run_preflight,
};
pub use workspace::resolve_projects;
