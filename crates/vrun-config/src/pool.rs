use vrun_core::{Diagnostic, RunnerError};

use crate::config::RunnerConfig;
use crate::validate::ValidationEnv;

pub fn validate_pool(config: &RunnerConfig, _env: &ValidationEnv) -> Vec<Diagnostic> {
    let options = &config.pool_options;
    if options.max_workers == Some(0) {
        return vec![RunnerError::PoolMaxWorkers.into()];
    }
    match (options.min_workers, options.max_workers) {
        (Some(min), Some(max)) if min > max => {
            vec![RunnerError::PoolWorkerRange { min, max }.into()]
        }
        _ => Vec::new(),
    }
}
