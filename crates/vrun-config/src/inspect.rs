use vrun_core::Diagnostic;

use crate::config::RunnerConfig;
use crate::matrix::{self, CheckTarget};
use crate::validate::ValidationEnv;

/// Debugger attachment needs one process and, in browser mode, the canonical
/// automation backend. Parallelism is reported before the browser pair.
pub fn validate_inspect(config: &RunnerConfig, _env: &ValidationEnv) -> Vec<Diagnostic> {
    matrix::check(matrix::INSPECT, &CheckTarget::root(config))
        .into_iter()
        .map(Diagnostic::from)
        .collect()
}
