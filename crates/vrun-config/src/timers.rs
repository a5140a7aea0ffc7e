use vrun_core::{Diagnostic, ErrorKind};

use crate::config::RunnerConfig;
use crate::matrix::{self, CheckTarget};
use crate::validate::ValidationEnv;

/// Timer APIs the fake clock knows how to replace.
pub const KNOWN_TIMERS: &[&str] = &[
    "setTimeout",
    "clearTimeout",
    "setImmediate",
    "clearImmediate",
    "setInterval",
    "clearInterval",
    "Date",
    "nextTick",
    "hrtime",
    "requestAnimationFrame",
    "cancelAnimationFrame",
    "requestIdleCallback",
    "cancelIdleCallback",
    "performance",
    "queueMicrotask",
];

/// Unknown timer names are flagged as likely typos; faking a primitive that
/// cannot cross a process boundary is rejected for child-process pools.
pub fn validate_fake_timers(config: &RunnerConfig, _env: &ValidationEnv) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = config
        .fake_timers
        .to_fake
        .iter()
        .filter(|name| !KNOWN_TIMERS.contains(&name.as_str()))
        .map(|name| {
            Diagnostic::warning(
                ErrorKind::TimerMock,
                format!("fakeTimers.toFake contains unknown timer \"{name}\""),
            )
        })
        .collect();

    if let Some(err) = matrix::check(matrix::FAKE_TIMERS, &CheckTarget::root(config)) {
        diagnostics.push(err.into());
    }
    diagnostics
}
