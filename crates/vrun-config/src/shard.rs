use vrun_core::{Diagnostic, RunnerError};

use crate::config::{RunnerConfig, ShardSpec};
use crate::matrix::{self, CheckTarget};
use crate::validate::ValidationEnv;

/// A validated `--shard` value: run slice `index` of `count` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shard {
    pub index: u64,
    pub count: u64,
}

impl std::fmt::Display for Shard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.index, self.count)
    }
}

impl ShardSpec {
    /// Check bounds. `count` is validated before `index`.
    pub fn resolve(&self) -> Result<Shard, RunnerError> {
        let (index, count) = match self {
            Self::Text(text) => {
                let (index, count) = text.split_once('/').unwrap_or((text.as_str(), ""));
                (parse_int(index), parse_int(count))
            }
            Self::Parts { index, count } => (integral(*index), integral(*count)),
        };

        let count = match count {
            Some(count) if count > 0 => count,
            _ => return Err(RunnerError::ShardCount),
        };
        let index = match index {
            Some(index) if index > 0 && index <= count => index,
            _ => return Err(RunnerError::ShardIndex),
        };
        Ok(Shard {
            index: saturate(index),
            count: saturate(count),
        })
    }
}

/// Parsed as signed so that `-1` is a bad value rather than not a number.
fn parse_int(text: &str) -> Option<i128> {
    text.trim().parse().ok()
}

fn integral(value: f64) -> Option<i128> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i128)
}

fn saturate(value: i128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Sharding needs a finite one-shot run and an in-range slice.
pub fn validate_shard(config: &RunnerConfig, _env: &ValidationEnv) -> Vec<Diagnostic> {
    if let Some(err) = matrix::check(matrix::SHARD, &CheckTarget::root(config)) {
        return vec![err.into()];
    }
    match &config.shard {
        Some(spec) => spec.resolve().err().into_iter().map(Diagnostic::from).collect(),
        None => Vec::new(),
    }
}
