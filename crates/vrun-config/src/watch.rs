use vrun_core::Diagnostic;

use crate::config::RunnerConfig;
use crate::matrix::{self, CheckTarget};
use crate::validate::ValidationEnv;

/// Merging blob reports is a one-shot operation over a complete set of shards.
pub fn validate_watch(config: &RunnerConfig, _env: &ValidationEnv) -> Vec<Diagnostic> {
    matrix::check(matrix::MERGE_REPORTS, &CheckTarget::root(config))
        .into_iter()
        .map(Diagnostic::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShardSpec;
    use vrun_core::RunnerError;

    fn merging(watch: bool) -> RunnerConfig {
        RunnerConfig {
            watch,
            merge_reports: Some(".vrun-reports".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_reports_with_watch() {
        let diags = validate_watch(&merging(true), &ValidationEnv::for_tests());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].render(), "Error: Cannot merge reports with --watch enabled");
    }

    #[test]
    fn test_merge_reports_alone_or_watch_alone() {
        let env = ValidationEnv::for_tests();
        assert!(validate_watch(&merging(false), &env).is_empty());
        let watching = RunnerConfig {
            watch: true,
            ..Default::default()
        };
        assert!(validate_watch(&watching, &env).is_empty());
    }

    #[test]
    fn test_merge_reports_with_shard() {
        let config = RunnerConfig {
            shard: Some(ShardSpec::Text("1/2".into())),
            ..merging(false)
        };
        assert_eq!(
            validate_watch(&config, &ValidationEnv::for_tests()),
            vec![Diagnostic::Fatal(RunnerError::MergeWithShard)]
        );
    }
}
