//! Coverage thresholds: the pre-flight source check, the post-run comparison
//! and the `autoUpdate` write-back.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use vrun_core::types::{Metric, Percent};
use vrun_core::{Diagnostic, RunnerError};

use crate::config::{RunnerConfig, ThresholdsConfig};
use crate::summary::{CoverageSummary, FileSummary};
use crate::thresholds_source::{has_thresholds_object, write_thresholds};
use crate::validate::ValidationEnv;

/// `autoUpdate` can only write back into a thresholds table that exists in
/// the config file on disk.
pub fn validate_thresholds_source(config: &RunnerConfig, env: &ValidationEnv) -> Vec<Diagnostic> {
    if !config.coverage.thresholds.auto_update {
        return Vec::new();
    }
    let source = env
        .config_file
        .as_deref()
        .and_then(|path| std::fs::read_to_string(path).ok());
    match source {
        Some(source) if has_thresholds_object(&source) => Vec::new(),
        _ => {
            debug!(config_file = ?env.config_file, "no thresholds table to update");
            vec![RunnerError::ThresholdsSource.into()]
        }
    }
}

/// Compare achieved coverage against the configured thresholds.
///
/// Errors come back in metric order. With `perFile` every file entry is
/// checked instead of the total, in path order.
pub fn check_thresholds(thresholds: &ThresholdsConfig, summary: &CoverageSummary) -> Vec<RunnerError> {
    if thresholds.per_file {
        return summary
            .files
            .iter()
            .flat_map(|(file, entry)| check_file(thresholds, file, entry))
            .collect();
    }

    let mut errors = Vec::new();
    for metric in Metric::ALL {
        let Some(threshold) = thresholds.get(metric) else {
            continue;
        };
        let achieved = summary.total.metric(metric);
        if threshold < 0.0 {
            let max = (-threshold) as u64;
            if achieved.uncovered() > max {
                errors.push(RunnerError::UncoveredExceeded {
                    metric,
                    uncovered: achieved.uncovered(),
                    max,
                });
            }
        } else if achieved.pct() < threshold {
            errors.push(RunnerError::ThresholdNotMet {
                metric,
                achieved: Percent(achieved.pct()),
                required: Percent(threshold),
            });
        }
    }
    errors
}

fn check_file(thresholds: &ThresholdsConfig, file: &str, entry: &FileSummary) -> Vec<RunnerError> {
    Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let threshold = thresholds.get(metric).filter(|t| *t >= 0.0)?;
            let achieved = entry.metric(metric).pct();
            (achieved < threshold).then(|| RunnerError::FileThresholdNotMet {
                metric,
                achieved: Percent(achieved),
                required: Percent(threshold),
                file: file.to_string(),
            })
        })
        .collect()
}

/// Thresholds the run has improved on, with their new values.
///
/// Only explicitly set metrics move. Percentages rise to the achieved value;
/// uncovered-count limits shrink to the achieved count.
pub fn improved_thresholds(thresholds: &ThresholdsConfig, summary: &CoverageSummary) -> Vec<(Metric, f64)> {
    if thresholds.hundred {
        return Vec::new();
    }
    Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let threshold = thresholds.get(metric)?;
            let achieved = summary.total.metric(metric);
            if threshold < 0.0 {
                let uncovered = achieved.uncovered() as f64;
                (uncovered < -threshold).then_some((metric, -uncovered))
            } else {
                (achieved.pct() > threshold).then_some((metric, achieved.pct()))
            }
        })
        .collect()
}

/// Raise thresholds in the config file on disk, keeping its formatting.
/// Returns what was written.
pub fn auto_update_thresholds(
    config_file: &Path,
    thresholds: &ThresholdsConfig,
    summary: &CoverageSummary,
) -> Result<Vec<(Metric, f64)>> {
    let updates = improved_thresholds(thresholds, summary);
    if updates.is_empty() {
        return Ok(updates);
    }
    let source = std::fs::read_to_string(config_file)
        .with_context(|| format!("Failed to read config: {}", config_file.display()))?;
    let updated = write_thresholds(&source, &updates)
        .context("Unable to parse thresholds from configuration file")?;
    std::fs::write(config_file, updated)
        .with_context(|| format!("Failed to write config: {}", config_file.display()))?;
    info!(count = updates.len(), "updated coverage thresholds");
    Ok(updates)
}
