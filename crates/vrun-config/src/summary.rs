//! Istanbul `json-summary` reader (`coverage-summary.json`).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use vrun_core::types::Metric;

/// File name the json-summary reporter writes into the reports directory.
pub const SUMMARY_FILE_NAME: &str = "coverage-summary.json";

/// `pct` is a number, or the string `"Unknown"` when nothing was counted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
enum Pct {
    Number(f64),
    Unknown(#[allow(dead_code)] serde::de::IgnoredAny),
}

impl Default for Pct {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct MetricSummary {
    pub total: u64,
    pub covered: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pct: Pct,
}

impl MetricSummary {
    pub fn new(total: u64, covered: u64) -> Self {
        let pct = if total == 0 {
            100.0
        } else {
            (covered as f64 * 10000.0 / total as f64).floor() / 100.0
        };
        Self {
            total,
            covered,
            skipped: 0,
            pct: Pct::Number(pct),
        }
    }

    /// Covered percentage. Unknown counts as fully covered.
    pub fn pct(&self) -> f64 {
        match self.pct {
            Pct::Number(pct) => pct,
            Pct::Unknown(_) => 100.0,
        }
    }

    pub fn uncovered(&self) -> u64 {
        self.total.saturating_sub(self.covered)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct FileSummary {
    #[serde(default)]
    pub lines: MetricSummary,
    #[serde(default)]
    pub functions: MetricSummary,
    #[serde(default)]
    pub statements: MetricSummary,
    #[serde(default)]
    pub branches: MetricSummary,
}

impl FileSummary {
    pub fn metric(&self, metric: Metric) -> &MetricSummary {
        match metric {
            Metric::Lines => &self.lines,
            Metric::Functions => &self.functions,
            Metric::Statements => &self.statements,
            Metric::Branches => &self.branches,
        }
    }
}

/// Achieved coverage of one run: the `total` entry plus one entry per file,
/// ordered by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageSummary {
    pub total: FileSummary,
    pub files: BTreeMap<String, FileSummary>,
}

impl CoverageSummary {
    pub fn from_json(content: &str) -> Result<Self> {
        let mut entries: BTreeMap<String, FileSummary> = serde_json::from_str(content)?;
        let total = entries.remove("total").unwrap_or_default();
        Ok(Self {
            total,
            files: entries,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read coverage summary: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse coverage summary: {}", path.display()))
    }
}
