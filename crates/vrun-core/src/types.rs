use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Execution backend that isolates test files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pool {
    Threads,
    #[default]
    Forks,
    #[value(name = "vmThreads")]
    VmThreads,
    #[value(name = "vmForks")]
    VmForks,
}

impl Pool {
    /// Returns the config/CLI-facing name for this pool
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Threads => "threads",
            Self::Forks => "forks",
            Self::VmThreads => "vmThreads",
            Self::VmForks => "vmForks",
        }
    }

    /// Whether workers of this pool live in separate child processes.
    pub fn is_child_process(&self) -> bool {
        matches!(self, Self::Forks | Self::VmForks)
    }
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coverage collection backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoverageProviderKind {
    /// Native engine coverage; in browser mode it needs a Chromium automation backend.
    #[default]
    V8,
    /// Source instrumentation, works with any browser.
    Istanbul,
    /// Loaded from `coverage.customProviderModule`.
    Custom,
}

impl CoverageProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V8 => "v8",
            Self::Istanbul => "istanbul",
            Self::Custom => "custom",
        }
    }

    /// Built-in providers never need module resolution.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom)
    }
}

impl std::fmt::Display for CoverageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A browser automation backend as configured by the user.
///
/// Field order is significant: it is the key order of the JSON blocks printed
/// in diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderIdentity {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub const CANONICAL_BROWSER_PROVIDER: &str = "playwright";
pub const CANONICAL_BROWSER_NAME: &str = "chromium";

impl ProviderIdentity {
    pub fn new(provider: impl Into<String>, name: Option<String>) -> Self {
        Self {
            provider: provider.into(),
            name,
        }
    }

    /// The only automation backend supporting attached debugging and v8 coverage.
    pub fn canonical() -> Self {
        Self::new(
            CANONICAL_BROWSER_PROVIDER,
            Some(CANONICAL_BROWSER_NAME.to_string()),
        )
    }

    pub fn is_canonical(&self) -> bool {
        self.provider == CANONICAL_BROWSER_PROVIDER
            && self.name.as_deref() == Some(CANONICAL_BROWSER_NAME)
    }

    /// `{"browser": {"provider": ..., "name": ...}}` with 2-space indentation.
    pub fn to_browser_block(&self) -> String {
        #[derive(Serialize)]
        struct BrowserBlock<'a> {
            browser: &'a ProviderIdentity,
        }
        serde_json::to_string_pretty(&BrowserBlock { browser: self }).unwrap_or_default()
    }
}

/// `{"coverage": {"provider": ...}}` with 2-space indentation.
pub fn coverage_provider_block(provider: CoverageProviderKind) -> String {
    #[derive(Serialize)]
    struct Inner {
        provider: CoverageProviderKind,
    }
    #[derive(Serialize)]
    struct CoverageBlock {
        coverage: Inner,
    }
    serde_json::to_string_pretty(&CoverageBlock {
        coverage: Inner { provider },
    })
    .unwrap_or_default()
}

/// Coverage metric, in reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Lines,
    Functions,
    Statements,
    Branches,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Lines,
        Metric::Functions,
        Metric::Statements,
        Metric::Branches,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Functions => "functions",
            Self::Statements => "statements",
            Self::Branches => "branches",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A percentage printed without a trailing `.0` for whole numbers.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Percent(pub f64);

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Output format for CLI responses
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_as_str() {
        assert_eq!(Pool::Threads.as_str(), "threads");
        assert_eq!(Pool::Forks.as_str(), "forks");
        assert_eq!(Pool::VmThreads.as_str(), "vmThreads");
        assert_eq!(Pool::VmForks.as_str(), "vmForks");
    }

    #[test]
    fn test_pool_child_process() {
        assert!(Pool::Forks.is_child_process());
        assert!(Pool::VmForks.is_child_process());
        assert!(!Pool::Threads.is_child_process());
        assert!(!Pool::VmThreads.is_child_process());
    }

    #[test]
    fn test_pool_value_enum_names() {
        assert!(matches!(Pool::from_str("vmThreads", false), Ok(Pool::VmThreads)));
        assert!(matches!(Pool::from_str("forks", false), Ok(Pool::Forks)));
        assert!(Pool::from_str("vm-threads", false).is_err());
    }

    #[test]
    fn test_canonical_identity() {
        assert!(ProviderIdentity::canonical().is_canonical());
        assert!(!ProviderIdentity::new("playwright", Some("firefox".into())).is_canonical());
        assert!(!ProviderIdentity::new("webdriverio", Some("chromium".into())).is_canonical());
        assert!(!ProviderIdentity::new("playwright", None).is_canonical());
    }

    #[test]
    fn test_browser_block_key_order_and_indent() {
        let block = ProviderIdentity::new("webdriverio", Some("chrome".into())).to_browser_block();
        assert_eq!(
            block,
            "{\n  \"browser\": {\n    \"provider\": \"webdriverio\",\n    \"name\": \"chrome\"\n  }\n}"
        );
    }

    #[test]
    fn test_browser_block_omits_missing_name() {
        let block = ProviderIdentity::new("preview", None).to_browser_block();
        assert_eq!(
            block,
            "{\n  \"browser\": {\n    \"provider\": \"preview\"\n  }\n}"
        );
    }

    #[test]
    fn test_coverage_provider_block() {
        assert_eq!(
            coverage_provider_block(CoverageProviderKind::Istanbul),
            "{\n  \"coverage\": {\n    \"provider\": \"istanbul\"\n  }\n}"
        );
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent(0.0).to_string(), "0");
        assert_eq!(Percent(100.0).to_string(), "100");
        assert_eq!(Percent(85.71).to_string(), "85.71");
    }

    #[test]
    fn test_metric_order() {
        let names: Vec<_> = Metric::ALL.iter().map(Metric::as_str).collect();
        assert_eq!(names, ["lines", "functions", "statements", "branches"]);
    }
}
