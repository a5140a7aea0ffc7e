use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vrun_config::RunnerConfig;
use vrun_config::config::ShardSpec;
use vrun_core::types::{CoverageProviderKind, Metric, OutputFormat, Pool};

#[derive(Parser)]
#[command(name = "vrun")]
#[command(about = "vrun: test runner that checks option compatibility before running")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VRUN_GIT_DESCRIBE"), ")"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the configuration, then hand off to the test command
    Run(RunArgs),

    /// Show/validate configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show {
        #[command(flatten)]
        source: ConfigSource,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Run the pre-flight checks without executing anything
    Validate {
        #[command(flatten)]
        source: ConfigSource,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Test command to execute once validation passes
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Where the configuration comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// Path to the config file (defaults to ./vrun.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root (overrides `root` from the config file)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Flags layered on top of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Re-run tests on file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Run only one slice of the test files, as <index>/<count>
    #[arg(long)]
    pub shard: Option<String>,

    /// Attach a debugger
    #[arg(long)]
    pub inspect: bool,

    /// Attach a debugger and break before the first test file
    #[arg(long)]
    pub inspect_brk: bool,

    /// Run test files one at a time
    #[arg(long)]
    pub no_file_parallelism: bool,

    #[arg(long, value_enum)]
    pub pool: Option<Pool>,

    /// Set poolOptions.threads.singleThread
    #[arg(long)]
    pub single_thread: bool,

    /// Set poolOptions.forks.singleFork
    #[arg(long)]
    pub single_fork: bool,

    #[arg(long)]
    pub min_workers: Option<u32>,

    #[arg(long)]
    pub max_workers: Option<u32>,

    /// Run tests in a browser
    #[arg(long)]
    pub browser: bool,

    /// Browser automation provider (playwright, webdriverio, preview)
    #[arg(long)]
    pub browser_provider: Option<String>,

    /// Browser to launch
    #[arg(long)]
    pub browser_name: Option<String>,

    /// Collect coverage
    #[arg(long)]
    pub coverage: bool,

    #[arg(long, value_enum)]
    pub coverage_provider: Option<CoverageProviderKind>,

    /// Directory the coverage reports are written to (removed before each run)
    #[arg(long)]
    pub coverage_reports_dir: Option<PathBuf>,

    /// Manifest of a custom coverage provider
    #[arg(long)]
    pub coverage_custom_module: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub coverage_thresholds_lines: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub coverage_thresholds_functions: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub coverage_thresholds_statements: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub coverage_thresholds_branches: Option<f64>,

    /// Require 100% for every metric
    #[arg(long = "coverage-thresholds-100")]
    pub coverage_thresholds_hundred: bool,

    /// Check thresholds for each file instead of the total
    #[arg(long)]
    pub coverage_thresholds_per_file: bool,

    /// Raise thresholds in the config file when coverage improves
    #[arg(long)]
    pub coverage_thresholds_auto_update: bool,

    /// Timer APIs to fake (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub fake_timers: Vec<String>,

    /// Merge blob reports from this directory instead of running tests
    #[arg(long)]
    pub merge_reports: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Apply every flag that was given. Flags only ever switch options on.
    pub fn apply(&self, config: &mut RunnerConfig) {
        config.watch |= self.watch;
        if let Some(shard) = &self.shard {
            config.shard = Some(ShardSpec::Text(shard.clone()));
        }

        config.inspect.enabled |= self.inspect;
        config.inspect.brk |= self.inspect_brk;
        if self.no_file_parallelism {
            config.file_parallelism = false;
        }

        if let Some(pool) = self.pool {
            config.pool = pool;
        }
        let options = &mut config.pool_options;
        options.threads.single_thread |= self.single_thread;
        options.forks.single_fork |= self.single_fork;
        options.min_workers = self.min_workers.or(options.min_workers);
        options.max_workers = self.max_workers.or(options.max_workers);

        config.browser.enabled |= self.browser;
        if let Some(provider) = &self.browser_provider {
            config.browser.provider = provider.clone();
        }
        if let Some(name) = &self.browser_name {
            config.browser.name = Some(name.clone());
        }

        let coverage = &mut config.coverage;
        coverage.enabled |= self.coverage;
        if let Some(provider) = self.coverage_provider {
            coverage.provider = provider;
        }
        if let Some(dir) = &self.coverage_reports_dir {
            coverage.reports_directory = dir.clone();
        }
        if let Some(module) = &self.coverage_custom_module {
            coverage.custom_provider_module = Some(module.clone());
        }

        let thresholds = &mut coverage.thresholds;
        let flags = [
            (Metric::Lines, self.coverage_thresholds_lines),
            (Metric::Functions, self.coverage_thresholds_functions),
            (Metric::Statements, self.coverage_thresholds_statements),
            (Metric::Branches, self.coverage_thresholds_branches),
        ];
        for (metric, value) in flags {
            if let Some(value) = value {
                thresholds.set(metric, value);
            }
        }
        thresholds.hundred |= self.coverage_thresholds_hundred;
        thresholds.per_file |= self.coverage_thresholds_per_file;
        thresholds.auto_update |= self.coverage_thresholds_auto_update;

        if !self.fake_timers.is_empty() {
            config.fake_timers.to_fake = self.fake_timers.clone();
        }
        if let Some(dir) = &self.merge_reports {
            config.merge_reports = Some(dir.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vrun").chain(args.iter().copied())).unwrap()
    }

    fn run_args(args: &[&str]) -> RunArgs {
        match parse(args).command {
            Commands::Run(run) => run,
            Commands::Config { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_flags_and_trailing_command() {
        let args = run_args(&[
            "run",
            "--shard",
            "2/3",
            "--pool",
            "vmThreads",
            "--coverage-thresholds-lines",
            "-10",
            "--fake-timers",
            "setTimeout,nextTick",
            "--",
            "npm",
            "test",
        ]);
        assert_eq!(args.overrides.shard.as_deref(), Some("2/3"));
        assert_eq!(args.overrides.pool, Some(Pool::VmThreads));
        assert_eq!(args.overrides.coverage_thresholds_lines, Some(-10.0));
        assert_eq!(args.overrides.fake_timers, ["setTimeout", "nextTick"]);
        assert_eq!(args.command, ["npm", "test"]);
    }

    #[test]
    fn test_overrides_layer_on_file_config() {
        let mut config = RunnerConfig::from_toml_str(
            "[test]\npool = \"threads\"\n[test.coverage.thresholds]\nlines = 50\nfunctions = 60\n",
        )
        .unwrap();
        let args = run_args(&[
            "run",
            "--inspect-brk",
            "--no-file-parallelism",
            "--coverage",
            "--coverage-provider",
            "istanbul",
            "--coverage-thresholds-lines",
            "80",
            "--coverage-thresholds-100",
            "--browser",
            "--browser-provider",
            "webdriverio",
        ]);
        args.overrides.apply(&mut config);

        assert_eq!(config.pool, Pool::Threads);
        assert!(config.inspect.brk && !config.inspect.enabled);
        assert!(!config.file_parallelism);
        assert!(config.coverage.enabled);
        assert_eq!(config.coverage.provider, CoverageProviderKind::Istanbul);
        assert_eq!(config.coverage.thresholds.lines, Some(80.0));
        assert_eq!(config.coverage.thresholds.functions, Some(60.0));
        assert!(config.coverage.thresholds.hundred);
        assert!(config.browser.enabled);
        assert_eq!(config.browser.provider, "webdriverio");
        assert_eq!(config.browser.name, None);
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let original = RunnerConfig::from_toml_str("[test]\nwatch = true\n").unwrap();
        let mut config = original.clone();
        ConfigOverrides::default().apply(&mut config);
        assert_eq!(config.to_toml_string().unwrap(), original.to_toml_string().unwrap());
    }

    #[test]
    fn test_config_subcommands_parse() {
        assert!(matches!(
            parse(&["config", "validate", "--watch", "--merge-reports", "out"]).command,
            Commands::Config {
                cmd: ConfigCommands::Validate { .. }
            }
        ));
        let cli = parse(&["config", "show", "--format", "json"]);
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
