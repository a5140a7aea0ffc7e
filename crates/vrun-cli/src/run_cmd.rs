//! `vrun run` command handler.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use vrun_config::summary::SUMMARY_FILE_NAME;
use vrun_config::{
    CoverageProvider, CoverageSummary, FAILURE_EXIT_CODE, RunnerConfig, auto_update_thresholds,
    check_thresholds, emit_fatal, emit_warnings, load_coverage_provider, run_preflight,
};
use vrun_core::Diagnostic;

use crate::cli::RunArgs;
use crate::pipeline::{self, LoadedConfig};

pub(crate) async fn handle_run(args: RunArgs) -> Result<i32> {
    let loaded = pipeline::load_config(&args.source, &args.overrides)?;
    let LoadedConfig { config, env } = &loaded;
    let mut stderr = std::io::stderr();

    // 1. Pre-flight: nothing has been touched yet.
    let report = match run_preflight(config, env) {
        Ok(report) => report,
        Err(err) => return Ok(emit_fatal(&err, &mut stderr)),
    };
    emit_warnings(&report, &mut stderr);

    let root = loaded.root();
    println!(" RUN  v{} {}", env!("CARGO_PKG_VERSION"), root.display());
    std::io::stdout().flush().ok();

    // 2. Provider load, after the banner and before anything runs.
    let provider = match load_coverage_provider(config, &root).await {
        Ok(provider) => provider,
        Err(err) => return Ok(emit_fatal(&err, &mut stderr)),
    };
    let reports_dir = vrun_config::paths::resolve(&root, &config.coverage.reports_directory);
    if let Some(provider) = &provider {
        info!(provider = provider.name(), "coverage enabled");
        if config.coverage.clean {
            clean_reports_directory(&reports_dir).await?;
        }
    }

    // 3. Hand off.
    let mut exit_code = execute(config, &root, &args.command).await?;

    // 4. Post-run thresholds.
    if let Some(provider) = &provider {
        let failed = check_coverage(config, provider, &reports_dir, exit_code == 0, env.config_file.as_deref())?;
        if failed && exit_code == 0 {
            exit_code = FAILURE_EXIT_CODE;
        }
    }
    Ok(exit_code)
}

async fn clean_reports_directory(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!("removed {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to clean {}", dir.display()));
        }
    }
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))
}

async fn execute(config: &RunnerConfig, root: &Path, command: &[String]) -> Result<i32> {
    let Some((program, rest)) = command.split_first() else {
        info!("no test command given, skipping execution");
        return Ok(0);
    };
    if config.watch {
        debug!("watch mode is left to the test command");
    }

    let status = tokio::process::Command::new(program)
        .args(rest)
        .envs(pipeline::build_child_env(config, root))
        .current_dir(root)
        .stdin(std::process::Stdio::inherit())
        .stdout(std::process::Stdio::inherit())
        .stderr(std::process::Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("Failed to spawn test command '{program}'"))?;

    let code = status.code().unwrap_or(1);
    debug!(code, "test command finished");
    Ok(code)
}

/// Print threshold failures; returns whether any threshold failed.
fn check_coverage(
    config: &RunnerConfig,
    provider: &CoverageProvider,
    reports_dir: &Path,
    run_passed: bool,
    config_file: Option<&Path>,
) -> Result<bool> {
    let thresholds = &config.coverage.thresholds;
    if thresholds.is_empty() {
        return Ok(false);
    }

    let summary_path = reports_dir.join(SUMMARY_FILE_NAME);
    let summary = if summary_path.is_file() {
        CoverageSummary::load(&summary_path)?
    } else {
        warn!(
            provider = provider.name(),
            "no coverage summary at {}, treating coverage as 0%",
            summary_path.display()
        );
        CoverageSummary::default()
    };

    let errors = check_thresholds(thresholds, &summary);
    let mut stderr = std::io::stderr();
    for err in &errors {
        writeln!(stderr, "{}", Diagnostic::Fatal(err.clone()).render()).ok();
    }
    if !errors.is_empty() {
        return Ok(true);
    }

    if thresholds.auto_update && run_passed {
        if let Some(path) = config_file {
            for (metric, value) in auto_update_thresholds(path, thresholds, &summary)? {
                eprintln!("Updated coverage.thresholds.{metric} to {value}");
            }
        }
    }
    Ok(false)
}
