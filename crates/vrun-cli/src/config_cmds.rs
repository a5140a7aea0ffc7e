use anyhow::Result;
use serde::Serialize;

use vrun_config::{FAILURE_EXIT_CODE, emit_fatal, emit_warnings, run_preflight};
use vrun_core::types::OutputFormat;
use vrun_core::{Diagnostic, RunnerError};

use crate::cli::{ConfigOverrides, ConfigSource};
use crate::pipeline;

pub(crate) fn handle_config_show(
    source: ConfigSource,
    overrides: ConfigOverrides,
    format: OutputFormat,
) -> Result<()> {
    let loaded = pipeline::load_config(&source, &overrides)?;
    match format {
        OutputFormat::Json => {
            let json_str = serde_json::to_string_pretty(&loaded.config)?;
            println!("{}", json_str);
        }
        OutputFormat::Text => {
            print!("{}", loaded.config.to_toml_string()?);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ValidationOutput {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorOutput>,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ErrorOutput {
    kind: String,
    message: String,
}

impl ValidationOutput {
    fn new(result: &std::result::Result<Vec<Diagnostic>, RunnerError>) -> Self {
        match result {
            Ok(warnings) => Self {
                valid: true,
                error: None,
                warnings: warnings.iter().map(Diagnostic::message).collect(),
            },
            Err(err) => Self {
                valid: false,
                error: Some(ErrorOutput {
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                }),
                warnings: Vec::new(),
            },
        }
    }
}

/// Run pre-flight only. Returns the process exit code.
pub(crate) fn handle_config_validate(
    source: ConfigSource,
    overrides: ConfigOverrides,
    format: OutputFormat,
) -> Result<i32> {
    let loaded = pipeline::load_config(&source, &overrides)?;
    let result = run_preflight(&loaded.config, &loaded.env);

    match format {
        OutputFormat::Json => {
            let output = ValidationOutput::new(&result.clone().map(|report| report.warnings));
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(if output.valid { 0 } else { FAILURE_EXIT_CODE })
        }
        OutputFormat::Text => {
            let mut stderr = std::io::stderr();
            match result {
                Ok(report) => {
                    emit_warnings(&report, &mut stderr);
                    match &loaded.env.config_file {
                        Some(path) => eprintln!("Configuration is valid: {}", path.display()),
                        None => eprintln!("Configuration is valid (defaults)"),
                    }
                    Ok(0)
                }
                Err(err) => Ok(emit_fatal(&err, &mut stderr)),
            }
        }
    }
}
