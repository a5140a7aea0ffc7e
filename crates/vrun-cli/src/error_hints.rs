//! User-facing error hints for common CLI failures.
//!
//! Match on error type/message and return an actionable suggestion with a
//! concrete command.

use anyhow::Error;

const HINT_COMMAND_NOT_FOUND: &str =
    "hint: check that the test command is installed and on PATH, e.g. vrun run -- npx vitest run";
const HINT_CONFIG_ERROR: &str =
    "hint: options live under the [test] table of vrun.toml; check them with 'vrun config show'";
const HINT_WORKSPACE: &str =
    "hint: workspace entries are globs relative to the project root, e.g. \"packages/*\"";
const HINT_SUMMARY: &str =
    "hint: the test command must write an istanbul json-summary (coverage-summary.json) into coverage.reportsDirectory";

pub fn suggest_fix(err: &Error) -> Option<String> {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
            if io_err.kind() == std::io::ErrorKind::NotFound
                && err.chain().any(|c| c.to_string().contains("spawn"))
            {
                return Some(HINT_COMMAND_NOT_FOUND.to_string());
            }
        }
    }

    let chain_text = err
        .chain()
        .map(|cause| cause.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .join(" | ");

    if chain_text.contains("coverage summary") {
        return Some(HINT_SUMMARY.to_string());
    }

    if chain_text.contains("workspace") || chain_text.contains("project config") {
        return Some(HINT_WORKSPACE.to_string());
    }

    if chain_text.contains("config")
        && (chain_text.contains("invalid")
            || chain_text.contains("missing")
            || chain_text.contains("parse"))
    {
        return Some(HINT_CONFIG_ERROR.to_string());
    }

    None
}
