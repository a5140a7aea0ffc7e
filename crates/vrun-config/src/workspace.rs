//! Expansion of `workspace` entries into per-project settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::{CONFIG_FILE_NAME, ProjectConfig, RunnerConfig, WorkspaceEntry};

#[derive(Debug, Default, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    test: ProjectConfig,
}

/// Resolve every workspace entry relative to `root`.
///
/// Glob matches that are directories contribute their `vrun.toml` (and are
/// skipped without one); file matches are read directly. Glob results come
/// back sorted, so project order is stable across runs.
pub fn resolve_projects(config: &RunnerConfig, root: &Path) -> Result<Vec<ProjectConfig>> {
    let mut projects = Vec::new();
    for entry in &config.workspace {
        match entry {
            WorkspaceEntry::Project(project) => projects.push(project.clone()),
            WorkspaceEntry::Pattern(pattern) => {
                let full = root.join(pattern);
                let full = full.to_string_lossy();
                let matches = glob::glob(&full)
                    .with_context(|| format!("Invalid workspace pattern '{pattern}'"))?;
                for path in matches {
                    let path = path.with_context(|| format!("Failed to expand '{pattern}'"))?;
                    if let Some(project) = load_project(&path)? {
                        debug!(
                            name = project.display_name(),
                            root = ?project.root,
                            "loaded workspace project"
                        );
                        projects.push(project);
                    }
                }
            }
        }
    }
    debug!(count = projects.len(), "resolved workspace projects");
    Ok(projects)
}

fn load_project(path: &Path) -> Result<Option<ProjectConfig>> {
    let (file, dir): (PathBuf, &Path) = if path.is_dir() {
        (path.join(CONFIG_FILE_NAME), path)
    } else {
        (path.to_path_buf(), path.parent().unwrap_or(path))
    };
    if !file.is_file() {
        debug!("skipping workspace entry without config: {}", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read project config: {}", file.display()))?;
    let parsed: ProjectFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse project config: {}", file.display()))?;

    let mut project = parsed.test;
    if project.name.is_none() {
        project.name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
    }
    project.root = Some(match &project.root {
        Some(root) => crate::paths::resolve(dir, root),
        None => dir.to_path_buf(),
    });
    Ok(Some(project))
}

/// Projects the validators should look at.
///
/// Falls back to the inline entries when the loader has not expanded globs,
/// which is the case for configs built in memory.
pub fn effective_projects(config: &RunnerConfig) -> Vec<&ProjectConfig> {
    if !config.projects.is_empty() {
        return config.projects.iter().collect();
    }
    config
        .workspace
        .iter()
        .filter_map(|entry| match entry {
            WorkspaceEntry::Project(project) => Some(project),
            WorkspaceEntry::Pattern(_) => None,
        })
        .collect()
}
