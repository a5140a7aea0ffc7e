//! Path resolution used before destructive filesystem operations.
//!
//! Paths are compared lexically first, so directories that do not exist yet
//! (a reports directory before the first run) can still be checked. When both
//! sides exist they are also compared after symlink resolution.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize `path`: drop `.` segments and fold `..` into the
/// preceding segment. Never climbs above the filesystem root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(segment) => out.push(segment),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolve `path` against `base` (when relative) and normalize the result.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Whether two resolved paths name the same directory.
pub fn same_location(a: &Path, b: &Path) -> bool {
    if normalize(a) == normalize(b) {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Whether removing `target` would remove one of the `protected` directories.
pub fn is_protected(target: &Path, protected: &[&Path]) -> bool {
    protected.iter().any(|dir| same_location(target, dir))
}
