//! Staging of stub modules into the documentation tree
//!
//! The doc generator expects one package directory per documented module.
//! Staging copies each discovered `<name>.py` to
//! `<dest>/<name>/__init__.<ext>` and guarantees the copied source opens
//! with a docstring, so every generated page has a title paragraph.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::origin::{OriginRegistry, SKIP_MODULES};

/// Errors that can occur while staging modules.
#[derive(Error, Debug)]
pub enum StageError {
    /// A module source could not be read.
    #[error("failed to read module source '{path}': {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A staged file or its directory could not be written.
    #[error("failed to write staged module '{path}': {source}")]
    WriteStage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The staging area could not be listed.
    #[error("failed to list staged modules '{path}': {source}")]
    ListStage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A module source path has no usable file stem.
    #[error("module source '{0}' has no file stem")]
    InvalidSource(PathBuf),
}

/// Stage a single module source as a package directory.
///
/// `ext` is the staged extension without the leading dot. Returns the path
/// of the staged `__init__` file.
pub fn stage_module(source: &Path, dest_root: &Path, ext: &str) -> Result<PathBuf, StageError> {
    let name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| StageError::InvalidSource(source.to_path_buf()))?;

    let content = fs::read_to_string(source).map_err(|e| StageError::ReadSource {
        path: source.to_path_buf(),
        source: e,
    })?;
    let staged = ensure_docstring(name, &content);

    let dest = dest_root.join(name).join(format!("__init__.{ext}"));
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| StageError::WriteStage {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(&dest, staged).map_err(|e| StageError::WriteStage {
        path: dest.clone(),
        source: e,
    })?;
    Ok(dest)
}

/// Stage every module in the registry, in name order.
pub fn stage_modules(
    registry: &OriginRegistry,
    dest_root: &Path,
    ext: &str,
) -> Result<Vec<PathBuf>, StageError> {
    let mut staged = Vec::with_capacity(registry.len());
    for name in registry.names() {
        if let Some(origin) = registry.get(name) {
            staged.push(stage_module(&origin.source_path, dest_root, ext)?);
        }
    }
    Ok(staged)
}

/// List the staged package directories, sorted.
///
/// Placeholder entries that must never be documented are skipped.
pub fn package_dirs(stub_root: &Path) -> Result<Vec<PathBuf>, StageError> {
    let entries = fs::read_dir(stub_root).map_err(|e| StageError::ListStage {
        path: stub_root.to_path_buf(),
        source: e,
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StageError::ListStage {
            path: stub_root.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let skipped = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| SKIP_MODULES.contains(&name));
        if !skipped {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Prepend a synthetic docstring when the source does not open with one.
fn ensure_docstring(name: &str, content: &str) -> String {
    let first = content.lines().next().unwrap_or("").trim_start();
    if first.starts_with("\"\"\"") || first.starts_with("'''") {
        content.to_string()
    } else {
        format!("\"\"\"Module: {name}\"\"\"\n{content}")
    }
}
