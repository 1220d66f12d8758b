//! Post-build scrub of generated HTML
//!
//! Stub sources use a placeholder type for values the generator could not
//! infer. The rendered pages read better without the placeholder's module
//! qualifier, so after a successful build every generated HTML file is
//! rewritten once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder type name the stub generator leaves in signatures.
pub const INCOMPLETE_MARKER: &str = "_typeshed.Incomplete";

const INCOMPLETE_REPLACEMENT: &str = "Incomplete";

/// Errors that can occur while scrubbing build output.
#[derive(Error, Debug)]
pub enum PostprocessError {
    /// The build output directory does not exist.
    #[error("build output directory not found at '{0}'")]
    MissingOutput(PathBuf),

    /// Glob pattern error.
    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A generated file could not be read or written back.
    #[error("failed to rewrite '{path}': {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// IO error while walking the output tree.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Replace the placeholder type name in every HTML file under `out_dir`.
///
/// Intended to run only after a successful build. Files without the
/// marker are left untouched; returns the number of files rewritten.
pub fn scrub_incomplete_markers(out_dir: &Path) -> Result<usize, PostprocessError> {
    if !out_dir.is_dir() {
        return Err(PostprocessError::MissingOutput(out_dir.to_path_buf()));
    }

    let pattern = out_dir.join("**").join("*.html");
    let mut rewritten = 0;
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let path = entry.map_err(|e| PostprocessError::Io(e.into_error()))?;
        let content = fs::read_to_string(&path).map_err(|e| PostprocessError::Rewrite {
            path: path.clone(),
            source: e,
        })?;
        if !content.contains(INCOMPLETE_MARKER) {
            continue;
        }
        let scrubbed = content.replace(INCOMPLETE_MARKER, INCOMPLETE_REPLACEMENT);
        fs::write(&path, scrubbed).map_err(|e| PostprocessError::Rewrite {
            path: path.clone(),
            source: e,
        })?;
        rewritten += 1;
    }
    Ok(rewritten)
}
