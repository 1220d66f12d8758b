//! Module origin tracking for stubs taken from the library collections
//!
//! A micropython-lib checkout groups installable modules into collections
//! (`micropython`, `python-stdlib`, `python-ecosys`), one directory per
//! module with the module source named after the directory. Discovery
//! scans a checkout and records where every module came from; the
//! docstring processor uses the registry to emit install notes.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory names that are never real modules.
pub const SKIP_MODULES: &[&str] = &["__pycache__", "__builtins__"];

/// Errors that can occur while scanning a library checkout.
#[derive(Error, Debug)]
pub enum OriginError {
    /// The checkout root does not exist or is not a directory.
    #[error("library checkout not found at '{0}'")]
    MissingCheckout(PathBuf),

    /// Glob pattern error.
    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Library collections recognized inside a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceCollection {
    Micropython,
    PythonStdlib,
    PythonEcosys,
}

impl SourceCollection {
    /// All collections, in scan order.
    pub const ALL: [SourceCollection; 3] = [
        SourceCollection::Micropython,
        SourceCollection::PythonStdlib,
        SourceCollection::PythonEcosys,
    ];

    /// Directory name of this collection inside the checkout.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            SourceCollection::Micropython => "micropython",
            SourceCollection::PythonStdlib => "python-stdlib",
            SourceCollection::PythonEcosys => "python-ecosys",
        }
    }
}

impl fmt::Display for SourceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Where a documented module's source came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOrigin {
    /// Module name as documented.
    pub name: String,
    /// Stub source file the module was staged from.
    pub source_path: PathBuf,
    /// Collection the module belongs to.
    pub collection: SourceCollection,
}

impl ModuleOrigin {
    /// Upstream tree URL for this module.
    #[must_use]
    pub fn repository_url(&self) -> String {
        format!(
            "https://github.com/micropython/micropython-lib/tree/master/{}/{}",
            self.collection.dir_name(),
            self.name
        )
    }
}

/// Read-only mapping from module name to its origin.
///
/// Built once by [`OriginRegistry::discover`] and shared by every
/// docstring-processing call afterwards.
#[derive(Debug, Clone, Default)]
pub struct OriginRegistry {
    modules: HashMap<String, ModuleOrigin>,
}

impl OriginRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a library checkout and register every installable module.
    ///
    /// A file counts as a module source when its stem matches its parent
    /// directory name, the layout micropython-lib uses for installable
    /// modules. Top-level directories other than the known collections are
    /// ignored.
    pub fn discover(lib_root: &Path) -> Result<Self, OriginError> {
        if !lib_root.is_dir() {
            return Err(OriginError::MissingCheckout(lib_root.to_path_buf()));
        }

        let mut registry = Self::new();
        for collection in SourceCollection::ALL {
            let collection_dir = lib_root.join(collection.dir_name());
            if !collection_dir.is_dir() {
                continue;
            }
            let pattern = collection_dir.join("**").join("*.py");
            for entry in glob::glob(&pattern.to_string_lossy())? {
                let path = entry.map_err(|e| OriginError::Io(e.into_error()))?;
                if !is_module_source(&path) {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if SKIP_MODULES.contains(&name) {
                    continue;
                }
                registry.insert(ModuleOrigin {
                    name: name.to_string(),
                    source_path: path.clone(),
                    collection,
                });
            }
        }
        Ok(registry)
    }

    /// Register a module origin, replacing any previous entry of the same
    /// name.
    pub fn insert(&mut self, origin: ModuleOrigin) {
        self.modules.insert(origin.name.clone(), origin);
    }

    /// Look up a module by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleOrigin> {
        self.modules.get(name)
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Registered module names, sorted for deterministic output.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// True when the file stem matches its parent directory stem.
fn is_module_source(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str());
    let parent = path.parent().and_then(Path::file_stem).and_then(|s| s.to_str());
    match (stem, parent) {
        (Some(stem), Some(parent)) => stem == parent,
        _ => false,
    }
}
