//! Docstring reversion and install-note injection
//!
//! The stub generator flattens reStructuredText markup into plain text so
//! the stubs read well in an editor. Before the documentation build renders
//! a docstring, [`DocstringProcessor`] undoes those rewrites and, for
//! modules staged from the library collections, appends an install note.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use thiserror::Error;

use crate::origin::OriginRegistry;

/// Marker the stub generator inserts at the top of module docstrings.
pub const MICROPYTHON_MARKER: &str = "MicroPython module:";

/// Flattened literal forms and the markup they revert to. Every rule is
/// applied to every line, in this order; no replacement text matches a
/// later pattern, so the pass is stable.
const LITERAL_REWRITES: &[(&str, &str)] = &[
    ("``Note:`` ", ".. note:: "),
    ("\"Note:\" ", ".. note:: "),
    ("``Admonition:`` ", ".. admonition:: "),
    ("``Data:`` ", ".. data:: "),
];

/// Errors that can occur while processing docstrings.
#[derive(Error, Debug)]
pub enum DocstringError {
    /// The documentation framework passed an entity kind outside the known
    /// set.
    #[error("unknown entity kind '{0}'")]
    UnknownEntityKind(String),

    /// A rewrite pattern failed to compile.
    #[error("invalid rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Kind of documented entity a docstring belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Module,
    Package,
    Class,
    Function,
    Method,
    Attribute,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Module => "module",
            EntityKind::Package => "package",
            EntityKind::Class => "class",
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Attribute => "attribute",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DocstringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "module" => Ok(EntityKind::Module),
            "package" => Ok(EntityKind::Package),
            "class" => Ok(EntityKind::Class),
            "function" => Ok(EntityKind::Function),
            "method" => Ok(EntityKind::Method),
            "attribute" => Ok(EntityKind::Attribute),
            other => Err(DocstringError::UnknownEntityKind(other.to_string())),
        }
    }
}

/// Reverts stub-generator rewrites and annotates external-library modules.
pub struct DocstringProcessor {
    cpython_reference: Regex,
    registry: OriginRegistry,
}

impl DocstringProcessor {
    /// Create a processor over a module origin registry.
    pub fn new(registry: OriginRegistry) -> Result<Self, DocstringError> {
        Ok(Self {
            cpython_reference: Regex::new(r"CPython module: (\w+).*")?,
            registry,
        })
    }

    /// Hook entry point, invoked once per documented entity.
    ///
    /// Acts only on module and package docstrings: appends the install
    /// note when the module is registered, then reverts the stub rewrites.
    /// Docstrings of other entity kinds are left untouched.
    pub fn process_docstring(&self, kind: EntityKind, name: &str, lines: &mut Vec<String>) {
        if !matches!(kind, EntityKind::Module | EntityKind::Package) {
            return;
        }
        self.append_install_note(name, lines);
        self.revert_stub_rewrites(lines);
    }

    /// Undo the stub generator's docstring rewrites in place.
    ///
    /// Removes the first provenance marker line (and a following blank
    /// line), then applies every rewrite rule to every remaining line.
    pub fn revert_stub_rewrites(&self, lines: &mut Vec<String>) {
        remove_provenance_marker(lines);
        for line in lines.iter_mut() {
            let reverted = self.cpython_reference.replace(line, "|see_cpython_module| ${1}.");
            let mut text = reverted.into_owned();
            for (flattened, markup) in LITERAL_REWRITES {
                text = text.replace(flattened, markup);
            }
            *line = text;
        }
    }

    /// Append the install callout for a module staged from a library
    /// collection. No-op when `name` is not registered.
    pub fn append_install_note(&self, name: &str, lines: &mut Vec<String>) {
        let Some(origin) = self.registry.get(name) else {
            return;
        };
        lines.extend([
            String::new(),
            ".. admonition:: Tip".to_string(),
            String::new(),
            format!(
                "    This is a {} module from the micropython-lib repository.",
                origin.collection
            ),
            "    It can be installed to a MicroPython board using:".to_string(),
            String::new(),
            "    .. code-block:: bash".to_string(),
            String::new(),
            format!("        mpremote mip install {name}"),
            String::new(),
            format!("    Source: {}", origin.repository_url()),
        ]);
    }
}

/// Remove the first provenance marker line, plus a directly following
/// blank line. Later occurrences are left alone.
fn remove_provenance_marker(lines: &mut Vec<String>) {
    if let Some(pos) = lines
        .iter()
        .position(|line| line.starts_with(MICROPYTHON_MARKER))
    {
        lines.remove(pos);
        if lines.get(pos).is_some_and(|line| line.is_empty()) {
            lines.remove(pos);
        }
    }
}
