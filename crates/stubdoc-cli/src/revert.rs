//! Docstring reversion for `stubdoc revert`.

use anyhow::{Context, Result};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use stubdoc_core::config::Config;
use stubdoc_core::docstring::{DocstringProcessor, EntityKind};
use stubdoc_core::origin::OriginRegistry;

/// Options for the docstring reverter.
#[derive(Debug, Clone)]
pub struct RevertOptions {
    /// Module name the docstring belongs to.
    pub name: String,

    /// Library checkout used to look up the module's origin.
    pub library: Option<PathBuf>,
}

/// Read a module docstring from stdin, process it, and print the result.
pub fn revert_docstring(options: RevertOptions) -> Result<()> {
    let lines: Vec<String> = io::stdin()
        .lock()
        .lines()
        .collect::<io::Result<_>>()
        .context("Failed to read docstring from stdin")?;

    let processed = process_lines(&options, lines)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in processed {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn process_lines(options: &RevertOptions, mut lines: Vec<String>) -> Result<Vec<String>> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let config = Config::load_or_default(&current_dir).context("Failed to load stubdoc.toml")?;

    // An explicit checkout must exist; the configured default is optional,
    // reversion works without origin data (no install note then).
    let registry = match &options.library {
        Some(library) => OriginRegistry::discover(library).with_context(|| {
            format!("Failed to scan library checkout at `{}`", library.display())
        })?,
        None if config.stage.library.is_dir() => OriginRegistry::discover(&config.stage.library)?,
        None => OriginRegistry::new(),
    };

    let processor =
        DocstringProcessor::new(registry).context("Failed to build the docstring processor")?;
    processor.process_docstring(EntityKind::Module, &options.name, &mut lines);
    Ok(lines)
}
