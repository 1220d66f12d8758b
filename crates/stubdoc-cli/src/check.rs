//! Page checking for `stubdoc check`.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use stubdoc_core::compare::PageComparator;
use stubdoc_core::config::{CheckConfig, Config};

/// Options for checking built pages against the reference site.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Pages to check; discovered from the source tree when empty.
    pub pages: Vec<String>,

    /// Build output directory (defaults to configuration).
    pub build_dir: Option<PathBuf>,

    /// Reference site base URL (defaults to configuration).
    pub base_url: Option<String>,

    /// Documentation version (defaults to configuration).
    pub docs_version: Option<String>,

    /// Per-page failure threshold (defaults to configuration).
    pub max_missing: Option<usize>,
}

/// Compare built pages against the reference site.
///
/// Pages that cannot be compared (unreadable local file, unreachable
/// reference) count as failed without aborting the rest of the run.
pub fn check_pages(options: CheckOptions) -> Result<()> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let config = Config::load_or_default(&current_dir).context("Failed to load stubdoc.toml")?;

    let mut check = config.check;
    if let Some(build_dir) = options.build_dir {
        check.build_dir = build_dir;
    }
    if let Some(base_url) = options.base_url {
        check.base_url = base_url;
    }
    if let Some(docs_version) = options.docs_version {
        check.docs_version = docs_version;
    }
    if let Some(max_missing) = options.max_missing {
        check.max_missing = max_missing;
    }

    let pages = if options.pages.is_empty() {
        discover_pages(&check.source_dir)?
    } else {
        options.pages
    };
    if pages.is_empty() {
        bail!(
            "No documented pages found under `{}`",
            check.source_dir.display()
        );
    }

    let comparator = PageComparator::new().context("Failed to build the HTTP client")?;

    let mut failed = 0_usize;
    for page in &pages {
        if !check_page(&comparator, &check, page) {
            failed += 1;
        }
    }

    println!("{} pages checked, {} failed", pages.len(), failed);
    if failed > 0 {
        bail!("{failed} of {} pages differ from the reference", pages.len());
    }
    Ok(())
}

/// Check one page; prints its result and returns whether it passed.
fn check_page(comparator: &PageComparator, check: &CheckConfig, page: &str) -> bool {
    let local = check.page_file(page);
    let url = check.page_url(page);

    let residue = match comparator.compare(&local, &url) {
        Ok(residue) => residue,
        Err(err) => {
            eprintln!("{page}: {err}");
            return false;
        }
    };
    let missing = residue.iter().filter(|line| line.is_removed()).count();
    let passed = missing < check.max_missing;

    match comparator.similarity(&local, &url) {
        Ok(ratio) => println!("{page}: {missing} missing lines, similarity {ratio:.3}"),
        Err(_) => println!("{page}: {missing} missing lines"),
    }
    if !passed {
        for line in &residue {
            println!("  {line}");
        }
    }
    passed
}

/// Discover documented pages from the source tree.
///
/// Every `library/*.rst` source that pulls in generated module content
/// yields the page `library/<stem>`.
fn discover_pages(source_dir: &Path) -> Result<Vec<String>> {
    let library_dir = source_dir.join("library");
    if !library_dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&library_dir)
        .with_context(|| format!("Failed to list `{}`", library_dir.display()))?;

    let mut pages = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list `{}`", library_dir.display()))?
            .path();
        if path.extension().and_then(|e| e.to_str()) != Some("rst") {
            continue;
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read `{}`", path.display()))?;
        if !content.contains("autoapi") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            pages.push(format!("library/{stem}"));
        }
    }
    pages.sort();
    Ok(pages)
}
