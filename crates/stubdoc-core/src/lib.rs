//! Stubdoc Core - Documentation toolkit for MicroPython stub packages
//!
//! This crate provides the core functionality:
//! - Origin: micropython-lib checkout scanning and module attribution
//! - Docstring: reverting stub-generator rewrites and appending install notes
//! - Stage: copying library modules into the documentation tree
//! - Diff: line diffing and similarity scoring
//! - Filters: noise filtering for documentation page diffs
//! - Compare: built pages checked against the published reference site
//! - Postprocess: cleanup of generated HTML output

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project configuration (`stubdoc.toml`)
pub mod config;

/// Module origin discovery - maps module names to micropython-lib sources
pub mod origin;

/// Docstring processing - reverts stub rewrites, appends install notes
pub mod docstring;

/// Module staging - copies library modules into the documentation tree
pub mod stage;

/// Text normalization shared by page extraction and comparison
pub mod normalize;

/// Line diffing and similarity scoring
pub mod diff;

/// Noise filters for documentation page diffs
pub mod filters;

/// Page comparison against the published reference site
pub mod compare;

/// Cleanup passes over generated HTML output
pub mod postprocess;

/// Convenience re-export of the configuration model
pub use config::Config;

/// Convenience re-export of the docstring processor
pub use docstring::{DocstringProcessor, EntityKind};

/// Convenience re-export of origin types
pub use origin::{ModuleOrigin, OriginRegistry, SourceCollection};

/// Convenience re-export of diff types
pub use diff::{diff_lines, similarity_ratio, DiffLine, DiffTag};

/// Convenience re-export of the page comparator
pub use compare::{PageComparator, ReferenceCache};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }

    /// Helper building a registry with one known micropython-lib module
    fn registry_with(name: &str) -> OriginRegistry {
        let mut registry = OriginRegistry::new();
        registry.insert(ModuleOrigin {
            name: name.to_string(),
            source_path: PathBuf::from(format!("micropython/{name}/{name}.py")),
            collection: SourceCollection::Micropython,
        });
        registry
    }

    #[test]
    fn test_docstring_pipeline_end_to_end() {
        let processor = DocstringProcessor::new(registry_with("umqtt.simple")).unwrap();
        let mut lines = vec![
            "MicroPython module: https://docs.micropython.org/en/latest/library/os.html".to_string(),
            String::new(),
            "CPython module: os https://docs.python.org/3/library/os.html .".to_string(),
            "``Note:`` behavior differs on ports.".to_string(),
        ];
        processor.process_docstring(EntityKind::Module, "umqtt.simple", &mut lines);

        // The install note lands before rewrites are reverted, so rules
        // apply to the appended lines too; none of them match any rule.
        assert_eq!(lines[0], "|see_cpython_module| os.");
        assert_eq!(lines[1], ".. note:: behavior differs on ports.");
        assert!(lines.iter().any(|l| l == "        mpremote mip install umqtt.simple"));
        assert!(lines.iter().any(|l| l.contains(
            "https://github.com/micropython/micropython-lib/tree/master/micropython/umqtt.simple"
        )));
    }

    #[test]
    fn test_page_verdict_pipeline() {
        let reference: Vec<String> = [
            "os \u{2013} basic \u{201c}operating system\u{201d} services",
            "Functions",
            "os.chdir(path)",
            "os.getcwd()",
            "This is the v1.23.0 version of the MicroPython",
            "documentation. The latest",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
        let local: Vec<String> = [
            "os \u{2013} basic \u{201c}operating system\u{201d} services",
            "Basic \u{201c}operating system\u{201d} services.",
            "os.chdir(path: str)",
            "os.getcwd()",
            "RETENTION = 30",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();

        let diff = diff_lines(&reference, &local);
        let filtered = filters::filter_page_diff(diff, &local);

        // Version banner, heading, signature pair, new assignment, and the
        // title echo are all noise; nothing survives the pipeline.
        assert!(filtered.is_empty());

        let ratio = similarity_ratio(&reference, &local);
        assert!(ratio > 0.15 && ratio < 1.0);
    }
}
