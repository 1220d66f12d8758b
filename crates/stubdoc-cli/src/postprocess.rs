//! Output cleanup for `stubdoc postprocess`.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use stubdoc_core::config::Config;
use stubdoc_core::postprocess::scrub_incomplete_markers;

/// Options for the generated-output scrub.
#[derive(Debug, Clone, Default)]
pub struct PostprocessOptions {
    /// Build output directory (defaults to configuration).
    pub out_dir: Option<PathBuf>,
}

/// Replace placeholder type names across the generated HTML.
pub fn scrub_output(options: PostprocessOptions) -> Result<()> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let config = Config::load_or_default(&current_dir).context("Failed to load stubdoc.toml")?;

    let out_dir = options.out_dir.unwrap_or(config.check.build_dir);
    let rewritten = scrub_incomplete_markers(&out_dir)
        .with_context(|| format!("Failed to scrub output under `{}`", out_dir.display()))?;

    println!("Rewrote {} files in `{}`", rewritten, out_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scrub_output_rewrites_markers() {
        let tmp = TempDir::new().unwrap();
        let page = tmp.path().join("library/os.html");
        fs::create_dir_all(page.parent().unwrap()).unwrap();
        fs::write(&page, "<span>_typeshed.Incomplete</span>").unwrap();

        let options = PostprocessOptions {
            out_dir: Some(tmp.path().to_path_buf()),
        };
        scrub_output(options).unwrap();

        let content = fs::read_to_string(&page).unwrap();
        assert_eq!(content, "<span>Incomplete</span>");
    }

    #[test]
    fn test_scrub_output_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let options = PostprocessOptions {
            out_dir: Some(tmp.path().join("nowhere")),
        };
        assert!(scrub_output(options).is_err());
    }
}
