//! Module staging for `stubdoc stage`.

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use stubdoc_core::config::Config;
use stubdoc_core::origin::OriginRegistry;
use stubdoc_core::stage::stage_modules;

/// Options for staging stub modules.
#[derive(Debug, Clone, Default)]
pub struct StageOptions {
    /// Library checkout to stage from (defaults to configuration).
    pub library: Option<PathBuf>,

    /// Destination directory (defaults to configuration).
    pub destination: Option<PathBuf>,

    /// Staged file extension (defaults to configuration).
    pub extension: Option<String>,
}

/// Stage every discovered stub module into the documentation tree.
pub fn stage_stubs(options: StageOptions) -> Result<()> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let config = Config::load_or_default(&current_dir).context("Failed to load stubdoc.toml")?;

    let library = options.library.unwrap_or(config.stage.library);
    let destination = options.destination.unwrap_or(config.stage.destination);
    let extension = options.extension.unwrap_or(config.stage.extension);

    let registry = OriginRegistry::discover(&library)
        .with_context(|| format!("Failed to scan library checkout at `{}`", library.display()))?;
    if registry.is_empty() {
        bail!("No stub modules found under `{}`", library.display());
    }

    let staged =
        stage_modules(&registry, &destination, &extension).context("Failed to stage modules")?;

    println!(
        "Staged {} modules into `{}`",
        staged.len(),
        destination.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_stage_stubs_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let library = tmp.path().join("micropython-lib");
        fs::create_dir_all(library.join("micropython/aioble")).unwrap();
        fs::write(
            library.join("micropython/aioble/aioble.py"),
            "\"\"\"BLE support.\"\"\"\n",
        )
        .unwrap();
        let destination = tmp.path().join("stubs");

        let options = StageOptions {
            library: Some(library),
            destination: Some(destination.clone()),
            extension: Some("py".to_string()),
        };
        stage_stubs(options).unwrap();

        assert!(destination.join("aioble/__init__.py").exists());
    }

    #[test]
    fn test_stage_stubs_empty_checkout_fails() {
        let tmp = TempDir::new().unwrap();
        let library = tmp.path().join("micropython-lib");
        fs::create_dir_all(library.join("micropython")).unwrap();

        let options = StageOptions {
            library: Some(library),
            destination: Some(tmp.path().join("stubs")),
            extension: None,
        };
        assert!(stage_stubs(options).is_err());
    }

    #[test]
    fn test_stage_stubs_missing_checkout_fails() {
        let tmp = TempDir::new().unwrap();
        let options = StageOptions {
            library: Some(tmp.path().join("nowhere")),
            destination: Some(tmp.path().join("stubs")),
            extension: None,
        };
        assert!(stage_stubs(options).is_err());
    }
}
