//! Project configuration (`stubdoc.toml`) parsing

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "stubdoc.toml";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The complete stubdoc.toml configuration.
///
/// Every field has a default, so a missing file or an empty table is
/// valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Module staging settings.
    #[serde(default)]
    pub stage: StageConfig,

    /// Page checking settings.
    #[serde(default)]
    pub check: CheckConfig,
}

/// Settings for staging stub modules into the documentation tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    /// Library checkout to stage modules from.
    #[serde(default = "default_library")]
    pub library: PathBuf,

    /// Staging target inside the documentation tree.
    #[serde(default = "default_destination")]
    pub destination: PathBuf,

    /// Staged file extension, without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            destination: default_destination(),
            extension: default_extension(),
        }
    }
}

/// Settings for checking built pages against the reference site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Base URL of the reference documentation site.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Published documentation version to compare against.
    #[serde(default = "default_docs_version")]
    pub docs_version: String,

    /// Local build output directory holding the generated HTML.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Documentation source directory, scanned for documented pages.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// A page fails when it is missing this many reference lines or more.
    #[serde(default = "default_max_missing")]
    pub max_missing: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            docs_version: default_docs_version(),
            build_dir: default_build_dir(),
            source_dir: default_source_dir(),
            max_missing: default_max_missing(),
        }
    }
}

impl CheckConfig {
    /// Reference URL for a page such as `library/os`.
    #[must_use]
    pub fn page_url(&self, page: &str) -> String {
        format!("{}/{}/{page}.html", self.base_url, self.docs_version)
    }

    /// Local build output file for a page.
    #[must_use]
    pub fn page_file(&self, page: &str) -> PathBuf {
        self.build_dir.join(format!("{page}.html"))
    }
}

fn default_library() -> PathBuf {
    PathBuf::from("micropython-lib")
}

fn default_destination() -> PathBuf {
    PathBuf::from("docs/stubs")
}

fn default_extension() -> String {
    "py".to_string()
}

fn default_base_url() -> String {
    "https://docs.micropython.org/en".to_string()
}

fn default_docs_version() -> String {
    "v1.23.0".to_string()
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("docs/build/html")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_max_missing() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or contains unknown fields.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load `stubdoc.toml` from a directory, falling back to defaults
    /// when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.stage.extension, "py");
        assert_eq!(config.check.docs_version, "v1.23.0");
        assert_eq!(config.check.max_missing, 10);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[check]
docs_version = "v1.24.0"
max_missing = 5
"#,
        )
        .unwrap();
        assert_eq!(config.check.docs_version, "v1.24.0");
        assert_eq!(config.check.max_missing, 5);
        assert_eq!(config.check.base_url, "https://docs.micropython.org/en");
        assert_eq!(config.stage.destination, PathBuf::from("docs/stubs"));
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
[stage]
library = "../micropython-lib"
destination = "docs/stubs"
extension = "pyi"

[check]
base_url = "https://docs.micropython.org/en"
docs_version = "latest"
build_dir = "build/html"
source_dir = "docs"
max_missing = 3
"#,
        )
        .unwrap();
        assert_eq!(config.stage.library, PathBuf::from("../micropython-lib"));
        assert_eq!(config.stage.extension, "pyi");
        assert_eq!(config.check.build_dir, PathBuf::from("build/html"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Config::parse("[check]\nretries = 3\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        assert!(Config::parse("[deploy]\n").is_err());
    }

    #[test]
    fn test_page_url_and_file() {
        let check = CheckConfig::default();
        assert_eq!(
            check.page_url("library/os"),
            "https://docs.micropython.org/en/v1.23.0/library/os.html"
        );
        assert_eq!(
            check.page_file("library/os"),
            PathBuf::from("docs/build/html/library/os.html")
        );
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.check.max_missing, 10);
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[check]\nmax_missing = 2\n",
        )
        .unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.check.max_missing, 2);
    }
}
