//! Configuration structures for the webpack-to-vite converter.
//!
//! - [`RunConfig`] - What to convert (project root, project type, entry override)
//! - [`OutputConfig`] - Where converted files go and which directories are skipped
//! - [`Config`] - Root configuration combining both
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a configuration file only needs the fields it changes.

use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The kind of project being converted.
///
/// Decides which configuration file is read and which conventions apply
/// (vue-cli implies an `@` alias and a `public/index.html` template).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    /// A vue-cli project configured through an optional `vue.config.js`.
    #[default]
    VueCli,
    /// A plain webpack project configured through `webpack.config.js`.
    Webpack,
}

impl ProjectType {
    /// Returns the name used on the command line and in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VueCli => "vue-cli",
            Self::Webpack => "webpack",
        }
    }
}

impl FromStr for ProjectType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vue-cli" | "vuecli" | "vue" => Ok(Self::VueCli),
            "webpack" => Ok(Self::Webpack),
            other => Err(ConfigError::InvalidOption {
                option: "project_type".to_owned(),
                reason: format!("unknown project type '{other}' (expected vue-cli or webpack)"),
            }),
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single conversion run operates on.
///
/// # Examples
///
/// ```
/// use wtv_core::{ProjectType, RunConfig};
///
/// let config = RunConfig::default();
/// assert_eq!(config.project_type, ProjectType::VueCli);
/// assert!(!config.cover);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root directory of the project to convert.
    pub root_dir: Utf8PathBuf,

    /// Source project type.
    pub project_type: ProjectType,

    /// Explicit entry file, relative to the project root.
    ///
    /// Overrides whatever the source configuration declares.
    pub entry: Option<Utf8PathBuf>,

    /// Write converted files into the project itself instead of a copy.
    pub cover: bool,
}

impl RunConfig {
    /// Creates a run configuration for the given project root.
    #[must_use]
    pub fn new(root_dir: impl Into<Utf8PathBuf>, project_type: ProjectType) -> Self {
        Self {
            root_dir: root_dir.into(),
            project_type,
            ..Self::default()
        }
    }

    /// Checks that the project root exists and is a directory, and that the
    /// entry override (if any) is relative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_dir.as_str().is_empty() || !self.root_dir.exists() {
            return Err(ConfigError::MissingDirectory(self.root_dir.clone()));
        }
        if !self.root_dir.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: self.root_dir.clone(),
                reason: "not a directory".to_owned(),
            });
        }
        if let Some(entry) = &self.entry {
            if entry.is_absolute() {
                return Err(ConfigError::InvalidPath {
                    path: entry.clone(),
                    reason: "entry must be relative to the project root".to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Names and locations of the generated files.
///
/// # Examples
///
/// ```
/// use wtv_core::OutputConfig;
///
/// let config = OutputConfig::default();
/// assert_eq!(config.config_file, "vite.config.js");
/// assert_eq!(config.copy_suffix, "-toVite");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name of the generated vite configuration.
    pub config_file: String,

    /// File name of the generated HTML entry document.
    pub html_file: String,

    /// File name of the project manifest.
    pub manifest_file: String,

    /// Suffix appended to the project directory name when converting into a copy.
    pub copy_suffix: String,

    /// Directory names the JSX scan never enters.
    pub skip_dirs: Vec<String>,

    /// Directory names left out of the `-toVite` copy, at any depth.
    pub copy_skip_dirs: Vec<String>,

    /// Version range written for the `vite` dependency.
    pub vite_version: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            config_file: "vite.config.js".to_owned(),
            html_file: "index.html".to_owned(),
            manifest_file: "package.json".to_owned(),
            copy_suffix: "-toVite".to_owned(),
            skip_dirs: vec![
                "node_modules".to_owned(),
                ".git".to_owned(),
                "dist".to_owned(),
            ],
            copy_skip_dirs: vec!["node_modules".to_owned()],
            vite_version: "^4.0.0".to_owned(),
        }
    }
}

/// Root configuration for the converter.
///
/// # Examples
///
/// ```
/// use wtv_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("vite.config.js"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// What to convert.
    pub run: RunConfig,

    /// Where the converted files go.
    pub output: OutputConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_defaults() {
        let config = OutputConfig::default();
        assert_eq!(config.config_file, "vite.config.js");
        assert_eq!(config.html_file, "index.html");
        assert_eq!(config.manifest_file, "package.json");
        assert_eq!(config.vite_version, "^4.0.0");
        assert!(config.skip_dirs.contains(&"node_modules".to_owned()));
        assert_eq!(config.copy_skip_dirs, ["node_modules"]);
    }

    #[test]
    fn test_project_type_from_str() {
        assert_eq!("vue-cli".parse::<ProjectType>().unwrap(), ProjectType::VueCli);
        assert_eq!("Webpack".parse::<ProjectType>().unwrap(), ProjectType::Webpack);
        assert!("rollup".parse::<ProjectType>().is_err());
    }

    #[test]
    fn test_project_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ProjectType::VueCli).unwrap(),
            r#""vue-cli""#
        );
        assert_eq!(
            serde_json::to_string(&ProjectType::Webpack).unwrap(),
            r#""webpack""#
        );
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"run": {"project_type": "webpack", "cover": true}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.run.project_type, ProjectType::Webpack);
        assert!(config.run.cover);
        assert_eq!(config.output.copy_suffix, "-toVite");
    }

    #[test]
    fn test_validate_missing_root() {
        let config = RunConfig::new("/nonexistent/project/root", ProjectType::Webpack);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_validate_absolute_entry() {
        let mut config = RunConfig::new(".", ProjectType::Webpack);
        config.entry = Some(Utf8PathBuf::from("/abs/main.js"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPath { .. })
        ));
    }
}
