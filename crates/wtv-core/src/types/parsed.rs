//! The extractor's output bundle.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extracted::ExtractedConfig;
use crate::config::ProjectType;

/// UI framework detected from the project manifest.
///
/// Decides which vite integration plugin the framework rule adds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkVersion {
    /// Vue 2.x.
    Vue2,
    /// Vue 3.x.
    Vue3,
    /// React (any version).
    React,
    /// No known framework, or no manifest.
    #[default]
    Unknown,
}

impl FrameworkVersion {
    /// Returns `true` for both Vue majors.
    #[must_use]
    pub const fn is_vue(self) -> bool {
        matches!(self, Self::Vue2 | Self::Vue3)
    }
}

impl std::fmt::Display for FrameworkVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Vue2 => "vue2",
            Self::Vue3 => "vue3",
            Self::React => "react",
            Self::Unknown => "unknown",
        })
    }
}

/// What was learned from `package.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestInfo {
    /// Where the manifest is (or would be).
    pub path: Utf8PathBuf,
    /// Whether the file exists.
    pub exists: bool,
    /// The `name` field.
    pub name: Option<String>,
    /// Framework inferred from the dependency maps.
    pub framework: FrameworkVersion,
}

/// The HTML template the generated `index.html` starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTemplate {
    /// Absolute path of an existing template, `None` when a document must be generated.
    pub path: Option<Utf8PathBuf>,
    /// Page title from `HtmlWebpackPlugin` options or vue-cli `pages`.
    pub title: Option<String>,
}

/// Everything extraction produced for one project.
///
/// Read-only once built. Rules read it alongside the transform context, and
/// the manifest and HTML emitters read it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct AstParsingResult {
    /// Absolute project root.
    pub root: Utf8PathBuf,
    /// Source project type.
    pub project_type: ProjectType,
    /// The configuration file that was parsed, if any.
    pub config_path: Option<Utf8PathBuf>,
    /// The normalized configuration.
    pub config: ExtractedConfig,
    /// Manifest details.
    pub manifest: ManifestInfo,
    /// HTML template details.
    pub html: HtmlTemplate,
    /// Variables loaded from `.env` files, later files winning.
    pub env: IndexMap<String, String>,
    /// Whether any source file uses JSX.
    pub uses_jsx: bool,
}

impl AstParsingResult {
    /// Creates a result with defaults for everything but the root and type.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, project_type: ProjectType) -> Self {
        let root = root.into();
        Self {
            manifest: ManifestInfo {
                path: root.join("package.json"),
                ..ManifestInfo::default()
            },
            root,
            project_type,
            config_path: None,
            config: ExtractedConfig::default(),
            html: HtmlTemplate::default(),
            env: IndexMap::new(),
            uses_jsx: false,
        }
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}
