//! The normalized model of a webpack (or vue-cli) configuration.
//!
//! [`ExtractedConfig`] is tool-agnostic: it records what the source
//! configuration declares, with paths already resolved, and leaves every
//! vite-specific decision to the rule catalog.

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::js::{JsValue, Opaque};
use super::location::SourceLocation;
use super::warning::UnsupportedConstructWarning;

/// Build mode of the source configuration.
///
/// # Examples
///
/// ```
/// use wtv_core::Mode;
///
/// assert_eq!(Mode::parse("development"), Some(Mode::Development));
/// assert_eq!(Mode::parse("staging"), None);
/// assert_eq!(Mode::default().as_str(), "production");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// `mode: 'development'`.
    Development,
    /// `mode: 'production'`, and webpack's default when nothing is set.
    #[default]
    Production,
    /// `mode: 'none'`.
    None,
}

impl Mode {
    /// Parses a mode name as webpack spells it.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "development" => Some(Self::Development),
            "production" => Some(Self::Production),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Returns the mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an alias token points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// An absolute file-system path.
    Path(Utf8PathBuf),
    /// A bare module specifier such as `vue/dist/vue.esm.js`.
    Module(String),
    /// An expression that could not be evaluated to either.
    Unsupported(Opaque),
}

/// Whether a descriptor came from `plugins` or from `module.rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructKind {
    /// An entry of the `plugins` array.
    Plugin,
    /// A loader referenced by a `module.rules` entry.
    Loader,
}

impl ConstructKind {
    /// Returns `"plugin"` or `"loader"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::Loader => "loader",
        }
    }
}

/// A plugin or loader as declared in the source configuration.
///
/// Descriptors are recorded whether or not the rule catalog knows them;
/// unknown ones travel to the output as commented pass-through.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructDescriptor {
    /// Plugin or loader.
    pub kind: ConstructKind,
    /// Constructor name (`HtmlWebpackPlugin`) or loader name (`sass-loader`).
    pub name: String,
    /// npm package the constructor was imported from, when traceable.
    pub package: Option<String>,
    /// Constructor arguments, or the loader's `options` as a single element.
    pub args: Vec<JsValue>,
    /// The declaration as written.
    pub source_text: String,
    /// Where the declaration starts.
    pub location: SourceLocation,
    /// The owning rule's `test`, rendered as source (`/\.scss$/`).
    pub test: Option<String>,
}

impl ConstructDescriptor {
    /// Returns the first argument (plugin options, or loader options).
    #[must_use]
    pub fn options(&self) -> Option<&JsValue> {
        self.args.first()
    }

    /// Returns `true` when either the package or the constructor name matches.
    #[must_use]
    pub fn matches(&self, package: &str, name: &str) -> bool {
        self.package.as_deref() == Some(package) || self.name == name || self.name == package
    }
}

/// Dev-server settings, kept as evaluated so rules decide how to map them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevServer {
    /// `port`.
    pub port: Option<JsValue>,
    /// `host`.
    pub host: Option<JsValue>,
    /// `open`.
    pub open: Option<JsValue>,
    /// `https` (or `server: 'https'`).
    pub https: Option<JsValue>,
    /// `proxy`.
    pub proxy: Option<JsValue>,
}

impl DevServer {
    /// Returns `true` when no setting is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.port.is_none()
            && self.host.is_none()
            && self.open.is_none()
            && self.https.is_none()
            && self.proxy.is_none()
    }
}

/// The normalized source configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedConfig {
    /// Entry name to entry file, relative to the project root. Never empty
    /// once extraction succeeds.
    pub entry: IndexMap<String, Utf8PathBuf>,

    /// Build mode.
    pub mode: Mode,

    /// Whether the configuration set `mode` itself.
    pub mode_explicit: bool,

    /// `output.path` (or vue-cli `outputDir`), absolute.
    pub output_path: Option<Utf8PathBuf>,

    /// `output.publicPath` (or vue-cli `publicPath`/`baseUrl`).
    pub public_path: Option<String>,

    /// vue-cli `assetsDir`.
    pub assets_dir: Option<String>,

    /// `resolve.alias` in declaration order.
    pub aliases: IndexMap<String, AliasTarget>,

    /// `resolve.extensions` as evaluated.
    pub extensions: Vec<JsValue>,

    /// `devtool`.
    pub devtool: Option<JsValue>,

    /// `plugins` in declaration order.
    pub plugins: Vec<ConstructDescriptor>,

    /// Loaders from `module.rules`, in declaration order.
    pub loaders: Vec<ConstructDescriptor>,

    /// `devServer`.
    pub dev_server: Option<DevServer>,

    /// Constructs noticed during extraction that cannot be converted.
    pub unsupported: Vec<UnsupportedConstructWarning>,
}

impl ExtractedConfig {
    /// Returns the first entry file.
    #[must_use]
    pub fn first_entry(&self) -> Option<&Utf8PathBuf> {
        self.entry.values().next()
    }

    /// Returns the plugins recorded with the given constructor name.
    pub fn plugins_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ConstructDescriptor> + 'a {
        self.plugins.iter().filter(move |plugin| plugin.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, package: Option<&str>) -> ConstructDescriptor {
        ConstructDescriptor {
            kind: ConstructKind::Plugin,
            name: name.to_owned(),
            package: package.map(str::to_owned),
            args: Vec::new(),
            source_text: format!("new {name}()"),
            location: SourceLocation::default(),
            test: None,
        }
    }

    #[test]
    fn test_mode_round_trip_names() {
        for mode in [Mode::Development, Mode::Production, Mode::None] {
            assert_eq!(Mode::parse(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn test_descriptor_matches_package_or_name() {
        let traced = descriptor("HtmlPlugin", Some("html-webpack-plugin"));
        assert!(traced.matches("html-webpack-plugin", "HtmlWebpackPlugin"));

        let untraced = descriptor("HtmlWebpackPlugin", None);
        assert!(untraced.matches("html-webpack-plugin", "HtmlWebpackPlugin"));

        let other = descriptor("Foo", Some("foo"));
        assert!(!other.matches("html-webpack-plugin", "HtmlWebpackPlugin"));
    }

    #[test]
    fn test_first_entry_keeps_declaration_order() {
        let mut config = ExtractedConfig::default();
        config
            .entry
            .insert("main".to_owned(), Utf8PathBuf::from("src/main.js"));
        config
            .entry
            .insert("admin".to_owned(), Utf8PathBuf::from("admin/index.js"));
        assert_eq!(
            config.first_entry().map(|p| p.as_str()),
            Some("src/main.js")
        );
    }

    #[test]
    fn test_dev_server_is_empty() {
        let mut server = DevServer::default();
        assert!(server.is_empty());
        server.port = Some(JsValue::Number(3000.0));
        assert!(!server.is_empty());
    }
}
