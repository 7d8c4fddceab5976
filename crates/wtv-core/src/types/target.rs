//! The vite configuration being built.
//!
//! Field names follow vite's own (`publicDir`, `build.outDir`, ...). Every
//! field is optional or empty until a rule writes it; the emitter skips
//! whatever is still unset.

use indexmap::IndexMap;

use super::value::{ObjectMap, Value};

/// One `resolve.alias` entry.
///
/// vite matches aliases first to last, so these are kept in a sequence
/// rather than a map.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasEntry {
    /// String or regex (raw) to match.
    pub find: Value,
    /// What the match is replaced with.
    pub replacement: Value,
}

/// One element of the `plugins` array.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginSlot {
    /// `callee(args...)`.
    Call {
        /// Imported factory name, e.g. `vue`.
        callee: String,
        /// Call arguments.
        args: Vec<Value>,
    },
    /// A source plugin without a vite counterpart, written out as comments.
    Commented {
        /// The original declaration.
        source_text: String,
        /// Why it was not converted.
        note: String,
    },
}

impl PluginSlot {
    /// A call without arguments.
    #[must_use]
    pub fn call(callee: impl Into<String>) -> Self {
        Self::Call {
            callee: callee.into(),
            args: Vec::new(),
        }
    }

    /// A call with arguments.
    #[must_use]
    pub fn call_with(callee: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Call {
            callee: callee.into(),
            args,
        }
    }
}

/// A loader that could not be ported, reported in the config header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassThrough {
    /// Loader name.
    pub name: String,
    /// The original declaration.
    pub source_text: String,
    /// What the user should do about it.
    pub note: String,
}

/// `resolve`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveConfig {
    /// `resolve.alias`.
    pub alias: Vec<AliasEntry>,
    /// `resolve.extensions`.
    pub extensions: Option<Vec<Value>>,
}

/// `css`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CssConfig {
    /// `css.preprocessorOptions`, keyed by language (`scss`, `less`, ...).
    pub preprocessor_options: IndexMap<String, ObjectMap>,
}

/// `server`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
    /// `server.port`.
    pub port: Option<Value>,
    /// `server.host`.
    pub host: Option<Value>,
    /// `server.open`.
    pub open: Option<Value>,
    /// `server.https`.
    pub https: Option<Value>,
    /// `server.proxy`, context to options.
    pub proxy: Option<ObjectMap>,
}

impl ServerConfig {
    /// Returns `true` when no server field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.port.is_none()
            && self.host.is_none()
            && self.open.is_none()
            && self.https.is_none()
            && self.proxy.is_none()
    }
}

/// `build`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildConfig {
    /// `build.outDir`.
    pub out_dir: Option<Value>,
    /// `build.assetsDir`.
    pub assets_dir: Option<Value>,
    /// `build.sourcemap`.
    pub sourcemap: Option<Value>,
    /// `build.emptyOutDir`.
    pub empty_out_dir: Option<Value>,
    /// `build.rollupOptions.input`.
    pub rollup_input: Option<ObjectMap>,
}

impl BuildConfig {
    /// Returns `true` when no build field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.out_dir.is_none()
            && self.assets_dir.is_none()
            && self.sourcemap.is_none()
            && self.empty_out_dir.is_none()
            && self.rollup_input.is_none()
    }
}

/// The destination configuration.
///
/// # Examples
///
/// ```
/// use wtv_core::{TargetConfig, Value};
///
/// let mut target = TargetConfig::default();
/// assert_eq!(target.root_dir(), ".");
/// target.root = Some(Value::string("src"));
/// assert_eq!(target.root_dir(), "src");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetConfig {
    /// `root`.
    pub root: Option<Value>,
    /// `base`.
    pub base: Option<Value>,
    /// `mode`.
    pub mode: Option<Value>,
    /// `publicDir`.
    pub public_dir: Option<Value>,
    /// `envDir`.
    pub env_dir: Option<Value>,
    /// `plugins`.
    pub plugins: Vec<PluginSlot>,
    /// `resolve`.
    pub resolve: ResolveConfig,
    /// `define`.
    pub define: ObjectMap,
    /// `css`.
    pub css: CssConfig,
    /// `server`.
    pub server: ServerConfig,
    /// `build`.
    pub build: BuildConfig,
    /// Loaders left for the user, listed as comments above the config.
    pub pass_through: Vec<PassThrough>,
}

impl TargetConfig {
    /// The project-relative vite root, `.` when unset or not a literal.
    #[must_use]
    pub fn root_dir(&self) -> &str {
        self.root.as_ref().and_then(Value::as_str).unwrap_or(".")
    }

    /// The public base path, `/` when unset or not a literal.
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.base.as_ref().and_then(Value::as_str).unwrap_or("/")
    }
}
