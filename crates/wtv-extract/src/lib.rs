//! Reads a webpack or vue-cli project into the normalized source model.
//!
//! This crate is the first stage of a conversion. It locates the project's
//! configuration file, evaluates it with `wtv-parser`, and gathers the
//! companion files a vite project needs: the manifest, `.env` files and the
//! HTML template. The result is an [`AstParsingResult`] that later stages
//! only read.
//!
//! # Overview
//!
//! The main entry point is [`Extractor`] (or the [`extract_project`]
//! shorthand), which combines:
//!
//! - [`WebpackReader`]: evaluated webpack config → [`ExtractedConfig`](wtv_core::ExtractedConfig)
//! - [`read_vue_config`]: vue-cli options and conventions
//! - [`manifest`]: `package.json` and framework detection
//! - [`env`]: `.env` and `.env.local`
//! - [`JsxScanner`]: JSX usage, walked on a blocking thread
//!
//! # Example
//!
//! ```ignore
//! use wtv_core::{ProjectType, RunConfig};
//! use wtv_extract::extract_project;
//!
//! let run = RunConfig::new("./my-app", ProjectType::Webpack);
//! let parsed = extract_project(&run).await?;
//!
//! for (name, file) in &parsed.config.entry {
//!     println!("entry {name}: {file}");
//! }
//! for warning in &parsed.config.unsupported {
//!     println!("warning: {warning}");
//! }
//! ```
//!
//! # Errors
//!
//! Only problems that make conversion impossible are errors (see
//! [`ExtractError`]). Unsupported constructs are collected as warnings on the
//! extracted config.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod manifest;
pub mod vuecli;
pub mod walker;
pub mod webpack;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};
use wtv_core::{
    AstParsingResult, JsObject, JsValue, OutputConfig, ProjectType, RunConfig,
    UnsupportedConstructWarning, path,
};
use wtv_parser::{ConfigParser, EvalContext, ModuleBindings, evaluate_exports};

pub use error::ExtractError;
pub use vuecli::{VUE_CLI_ENTRY_NAME, read_vue_config};
pub use walker::JsxScanner;
pub use webpack::{DeclaredEntry, WebpackReader};

/// Webpack configuration files, in lookup order.
pub const WEBPACK_CONFIG_CANDIDATES: &[&str] = &[
    "webpack.config.js",
    "webpack.config.ts",
    "webpack.config.cjs",
    "webpack.config.mjs",
    "build/webpack.base.conf.js",
];

/// vue-cli configuration files, in lookup order.
pub const VUE_CONFIG_CANDIDATES: &[&str] = &[
    "vue.config.js",
    "vue.config.cjs",
    "vue.config.mjs",
    "vue.config.ts",
];

/// Name webpack gives its single entry.
pub const WEBPACK_ENTRY_NAME: &str = "main";

/// Extensions tried for an entry written without one.
pub const ENTRY_EXTENSIONS: &[&str] = &["js", "mjs", "jsx", "ts", "tsx", "vue"];

/// Reads a project described by a [`RunConfig`].
#[derive(Debug, Clone)]
pub struct Extractor {
    root: Utf8PathBuf,
    project_type: ProjectType,
    entry: Option<Utf8PathBuf>,
    skip_dirs: Vec<String>,
}

impl Extractor {
    /// Creates an extractor for the project `run` points at.
    #[must_use]
    pub fn new(run: &RunConfig) -> Self {
        Self {
            root: run.root_dir.clone(),
            project_type: run.project_type,
            entry: run.entry.clone(),
            skip_dirs: OutputConfig::default().skip_dirs,
        }
    }

    /// Replaces the directory names the JSX scan skips.
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: &[String]) -> Self {
        self.skip_dirs = dirs.to_vec();
        self
    }

    /// Reads the project.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::MissingConfig`] when a webpack project has no configuration file
    /// - [`ExtractError::Parse`] when the configuration file has a syntax error
    /// - [`ExtractError::MissingEntry`] when an entry file does not exist
    /// - [`ExtractError::UnresolvedEntry`] when the declared entry cannot be evaluated
    /// - [`ExtractError::Read`], [`ExtractError::Manifest`], [`ExtractError::Walk`]
    ///   for unreadable companion files
    #[instrument(skip(self), fields(root = %self.root, project_type = %self.project_type))]
    pub async fn extract(&self) -> Result<AstParsingResult, ExtractError> {
        let root = canonical_root(&self.root).await?;
        info!(root = %root, "Extracting project");

        let mut parsed = AstParsingResult::new(root.clone(), self.project_type);
        parsed.env = env::load_env(&root).await?;
        parsed.manifest = manifest::read_manifest(&root).await?;

        let declared = match self.project_type {
            ProjectType::Webpack => {
                let config_path = find_file_in(&root, WEBPACK_CONFIG_CANDIDATES)
                    .await
                    .ok_or_else(|| ExtractError::MissingConfig {
                        root: root.clone(),
                        candidates: WEBPACK_CONFIG_CANDIDATES
                            .iter()
                            .map(|c| (*c).to_owned())
                            .collect(),
                    })?;
                let loaded = load_config(&config_path, &root, &parsed.env).await?;
                let exported = exported_object(loaded.value, &mut parsed.config.unsupported);
                let reader = WebpackReader::new(&root, &loaded.bindings, WEBPACK_ENTRY_NAME);
                let declared = reader.read(&exported, &mut parsed.config, &mut parsed.html);
                parsed.config_path = Some(config_path);
                declared
            }
            ProjectType::VueCli => {
                let loaded = match find_file_in(&root, VUE_CONFIG_CANDIDATES).await {
                    Some(config_path) => {
                        let loaded = load_config(&config_path, &root, &parsed.env).await?;
                        parsed.config_path = Some(config_path);
                        loaded
                    }
                    None => {
                        debug!("No vue.config.js, using vue-cli defaults");
                        LoadedConfig::default()
                    }
                };
                let exported = exported_object(loaded.value, &mut parsed.config.unsupported);
                let reader = WebpackReader::new(&root, &loaded.bindings, VUE_CLI_ENTRY_NAME);
                read_vue_config(&reader, &root, &exported, &mut parsed.config, &mut parsed.html)
            }
        };

        parsed.config.entry = self
            .resolve_entries(&root, declared, parsed.config_path.as_deref())
            .await?;
        self.resolve_html_template(&mut parsed).await;

        let scanner = JsxScanner::new(&root).with_skip_dirs(&self.skip_dirs);
        parsed.uses_jsx = tokio::task::spawn_blocking(move || scanner.scan()).await??;

        for warning in &parsed.config.unsupported {
            warn!(%warning, "Unsupported construct");
        }
        info!(
            entries = parsed.config.entry.len(),
            plugins = parsed.config.plugins.len(),
            loaders = parsed.config.loaders.len(),
            framework = %parsed.manifest.framework,
            uses_jsx = parsed.uses_jsx,
            warnings = parsed.config.unsupported.len(),
            "Extraction complete"
        );
        Ok(parsed)
    }

    fn entry_name(&self) -> &'static str {
        match self.project_type {
            ProjectType::Webpack => WEBPACK_ENTRY_NAME,
            ProjectType::VueCli => VUE_CLI_ENTRY_NAME,
        }
    }

    /// Applies the override, the declared entries or the defaults, and checks
    /// that every entry exists. Paths come back relative to `root`.
    async fn resolve_entries(
        &self,
        root: &Utf8Path,
        declared: DeclaredEntry,
        config_path: Option<&Utf8Path>,
    ) -> Result<IndexMap<String, Utf8PathBuf>, ExtractError> {
        let declared = match &self.entry {
            Some(entry) => {
                let mut paths = IndexMap::new();
                paths.insert(self.entry_name().to_owned(), path::resolve(root, &[entry.as_str()]));
                paths
            }
            None => match declared {
                DeclaredEntry::Paths(paths) => paths,
                DeclaredEntry::Unresolved(source_text) => {
                    return Err(ExtractError::UnresolvedEntry {
                        path: config_path.map_or_else(|| root.to_owned(), Utf8Path::to_owned),
                        source_text,
                    });
                }
                DeclaredEntry::Absent => {
                    let defaults: &[&str] = match self.project_type {
                        ProjectType::Webpack => &["src/index.js"],
                        ProjectType::VueCli => &["src/main.ts", "src/main.js"],
                    };
                    let found = find_file_in(root, defaults).await.ok_or_else(|| {
                        ExtractError::MissingEntry {
                            path: root.join(defaults.last().copied().unwrap_or_default()),
                        }
                    })?;
                    let mut paths = IndexMap::new();
                    paths.insert(self.entry_name().to_owned(), found);
                    paths
                }
            },
        };

        let mut entries = IndexMap::new();
        for (name, file) in declared {
            let found = find_entry_file(&file)
                .await
                .ok_or(ExtractError::MissingEntry { path: file })?;
            let relative = path::relative_to(&found, root);
            debug!(entry = %name, file = %relative, "Resolved entry");
            entries.insert(name, relative);
        }
        Ok(entries)
    }

    /// Checks the declared template, falling back to the conventional
    /// locations. A declared template that does not exist is a warning.
    async fn resolve_html_template(&self, parsed: &mut AstParsingResult) {
        if let Some(template) = parsed.html.path.take() {
            if is_file(&template).await {
                parsed.html.path = Some(template);
                return;
            }
            parsed.config.unsupported.push(UnsupportedConstructWarning::new(
                "HtmlWebpackPlugin.template",
                format!("template {template} does not exist; a default index.html is generated"),
            ));
        }
        let candidates: &[&str] = match self.project_type {
            ProjectType::VueCli => &["public/index.html"],
            ProjectType::Webpack => &["public/index.html", "index.html", "src/index.html"],
        };
        parsed.html.path = find_file_in(&parsed.root, candidates).await;
    }
}

/// Reads the project described by `run` with default settings.
///
/// # Errors
///
/// See [`Extractor::extract`].
pub async fn extract_project(run: &RunConfig) -> Result<AstParsingResult, ExtractError> {
    Extractor::new(run).extract().await
}

/// A configuration file's exported value and its module bindings.
#[derive(Debug, Default)]
struct LoadedConfig {
    value: JsValue,
    bindings: ModuleBindings,
}

async fn load_config(
    path: &Utf8Path,
    root: &Utf8Path,
    env: &IndexMap<String, String>,
) -> Result<LoadedConfig, ExtractError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ExtractError::read(path, e))?;
    let mut parser = ConfigParser::for_path(path).map_err(|e| ExtractError::parse(path, e))?;
    let parsed = parser
        .parse(&source)
        .map_err(|e| ExtractError::parse(path, e))?;
    let ctx = EvalContext {
        file: path,
        cwd: root,
        env,
    };
    let value = evaluate_exports(&parsed, &source, &ctx);
    debug!(path = %path, bindings = parsed.bindings.len(), kind = value.type_name(), "Evaluated config");
    Ok(LoadedConfig {
        value,
        bindings: parsed.bindings,
    })
}

/// Narrows an export to the configuration object it holds.
fn exported_object(value: JsValue, warnings: &mut Vec<UnsupportedConstructWarning>) -> JsValue {
    match value {
        JsValue::Object(_) => value,
        JsValue::Array(configs) => {
            warnings.push(UnsupportedConstructWarning::new(
                "module.exports",
                format!("{} configurations exported; only the first is converted", configs.len()),
            ));
            configs
                .into_iter()
                .next()
                .filter(|first| matches!(first, JsValue::Object(_)))
                .unwrap_or_else(|| JsValue::Object(JsObject::new()))
        }
        JsValue::Undefined => JsValue::Object(JsObject::new()),
        other => {
            let warning = UnsupportedConstructWarning::new(
                "module.exports",
                format!("export is a {} and cannot be read", other.type_name()),
            );
            warnings.push(match &other {
                JsValue::Opaque(opaque) => warning.at(opaque.location),
                _ => warning,
            });
            JsValue::Object(JsObject::new())
        }
    }
}

async fn canonical_root(root: &Utf8Path) -> Result<Utf8PathBuf, ExtractError> {
    let canonical = tokio::fs::canonicalize(root)
        .await
        .map_err(|e| ExtractError::read(root, e))?;
    Utf8PathBuf::from_path_buf(canonical).map_err(ExtractError::NonUtf8Path)
}

async fn is_file(path: &Utf8Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

/// First of `candidates` (relative to `root`) that is a file.
async fn find_file_in(root: &Utf8Path, candidates: &[&str]) -> Option<Utf8PathBuf> {
    for candidate in candidates {
        let path = root.join(candidate);
        if is_file(&path).await {
            return Some(path);
        }
    }
    None
}

/// Resolves an entry the way webpack does: as written, then with each of
/// [`ENTRY_EXTENSIONS`], then as a directory with an `index` file.
async fn find_entry_file(file: &Utf8Path) -> Option<Utf8PathBuf> {
    if is_file(file).await {
        return Some(file.to_owned());
    }
    for ext in ENTRY_EXTENSIONS {
        let candidate = Utf8PathBuf::from(format!("{file}.{ext}"));
        if is_file(&candidate).await {
            return Some(candidate);
        }
    }
    for ext in ENTRY_EXTENSIONS {
        let candidate = file.join(format!("index.{ext}"));
        if is_file(&candidate).await {
            return Some(candidate);
        }
    }
    None
}
