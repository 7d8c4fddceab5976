//! Core types, errors, and configuration for the webpack-to-vite converter.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - [`JsValue`]: the structural evaluation of a webpack configuration
//! - [`ExtractedConfig`] and [`AstParsingResult`]: the normalized source model
//! - [`TargetConfig`], [`Value`] and [`ImportList`]: the vite destination model
//! - [`UnsupportedConstructWarning`]: non-fatal conversion diagnostics
//! - [`Config`] / [`RunConfig`]: run configuration and [`ConfigError`]
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod path;
pub mod types;

pub use config::{Config, OutputConfig, ProjectType, RunConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet};
pub use types::{
    AliasEntry, AliasTarget, AstParsingResult, BuildConfig, Construct, ConstructDescriptor,
    ConstructKind, CssConfig, DevServer, ExtractedConfig, FrameworkVersion, HtmlTemplate,
    ImportClause, ImportList, ImportStatement, JsObject, JsValue, Literal, ManifestInfo, Mode,
    ObjectMap, Opaque, PassThrough, PluginSlot, RawExpression, ResolveConfig, ServerConfig,
    SourceLocation, TargetConfig, UnsupportedConstructWarning, Value, format_number,
    property_key, quote_js_string,
};
