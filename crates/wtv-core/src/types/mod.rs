//! Domain types for the webpack-to-vite converter.
//!
//! # Module Organization
//!
//! - [`js`] - Structural evaluation results of JavaScript expressions
//! - [`extracted`] - The normalized source configuration
//! - [`parsed`] - The extractor's output bundle and project metadata
//! - [`value`] - Literal and raw values of the destination model
//! - [`target`] - The vite configuration being built
//! - [`import`] - Import statements of the generated file
//! - [`warning`] - Non-fatal diagnostics
//! - [`location`] - Source code locations
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use wtv_core::{ExtractedConfig, TargetConfig, Value};
//! ```

pub mod extracted;
pub mod import;
pub mod js;
pub mod location;
pub mod parsed;
pub mod target;
pub mod value;
pub mod warning;

pub use extracted::{
    AliasTarget, ConstructDescriptor, ConstructKind, DevServer, ExtractedConfig, Mode,
};
pub use import::{ImportClause, ImportList, ImportStatement};
pub use js::{Construct, JsObject, JsValue, Opaque, format_number};
pub use location::SourceLocation;
pub use parsed::{AstParsingResult, FrameworkVersion, HtmlTemplate, ManifestInfo};
pub use target::{
    AliasEntry, BuildConfig, CssConfig, PassThrough, PluginSlot, ResolveConfig, ServerConfig,
    TargetConfig,
};
pub use value::{
    Literal, ObjectMap, RawExpression, Value, is_identifier, property_key, quote_js_string,
};
pub use warning::UnsupportedConstructWarning;
