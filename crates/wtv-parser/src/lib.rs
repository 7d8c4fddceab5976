//! Parsing and structural evaluation of webpack and vue-cli configuration
//! files using tree-sitter.
//!
//! This crate turns a configuration file into a [`JsValue`](wtv_core::JsValue)
//! tree without running any JavaScript:
//!
//! - [`ConfigParser`] parses the file with the TSX or TypeScript grammar and
//!   records its `require`/`import` bindings
//! - [`evaluate_exports`] walks the tree and computes the exported value
//!
//! # Overview
//!
//! ```
//! use camino::Utf8Path;
//! use indexmap::IndexMap;
//! use wtv_core::JsValue;
//! use wtv_parser::{ConfigParser, EvalContext, SourceKind, evaluate_exports};
//!
//! let source = r#"
//!     const path = require('path');
//!     const HtmlWebpackPlugin = require('html-webpack-plugin');
//!
//!     module.exports = {
//!         entry: './src/index.js',
//!         output: { path: path.resolve(__dirname, 'dist') },
//!         plugins: [new HtmlWebpackPlugin({ title: 'App' })],
//!     };
//! "#;
//!
//! let mut parser = ConfigParser::new(SourceKind::JavaScript)?;
//! let parsed = parser.parse(source)?;
//! assert_eq!(parsed.bindings.module_of("HtmlWebpackPlugin"), Some("html-webpack-plugin"));
//!
//! let env = IndexMap::new();
//! let ctx = EvalContext {
//!     file: Utf8Path::new("/app/webpack.config.js"),
//!     cwd: Utf8Path::new("/app"),
//!     env: &env,
//! };
//! let config = evaluate_exports(&parsed, source, &ctx);
//!
//! let out = config.get("output").and_then(|o| o.get("path"));
//! assert_eq!(out, Some(&JsValue::String("/app/dist".into())));
//! # Ok::<(), wtv_parser::ParseError>(())
//! ```
//!
//! # Unsupported code
//!
//! Evaluation is total. Expressions the evaluator does not model become
//! [`JsValue::Opaque`](wtv_core::JsValue::Opaque) with their source text and
//! location, which later stages report as warnings or copy through verbatim.
//!
//! # Thread Safety
//!
//! [`ConfigParser`] is `Send` but not `Sync`; create one per task. The
//! compiled binding queries are shared globally.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod bindings;
pub mod error;
pub mod eval;
mod node;
mod parser;
pub mod queries;

pub use bindings::{ModuleBinding, ModuleBindings, extract_bindings};
pub use error::ParseError;
pub use eval::{EvalContext, Evaluator, deep_merge, evaluate_exports};
pub use parser::{ConfigParser, ParsedSource, SourceKind};
