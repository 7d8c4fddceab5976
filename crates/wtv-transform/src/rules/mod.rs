//! The rules of the catalog, grouped by the part of the config they write.

pub(crate) mod base;
pub(crate) mod define;
pub(crate) mod framework;
pub(crate) mod loaders;
pub(crate) mod plugins;
pub(crate) mod resolve;
pub(crate) mod server;

use camino::Utf8Path;
use wtv_core::{
    AstParsingResult, ConstructDescriptor, ImportStatement, UnsupportedConstructWarning, Value,
    path, quote_js_string,
};

use crate::context::TransformContext;

/// `path.resolve(__dirname, '<relative>')` for an absolute path inside (or
/// near) the project. Registers the `path` import.
pub(crate) fn project_path(
    parsed: &AstParsingResult,
    ctx: &mut TransformContext,
    absolute: &Utf8Path,
) -> Value {
    ctx.import(ImportStatement::default_import("path", "path"));
    let relative = path::relative_to(absolute, &parsed.root);
    let relative = path::to_forward_slashes(relative.as_str());
    if relative == "." {
        Value::raw("path.resolve(__dirname)")
    } else {
        Value::raw(format!(
            "path.resolve(__dirname, {})",
            quote_js_string(&relative)
        ))
    }
}

/// A warning pointing at a plugin or loader declaration.
pub(crate) fn construct_warning(
    descriptor: &ConstructDescriptor,
    reason: impl Into<String>,
) -> UnsupportedConstructWarning {
    let warning = UnsupportedConstructWarning::new(descriptor.name.clone(), reason);
    if descriptor.location.line == 0 {
        warning
    } else {
        warning.at(descriptor.location)
    }
}
