//! `vite-base`, `mode`, `entry`, `output` and `devtool`.

use tracing::debug;
use wtv_core::{
    AstParsingResult, ImportStatement, JsValue, Mode, ObjectMap, UnsupportedConstructWarning,
    Value, path,
};

use super::project_path;
use crate::context::TransformContext;
use crate::error::RuleError;

/// `import { defineConfig } from 'vite'` and the `vite` dependency.
pub(crate) fn vite_base(
    _parsed: &AstParsingResult,
    ctx: &mut TransformContext,
) -> Result<(), RuleError> {
    ctx.import(ImportStatement::named("vite", ["defineConfig"]));
    let version = ctx.vite_version.clone();
    ctx.require("vite", &version);
    Ok(())
}

/// Copies an explicit mode. Development builds keep their source maps.
pub(crate) fn mode(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    let config = &parsed.config;
    if !config.mode_explicit {
        return Ok(());
    }
    let mode = match config.mode {
        Mode::None => Mode::Production,
        other => other,
    };
    ctx.target.mode = Some(Value::string(mode.as_str()));
    if mode == Mode::Development {
        ctx.target.build.sourcemap = Some(Value::bool(true));
    }
    Ok(())
}

/// The directory of the first entry becomes the vite root. Additional
/// entries become rollup inputs.
pub(crate) fn entry(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    let Some(first) = parsed.config.first_entry() else {
        return Err(RuleError::new("entry", "root", "no entry point was extracted"));
    };

    let dir = path::to_forward_slashes(first.parent().map_or("", |dir| dir.as_str()));
    if !dir.is_empty() && dir != "." {
        debug!(root = %dir, "Vite root below project root");
        ctx.target.root = Some(Value::string(dir));
        let public = project_path(parsed, ctx, &parsed.root.join("public"));
        ctx.target.public_dir = Some(public);
        ctx.target.env_dir = Some(Value::raw("__dirname"));
    }

    if parsed.config.entry.len() > 1 {
        let mut input = ObjectMap::new();
        for (name, file) in &parsed.config.entry {
            let value = project_path(parsed, ctx, &parsed.root.join(file));
            input.insert(name.clone(), value);
        }
        ctx.target.build.rollup_input = Some(input);
    }
    Ok(())
}

/// Public path, output directory and assets directory.
pub(crate) fn output(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    let config = &parsed.config;
    match config.public_path.as_deref() {
        None | Some("auto") => {}
        Some("") => ctx.target.base = Some(Value::string("./")),
        Some(public) => ctx.target.base = Some(Value::string(public)),
    }
    if let Some(out_dir) = &config.output_path {
        let value = project_path(parsed, ctx, out_dir);
        ctx.target.build.out_dir = Some(value);
    }
    if let Some(assets) = &config.assets_dir {
        ctx.target.build.assets_dir = Some(Value::string(assets.clone()));
    }
    Ok(())
}

/// Maps `devtool` onto `build.sourcemap`, overriding the mode default.
pub(crate) fn devtool(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    let Some(devtool) = &parsed.config.devtool else {
        return Ok(());
    };
    let sourcemap = match devtool {
        JsValue::Undefined => return Ok(()),
        JsValue::Bool(false) | JsValue::Null => Value::bool(false),
        JsValue::String(name) => match sourcemap_for(name) {
            Some(value) => value,
            None => {
                ctx.warn(UnsupportedConstructWarning::new(
                    format!("devtool '{name}'"),
                    "no vite build equivalent; build.sourcemap left unchanged",
                ));
                return Ok(());
            }
        },
        JsValue::Opaque(_) => Value::from_js(devtool),
        other => {
            return Err(RuleError::new(
                "devtool",
                "build.sourcemap",
                format!("devtool is a {}, expected a string or false", other.type_name()),
            ));
        }
    };
    ctx.target.build.sourcemap = Some(sourcemap);
    Ok(())
}

fn sourcemap_for(devtool: &str) -> Option<Value> {
    if devtool.is_empty() || devtool == "false" {
        Some(Value::bool(false))
    } else if devtool.contains("hidden") {
        Some(Value::string("hidden"))
    } else if devtool.contains("inline") {
        Some(Value::string("inline"))
    } else if devtool.contains("source-map") {
        Some(Value::bool(true))
    } else {
        None
    }
}
