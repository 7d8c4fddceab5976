//! `define` and `env`.
//!
//! `DefinePlugin` and vite's `define` both read a string value as code, so
//! `'"production"'` is carried over as the same string literal. Other values
//! keep their evaluated form.

use wtv_core::{
    AstParsingResult, JsValue, ObjectMap, ProjectType, Value, quote_js_string,
};

use super::construct_warning;
use crate::context::TransformContext;
use crate::error::RuleError;

/// Prefix vue-cli exposes to client code.
const CLIENT_ENV_PREFIX: &str = "VUE_APP_";

/// Flattens every `DefinePlugin` into `define`.
pub(crate) fn define(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    for plugin in parsed.config.plugins_named("DefinePlugin") {
        match plugin.options() {
            Some(JsValue::Object(definitions)) => {
                for (key, value) in definitions {
                    flatten(key, value, &mut ctx.target.define);
                }
            }
            _ => {
                let warning = construct_warning(plugin, "definitions are not an object literal");
                ctx.warn(warning);
            }
        }
    }
    Ok(())
}

fn flatten(key: &str, value: &JsValue, define: &mut ObjectMap) {
    match value {
        JsValue::Object(nested) => {
            for (child, value) in nested {
                flatten(&format!("{key}.{child}"), value, define);
            }
        }
        other => {
            define.insert(key.to_owned(), Value::from_js(other));
        }
    }
}

/// A definition that inlines `value` as a string literal in client code.
fn string_definition(value: &str) -> Value {
    Value::raw(format!("JSON.stringify({})", quote_js_string(value)))
}

/// `.env` values: `NODE_ENV` decides the mode, client variables become
/// `process.env.*` definitions.
pub(crate) fn env(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    for (key, value) in &parsed.env {
        if key == "NODE_ENV" {
            ctx.target.mode = Some(Value::string(value.clone()));
        } else if key.starts_with(CLIENT_ENV_PREFIX) || key == "BASE_URL" {
            ctx.target
                .define
                .insert(format!("process.env.{key}"), string_definition(value));
        }
    }

    if parsed.project_type == ProjectType::VueCli {
        let base = string_definition(ctx.target.base_path());
        ctx.target
            .define
            .entry("process.env.BASE_URL".to_owned())
            .or_insert(base);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{context, object, parsed, plugin, string};
    use wtv_core::{Opaque, SourceLocation};

    #[test]
    fn test_define_values_are_code() {
        let mut parsed = parsed();
        parsed.config.plugins.push(plugin(
            "DefinePlugin",
            Some("webpack"),
            vec![object(&[
                ("__VERSION__", string("'1.0.0'")),
                (
                    "process.env",
                    object(&[("NODE_ENV", string("\"production\""))]),
                ),
                (
                    "BUILD_TIME",
                    JsValue::Opaque(Opaque {
                        source_text: "JSON.stringify(Date.now())".to_owned(),
                        location: SourceLocation::default(),
                    }),
                ),
                ("DEBUG", JsValue::Bool(false)),
            ])],
        ));
        let mut ctx = context();
        define(&parsed, &mut ctx).expect("rule");

        let define = &ctx.target.define;
        assert_eq!(define["__VERSION__"], Value::string("'1.0.0'"));
        assert_eq!(define["process.env.NODE_ENV"], Value::string("\"production\""));
        assert_eq!(define["BUILD_TIME"], Value::raw("JSON.stringify(Date.now())"));
        assert_eq!(define["DEBUG"], Value::bool(false));
        assert_eq!(
            define["process.env.NODE_ENV"].to_string(),
            r#"'"production"'"#,
            "the definition keeps its quotes in the generated file"
        );
    }

    #[test]
    fn test_define_without_object_warns() {
        let mut parsed = parsed();
        parsed
            .config
            .plugins
            .push(plugin("DefinePlugin", Some("webpack"), Vec::new()));
        let mut ctx = context();
        define(&parsed, &mut ctx).expect("rule");
        assert!(ctx.target.define.is_empty());
        assert_eq!(ctx.warnings.len(), 1);
    }

    #[test]
    fn test_env_overrides_mode_and_define() {
        let mut parsed = parsed();
        parsed.env.insert("NODE_ENV".to_owned(), "development".to_owned());
        parsed
            .env
            .insert("VUE_APP_API".to_owned(), "https://api.example.com".to_owned());
        parsed.env.insert("SECRET".to_owned(), "hunter2".to_owned());

        let mut ctx = context();
        ctx.target.mode = Some(Value::string("production"));
        ctx.target.define.insert(
            "process.env.VUE_APP_API".to_owned(),
            Value::raw("'http://old'"),
        );
        env(&parsed, &mut ctx).expect("rule");

        assert_eq!(ctx.target.mode, Some(Value::string("development")));
        assert_eq!(
            ctx.target.define["process.env.VUE_APP_API"],
            Value::raw("JSON.stringify('https://api.example.com')")
        );
        assert!(!ctx.target.define.keys().any(|k| k.contains("SECRET")));
    }

    #[test]
    fn test_vue_cli_gets_base_url() {
        let mut parsed = parsed();
        parsed.project_type = ProjectType::VueCli;
        let mut ctx = context();
        ctx.target.base = Some(Value::string("/shop/"));
        env(&parsed, &mut ctx).expect("rule");
        assert_eq!(
            ctx.target.define["process.env.BASE_URL"],
            Value::raw("JSON.stringify('/shop/')")
        );
    }
}
