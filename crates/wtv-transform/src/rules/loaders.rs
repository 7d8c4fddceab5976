//! `loaders`: the static table of known webpack loaders.

use tracing::trace;
use wtv_core::{
    AstParsingResult, ConstructDescriptor, FxHashSet, JsValue, ObjectMap, PassThrough, Value,
};

use super::construct_warning;
use crate::context::TransformContext;
use crate::error::RuleError;

/// Loaders whose work vite does out of the box.
const ABSORBED: &[&str] = &[
    "vue-loader",
    "babel-loader",
    "ts-loader",
    "esbuild-loader",
    "css-loader",
    "style-loader",
    "vue-style-loader",
    "postcss-loader",
    "mini-css-extract-plugin",
    "MiniCssExtractPlugin.loader",
    "file-loader",
    "url-loader",
];

/// Options that prepend code to every stylesheet, newest name first.
const ADDITIONAL_DATA: &[&str] = &["additionalData", "prependData", "data"];

/// Maps loaders onto vite's CSS pipeline. Unknown loaders are listed as
/// pass-through notes, once per loader and rule `test`.
pub(crate) fn loaders(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    let mut reported = FxHashSet::default();
    for loader in &parsed.config.loaders {
        if is_loader(loader, "sass-loader") {
            ctx.require("sass", "^1.57.1");
            let language = if loader.test.as_deref().is_some_and(|t| t.contains("sass") && !t.contains("scss")) {
                "sass"
            } else {
                "scss"
            };
            preprocessor(loader, language, None, ctx)?;
        } else if is_loader(loader, "less-loader") {
            ctx.require("less", "^4.1.3");
            preprocessor(loader, "less", Some("lessOptions"), ctx)?;
        } else if is_loader(loader, "stylus-loader") {
            ctx.require("stylus", "^0.59.0");
            preprocessor(loader, "styl", Some("stylusOptions"), ctx)?;
        } else if ABSORBED.iter().any(|name| is_loader(loader, name)) {
            trace!(loader = %loader.name, "Loader absorbed by vite");
        } else if reported.insert((loader.name.as_str(), loader.test.as_deref())) {
            ctx.target.pass_through.push(PassThrough {
                name: loader.name.clone(),
                source_text: loader.source_text.clone(),
                note: match &loader.test {
                    Some(test) => format!("used for {test}; find a vite plugin or drop it"),
                    None => "find a vite plugin or drop it".to_owned(),
                },
            });
            let warning = construct_warning(loader, "loader has no vite equivalent");
            ctx.warn(warning);
        }
    }
    Ok(())
}

fn is_loader(loader: &ConstructDescriptor, name: &str) -> bool {
    loader.name == name || loader.package.as_deref() == Some(name)
}

/// Writes `css.preprocessorOptions.<language>` from the loader options.
fn preprocessor(
    loader: &ConstructDescriptor,
    language: &str,
    nested: Option<&str>,
    ctx: &mut TransformContext,
) -> Result<(), RuleError> {
    let options = match loader.options() {
        None | Some(JsValue::Undefined) => return Ok(()),
        Some(JsValue::Object(options)) => options,
        Some(JsValue::Opaque(_)) => {
            let warning = construct_warning(loader, "options could not be evaluated and were dropped");
            ctx.warn(warning);
            return Ok(());
        }
        Some(other) => {
            return Err(RuleError::new(
                "loaders",
                format!("css.preprocessorOptions.{language}"),
                format!("{} options are a {}", loader.name, other.type_name()),
            ));
        }
    };

    let mut out = ObjectMap::new();
    if let Some(data) = ADDITIONAL_DATA.iter().find_map(|key| options.get(*key)) {
        out.insert("additionalData".to_owned(), Value::from_js(data));
    }
    if let Some(JsValue::Object(nested)) = nested.and_then(|key| options.get(key)) {
        for (key, value) in nested {
            out.insert(key.clone(), Value::from_js(value));
        }
    }
    if out.is_empty() {
        return Ok(());
    }
    ctx.target
        .css
        .preprocessor_options
        .entry(language.to_owned())
        .or_default()
        .extend(out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{context, loader, object, parsed, string};

    fn run(loaders: Vec<ConstructDescriptor>) -> TransformContext {
        let mut parsed = parsed();
        parsed.config.loaders = loaders;
        let mut ctx = context();
        super::loaders(&parsed, &mut ctx).expect("rule");
        ctx
    }

    #[test]
    fn test_absorbed_loaders() {
        let ctx = run(vec![
            loader("vue-loader", None, r"/\.vue$/"),
            loader("babel-loader", None, r"/\.js$/"),
            loader("css-loader", None, r"/\.css$/"),
            loader("url-loader", Some(object(&[("limit", JsValue::Number(8192.0))])), r"/\.png$/"),
        ]);
        assert!(ctx.target.pass_through.is_empty());
        assert!(ctx.warnings.is_empty());
        assert!(ctx.dev_dependencies.is_empty());
    }

    #[test]
    fn test_sass_additional_data() {
        let ctx = run(vec![loader(
            "sass-loader",
            Some(object(&[("prependData", string("@import '@/styles/vars.scss';"))])),
            r"/\.scss$/",
        )]);
        let scss = &ctx.target.css.preprocessor_options["scss"];
        assert_eq!(
            scss["additionalData"],
            Value::string("@import '@/styles/vars.scss';")
        );
        assert_eq!(ctx.dev_dependencies["sass"], "^1.57.1");
    }

    #[test]
    fn test_indented_sass_gets_its_own_key() {
        let ctx = run(vec![loader(
            "sass-loader",
            Some(object(&[("additionalData", string("@import vars"))])),
            r"/\.sass$/",
        )]);
        assert!(ctx.target.css.preprocessor_options.contains_key("sass"));
    }

    #[test]
    fn test_less_options() {
        let ctx = run(vec![loader(
            "less-loader",
            Some(object(&[(
                "lessOptions",
                object(&[
                    ("javascriptEnabled", JsValue::Bool(true)),
                    ("modifyVars", object(&[("primary-color", string("#1DA57A"))])),
                ]),
            )])),
            r"/\.less$/",
        )]);
        let less = &ctx.target.css.preprocessor_options["less"];
        insta::assert_snapshot!(
            Value::object(less.clone()).to_string(),
            @"{ javascriptEnabled: true, modifyVars: { 'primary-color': '#1DA57A' } }"
        );
    }

    #[test]
    fn test_unknown_loader_passes_through_once() {
        let ctx = run(vec![
            loader("svg-sprite-loader", None, r"/\.svg$/"),
            loader("svg-sprite-loader", None, r"/\.svg$/"),
        ]);
        assert_eq!(ctx.target.pass_through.len(), 1);
        assert_eq!(ctx.target.pass_through[0].name, "svg-sprite-loader");
        assert_eq!(ctx.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_loader_noted_for_each_rule() {
        let ctx = run(vec![
            loader("svg-sprite-loader", None, r"/\.svg$/"),
            loader("svg-sprite-loader", None, r"/icons\/.*\.svg$/"),
            loader("svg-sprite-loader", None, r"/\.svg$/"),
        ]);
        let notes: Vec<_> = ctx.target.pass_through.iter().map(|note| note.note.as_str()).collect();
        assert_eq!(
            notes,
            [
                r"used for /\.svg$/; find a vite plugin or drop it",
                r"used for /icons\/.*\.svg$/; find a vite plugin or drop it",
            ]
        );
        assert_eq!(ctx.warnings.len(), 2);
    }

    #[test]
    fn test_non_object_options_fail() {
        let mut parsed = parsed();
        parsed.config.loaders = vec![loader("sass-loader", Some(JsValue::Number(1.0)), r"/\.scss$/")];
        let err = super::loaders(&parsed, &mut context()).expect_err("should fail");
        assert_eq!(err.field, "css.preprocessorOptions.scss");
    }
}
