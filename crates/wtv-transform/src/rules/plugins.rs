//! `plugins`: the static table of known webpack plugins.

use tracing::{debug, trace};
use wtv_core::{
    AstParsingResult, ConstructDescriptor, ImportStatement, JsValue, ObjectMap, PluginSlot, Value,
};

use super::construct_warning;
use crate::context::TransformContext;
use crate::error::RuleError;

type Port = fn(&ConstructDescriptor, &mut TransformContext) -> Result<(), RuleError>;

/// A webpack plugin the catalog knows.
struct KnownPlugin {
    /// npm package, or `None` for plugins shipped with webpack itself.
    package: Option<&'static str>,
    /// Constructor name.
    name: &'static str,
    port: Port,
}

impl KnownPlugin {
    fn matches(&self, descriptor: &ConstructDescriptor) -> bool {
        match self.package {
            Some(package) => descriptor.matches(package, self.name),
            None => descriptor.name == self.name,
        }
    }
}

const KNOWN_PLUGINS: &[KnownPlugin] = &[
    KnownPlugin {
        package: Some("html-webpack-plugin"),
        name: "HtmlWebpackPlugin",
        port: absorbed,
    },
    KnownPlugin {
        package: Some("vue-loader"),
        name: "VueLoaderPlugin",
        port: absorbed,
    },
    KnownPlugin {
        package: Some("mini-css-extract-plugin"),
        name: "MiniCssExtractPlugin",
        port: absorbed,
    },
    KnownPlugin {
        package: None,
        name: "HotModuleReplacementPlugin",
        port: absorbed,
    },
    KnownPlugin {
        package: None,
        name: "ProgressPlugin",
        port: absorbed,
    },
    KnownPlugin {
        package: None,
        name: "NamedModulesPlugin",
        port: absorbed,
    },
    KnownPlugin {
        package: None,
        name: "DefinePlugin",
        port: absorbed,
    },
    KnownPlugin {
        package: Some("clean-webpack-plugin"),
        name: "CleanWebpackPlugin",
        port: clean,
    },
    KnownPlugin {
        package: Some("copy-webpack-plugin"),
        name: "CopyWebpackPlugin",
        port: static_copy,
    },
    KnownPlugin {
        package: Some("compression-webpack-plugin"),
        name: "CompressionPlugin",
        port: compression,
    },
    KnownPlugin {
        package: Some("eslint-webpack-plugin"),
        name: "ESLintPlugin",
        port: eslint,
    },
    KnownPlugin {
        package: Some("fork-ts-checker-webpack-plugin"),
        name: "ForkTsCheckerWebpackPlugin",
        port: checker,
    },
    KnownPlugin {
        package: Some("webpack-bundle-analyzer"),
        name: "BundleAnalyzerPlugin",
        port: visualizer,
    },
];

/// Ports every declared plugin through the table. Unknown plugins are kept
/// as comments in the plugin array.
pub(crate) fn plugins(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    for descriptor in &parsed.config.plugins {
        match KNOWN_PLUGINS.iter().find(|known| known.matches(descriptor)) {
            Some(known) => {
                trace!(plugin = %descriptor.name, "Porting plugin");
                (known.port)(descriptor, ctx)?;
            }
            None => {
                debug!(plugin = %descriptor.name, "Unknown plugin kept as comment");
                ctx.target.plugins.push(PluginSlot::Commented {
                    source_text: descriptor.source_text.clone(),
                    note: "no vite equivalent known; port by hand".to_owned(),
                });
                let warning = construct_warning(descriptor, "plugin left as a comment in vite.config.js");
                ctx.warn(warning);
            }
        }
    }
    Ok(())
}

/// Covered by vite itself or by another rule.
#[allow(clippy::unnecessary_wraps)]
fn absorbed(_descriptor: &ConstructDescriptor, _ctx: &mut TransformContext) -> Result<(), RuleError> {
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn clean(_descriptor: &ConstructDescriptor, ctx: &mut TransformContext) -> Result<(), RuleError> {
    ctx.target.build.empty_out_dir = Some(Value::bool(true));
    Ok(())
}

/// `patterns: [{ from, to }]` becomes `targets: [{ src, dest }]`.
fn static_copy(descriptor: &ConstructDescriptor, ctx: &mut TransformContext) -> Result<(), RuleError> {
    let patterns: &[JsValue] = match descriptor.options() {
        Some(JsValue::Array(patterns)) => patterns.as_slice(),
        Some(options) => match options.get("patterns") {
            Some(JsValue::Array(patterns)) => patterns.as_slice(),
            _ => &[],
        },
        None => &[],
    };

    let mut targets = Vec::new();
    for pattern in patterns {
        let (src, dest) = match pattern {
            JsValue::String(from) => (Value::string(from.clone()), Value::string(".")),
            JsValue::Object(_) => {
                let Some(from) = pattern.get("from") else {
                    return Err(RuleError::new(
                        "plugins",
                        "viteStaticCopy.targets",
                        "copy pattern without `from`",
                    ));
                };
                let dest = pattern
                    .get("to")
                    .map_or_else(|| Value::string("."), Value::from_js);
                (Value::from_js(from), dest)
            }
            other => (Value::from_js(other), Value::string(".")),
        };
        let mut target = ObjectMap::new();
        target.insert("src".to_owned(), src);
        target.insert("dest".to_owned(), dest);
        targets.push(Value::object(target));
    }

    if targets.is_empty() {
        let warning = construct_warning(descriptor, "no copy patterns could be read");
        ctx.warn(warning);
        return Ok(());
    }

    ctx.import(ImportStatement::named("vite-plugin-static-copy", ["viteStaticCopy"]));
    ctx.require("vite-plugin-static-copy", "^0.13.0");
    let mut options = ObjectMap::new();
    options.insert("targets".to_owned(), Value::array(targets));
    ctx.target
        .plugins
        .push(PluginSlot::call_with("viteStaticCopy", vec![Value::object(options)]));
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn compression(descriptor: &ConstructDescriptor, ctx: &mut TransformContext) -> Result<(), RuleError> {
    ctx.import(ImportStatement::default_import(
        "viteCompression",
        "vite-plugin-compression",
    ));
    ctx.require("vite-plugin-compression", "^0.5.1");
    let options = carry_options(
        descriptor,
        &[
            ("algorithm", "algorithm"),
            ("threshold", "threshold"),
            ("deleteOriginalAssets", "deleteOriginFile"),
        ],
    );
    ctx.target
        .plugins
        .push(PluginSlot::call_with("viteCompression", options));
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn eslint(descriptor: &ConstructDescriptor, ctx: &mut TransformContext) -> Result<(), RuleError> {
    ctx.import(ImportStatement::default_import("eslint", "vite-plugin-eslint"));
    ctx.require("vite-plugin-eslint", "^1.8.1");
    let options = carry_options(descriptor, &[("fix", "fix"), ("cache", "cache")]);
    ctx.target.plugins.push(PluginSlot::call_with("eslint", options));
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn checker(_descriptor: &ConstructDescriptor, ctx: &mut TransformContext) -> Result<(), RuleError> {
    ctx.import(ImportStatement::default_import("checker", "vite-plugin-checker"));
    ctx.require("vite-plugin-checker", "^0.5.6");
    let mut options = ObjectMap::new();
    options.insert("typescript".to_owned(), Value::bool(true));
    ctx.target
        .plugins
        .push(PluginSlot::call_with("checker", vec![Value::object(options)]));
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn visualizer(descriptor: &ConstructDescriptor, ctx: &mut TransformContext) -> Result<(), RuleError> {
    ctx.import(ImportStatement::named("rollup-plugin-visualizer", ["visualizer"]));
    ctx.require("rollup-plugin-visualizer", "^5.9.0");
    let options = carry_options(descriptor, &[("openAnalyzer", "open")]);
    ctx.target
        .plugins
        .push(PluginSlot::call_with("visualizer", options));
    Ok(())
}

/// Copies the named options into a single options object, renaming keys.
/// Returns no arguments when nothing carries over.
fn carry_options(descriptor: &ConstructDescriptor, keys: &[(&str, &str)]) -> Vec<Value> {
    let Some(options) = descriptor.options() else {
        return Vec::new();
    };
    let mut out = ObjectMap::new();
    for (from, to) in keys {
        if let Some(value) = options.get(from) {
            out.insert((*to).to_owned(), Value::from_js(value));
        }
    }
    if out.is_empty() {
        Vec::new()
    } else {
        vec![Value::object(out)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{context, object, parsed, plugin, string};

    fn run(descriptors: Vec<ConstructDescriptor>) -> TransformContext {
        let mut parsed = parsed();
        parsed.config.plugins = descriptors;
        let mut ctx = context();
        plugins(&parsed, &mut ctx).expect("rule");
        ctx
    }

    fn rendered(ctx: &TransformContext) -> Vec<String> {
        ctx.target
            .plugins
            .iter()
            .map(|slot| match slot {
                PluginSlot::Call { callee, args } => format!(
                    "{callee}({})",
                    args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                ),
                PluginSlot::Commented { source_text, .. } => format!("// {source_text}"),
            })
            .collect()
    }

    #[test]
    fn test_absorbed_plugins_add_nothing() {
        let ctx = run(vec![
            plugin("HtmlWebpackPlugin", Some("html-webpack-plugin"), Vec::new()),
            plugin("VueLoaderPlugin", Some("vue-loader"), Vec::new()),
            plugin("HotModuleReplacementPlugin", Some("webpack"), Vec::new()),
            plugin("DefinePlugin", Some("webpack"), Vec::new()),
        ]);
        assert!(ctx.target.plugins.is_empty());
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_renamed_import_is_traced_by_package() {
        let ctx = run(vec![plugin("HtmlPlugin", Some("html-webpack-plugin"), Vec::new())]);
        assert!(ctx.target.plugins.is_empty());
    }

    #[test]
    fn test_clean_sets_empty_out_dir() {
        let ctx = run(vec![plugin(
            "CleanWebpackPlugin",
            Some("clean-webpack-plugin"),
            Vec::new(),
        )]);
        assert_eq!(ctx.target.build.empty_out_dir, Some(Value::bool(true)));
    }

    #[test]
    fn test_copy_patterns_become_targets() {
        let ctx = run(vec![plugin(
            "CopyWebpackPlugin",
            Some("copy-webpack-plugin"),
            vec![object(&[(
                "patterns",
                JsValue::Array(vec![
                    object(&[("from", string("static")), ("to", string("static"))]),
                    string("robots.txt"),
                ]),
            )])],
        )]);
        insta::assert_snapshot!(
            rendered(&ctx).join("\n"),
            @"viteStaticCopy({ targets: [{ src: 'static', dest: 'static' }, { src: 'robots.txt', dest: '.' }] })"
        );
        assert!(ctx.imports.contains("vite-plugin-static-copy"));
    }

    #[test]
    fn test_replacement_plugins() {
        let ctx = run(vec![
            plugin(
                "CompressionPlugin",
                Some("compression-webpack-plugin"),
                vec![object(&[
                    ("algorithm", string("gzip")),
                    ("test", string("x")),
                    ("deleteOriginalAssets", JsValue::Bool(false)),
                ])],
            ),
            plugin("ESLintPlugin", Some("eslint-webpack-plugin"), Vec::new()),
            plugin(
                "ForkTsCheckerWebpackPlugin",
                Some("fork-ts-checker-webpack-plugin"),
                Vec::new(),
            ),
            plugin("BundleAnalyzerPlugin", Some("webpack-bundle-analyzer"), Vec::new()),
        ]);
        assert_eq!(
            rendered(&ctx),
            [
                "viteCompression({ algorithm: 'gzip', deleteOriginFile: false })",
                "eslint()",
                "checker({ typescript: true })",
                "visualizer()",
            ]
        );
        let deps: Vec<_> = ctx.dev_dependencies.keys().map(String::as_str).collect();
        assert_eq!(
            deps,
            [
                "vite-plugin-compression",
                "vite-plugin-eslint",
                "vite-plugin-checker",
                "rollup-plugin-visualizer"
            ]
        );
    }

    #[test]
    fn test_unknown_plugin_is_commented_with_warning() {
        let ctx = run(vec![plugin("WorkboxPlugin", Some("workbox-webpack-plugin"), Vec::new())]);
        assert_eq!(rendered(&ctx), ["// new WorkboxPlugin()"]);
        assert_eq!(ctx.warnings.len(), 1);
        assert_eq!(ctx.warnings[0].construct, "WorkboxPlugin");
        assert!(ctx.warnings[0].location.is_some());
    }

    #[test]
    fn test_copy_pattern_without_from_fails() {
        let mut parsed = parsed();
        parsed.config.plugins = vec![plugin(
            "CopyWebpackPlugin",
            Some("copy-webpack-plugin"),
            vec![JsValue::Array(vec![object(&[("to", string("x"))])])],
        )];
        let err = plugins(&parsed, &mut context()).expect_err("should fail");
        assert_eq!(err.rule, "plugins");
    }
}
