//! `framework`.

use tracing::debug;
use wtv_core::{
    AstParsingResult, FrameworkVersion, ImportStatement, ObjectMap, PluginSlot, Value,
};

use crate::context::TransformContext;
use crate::error::RuleError;

/// Adds the vite integration plugin for the detected framework.
pub(crate) fn framework(
    _parsed: &AstParsingResult,
    ctx: &mut TransformContext,
) -> Result<(), RuleError> {
    match ctx.framework {
        FrameworkVersion::Vue2 => {
            ctx.import(ImportStatement::named("vite-plugin-vue2", ["createVuePlugin"]));
            ctx.require("vite-plugin-vue2", "^2.0.3");
            let args = if ctx.uses_jsx {
                let mut options = ObjectMap::new();
                options.insert("jsx".to_owned(), Value::bool(true));
                vec![Value::object(options)]
            } else {
                Vec::new()
            };
            ctx.target
                .plugins
                .push(PluginSlot::call_with("createVuePlugin", args));
        }
        FrameworkVersion::Vue3 => {
            ctx.import(ImportStatement::default_import("vue", "@vitejs/plugin-vue"));
            ctx.require("@vitejs/plugin-vue", "^4.0.0");
            ctx.target.plugins.push(PluginSlot::call("vue"));
            if ctx.uses_jsx {
                ctx.import(ImportStatement::default_import(
                    "vueJsx",
                    "@vitejs/plugin-vue-jsx",
                ));
                ctx.require("@vitejs/plugin-vue-jsx", "^3.0.0");
                ctx.target.plugins.push(PluginSlot::call("vueJsx"));
            }
        }
        FrameworkVersion::React => {
            ctx.import(ImportStatement::default_import("react", "@vitejs/plugin-react"));
            ctx.require("@vitejs/plugin-react", "^3.1.0");
            ctx.target.plugins.push(PluginSlot::call("react"));
        }
        FrameworkVersion::Unknown => debug!("No framework detected, no integration plugin"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ProjectHints, TransformContext};
    use crate::rules::fixtures::parsed;

    fn run(framework: FrameworkVersion, uses_jsx: bool) -> TransformContext {
        let mut ctx = TransformContext::new(ProjectHints {
            framework,
            uses_jsx,
        });
        super::framework(&parsed(), &mut ctx).expect("rule");
        ctx
    }

    fn callees(ctx: &TransformContext) -> Vec<String> {
        ctx.target
            .plugins
            .iter()
            .filter_map(|slot| match slot {
                PluginSlot::Call { callee, args } if args.is_empty() => Some(callee.clone()),
                PluginSlot::Call { callee, args } => Some(format!("{callee}({})", args.len())),
                PluginSlot::Commented { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_vue2_with_jsx() {
        let ctx = run(FrameworkVersion::Vue2, true);
        assert_eq!(callees(&ctx), ["createVuePlugin(1)"]);
        assert!(ctx.dev_dependencies.contains_key("vite-plugin-vue2"));
    }

    #[test]
    fn test_vue3_with_jsx() {
        let ctx = run(FrameworkVersion::Vue3, true);
        assert_eq!(callees(&ctx), ["vue", "vueJsx"]);
        let imports: Vec<_> = ctx.imports.iter().map(ToString::to_string).collect();
        assert_eq!(
            imports,
            [
                "import vue from '@vitejs/plugin-vue'",
                "import vueJsx from '@vitejs/plugin-vue-jsx'"
            ]
        );
    }

    #[test]
    fn test_react() {
        let ctx = run(FrameworkVersion::React, false);
        assert_eq!(callees(&ctx), ["react"]);
    }

    #[test]
    fn test_unknown_adds_nothing() {
        let ctx = run(FrameworkVersion::Unknown, true);
        assert!(ctx.target.plugins.is_empty());
        assert!(ctx.imports.is_empty());
    }
}
