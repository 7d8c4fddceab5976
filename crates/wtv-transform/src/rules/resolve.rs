//! `alias` and `extensions`.

use wtv_core::{
    AliasEntry, AliasTarget, AstParsingResult, JsValue, UnsupportedConstructWarning, Value,
};

use super::project_path;
use crate::context::TransformContext;
use crate::error::RuleError;

/// Aliases in declaration order as `{ find, replacement }` entries.
///
/// A webpack exact-match alias (`vue$`) becomes a regex `find`.
pub(crate) fn alias(parsed: &AstParsingResult, ctx: &mut TransformContext) -> Result<(), RuleError> {
    for (token, target) in &parsed.config.aliases {
        let find = match token.strip_suffix('$') {
            Some(exact) => Value::raw(format!("/^{}$/", escape_regex(exact))),
            None => Value::string(token.clone()),
        };
        let replacement = match target {
            AliasTarget::Path(absolute) => project_path(parsed, ctx, absolute),
            AliasTarget::Module(specifier) => Value::string(specifier.clone()),
            AliasTarget::Unsupported(opaque) => {
                ctx.warn(
                    UnsupportedConstructWarning::new(
                        format!("resolve.alias['{token}']"),
                        "target kept as written; check that it still evaluates in vite.config.js",
                    )
                    .at(opaque.location),
                );
                Value::raw(opaque.source_text.clone())
            }
        };
        ctx.target
            .resolve
            .alias
            .push(AliasEntry { find, replacement });
    }
    Ok(())
}

/// String extensions are copied; webpack's `'...'` default marker is dropped.
pub(crate) fn extensions(
    parsed: &AstParsingResult,
    ctx: &mut TransformContext,
) -> Result<(), RuleError> {
    let mut extensions = Vec::new();
    for extension in &parsed.config.extensions {
        match extension {
            JsValue::String(ext) if ext == "..." => {}
            JsValue::String(ext) => extensions.push(Value::string(ext.clone())),
            JsValue::Opaque(opaque) => ctx.warn(
                UnsupportedConstructWarning::new(
                    "resolve.extensions",
                    format!("'{}' dropped", opaque.source_text),
                )
                .at(opaque.location),
            ),
            other => {
                return Err(RuleError::new(
                    "extensions",
                    "resolve.extensions",
                    format!("extension is a {}, expected a string", other.type_name()),
                ));
            }
        }
    }
    if !extensions.is_empty() {
        ctx.target.resolve.extensions = Some(extensions);
    }
    Ok(())
}

fn escape_regex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '/' | '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{context, parsed};
    use wtv_core::{Opaque, SourceLocation};

    #[test]
    fn test_alias_order_and_targets() {
        let mut parsed = parsed();
        let aliases = &mut parsed.config.aliases;
        aliases.insert("@".to_owned(), AliasTarget::Path("/app/src".into()));
        aliases.insert(
            "vue$".to_owned(),
            AliasTarget::Module("vue/dist/vue.esm.js".to_owned()),
        );
        aliases.insert("~lib".to_owned(), AliasTarget::Path("/shared/lib".into()));

        let mut ctx = context();
        alias(&parsed, &mut ctx).expect("rule");

        let rendered: Vec<_> = ctx
            .target
            .resolve
            .alias
            .iter()
            .map(|entry| format!("{} -> {}", entry.find, entry.replacement))
            .collect();
        insta::assert_snapshot!(rendered.join("\n"), @r"
        '@' -> path.resolve(__dirname, 'src')
        /^vue$/ -> 'vue/dist/vue.esm.js'
        '~lib' -> path.resolve(__dirname, '../shared/lib')
        ");
        assert!(ctx.imports.contains("path"));
    }

    #[test]
    fn test_alias_replacement_is_raw() {
        let mut parsed = parsed();
        parsed
            .config
            .aliases
            .insert("@".to_owned(), AliasTarget::Path("/app/src".into()));
        let mut ctx = context();
        alias(&parsed, &mut ctx).expect("rule");

        let entry = &ctx.target.resolve.alias[0];
        assert!(entry.replacement.is_raw());
        assert!(!entry.find.is_raw());
    }

    #[test]
    fn test_unsupported_alias_is_kept_with_warning() {
        let mut parsed = parsed();
        parsed.config.aliases.insert(
            "cfg".to_owned(),
            AliasTarget::Unsupported(Opaque {
                source_text: "getConfigDir()".to_owned(),
                location: SourceLocation::new(4, 10, 80),
            }),
        );
        let mut ctx = context();
        alias(&parsed, &mut ctx).expect("rule");
        assert_eq!(
            ctx.target.resolve.alias[0].replacement,
            Value::raw("getConfigDir()")
        );
        assert_eq!(ctx.warnings.len(), 1);
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("vue"), "vue");
        assert_eq!(escape_regex("a.b/c"), r"a\.b\/c");
    }

    #[test]
    fn test_extensions_drop_default_marker() {
        let mut parsed = parsed();
        parsed.config.extensions = vec![
            JsValue::String(".js".to_owned()),
            JsValue::String(".vue".to_owned()),
            JsValue::String("...".to_owned()),
        ];
        let mut ctx = context();
        extensions(&parsed, &mut ctx).expect("rule");
        assert_eq!(
            ctx.target.resolve.extensions,
            Some(vec![Value::string(".js"), Value::string(".vue")])
        );
    }

    #[test]
    fn test_only_default_marker_leaves_extensions_unset() {
        let mut parsed = parsed();
        parsed.config.extensions = vec![JsValue::String("...".to_owned())];
        let mut ctx = context();
        extensions(&parsed, &mut ctx).expect("rule");
        assert_eq!(ctx.target.resolve.extensions, None);
    }

    #[test]
    fn test_non_string_extension_fails() {
        let mut parsed = parsed();
        parsed.config.extensions = vec![JsValue::Number(1.0)];
        let err = extensions(&parsed, &mut context()).expect_err("should fail");
        assert_eq!(err.rule, "extensions");
    }
}
