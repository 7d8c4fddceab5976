//! `dev-server`.

use wtv_core::{
    AstParsingResult, JsObject, JsValue, ObjectMap, UnsupportedConstructWarning, Value,
    quote_js_string,
};

use crate::context::TransformContext;
use crate::error::RuleError;

const RULE: &str = "dev-server";

/// Proxy options vite understands under the same name.
const PROXY_OPTIONS: &[&str] = &[
    "target",
    "changeOrigin",
    "ws",
    "secure",
    "headers",
    "auth",
    "timeout",
    "xfwd",
    "cookieDomainRewrite",
];

/// Maps `devServer` onto `server`.
pub(crate) fn dev_server(
    parsed: &AstParsingResult,
    ctx: &mut TransformContext,
) -> Result<(), RuleError> {
    let Some(dev_server) = &parsed.config.dev_server else {
        return Ok(());
    };
    let server = &mut ctx.target.server;

    if let Some(port) = &dev_server.port {
        server.port = port_value(port)?;
    }
    if let Some(host) = &dev_server.host {
        server.host = scalar("server.host", host)?;
    }
    if let Some(open) = &dev_server.open {
        server.open = scalar("server.open", open)?;
    }
    if let Some(https) = &dev_server.https {
        server.https = match https {
            JsValue::Undefined => None,
            JsValue::Bool(_) | JsValue::Object(_) | JsValue::Opaque(_) => Some(Value::from_js(https)),
            other => return Err(type_error("server.https", other, "a boolean or an object")),
        };
    }
    if let Some(proxy) = &dev_server.proxy {
        let mut warnings = Vec::new();
        ctx.target.server.proxy = proxy_value(proxy, &mut warnings)?;
        for warning in warnings {
            ctx.warn(warning);
        }
    }
    Ok(())
}

fn port_value(port: &JsValue) -> Result<Option<Value>, RuleError> {
    match port {
        JsValue::Undefined => Ok(None),
        JsValue::Number(_) | JsValue::Opaque(_) => Ok(Some(Value::from_js(port))),
        JsValue::String(text) => Ok(Some(
            text.parse::<f64>()
                .map_or_else(|_| Value::string(text.clone()), Value::number),
        )),
        other => Err(type_error("server.port", other, "a number")),
    }
}

fn scalar(field: &str, value: &JsValue) -> Result<Option<Value>, RuleError> {
    match value {
        JsValue::Undefined => Ok(None),
        JsValue::Bool(_) | JsValue::String(_) | JsValue::Opaque(_) => Ok(Some(Value::from_js(value))),
        other => Err(type_error(field, other, "a string or a boolean")),
    }
}

/// Accepts both the object form (`{ '/api': {...} }`) and webpack 5's array
/// form (`[{ context: ['/api'], target }]`).
fn proxy_value(
    proxy: &JsValue,
    warnings: &mut Vec<UnsupportedConstructWarning>,
) -> Result<Option<ObjectMap>, RuleError> {
    let mut out = ObjectMap::new();
    match proxy {
        JsValue::Undefined => return Ok(None),
        JsValue::Object(map) => {
            for (context, options) in map {
                out.insert(context.clone(), proxy_entry(context, options, warnings)?);
            }
        }
        JsValue::Array(items) => {
            for item in items {
                let contexts: Vec<&str> = match item.get("context") {
                    Some(JsValue::String(context)) => vec![context.as_str()],
                    Some(JsValue::Array(contexts)) => {
                        contexts.iter().filter_map(JsValue::as_str).collect()
                    }
                    _ => {
                        return Err(type_error(
                            "server.proxy",
                            item,
                            "an object with a context",
                        ));
                    }
                };
                for context in contexts {
                    out.insert(context.to_owned(), proxy_entry(context, item, warnings)?);
                }
            }
        }
        other => return Err(type_error("server.proxy", other, "an object or an array")),
    }
    Ok(Some(out))
}

fn proxy_entry(
    context: &str,
    options: &JsValue,
    warnings: &mut Vec<UnsupportedConstructWarning>,
) -> Result<Value, RuleError> {
    let map = match options {
        JsValue::String(target) => return Ok(Value::string(target.clone())),
        JsValue::Object(map) => map,
        other => {
            return Err(type_error(
                &format!("server.proxy['{context}']"),
                other,
                "a string or an object",
            ));
        }
    };

    let mut entry = ObjectMap::new();
    for key in PROXY_OPTIONS {
        if let Some(value) = map.get(*key) {
            entry.insert((*key).to_owned(), Value::from_js(value));
        }
    }
    match map.get("pathRewrite") {
        None | Some(JsValue::Undefined) => {}
        Some(JsValue::Object(rewrites)) => {
            entry.insert("rewrite".to_owned(), rewrite_function(rewrites));
        }
        Some(JsValue::Opaque(opaque)) => {
            entry.insert("rewrite".to_owned(), Value::raw(opaque.source_text.clone()));
        }
        Some(other) => {
            return Err(type_error(
                &format!("server.proxy['{context}'].rewrite"),
                other,
                "an object of patterns",
            ));
        }
    }
    for key in map.keys() {
        if key != "pathRewrite" && key != "context" && !PROXY_OPTIONS.contains(&key.as_str()) {
            warnings.push(UnsupportedConstructWarning::new(
                format!("devServer.proxy['{context}'].{key}"),
                "option has no vite equivalent and was dropped",
            ));
        }
    }
    Ok(Value::object(entry))
}

/// `{ '^/api': '' }` becomes `(path) => path.replace(/^\/api/, '')`.
fn rewrite_function(rewrites: &JsObject) -> Value {
    let mut body = String::from("path");
    for (pattern, replacement) in rewrites {
        let replacement = replacement.as_str().unwrap_or_default();
        body.push_str(&format!(
            ".replace(/{}/, {})",
            escape_slashes(pattern),
            quote_js_string(replacement)
        ));
    }
    Value::raw(format!("(path) => {body}"))
}

fn escape_slashes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut escaped = false;
    for ch in pattern.chars() {
        if ch == '/' && !escaped {
            out.push('\\');
        }
        escaped = ch == '\\' && !escaped;
        out.push(ch);
    }
    out
}

fn type_error(field: &str, value: &JsValue, expected: &str) -> RuleError {
    RuleError::new(
        RULE,
        field,
        format!("value is a {}, expected {expected}", value.type_name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{context, object, parsed, string};
    use wtv_core::DevServer;

    fn run(dev_server: DevServer) -> Result<TransformContext, RuleError> {
        let mut parsed = parsed();
        parsed.config.dev_server = Some(dev_server);
        let mut ctx = context();
        super::dev_server(&parsed, &mut ctx)?;
        Ok(ctx)
    }

    #[test]
    fn test_scalars() {
        let ctx = run(DevServer {
            port: Some(string("8081")),
            host: Some(string("0.0.0.0")),
            open: Some(JsValue::Bool(true)),
            https: Some(JsValue::Bool(false)),
            proxy: None,
        })
        .expect("rule");
        let server = &ctx.target.server;
        assert_eq!(server.port, Some(Value::number(8081.0)));
        assert_eq!(server.host, Some(Value::string("0.0.0.0")));
        assert_eq!(server.open, Some(Value::bool(true)));
        assert_eq!(server.https, Some(Value::bool(false)));
    }

    #[test]
    fn test_proxy_with_path_rewrite() {
        let proxy = object(&[(
            "/api",
            object(&[
                ("target", string("http://localhost:3000")),
                ("changeOrigin", JsValue::Bool(true)),
                ("pathRewrite", object(&[("^/api", string(""))])),
            ]),
        )]);
        let ctx = run(DevServer {
            proxy: Some(proxy),
            ..DevServer::default()
        })
        .expect("rule");

        let proxy = ctx.target.server.proxy.expect("proxy");
        insta::assert_snapshot!(
            proxy["/api"].to_string(),
            @r"{ target: 'http://localhost:3000', changeOrigin: true, rewrite: (path) => path.replace(/^\/api/, '') }"
        );
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_proxy_array_form() {
        let proxy = JsValue::Array(vec![object(&[
            ("context", JsValue::Array(vec![string("/auth"), string("/api")])),
            ("target", string("http://localhost:3000")),
            ("bypass", string("x")),
        ])]);
        let ctx = run(DevServer {
            proxy: Some(proxy),
            ..DevServer::default()
        })
        .expect("rule");
        let proxy = ctx.target.server.proxy.expect("proxy");
        let keys: Vec<_> = proxy.keys().map(String::as_str).collect();
        assert_eq!(keys, ["/auth", "/api"]);
        assert_eq!(ctx.warnings.len(), 2);
    }

    #[test]
    fn test_string_proxy() {
        let ctx = run(DevServer {
            proxy: Some(object(&[("/api", string("http://backend"))])),
            ..DevServer::default()
        })
        .expect("rule");
        let proxy = ctx.target.server.proxy.expect("proxy");
        assert_eq!(proxy["/api"], Value::string("http://backend"));
    }

    #[test]
    fn test_port_of_wrong_type_fails() {
        let err = run(DevServer {
            port: Some(JsValue::Array(Vec::new())),
            ..DevServer::default()
        })
        .expect_err("should fail");
        assert_eq!(err.rule, "dev-server");
        assert_eq!(err.field, "server.port");
    }

    #[test]
    fn test_escape_slashes() {
        assert_eq!(escape_slashes("^/api"), r"^\/api");
        assert_eq!(escape_slashes(r"^\/api"), r"^\/api");
    }
}
