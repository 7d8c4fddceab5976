//! `index.html`.
//!
//! Vite serves the HTML document as the entry point, so the template the
//! bundler used to fill in is rewritten into a static file with an explicit
//! module script.

use camino::Utf8Path;
use tracing::{info, warn};
use wtv_core::path::{relative_to, to_forward_slashes};
use wtv_core::{AstParsingResult, UnsupportedConstructWarning};
use wtv_transform::Transformed;

use crate::error::EmitError;

const TAG_OPEN: &str = "<%";
const TAG_CLOSE: &str = "%>";
const BODY_CLOSE: &str = "</body>";

/// Renders the entry document.
///
/// Known template placeholders are replaced with `base` and `title`, any
/// other template tag is removed and reported. The module script pointing at
/// `entry_src` goes right before the last `</body>`, or at the end when the
/// template has none. Without a template a minimal document is generated.
///
/// # Examples
///
/// ```
/// use wtv_emit::render_index_html;
///
/// let (html, warnings) = render_index_html(
///     Some("<link rel=\"icon\" href=\"<%= BASE_URL %>favicon.ico\"><body></body>"),
///     "Shop",
///     "/",
///     "/main.js",
/// );
/// assert_eq!(
///     html,
///     "<link rel=\"icon\" href=\"/favicon.ico\"><body>  <script type=\"module\" src=\"/main.js\"></script>\n</body>"
/// );
/// assert!(warnings.is_empty());
/// ```
#[must_use]
pub fn render_index_html(
    template: Option<&str>,
    title: &str,
    base: &str,
    entry_src: &str,
) -> (String, Vec<UnsupportedConstructWarning>) {
    let script = format!("<script type=\"module\" src=\"{}\"></script>", escape_html(entry_src));
    let Some(template) = template else {
        let html = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"UTF-8\" />\n    \
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n    \
             <title>{}</title>\n  </head>\n  <body>\n    <div id=\"app\"></div>\n    {script}\n  \
             </body>\n</html>\n",
            escape_html(title)
        );
        let warnings = vec![UnsupportedConstructWarning::new(
            "index.html",
            "no HTML template found; generated a default document with <div id=\"app\">",
        )];
        return (html, warnings);
    };

    let (mut html, warnings) = fill_placeholders(template, title, base);
    match html.rfind(BODY_CLOSE) {
        Some(at) => html.insert_str(at, &format!("  {script}\n")),
        None => {
            if !html.is_empty() && !html.ends_with('\n') {
                html.push('\n');
            }
            html.push_str(&script);
            html.push('\n');
        }
    }
    (html, warnings)
}

fn fill_placeholders(
    template: &str,
    title: &str,
    base: &str,
) -> (String, Vec<UnsupportedConstructWarning>) {
    let mut out = String::with_capacity(template.len());
    let mut warnings = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(TAG_OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + TAG_OPEN.len()..];
        let Some(end) = after_open.find(TAG_CLOSE) else {
            warnings.push(UnsupportedConstructWarning::new(
                "index.html",
                "unterminated template tag left as is",
            ));
            out.push_str(&rest[start..]);
            return (out, warnings);
        };

        let tag = &rest[start..start + TAG_OPEN.len() + end + TAG_CLOSE.len()];
        let body = &after_open[..end];
        match body.strip_prefix(['=', '-']).map(str::trim) {
            Some("BASE_URL") => out.push_str(base),
            Some("htmlWebpackPlugin.options.title" | "webpackConfig.name") => {
                out.push_str(&escape_html(title));
            }
            _ => {
                warn!(tag = %tag, "Removing template tag");
                warnings.push(UnsupportedConstructWarning::new(
                    tag,
                    "template tag removed from index.html; port it by hand",
                ));
            }
        }
        rest = &after_open[end + TAG_CLOSE.len()..];
    }
    out.push_str(rest);
    (out, warnings)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Writes the entry document to `path` and returns the template warnings.
///
/// Reads the template recorded at extraction. The script source is the first
/// entry relative to the configured vite root, so this must run on the same
/// [`Transformed`] the config emitter wrote.
pub async fn emit_index_html(
    path: &Utf8Path,
    parsed: &AstParsingResult,
    transformed: &Transformed,
) -> Result<Vec<UnsupportedConstructWarning>, EmitError> {
    let template = match &parsed.html.path {
        Some(template_path) => Some(
            tokio::fs::read_to_string(template_path)
                .await
                .map_err(|err| EmitError::read(template_path, err))?,
        ),
        None => None,
    };

    let config = &transformed.config;
    let entry_src = parsed.config.first_entry().map_or_else(
        || "/main.js".to_owned(),
        |entry| {
            let relative = relative_to(entry, Utf8Path::new(config.root_dir()));
            format!("/{}", to_forward_slashes(relative.as_str()))
        },
    );
    let title = parsed
        .html
        .title
        .as_deref()
        .or(parsed.manifest.name.as_deref())
        .unwrap_or("App");

    let (html, warnings) =
        render_index_html(template.as_deref(), title, config.base_path(), &entry_src);
    crate::write_file(path, &html).await?;
    info!(path = %path, entry = %entry_src, warnings = warnings.len(), "Wrote index.html");
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtv_core::{ProjectType, TargetConfig, Value};

    const VUE_CLI_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="">
  <head>
    <link rel="icon" href="<%= BASE_URL %>favicon.ico">
    <title><%= htmlWebpackPlugin.options.title %></title>
  </head>
  <body>
    <noscript>
      <strong>Please enable JavaScript to continue.</strong>
    </noscript>
    <% if (process.env.NODE_ENV === 'production') { %><script src="/analytics.js"></script><% } %>
    <div id="app"></div>
  </body>
</html>
"#;

    #[test]
    fn test_vue_cli_template() {
        let (html, warnings) =
            render_index_html(Some(VUE_CLI_TEMPLATE), "Shop & Co", "/portal/", "/main.js");
        insta::assert_snapshot!(html, @r#"
        <!DOCTYPE html>
        <html lang="">
          <head>
            <link rel="icon" href="/portal/favicon.ico">
            <title>Shop &amp; Co</title>
          </head>
          <body>
            <noscript>
              <strong>Please enable JavaScript to continue.</strong>
            </noscript>
            <script src="/analytics.js"></script>
            <div id="app"></div>
            <script type="module" src="/main.js"></script>
        </body>
        </html>
        "#);
        let tags: Vec<_> = warnings.iter().map(|w| w.construct.as_str()).collect();
        assert_eq!(
            tags,
            ["<% if (process.env.NODE_ENV === 'production') { %>", "<% } %>"]
        );
    }

    #[test]
    fn test_webpack_config_name_and_dash_tags() {
        let (html, warnings) = render_index_html(
            Some("<title><%- webpackConfig.name %></title><body></body>"),
            "Admin",
            "/",
            "/src/index.ts",
        );
        assert_eq!(
            html,
            "<title>Admin</title><body>  <script type=\"module\" src=\"/src/index.ts\"></script>\n</body>"
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_body_appends_script() {
        let (html, _) = render_index_html(Some("<div id=\"root\"></div>"), "x", "/", "/main.js");
        assert_eq!(
            html,
            "<div id=\"root\"></div>\n<script type=\"module\" src=\"/main.js\"></script>\n"
        );
    }

    #[test]
    fn test_unterminated_tag() {
        let (html, warnings) = render_index_html(Some("<p><% oops</p>"), "x", "/", "/m.js");
        assert!(html.starts_with("<p><% oops</p>"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_default_document() {
        let (html, warnings) = render_index_html(None, "<Shop>", "/", "/main.js");
        assert!(html.contains("<title>&lt;Shop&gt;</title>"));
        assert!(html.contains("<div id=\"app\"></div>"));
        assert!(html.contains("<script type=\"module\" src=\"/main.js\"></script>\n  </body>"));
        assert_eq!(warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_emit_uses_vite_root_and_base() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8Path::from_path(dir.path()).expect("utf8");
        let template = root.join("public/index.html");
        tokio::fs::create_dir_all(root.join("public")).await.expect("mkdir");
        tokio::fs::write(&template, "<body><%= BASE_URL %></body>")
            .await
            .expect("write");

        let mut parsed = AstParsingResult::new(root, ProjectType::VueCli);
        parsed
            .config
            .entry
            .insert("app".to_owned(), "src/main.js".into());
        parsed.html.path = Some(template);

        let transformed = Transformed {
            config: TargetConfig {
                root: Some(Value::string("src")),
                base: Some(Value::string("/app/")),
                ..TargetConfig::default()
            },
            imports: wtv_core::ImportList::new(),
            dependencies: indexmap::IndexMap::new(),
            warnings: Vec::new(),
        };

        let out = root.join("src/index.html");
        let warnings = emit_index_html(&out, &parsed, &transformed)
            .await
            .expect("emit");
        assert!(warnings.is_empty());
        let html = tokio::fs::read_to_string(&out).await.expect("read");
        assert_eq!(
            html,
            "<body>/app/  <script type=\"module\" src=\"/main.js\"></script>\n</body>"
        );
    }

    #[tokio::test]
    async fn test_missing_template_file_names_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8Path::from_path(dir.path()).expect("utf8");
        let mut parsed = AstParsingResult::new(root, ProjectType::Webpack);
        parsed.html.path = Some(root.join("gone.html"));
        let transformed = Transformed {
            config: TargetConfig::default(),
            imports: wtv_core::ImportList::new(),
            dependencies: indexmap::IndexMap::new(),
            warnings: Vec::new(),
        };

        let err = emit_index_html(&root.join("index.html"), &parsed, &transformed)
            .await
            .expect_err("missing template");
        assert_eq!(err.path(), root.join("gone.html"));
    }
}
