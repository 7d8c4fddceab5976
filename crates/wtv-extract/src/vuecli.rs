//! Mapping `vue.config.js` onto [`ExtractedConfig`].
//!
//! vue-cli hides webpack behind its own options and a few conventions: an
//! `@` alias for `src`, `public/index.html` as the page template, and a
//! `configureWebpack` escape hatch that is read like a webpack config.

use camino::Utf8Path;
use indexmap::IndexMap;
use tracing::debug;
use wtv_core::{
    AliasTarget, ConstructDescriptor, ConstructKind, ExtractedConfig, HtmlTemplate, JsValue,
    UnsupportedConstructWarning, path,
};

use crate::webpack::{DeclaredEntry, WebpackReader, location_of, unsupported};

/// Name vue-cli gives its single entry.
pub const VUE_CLI_ENTRY_NAME: &str = "app";

/// `css.loaderOptions` keys and the loader each configures.
const LOADER_OPTIONS: &[(&str, &str, &str)] = &[
    ("css", "css-loader", r"/\.css$/"),
    ("postcss", "postcss-loader", r"/\.css$/"),
    ("sass", "sass-loader", r"/\.sass$/"),
    ("scss", "sass-loader", r"/\.scss$/"),
    ("less", "less-loader", r"/\.less$/"),
    ("stylus", "stylus-loader", r"/\.styl(us)?$/"),
];

/// Records what a vue-cli configuration declares.
///
/// `config` is the evaluated export of `vue.config.js`, or an empty object
/// when the project has none.
pub fn read_vue_config(
    reader: &WebpackReader<'_>,
    root: &Utf8Path,
    config: &JsValue,
    out: &mut ExtractedConfig,
    html: &mut HtmlTemplate,
) -> DeclaredEntry {
    out.aliases
        .insert("@".to_owned(), AliasTarget::Path(root.join("src")));

    let public_path = config.get("publicPath").or_else(|| config.get("baseUrl"));
    match public_path {
        None | Some(JsValue::Undefined) => {}
        Some(JsValue::String(public)) => out.public_path = Some(public.clone()),
        Some(other) => out.unsupported.push(unsupported(
            "publicPath",
            other,
            "public path does not evaluate to a string",
        )),
    }
    if let Some(dir) = config.get("outputDir").and_then(JsValue::as_str) {
        out.output_path = Some(path::resolve(root, &[dir]));
    }
    if let Some(dir) = config.get("assetsDir").and_then(JsValue::as_str) {
        out.assets_dir = Some(dir.to_owned());
    }
    if config.get("productionSourceMap") == Some(&JsValue::Bool(false)) {
        out.devtool = Some(JsValue::Bool(false));
    }
    if let Some(dev_server) = reader.read_dev_server(config.get("devServer"), out) {
        out.dev_server = Some(dev_server);
    }
    read_loader_options(config, out);

    let pages = read_pages(root, config.get("pages"), out, html);

    let configured = match config.get("configureWebpack") {
        None | Some(JsValue::Undefined) => DeclaredEntry::Absent,
        Some(webpack @ JsValue::Object(_)) => {
            debug!("Reading configureWebpack object");
            reader.read(webpack, out, html)
        }
        Some(other) => {
            let warning = UnsupportedConstructWarning::new(
                "configureWebpack",
                "function form cannot be evaluated; port its changes to vite.config.js by hand",
            );
            out.unsupported.push(match location_of(other) {
                Some(location) => warning.at(location),
                None => warning,
            });
            DeclaredEntry::Absent
        }
    };

    match config.get("chainWebpack") {
        None | Some(JsValue::Undefined) => {}
        Some(chain) => {
            let warning = UnsupportedConstructWarning::new(
                "chainWebpack",
                "webpack-chain calls are not converted; port them to vite.config.js by hand",
            );
            out.unsupported.push(match location_of(chain) {
                Some(location) => warning.at(location),
                None => warning,
            });
        }
    }

    pages.or(configured)
}

/// `css.loaderOptions` become loader descriptors so the loader rules map them.
fn read_loader_options(config: &JsValue, out: &mut ExtractedConfig) {
    let Some(options) = config.get("css").and_then(|css| css.get("loaderOptions")) else {
        return;
    };
    let Some(options) = options.as_object() else {
        out.unsupported.push(unsupported(
            "css.loaderOptions",
            options,
            "loader options do not evaluate to an object",
        ));
        return;
    };

    for (key, value) in options {
        let Some((_, loader, test)) = LOADER_OPTIONS.iter().find(|(name, ..)| name == key) else {
            out.unsupported.push(UnsupportedConstructWarning::new(
                format!("css.loaderOptions.{key}"),
                "unknown preprocessor",
            ));
            continue;
        };
        out.loaders.push(ConstructDescriptor {
            kind: ConstructKind::Loader,
            name: (*loader).to_owned(),
            package: Some((*loader).to_owned()),
            args: vec![value.clone()],
            source_text: format!("css.loaderOptions.{key}"),
            location: location_of(value).unwrap_or_default(),
            test: Some((*test).to_owned()),
        });
    }
}

/// Reads `pages`. The first page's template and title become the HTML
/// template.
fn read_pages(
    root: &Utf8Path,
    pages: Option<&JsValue>,
    out: &mut ExtractedConfig,
    html: &mut HtmlTemplate,
) -> DeclaredEntry {
    let Some(pages) = pages.and_then(JsValue::as_object) else {
        return DeclaredEntry::Absent;
    };

    let mut entries = IndexMap::new();
    for (index, (name, page)) in pages.iter().enumerate() {
        let entry = match page {
            JsValue::String(file) => Some(file.as_str()),
            JsValue::Object(_) => page.get("entry").and_then(|entry| match entry {
                JsValue::Array(items) => items.last().and_then(JsValue::as_str),
                other => other.as_str(),
            }),
            _ => None,
        };
        let Some(entry) = entry else {
            return DeclaredEntry::Unresolved(crate::webpack::render(page));
        };
        entries.insert(name.clone(), path::resolve(root, &[entry]));

        if index == 0 {
            if let Some(template) = page.get("template").and_then(JsValue::as_str) {
                html.path = Some(path::resolve(root, &[template]));
            }
            if let Some(title) = page.get("title").and_then(JsValue::as_str) {
                html.title = Some(title.to_owned());
            }
        } else {
            out.unsupported.push(UnsupportedConstructWarning::new(
                format!("pages.{name}"),
                "only the first page gets an index.html template",
            ));
        }
    }

    if entries.is_empty() {
        DeclaredEntry::Absent
    } else {
        DeclaredEntry::Paths(entries)
    }
}
