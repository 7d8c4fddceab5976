//! `vite.config.js`.

use camino::Utf8Path;
use tracing::info;
use wtv_core::{ObjectMap, TargetConfig, Value};
use wtv_transform::Transformed;

use crate::error::EmitError;
use crate::js::{Node, Printer};

/// Renders the configuration file: imports, the pass-through notes, then
/// `export default defineConfig({...});`.
#[must_use]
pub fn render_vite_config(transformed: &Transformed) -> String {
    let mut printer = Printer::new();
    for import in &transformed.imports {
        printer.push(&format!("{import};"));
        printer.newline();
    }
    if !transformed.imports.is_empty() {
        printer.newline();
    }

    let pass_through = &transformed.config.pass_through;
    if !pass_through.is_empty() {
        printer.push("// The following loaders have no vite equivalent and were not converted:");
        printer.newline();
        for loader in pass_through {
            printer.push(&format!("//   {}: {}", loader.name, loader.note));
            printer.newline();
            for line in loader.source_text.lines() {
                printer.push(&format!("//     {}", line.trim_end()));
                printer.newline();
            }
        }
        printer.newline();
    }

    let config = &transformed.config;
    let alias: Vec<Value> = config
        .resolve
        .alias
        .iter()
        .map(|entry| {
            let mut map = ObjectMap::new();
            map.insert("find".to_owned(), entry.find.clone());
            map.insert("replacement".to_owned(), entry.replacement.clone());
            Value::object(map)
        })
        .collect();

    printer.push("export default defineConfig(");
    printer.node(&config_node(config, alias), 0);
    printer.push(");");
    printer.newline();
    printer.finish()
}

fn config_node(config: &TargetConfig, alias: Vec<Value>) -> Node<'_> {
    let mut entries: Vec<(&'static str, Node<'_>)> = Vec::new();
    push_value(&mut entries, "root", config.root.as_ref());
    push_value(&mut entries, "base", config.base.as_ref());
    push_value(&mut entries, "mode", config.mode.as_ref());
    push_value(&mut entries, "publicDir", config.public_dir.as_ref());
    push_value(&mut entries, "envDir", config.env_dir.as_ref());
    if !config.plugins.is_empty() {
        entries.push(("plugins", Node::Plugins(&config.plugins)));
    }

    let mut resolve = Vec::new();
    if !alias.is_empty() {
        resolve.push(("alias", Node::Owned(Value::array(alias))));
    }
    if let Some(extensions) = &config.resolve.extensions {
        resolve.push(("extensions", Node::Owned(Value::array(extensions.clone()))));
    }
    push_object(&mut entries, "resolve", resolve);

    if !config.define.is_empty() {
        entries.push(("define", Node::Owned(Value::object(config.define.clone()))));
    }

    if !config.css.preprocessor_options.is_empty() {
        let options = config
            .css
            .preprocessor_options
            .iter()
            .map(|(language, options)| (language.clone(), Value::object(options.clone())))
            .collect();
        entries.push((
            "css",
            Node::Object(vec![("preprocessorOptions", Node::Owned(Value::object(options)))]),
        ));
    }

    let server = &config.server;
    let mut server_entries = Vec::new();
    push_value(&mut server_entries, "port", server.port.as_ref());
    push_value(&mut server_entries, "host", server.host.as_ref());
    push_value(&mut server_entries, "open", server.open.as_ref());
    push_value(&mut server_entries, "https", server.https.as_ref());
    if let Some(proxy) = &server.proxy {
        server_entries.push(("proxy", Node::Owned(Value::object(proxy.clone()))));
    }
    push_object(&mut entries, "server", server_entries);

    let build = &config.build;
    let mut build_entries = Vec::new();
    push_value(&mut build_entries, "outDir", build.out_dir.as_ref());
    push_value(&mut build_entries, "assetsDir", build.assets_dir.as_ref());
    push_value(&mut build_entries, "sourcemap", build.sourcemap.as_ref());
    push_value(&mut build_entries, "emptyOutDir", build.empty_out_dir.as_ref());
    if let Some(input) = &build.rollup_input {
        build_entries.push((
            "rollupOptions",
            Node::Object(vec![("input", Node::Owned(Value::object(input.clone())))]),
        ));
    }
    push_object(&mut entries, "build", build_entries);

    Node::Object(entries)
}

fn push_value<'a>(entries: &mut Vec<(&'static str, Node<'a>)>, key: &'static str, value: Option<&'a Value>) {
    if let Some(value) = value {
        entries.push((key, Node::Value(value)));
    }
}

fn push_object<'a>(
    entries: &mut Vec<(&'static str, Node<'a>)>,
    key: &'static str,
    children: Vec<(&'static str, Node<'a>)>,
) {
    if !children.is_empty() {
        entries.push((key, Node::Object(children)));
    }
}

/// Writes `vite.config.js`, creating parent directories and replacing any
/// existing file.
///
/// # Errors
///
/// Returns [`EmitError::Write`] naming `path` when the file cannot be written.
pub async fn emit_vite_config(path: &Utf8Path, transformed: &Transformed) -> Result<(), EmitError> {
    let source = render_vite_config(transformed);
    crate::write_file(path, &source).await?;
    info!(path = %path, bytes = source.len(), "Wrote vite config");
    Ok(())
}
