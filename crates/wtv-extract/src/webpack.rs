//! Mapping an evaluated webpack configuration onto [`ExtractedConfig`].
//!
//! The reader never fails: values it cannot interpret become
//! [`UnsupportedConstructWarning`]s or descriptors that the rule catalog
//! passes through. Only entries are left for the caller to check, since a
//! project without a usable entry cannot be converted at all.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::{debug, trace};
use wtv_core::{
    AliasTarget, ConstructDescriptor, ConstructKind, DevServer, ExtractedConfig, HtmlTemplate,
    JsValue, Mode, Opaque, SourceLocation, UnsupportedConstructWarning, Value, path,
};
use wtv_parser::ModuleBindings;

/// Entries as the configuration declares them, before defaults and
/// existence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredEntry {
    /// The configuration declares no entry.
    Absent,
    /// Entry name to absolute path (possibly without extension).
    Paths(IndexMap<String, Utf8PathBuf>),
    /// An entry is declared but does not evaluate to paths.
    Unresolved(String),
}

impl DeclaredEntry {
    /// Keeps `self` unless it is [`Absent`](Self::Absent).
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Absent => other,
            declared => declared,
        }
    }
}

/// Reads webpack configuration objects.
#[derive(Debug, Clone, Copy)]
pub struct WebpackReader<'a> {
    root: &'a Utf8Path,
    bindings: &'a ModuleBindings,
    entry_name: &'a str,
}

impl<'a> WebpackReader<'a> {
    /// Creates a reader resolving relative paths against `root`.
    ///
    /// `entry_name` names a single unnamed entry (`main` for webpack, `app`
    /// for vue-cli).
    #[must_use]
    pub const fn new(root: &'a Utf8Path, bindings: &'a ModuleBindings, entry_name: &'a str) -> Self {
        Self {
            root,
            bindings,
            entry_name,
        }
    }

    /// Records everything `config` declares into `out` and `html`.
    pub fn read(
        &self,
        config: &JsValue,
        out: &mut ExtractedConfig,
        html: &mut HtmlTemplate,
    ) -> DeclaredEntry {
        let context = match config.get("context") {
            Some(JsValue::String(dir)) => path::resolve(self.root, &[dir]),
            _ => self.root.to_owned(),
        };

        self.read_mode(config.get("mode"), out);
        self.read_output(config.get("output"), out);
        if let Some(resolve) = config.get("resolve") {
            self.read_aliases(resolve.get("alias"), out);
            match resolve.get("extensions") {
                Some(JsValue::Array(extensions)) => out.extensions.clone_from(extensions),
                None | Some(JsValue::Undefined) => {}
                Some(other) => out.unsupported.push(unsupported(
                    "resolve.extensions",
                    other,
                    "extensions do not evaluate to a list",
                )),
            }
        }
        match config.get("devtool") {
            None | Some(JsValue::Undefined) => {}
            Some(devtool) => out.devtool = Some(devtool.clone()),
        }
        if let Some(dev_server) = self.read_dev_server(config.get("devServer"), out) {
            out.dev_server = Some(dev_server);
        }
        self.read_plugins(config.get("plugins"), out);
        self.read_html_plugin(out, html, &context);
        if let Some(module) = config.get("module") {
            for key in ["rules", "loaders"] {
                match module.get(key) {
                    Some(JsValue::Array(rules)) => {
                        for rule in rules {
                            self.read_rule(rule, None, out);
                        }
                    }
                    None | Some(JsValue::Undefined) => {}
                    Some(other) => out.unsupported.push(unsupported(
                        format!("module.{key}"),
                        other,
                        "rules do not evaluate to a list",
                    )),
                }
            }
        }

        self.declared_entry(config.get("entry"), &context)
    }

    fn read_mode(&self, mode: Option<&JsValue>, out: &mut ExtractedConfig) {
        match mode {
            None | Some(JsValue::Undefined) => {}
            Some(JsValue::String(name)) => match Mode::parse(name) {
                Some(mode) => {
                    out.mode = mode;
                    out.mode_explicit = true;
                }
                None => out.unsupported.push(UnsupportedConstructWarning::new(
                    "mode",
                    format!("unknown mode '{name}'"),
                )),
            },
            Some(other) => out.unsupported.push(unsupported(
                "mode",
                other,
                "mode does not evaluate to a string",
            )),
        }
    }

    fn read_output(&self, output: Option<&JsValue>, out: &mut ExtractedConfig) {
        let Some(output) = output else {
            return;
        };
        match output.get("path") {
            None | Some(JsValue::Undefined) => {}
            Some(JsValue::String(dir)) => out.output_path = Some(path::resolve(self.root, &[dir])),
            Some(other) => out.unsupported.push(unsupported(
                "output.path",
                other,
                "output directory does not evaluate to a string",
            )),
        }
        match output.get("publicPath") {
            None | Some(JsValue::Undefined) => {}
            Some(JsValue::String(public)) => out.public_path = Some(public.clone()),
            Some(other) => out.unsupported.push(unsupported(
                "output.publicPath",
                other,
                "public path does not evaluate to a string",
            )),
        }
    }

    /// Reads `resolve.alias` in either the object or the array form.
    pub fn read_aliases(&self, alias: Option<&JsValue>, out: &mut ExtractedConfig) {
        match alias {
            None | Some(JsValue::Undefined) => {}
            Some(JsValue::Object(map)) => {
                for (find, target) in map {
                    out.aliases.insert(find.clone(), self.alias_target(target));
                }
            }
            Some(JsValue::Array(items)) => {
                for item in items {
                    match (item.get("name").and_then(JsValue::as_str), item.get("alias")) {
                        (Some(find), Some(target)) => {
                            out.aliases.insert(find.to_owned(), self.alias_target(target));
                        }
                        _ => out.unsupported.push(unsupported(
                            "resolve.alias",
                            item,
                            "alias entry without name and alias",
                        )),
                    }
                }
            }
            Some(other) => out.unsupported.push(unsupported(
                "resolve.alias",
                other,
                "aliases do not evaluate to an object",
            )),
        }
    }

    /// A bare target names a module unless it exists relative to the root,
    /// as in `alias: { '@': 'src' }`.
    fn alias_target(&self, target: &JsValue) -> AliasTarget {
        match target {
            JsValue::String(s)
                if path::is_path_like(s)
                    || Utf8Path::new(s).is_absolute()
                    || self.root.join(s).exists() =>
            {
                AliasTarget::Path(path::resolve(self.root, &[s]))
            }
            JsValue::String(s) => AliasTarget::Module(s.clone()),
            other => AliasTarget::Unsupported(opaque_of(other)),
        }
    }

    /// Reads a `devServer` object. Returns `None` when nothing usable is set.
    pub fn read_dev_server(
        &self,
        dev_server: Option<&JsValue>,
        out: &mut ExtractedConfig,
    ) -> Option<DevServer> {
        let dev_server = match dev_server {
            None | Some(JsValue::Undefined) => return None,
            Some(value @ JsValue::Object(_)) => value,
            Some(other) => {
                out.unsupported.push(unsupported(
                    "devServer",
                    other,
                    "dev server settings do not evaluate to an object",
                ));
                return None;
            }
        };
        let field = |key: &str| {
            dev_server
                .get(key)
                .filter(|value| !matches!(value, JsValue::Undefined))
                .cloned()
        };
        let server = DevServer {
            port: field("port"),
            host: field("host"),
            open: field("open"),
            https: field("https").or_else(|| field("server")),
            proxy: field("proxy"),
        };
        (!server.is_empty()).then_some(server)
    }

    fn read_plugins(&self, plugins: Option<&JsValue>, out: &mut ExtractedConfig) {
        match plugins {
            None | Some(JsValue::Undefined) => {}
            Some(JsValue::Array(items)) => {
                for item in items {
                    if let Some(descriptor) = self.plugin_descriptor(item) {
                        trace!(plugin = %descriptor.name, "Found plugin");
                        out.plugins.push(descriptor);
                    }
                }
            }
            Some(other) => out.unsupported.push(unsupported(
                "plugins",
                other,
                "plugin list does not evaluate to an array",
            )),
        }
    }

    /// Describes one entry of the `plugins` array. Falsy entries (disabled
    /// conditional plugins) are dropped.
    fn plugin_descriptor(&self, item: &JsValue) -> Option<ConstructDescriptor> {
        if item.truthiness() == Some(false) {
            return None;
        }
        let descriptor = match item {
            JsValue::Construct(construct) => ConstructDescriptor {
                kind: ConstructKind::Plugin,
                name: construct.name().to_owned(),
                package: self.package_of(construct.root_identifier()),
                args: construct.args.to_vec(),
                source_text: construct.source_text.clone(),
                location: construct.location,
                test: None,
            },
            JsValue::Opaque(opaque) => {
                let callee = opaque
                    .source_text
                    .split('(')
                    .next()
                    .unwrap_or_default()
                    .trim();
                let root = callee.split('.').next().unwrap_or_default();
                ConstructDescriptor {
                    kind: ConstructKind::Plugin,
                    name: callee.rsplit('.').next().unwrap_or(callee).to_owned(),
                    package: self.package_of(root),
                    args: Vec::new(),
                    source_text: opaque.source_text.clone(),
                    location: opaque.location,
                    test: None,
                }
            }
            other => ConstructDescriptor {
                kind: ConstructKind::Plugin,
                name: other.type_name().to_owned(),
                package: None,
                args: Vec::new(),
                source_text: render(other),
                location: location_of(other).unwrap_or_default(),
                test: None,
            },
        };
        Some(descriptor)
    }

    fn package_of(&self, identifier: &str) -> Option<String> {
        self.bindings.module_of(identifier).map(str::to_owned)
    }

    /// Takes the template and title from the first `HtmlWebpackPlugin`.
    fn read_html_plugin(&self, out: &mut ExtractedConfig, html: &mut HtmlTemplate, context: &Utf8Path) {
        let Some(plugin) = out
            .plugins
            .iter()
            .find(|plugin| plugin.matches("html-webpack-plugin", "HtmlWebpackPlugin"))
        else {
            return;
        };
        let Some(options) = plugin.options() else {
            return;
        };
        if let Some(template) = options.get("template").and_then(JsValue::as_str) {
            // `!!ejs-loader!./index.html` names a loader chain before the file.
            let file = template.rsplit('!').next().unwrap_or(template);
            html.path = Some(path::resolve(context, &[file]));
        }
        if let Some(title) = options.get("title").and_then(JsValue::as_str) {
            html.title = Some(title.to_owned());
        }
        debug!(template = ?html.path, title = ?html.title, "Read HtmlWebpackPlugin options");
    }

    /// Reads one `module.rules` entry, recursing into `oneOf` and `rules`.
    fn read_rule(&self, rule: &JsValue, inherited_test: Option<&str>, out: &mut ExtractedConfig) {
        match rule {
            JsValue::Object(_) => {}
            falsy if falsy.truthiness() == Some(false) => return,
            other => {
                out.unsupported.push(unsupported(
                    "module.rules",
                    other,
                    "rule does not evaluate to an object",
                ));
                return;
            }
        }

        let test = match rule.get("test") {
            None | Some(JsValue::Undefined) => inherited_test.map(str::to_owned),
            Some(test) => Some(render(test)),
        };

        for key in ["use", "loaders"] {
            match rule.get(key) {
                None | Some(JsValue::Undefined) => {}
                Some(uses) => self.read_use(uses, test.as_deref(), out),
            }
        }
        if let Some(loader) = rule.get("loader") {
            let options = rule.get("options").or_else(|| rule.get("query"));
            self.push_loader(loader, options, test.as_deref(), out);
        }
        for key in ["oneOf", "rules"] {
            if let Some(JsValue::Array(rules)) = rule.get(key) {
                for nested in rules {
                    self.read_rule(nested, test.as_deref(), out);
                }
            }
        }
    }

    fn read_use(&self, uses: &JsValue, test: Option<&str>, out: &mut ExtractedConfig) {
        match uses {
            JsValue::String(chain) => {
                for loader in chain.split('!').filter(|l| !l.is_empty()) {
                    self.push_loader(&JsValue::String(loader.to_owned()), None, test, out);
                }
            }
            JsValue::Array(items) => {
                for item in items {
                    self.read_use(item, test, out);
                }
            }
            JsValue::Object(_) => {
                let options = uses.get("options").or_else(|| uses.get("query"));
                match uses.get("loader") {
                    Some(loader) => self.push_loader(loader, options, test, out),
                    None => out.unsupported.push(unsupported(
                        "module.rules[].use",
                        uses,
                        "use entry without a loader",
                    )),
                }
            }
            falsy if falsy.truthiness() == Some(false) => {}
            other => self.push_loader(other, None, test, out),
        }
    }

    fn push_loader(
        &self,
        loader: &JsValue,
        options: Option<&JsValue>,
        test: Option<&str>,
        out: &mut ExtractedConfig,
    ) {
        let args: Vec<JsValue> = options
            .filter(|options| !matches!(options, JsValue::Undefined))
            .cloned()
            .into_iter()
            .collect();

        let descriptor = match loader {
            JsValue::String(specifier) => {
                let name = specifier.split('?').next().unwrap_or(specifier).trim();
                ConstructDescriptor {
                    kind: ConstructKind::Loader,
                    name: name.to_owned(),
                    package: (!path::is_path_like(name) && !Utf8Path::new(name).is_absolute())
                        .then(|| name.to_owned()),
                    args,
                    source_text: quote(specifier),
                    location: SourceLocation::default(),
                    test: test.map(str::to_owned),
                }
            }
            other => {
                let source_text = other.source_text().map_or_else(|| render(other), str::to_owned);
                let root = source_text.split(['.', '(']).next().unwrap_or_default();
                ConstructDescriptor {
                    kind: ConstructKind::Loader,
                    package: self.package_of(root),
                    name: source_text.clone(),
                    args,
                    source_text,
                    location: location_of(other).unwrap_or_default(),
                    test: test.map(str::to_owned),
                }
            }
        };
        trace!(loader = %descriptor.name, "Found loader");
        out.loaders.push(descriptor);
    }

    /// Interprets the `entry` field.
    pub fn declared_entry(&self, entry: Option<&JsValue>, context: &Utf8Path) -> DeclaredEntry {
        match entry {
            None | Some(JsValue::Undefined) => DeclaredEntry::Absent,
            Some(JsValue::Object(map)) => {
                let mut paths = IndexMap::new();
                for (name, item) in map {
                    match entry_path(item) {
                        Some(file) => {
                            paths.insert(name.clone(), path::resolve(context, &[file]));
                        }
                        None => return DeclaredEntry::Unresolved(render(item)),
                    }
                }
                if paths.is_empty() {
                    DeclaredEntry::Absent
                } else {
                    DeclaredEntry::Paths(paths)
                }
            }
            Some(item) => match entry_path(item) {
                Some(file) => {
                    let mut paths = IndexMap::new();
                    paths.insert(self.entry_name.to_owned(), path::resolve(context, &[file]));
                    DeclaredEntry::Paths(paths)
                }
                None => DeclaredEntry::Unresolved(render(item)),
            },
        }
    }
}

/// The file of one entry: a string, the last element of an array (earlier
/// elements are polyfills), or the `import` of an entry descriptor.
fn entry_path(item: &JsValue) -> Option<&str> {
    match item {
        JsValue::String(file) => Some(file),
        JsValue::Array(items) => items.last().and_then(entry_path),
        JsValue::Object(descriptor) => descriptor.get("import").and_then(entry_path),
        _ => None,
    }
}

/// A value as JavaScript source.
pub(crate) fn render(value: &JsValue) -> String {
    Value::from_js(value).to_string()
}

fn quote(s: &str) -> String {
    wtv_core::quote_js_string(s)
}

pub(crate) fn location_of(value: &JsValue) -> Option<SourceLocation> {
    match value {
        JsValue::Opaque(opaque) => Some(opaque.location),
        JsValue::Construct(construct) => Some(construct.location),
        _ => None,
    }
}

fn opaque_of(value: &JsValue) -> Opaque {
    match value {
        JsValue::Opaque(opaque) => opaque.clone(),
        other => Opaque {
            source_text: render(other),
            location: location_of(other).unwrap_or_default(),
        },
    }
}

/// A warning about `value`, located when the value carries a location.
pub(crate) fn unsupported(
    construct: impl Into<String>,
    value: &JsValue,
    reason: &str,
) -> UnsupportedConstructWarning {
    let warning = UnsupportedConstructWarning::new(
        construct,
        format!("{reason}: `{}`", render(value)),
    );
    match location_of(value) {
        Some(location) => warning.at(location),
        None => warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtv_parser::{ConfigParser, EvalContext, SourceKind, evaluate_exports};

    struct Read {
        config: ExtractedConfig,
        html: HtmlTemplate,
        entry: DeclaredEntry,
    }

    fn read_config(source: &str) -> Read {
        let mut parser = ConfigParser::new(SourceKind::JavaScript).expect("Parser creation failed");
        let parsed = parser.parse(source).expect("Parse failed");
        let env = IndexMap::new();
        let ctx = EvalContext {
            file: Utf8Path::new("/app/webpack.config.js"),
            cwd: Utf8Path::new("/app"),
            env: &env,
        };
        let value = evaluate_exports(&parsed, source, &ctx);
        let reader = WebpackReader::new(Utf8Path::new("/app"), &parsed.bindings, "main");
        let mut config = ExtractedConfig::default();
        let mut html = HtmlTemplate::default();
        let entry = reader.read(&value, &mut config, &mut html);
        Read {
            config,
            html,
            entry,
        }
    }

    #[test]
    fn test_basic_fields() {
        let read = read_config(
            r"
const path = require('path');
module.exports = {
  mode: 'development',
  entry: './src/main.js',
  output: { path: path.resolve(__dirname, 'build'), publicPath: '/static/' },
  devtool: 'cheap-module-source-map',
  resolve: { extensions: ['.js', '.vue'] },
};
",
        );
        assert_eq!(read.config.mode, Mode::Development);
        assert!(read.config.mode_explicit);
        assert_eq!(read.config.output_path.as_deref(), Some(Utf8Path::new("/app/build")));
        assert_eq!(read.config.public_path.as_deref(), Some("/static/"));
        assert_eq!(
            read.config.devtool,
            Some(JsValue::String("cheap-module-source-map".to_owned()))
        );
        assert_eq!(read.config.extensions.len(), 2);

        let DeclaredEntry::Paths(paths) = &read.entry else {
            panic!("expected paths, got {:?}", read.entry);
        };
        assert_eq!(paths["main"], "/app/src/main.js");
    }

    #[test]
    fn test_entry_forms() {
        let read = read_config(
            "module.exports = { entry: { app: ['babel-polyfill', './src/app.js'], admin: { import: './src/admin.js' } } };",
        );
        let DeclaredEntry::Paths(paths) = read.entry else {
            panic!("expected paths");
        };
        assert_eq!(paths["app"], "/app/src/app.js");
        assert_eq!(paths["admin"], "/app/src/admin.js");

        let read = read_config("module.exports = { entry: getEntries() };");
        assert_eq!(read.entry, DeclaredEntry::Unresolved("getEntries()".to_owned()));

        let read = read_config("module.exports = { context: __dirname + '/src', entry: './index.js' };");
        let DeclaredEntry::Paths(paths) = read.entry else {
            panic!("expected paths");
        };
        assert_eq!(paths["main"], "/app/src/index.js");
    }

    #[test]
    fn test_aliases_keep_order_and_kind() {
        let read = read_config(
            r"
const path = require('path');
module.exports = {
  resolve: {
    alias: {
      '@': path.resolve(__dirname, 'src'),
      vue$: 'vue/dist/vue.esm.js',
      components: './src/components',
      broken: someFunction(),
    },
  },
};
",
        );
        let aliases: Vec<_> = read.config.aliases.keys().map(String::as_str).collect();
        assert_eq!(aliases, ["@", "vue$", "components", "broken"]);
        assert_eq!(
            read.config.aliases["@"],
            AliasTarget::Path(Utf8PathBuf::from("/app/src"))
        );
        assert_eq!(
            read.config.aliases["vue$"],
            AliasTarget::Module("vue/dist/vue.esm.js".to_owned())
        );
        assert_eq!(
            read.config.aliases["components"],
            AliasTarget::Path(Utf8PathBuf::from("/app/src/components"))
        );
        assert!(matches!(read.config.aliases["broken"], AliasTarget::Unsupported(_)));
    }

    #[test]
    fn test_plugins_are_traced_to_packages() {
        let read = read_config(
            r"
const webpack = require('webpack');
const HtmlWebpackPlugin = require('html-webpack-plugin');
const { VueLoaderPlugin } = require('vue-loader');
module.exports = {
  plugins: [
    new VueLoaderPlugin(),
    new HtmlWebpackPlugin({ template: 'public/index.html', title: 'Shop' }),
    new webpack.DefinePlugin({ VERSION: JSON.stringify('1.0') }),
    false,
    customPlugin(),
  ],
};
",
        );
        let names: Vec<_> = read.config.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["VueLoaderPlugin", "HtmlWebpackPlugin", "DefinePlugin", "customPlugin"]
        );
        assert_eq!(read.config.plugins[0].package.as_deref(), Some("vue-loader"));
        assert_eq!(read.config.plugins[2].package.as_deref(), Some("webpack"));
        assert_eq!(read.config.plugins[3].package, None);

        assert_eq!(read.html.path.as_deref(), Some(Utf8Path::new("/app/public/index.html")));
        assert_eq!(read.html.title.as_deref(), Some("Shop"));
    }

    #[test]
    fn test_loaders_from_rules() {
        let read = read_config(
            r"
const MiniCssExtractPlugin = require('mini-css-extract-plugin');
module.exports = {
  module: {
    rules: [
      { test: /\.vue$/, loader: 'vue-loader' },
      {
        test: /\.scss$/,
        use: [
          MiniCssExtractPlugin.loader,
          'css-loader?modules',
          { loader: 'sass-loader', options: { additionalData: '@import \'vars\';' } },
        ],
      },
      { oneOf: [{ use: 'style-loader!css-loader' }] },
    ],
  },
};
",
        );
        let names: Vec<_> = read.config.loaders.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "vue-loader",
                "MiniCssExtractPlugin.loader",
                "css-loader",
                "sass-loader",
                "style-loader",
                "css-loader"
            ]
        );
        assert_eq!(read.config.loaders[0].test.as_deref(), Some(r"/\.vue$/"));
        assert_eq!(
            read.config.loaders[1].package.as_deref(),
            Some("mini-css-extract-plugin")
        );
        let sass = &read.config.loaders[3];
        assert_eq!(
            sass.options().and_then(|o| o.get("additionalData")),
            Some(&JsValue::String("@import 'vars';".to_owned()))
        );
    }

    #[test]
    fn test_dev_server() {
        let read = read_config(
            "module.exports = { devServer: { port: 8081, host: '0.0.0.0', hot: true, proxy: { '/api': 'http://localhost:3000' } } };",
        );
        let server = read.config.dev_server.expect("dev server");
        assert_eq!(server.port, Some(JsValue::Number(8081.0)));
        assert_eq!(server.host, Some(JsValue::String("0.0.0.0".to_owned())));
        assert!(server.open.is_none());
        assert!(server.proxy.is_some());
    }

    #[test]
    fn test_unknown_mode_is_a_warning() {
        let read = read_config("module.exports = { mode: 'staging' };");
        assert_eq!(read.config.mode, Mode::Production);
        assert!(!read.config.mode_explicit);
        assert_eq!(read.config.unsupported.len(), 1);
        assert_eq!(read.entry, DeclaredEntry::Absent);
    }
}
