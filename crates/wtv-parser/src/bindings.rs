//! Module binding extraction.
//!
//! Maps each local identifier introduced by `require(...)` or `import` to the
//! module it came from. Plugin constructors are traced to their npm package
//! through this map, and the evaluator uses it to recognize `path`,
//! `webpack-merge` and `defineConfig`.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};
use wtv_core::FxHashMap;

use crate::node::{named_children, string_value, text};
use crate::queries::{
    PATTERN_IMPORT, PATTERN_REQUIRE_DEFAULT, PATTERN_REQUIRE_DESTRUCTURED, PATTERN_REQUIRE_MEMBER,
    capture_index,
};

/// Where a local identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBinding {
    /// The module specifier (`html-webpack-plugin`, `path`, ...).
    pub module: String,
    /// The exported member, or `None` for the whole module (default and
    /// namespace imports, plain `require`).
    pub member: Option<String>,
}

/// Local identifier to module binding.
///
/// # Examples
///
/// ```
/// use wtv_parser::{ConfigParser, SourceKind};
///
/// let mut parser = ConfigParser::new(SourceKind::JavaScript)?;
/// let parsed = parser.parse("const { VueLoaderPlugin } = require('vue-loader');")?;
/// let binding = parsed.bindings.get("VueLoaderPlugin").expect("bound");
/// assert_eq!(binding.module, "vue-loader");
/// assert_eq!(binding.member.as_deref(), Some("VueLoaderPlugin"));
/// # Ok::<(), wtv_parser::ParseError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleBindings {
    map: FxHashMap<String, ModuleBinding>,
}

impl ModuleBindings {
    /// Returns the binding of a local identifier.
    #[must_use]
    pub fn get(&self, local: &str) -> Option<&ModuleBinding> {
        self.map.get(local)
    }

    /// Returns the module a local identifier was bound from.
    #[must_use]
    pub fn module_of(&self, local: &str) -> Option<&str> {
        self.get(local).map(|binding| binding.module.as_str())
    }

    /// Number of bound identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` when the file binds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Records a binding. Later declarations of the same name win.
    pub fn insert(&mut self, local: impl Into<String>, module: impl Into<String>, member: Option<String>) {
        self.map.insert(
            local.into(),
            ModuleBinding {
                module: module.into(),
                member,
            },
        );
    }
}

/// Extracts all module bindings from a parsed syntax tree.
pub fn extract_bindings(tree: &Tree, source: &str, query: &Query) -> ModuleBindings {
    let mut bindings = ModuleBindings::default();

    let (
        Some(local_idx),
        Some(pattern_idx),
        Some(source_idx),
        Some(member_idx),
        Some(clause_idx),
        Some(import_source_idx),
    ) = (
        capture_index(query, "binding.local"),
        capture_index(query, "binding.pattern"),
        capture_index(query, "binding.source"),
        capture_index(query, "binding.member"),
        capture_index(query, "import.clause"),
        capture_index(query, "import.source"),
    )
    else {
        return bindings;
    };

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());

    while let Some(match_) = matches.next() {
        let capture = |index: u32| {
            match_
                .captures
                .iter()
                .find(|capture| capture.index == index)
                .map(|capture| capture.node)
        };

        match match_.pattern_index {
            PATTERN_REQUIRE_DEFAULT => {
                if let (Some(local), Some(module)) = (capture(local_idx), capture(source_idx)) {
                    if let Some(module) = string_value(module, source) {
                        bindings.insert(text(local, source), module, None);
                    }
                }
            }
            PATTERN_REQUIRE_MEMBER => {
                if let (Some(local), Some(module), Some(member)) =
                    (capture(local_idx), capture(source_idx), capture(member_idx))
                {
                    if let Some(module) = string_value(module, source) {
                        bindings.insert(
                            text(local, source),
                            module,
                            Some(text(member, source).to_owned()),
                        );
                    }
                }
            }
            PATTERN_REQUIRE_DESTRUCTURED => {
                if let (Some(pattern), Some(module)) = (capture(pattern_idx), capture(source_idx)) {
                    if let Some(module) = string_value(module, source) {
                        bind_object_pattern(&mut bindings, pattern, source, &module);
                    }
                }
            }
            PATTERN_IMPORT => {
                if let (Some(clause), Some(module)) =
                    (capture(clause_idx), capture(import_source_idx))
                {
                    if let Some(module) = string_value(module, source) {
                        bind_import_clause(&mut bindings, clause, source, &module);
                    }
                }
            }
            _ => {}
        }
    }

    bindings
}

/// `{ a, b: c, d = 1 }` binds `a`, `c` and `d`.
fn bind_object_pattern(bindings: &mut ModuleBindings, pattern: Node<'_>, source: &str, module: &str) {
    for property in named_children(pattern) {
        match property.kind() {
            "shorthand_property_identifier_pattern" => {
                let name = text(property, source);
                bindings.insert(name, module, Some(name.to_owned()));
            }
            "pair_pattern" => {
                let key = property.child_by_field_name("key");
                let value = property.child_by_field_name("value");
                if let (Some(key), Some(value)) = (key, value) {
                    if value.kind() == "identifier" {
                        bindings.insert(
                            text(value, source),
                            module,
                            Some(text(key, source).to_owned()),
                        );
                    }
                }
            }
            "object_assignment_pattern" => {
                if let Some(left) = property.child_by_field_name("left") {
                    let name = text(left, source);
                    bindings.insert(name, module, Some(name.to_owned()));
                }
            }
            _ => {}
        }
    }
}

/// `import a, { b as c } from 'm'` and `import * as ns from 'm'`.
fn bind_import_clause(bindings: &mut ModuleBindings, clause: Node<'_>, source: &str, module: &str) {
    for part in named_children(clause) {
        match part.kind() {
            "identifier" => bindings.insert(text(part, source), module, None),
            "namespace_import" => {
                if let Some(local) = named_children(part).into_iter().next() {
                    bindings.insert(text(local, source), module, None);
                }
            }
            "named_imports" => {
                for specifier in named_children(part) {
                    let Some(name) = specifier.child_by_field_name("name") else {
                        continue;
                    };
                    let local = specifier.child_by_field_name("alias").unwrap_or(name);
                    bindings.insert(
                        text(local, source),
                        module,
                        Some(text(name, source).to_owned()),
                    );
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ConfigParser, SourceKind};

    fn bindings(source: &str) -> super::ModuleBindings {
        let mut parser = ConfigParser::new(SourceKind::JavaScript).expect("Parser creation failed");
        parser.parse(source).expect("Parse failed").bindings
    }

    #[test]
    fn test_require_default() {
        let bindings = bindings("const HtmlWebpackPlugin = require('html-webpack-plugin');");
        assert_eq!(
            bindings.module_of("HtmlWebpackPlugin"),
            Some("html-webpack-plugin")
        );
        assert_eq!(bindings.get("HtmlWebpackPlugin").and_then(|b| b.member.as_deref()), None);
    }

    #[test]
    fn test_require_destructured_and_renamed() {
        let bindings = bindings("const { merge, smart: smartMerge } = require('webpack-merge');");
        assert_eq!(bindings.module_of("merge"), Some("webpack-merge"));
        let renamed = bindings.get("smartMerge").expect("renamed binding");
        assert_eq!(renamed.member.as_deref(), Some("smart"));
    }

    #[test]
    fn test_require_member() {
        let bindings = bindings("const CopyPlugin = require('copy-webpack-plugin').default;");
        let binding = bindings.get("CopyPlugin").expect("binding");
        assert_eq!(binding.module, "copy-webpack-plugin");
        assert_eq!(binding.member.as_deref(), Some("default"));
    }

    #[test]
    fn test_imports() {
        let bindings = bindings(
            "import path, { resolve as r } from 'path';\nimport * as webpack from 'webpack';",
        );
        assert_eq!(bindings.module_of("path"), Some("path"));
        assert_eq!(bindings.get("r").and_then(|b| b.member.as_deref()), Some("resolve"));
        assert_eq!(bindings.module_of("webpack"), Some("webpack"));
        assert_eq!(bindings.len(), 3);
    }

    #[test]
    fn test_other_calls_are_not_bindings() {
        let bindings = bindings("const x = load('foo');\nconst y = require(name);");
        assert!(bindings.is_empty());
    }
}
