//! Parser management using tree-sitter.
//!
//! This module provides the [`ConfigParser`] struct for parsing configuration
//! files into a syntax tree plus the module bindings declared at their top.

use camino::Utf8Path;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::bindings::{ModuleBindings, extract_bindings};
use crate::error::ParseError;
use crate::queries::binding_query;

/// Which grammar a configuration file is parsed with.
///
/// JavaScript files go through the TSX grammar, which accepts plain
/// JavaScript and JSX; `.ts` files use the TypeScript grammar so that
/// angle-bracket type assertions parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `.js`, `.cjs`, `.mjs`, `.jsx`.
    JavaScript,
    /// `.ts`, `.cts`, `.mts`.
    TypeScript,
}

impl SourceKind {
    /// Picks the grammar from a file extension. Unknown extensions are
    /// treated as JavaScript.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use wtv_parser::SourceKind;
    ///
    /// assert_eq!(SourceKind::from_path(Utf8Path::new("webpack.config.ts")), SourceKind::TypeScript);
    /// assert_eq!(SourceKind::from_path(Utf8Path::new("vue.config.js")), SourceKind::JavaScript);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some("ts" | "cts" | "mts") => Self::TypeScript,
            _ => Self::JavaScript,
        }
    }

    /// The tree-sitter language for this kind.
    #[must_use]
    pub fn language(self) -> Language {
        match self {
            Self::JavaScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }

    /// Human-readable grammar name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::JavaScript => "TSX",
            Self::TypeScript => "TypeScript",
        }
    }
}

/// A parsed configuration file.
#[derive(Debug)]
pub struct ParsedSource {
    /// The syntax tree.
    pub tree: Tree,
    /// Grammar the tree was produced with.
    pub kind: SourceKind,
    /// `require`/`import` bindings found in the file.
    pub bindings: ModuleBindings,
}

/// Parser for webpack and vue-cli configuration files.
///
/// The parser can be reused for multiple files of the same kind.
///
/// # Examples
///
/// ```
/// use wtv_parser::{ConfigParser, SourceKind};
///
/// let mut parser = ConfigParser::new(SourceKind::JavaScript)?;
/// let parsed = parser.parse("const path = require('path');\nmodule.exports = {};")?;
/// assert_eq!(parsed.bindings.module_of("path"), Some("path"));
/// # Ok::<(), wtv_parser::ParseError>(())
/// ```
pub struct ConfigParser {
    /// The underlying tree-sitter parser.
    parser: Parser,
    /// Grammar in use.
    kind: SourceKind,
}

impl ConfigParser {
    /// Creates a parser for the given grammar.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if the grammar cannot be set.
    pub fn new(kind: SourceKind) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&kind.language())
            .map_err(|_| ParseError::LanguageInit(kind.name()))?;
        Ok(Self { parser, kind })
    }

    /// Creates a parser suited to the file at `path`.
    pub fn for_path(path: &Utf8Path) -> Result<Self, ParseError> {
        Self::new(SourceKind::from_path(path))
    }

    /// Returns the grammar this parser uses.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Parses source code and extracts its module bindings.
    ///
    /// # Errors
    ///
    /// - Returns [`ParseError::Parse`] if tree-sitter produces no tree
    /// - Returns [`ParseError::Syntax`] if the tree contains an error node
    /// - Returns [`ParseError::QueryCompile`] if the binding query fails to compile
    pub fn parse(&mut self, source: &str) -> Result<ParsedSource, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::Parse)?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error(root)
                .map_or((1, 1), |node| {
                    let point = node.start_position();
                    (point.row + 1, point.column + 1)
                });
            return Err(ParseError::Syntax { line, column });
        }

        let query = binding_query(self.kind)?;
        let bindings = extract_bindings(&tree, source, query);

        Ok(ParsedSource {
            tree,
            kind: self.kind,
            bindings,
        })
    }
}

impl std::fmt::Debug for ConfigParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigParser")
            .field("language", &self.kind.name())
            .finish_non_exhaustive()
    }
}

/// Finds the first `ERROR` or missing node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}
