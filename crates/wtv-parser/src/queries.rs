//! Pre-compiled tree-sitter queries for module binding extraction.
//!
//! This module provides the [`BINDING_QUERY`] constant containing S-expression
//! patterns for `require` and `import` bindings, and accessors that compile
//! and cache the query once per grammar.

use std::sync::OnceLock;

use tree_sitter::{Language, Query};

use crate::error::ParseError;
use crate::parser::SourceKind;

/// Tree-sitter query for module bindings.
///
/// Patterns, in order (the pattern index is used to tell them apart):
///
/// 0. `const x = require('m')`
/// 1. `const { a, b: c } = require('m')`
/// 2. `const x = require('m').member`
/// 3. `import ... from 'm'`
///
/// # Capture Names
///
/// - `binding.local` - The bound identifier
/// - `binding.pattern` - A destructuring pattern
/// - `binding.require` - The `require` callee
/// - `binding.source` - The required module string
/// - `binding.member` - The property read off the required module
/// - `import.clause` - The import clause
/// - `import.source` - The imported module string
pub const BINDING_QUERY: &str = r#"
(variable_declarator
  name: (identifier) @binding.local
  value: (call_expression
    function: (identifier) @binding.require
    arguments: (arguments . (string) @binding.source))
  (#eq? @binding.require "require"))

(variable_declarator
  name: (object_pattern) @binding.pattern
  value: (call_expression
    function: (identifier) @binding.require
    arguments: (arguments . (string) @binding.source))
  (#eq? @binding.require "require"))

(variable_declarator
  name: (identifier) @binding.local
  value: (member_expression
    object: (call_expression
      function: (identifier) @binding.require
      arguments: (arguments . (string) @binding.source))
    property: (property_identifier) @binding.member)
  (#eq? @binding.require "require"))

(import_statement
  (import_clause) @import.clause
  source: (string) @import.source)
"#;

/// Pattern index of `const x = require('m')`.
pub const PATTERN_REQUIRE_DEFAULT: usize = 0;

/// Pattern index of `const { a } = require('m')`.
pub const PATTERN_REQUIRE_DESTRUCTURED: usize = 1;

/// Pattern index of `const x = require('m').member`.
pub const PATTERN_REQUIRE_MEMBER: usize = 2;

/// Pattern index of `import ... from 'm'`.
pub const PATTERN_IMPORT: usize = 3;

/// Global cache for the compiled binding query (TypeScript).
static COMPILED_QUERY_TS: OnceLock<Query> = OnceLock::new();

/// Global cache for the compiled binding query (TSX, used for JavaScript).
static COMPILED_QUERY_TSX: OnceLock<Query> = OnceLock::new();

/// Returns the compiled binding query for the given source kind.
///
/// The query is compiled once per grammar and cached for all subsequent
/// calls. This function is thread-safe.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query fails to compile.
pub fn binding_query(kind: SourceKind) -> Result<&'static Query, ParseError> {
    let cache = match kind {
        SourceKind::TypeScript => &COMPILED_QUERY_TS,
        SourceKind::JavaScript => &COMPILED_QUERY_TSX,
    };
    if let Some(query) = cache.get() {
        return Ok(query);
    }

    let query = compile_query(&kind.language())?;
    Ok(cache.get_or_init(|| query))
}

/// Compiles the binding query for the given language.
fn compile_query(language: &Language) -> Result<Query, ParseError> {
    Query::new(language, BINDING_QUERY).map_err(|e| ParseError::QueryCompile {
        offset: e.offset,
        kind: e,
    })
}

/// Looks up a capture index by name.
#[inline]
pub fn capture_index(query: &Query, name: &str) -> Option<u32> {
    query.capture_index_for_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_compiles_for_both_grammars() {
        assert!(compile_query(&SourceKind::JavaScript.language()).is_ok());
        assert!(compile_query(&SourceKind::TypeScript.language()).is_ok());
    }

    #[test]
    fn test_capture_names() {
        let query = binding_query(SourceKind::JavaScript).expect("Query should compile");
        let names = query.capture_names();
        assert!(names.contains(&"binding.local"));
        assert!(names.contains(&"binding.pattern"));
        assert!(names.contains(&"binding.source"));
        assert!(names.contains(&"binding.member"));
        assert!(names.contains(&"import.clause"));
        assert!(names.contains(&"import.source"));
    }

    #[test]
    fn test_query_pattern_count() {
        let query = binding_query(SourceKind::TypeScript).expect("Query should compile");
        assert_eq!(query.pattern_count(), 4);
    }
}
