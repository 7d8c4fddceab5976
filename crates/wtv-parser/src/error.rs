//! Error types for the wtv-parser crate.
//!
//! This module provides the [`ParseError`] type for errors that can occur
//! while parsing a configuration file.

/// Errors that can occur while parsing a configuration file.
///
/// Evaluation never fails: expressions outside the supported subset become
/// [`JsValue::Opaque`](wtv_core::JsValue::Opaque). Only setting up the parser
/// and syntax errors in the file are reported here.
///
/// # Examples
///
/// ```
/// use wtv_parser::ParseError;
///
/// let err = ParseError::Syntax { line: 3, column: 7 };
/// assert_eq!(err.to_string(), "syntax error at line 3, column 7");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to create a new tree-sitter parser.
    #[error("failed to initialize tree-sitter parser")]
    ParserInit,

    /// Failed to set the grammar on the parser.
    #[error("failed to set {0} language")]
    LanguageInit(&'static str),

    /// Failed to compile a tree-sitter query.
    ///
    /// Contains the byte offset where the error occurred and the error kind.
    #[error("failed to compile query at offset {offset}: {kind:?}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// The kind of query error.
        kind: tree_sitter::QueryError,
    },

    /// The parser produced no tree.
    #[error("failed to parse source code")]
    Parse,

    /// The file is not valid JavaScript/TypeScript.
    ///
    /// Line and column (both 1-based) point at the first erroneous node.
    #[error("syntax error at line {line}, column {column}")]
    Syntax {
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_init_display() {
        let err = ParseError::ParserInit;
        assert_eq!(err.to_string(), "failed to initialize tree-sitter parser");
    }

    #[test]
    fn test_language_init_display() {
        let err = ParseError::LanguageInit("TSX");
        assert_eq!(err.to_string(), "failed to set TSX language");
    }

    #[test]
    fn test_parse_display() {
        let err = ParseError::Parse;
        assert_eq!(err.to_string(), "failed to parse source code");
    }
}
