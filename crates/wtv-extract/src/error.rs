//! Error types for the wtv-extract crate.
//!
//! This module provides the [`ExtractError`] type for errors that stop a
//! project from being read. Anything that can be converted partially is a
//! warning on the extracted model instead.

use camino::Utf8PathBuf;

/// Errors that can occur while reading a project.
///
/// Every variant that concerns a file names it.
///
/// # Examples
///
/// ```
/// use wtv_extract::ExtractError;
/// use camino::Utf8PathBuf;
///
/// let err = ExtractError::MissingEntry {
///     path: Utf8PathBuf::from("/app/src/main.js"),
/// };
/// assert!(err.to_string().contains("/app/src/main.js"));
/// assert_eq!(err.path().map(|p| p.as_str()), Some("/app/src/main.js"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No configuration file was found where one is required.
    #[error("no webpack configuration found in {root} (looked for {})", candidates.join(", "))]
    MissingConfig {
        /// The project root.
        root: Utf8PathBuf,
        /// File names that were tried, in order.
        candidates: Vec<String>,
    },

    /// An entry file does not exist.
    #[error("entry file does not exist: {path}")]
    MissingEntry {
        /// The absolute path the entry resolved to.
        path: Utf8PathBuf,
    },

    /// The configuration declares an entry that cannot be evaluated.
    #[error("cannot determine the entry declared in {path}: `{source_text}` (pass --entry)")]
    UnresolvedEntry {
        /// The configuration file.
        path: Utf8PathBuf,
        /// The entry expression as written.
        source_text: String,
    },

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JavaScript or TypeScript.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The configuration file.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: wtv_parser::ParseError,
    },

    /// `package.json` exists but is not valid JSON.
    #[error("invalid manifest {path}: {source}")]
    Manifest {
        /// The manifest file.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Walking the project tree failed.
    #[error("failed to walk project: {0}")]
    Walk(#[from] ignore::Error),

    /// The background walk task panicked or was cancelled.
    #[error("project scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ExtractError {
    /// Creates a new [`ExtractError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ExtractError::Parse`] error.
    #[inline]
    pub fn parse(path: impl Into<Utf8PathBuf>, source: wtv_parser::ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::MissingConfig { root: path, .. }
            | Self::MissingEntry { path }
            | Self::UnresolvedEntry { path, .. }
            | Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Manifest { path, .. } => Some(path),
            Self::Walk(_) | Self::Task(_) | Self::NonUtf8Path(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_missing_config_lists_candidates() {
        let err = ExtractError::MissingConfig {
            root: Utf8PathBuf::from("/app"),
            candidates: vec!["webpack.config.js".to_owned(), "webpack.config.ts".to_owned()],
        };
        let msg = err.to_string();
        assert!(msg.contains("/app"));
        assert!(msg.contains("webpack.config.js, webpack.config.ts"));
    }

    #[test]
    fn test_read_error_names_path() {
        let err = ExtractError::read(
            "/app/.env",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.path().map(|p| p.as_str()), Some("/app/.env"));
        assert!(err.to_string().contains("/app/.env"));
    }

    #[test]
    fn test_parse_error_wraps_position() {
        let err = ExtractError::parse(
            "/app/webpack.config.js",
            wtv_parser::ParseError::Syntax { line: 4, column: 2 },
        );
        let msg = err.to_string();
        assert!(msg.contains("webpack.config.js"));
        assert!(msg.contains("line 4"));
    }

    #[test]
    fn test_non_utf8_has_no_path() {
        let err = ExtractError::NonUtf8Path(std::path::PathBuf::from("x"));
        assert!(err.path().is_none());
    }
}
