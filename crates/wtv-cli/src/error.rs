//! Error type for a whole conversion.

use camino::Utf8PathBuf;
use wtv_core::ConfigError;
use wtv_emit::EmitError;
use wtv_extract::ExtractError;
use wtv_transform::RuleError;

/// Any fatal error of a conversion run.
///
/// Only a failed project copy cleans up after itself; every later failure
/// leaves the copied project on disk for inspection.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The run configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The project could not be read.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A rule could not map a value.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// An output file could not be written.
    #[error(transparent)]
    Emit(#[from] EmitError),

    /// A file could not be copied into the converted project.
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        /// Source file.
        from: Utf8PathBuf,
        /// Destination file.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The project tree could not be walked for copying.
    #[error("failed to walk {root}: {source}")]
    Walk {
        /// The project root.
        root: Utf8PathBuf,
        /// The walker error.
        #[source]
        source: ignore::Error,
    },

    /// A path under the project is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The blocking copy task panicked or was cancelled.
    #[error("project copy task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ConvertError {
    /// Creates a [`ConvertError::Copy`].
    #[must_use]
    pub fn copy(from: impl Into<Utf8PathBuf>, to: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Copy {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Returns `true` when the error happened while copying the project.
    #[must_use]
    pub const fn is_copy_failure(&self) -> bool {
        matches!(
            self,
            Self::Copy { .. } | Self::Walk { .. } | Self::NonUtf8Path(_) | Self::Task(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_error_is_transparent() {
        let err = ConvertError::from(RuleError::new("alias", "@", "unsupported target"));
        assert_eq!(err.to_string(), "rule 'alias' failed on @: unsupported target");
        assert!(!err.is_copy_failure());
    }

    #[test]
    fn test_copy_error_names_both_paths() {
        let err = ConvertError::copy(
            "/p/a.js",
            "/p-toVite/a.js",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert_eq!(err.to_string(), "failed to copy /p/a.js to /p-toVite/a.js: disk full");
        assert!(err.is_copy_failure());
    }
}
