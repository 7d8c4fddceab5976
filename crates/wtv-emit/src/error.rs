//! Error types for the wtv-emit crate.

use camino::{Utf8Path, Utf8PathBuf};

/// Errors that can occur while writing the converted project's files.
///
/// Every variant names the file involved.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// A file or its parent directory could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The file being written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An input file (existing manifest, HTML template) could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The existing manifest is not valid JSON.
    #[error("{path} is not valid JSON: {source}")]
    Manifest {
        /// The manifest path.
        path: Utf8PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The existing manifest is valid JSON but not an object.
    #[error("{path} does not contain a JSON object")]
    ManifestShape {
        /// The manifest path.
        path: Utf8PathBuf,
    },
}

impl EmitError {
    /// Creates a [`EmitError::Write`].
    #[must_use]
    pub fn write(path: &Utf8Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_owned(),
            source,
        }
    }

    /// Creates a [`EmitError::Read`].
    #[must_use]
    pub fn read(path: &Utf8Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_owned(),
            source,
        }
    }

    /// Returns the file the error is about.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Write { path, .. }
            | Self::Read { path, .. }
            | Self::Manifest { path, .. }
            | Self::ManifestShape { path } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_names_the_path() {
        let err = EmitError::write(
            Utf8Path::new("/out/vite.config.js"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to write /out/vite.config.js: denied");
        assert_eq!(err.path(), "/out/vite.config.js");
    }
}
