//! Writes the converted project's files.
//!
//! Three emitters turn a [`Transformed`](wtv_transform::Transformed) into
//! files on disk:
//!
//! - [`emit_vite_config`]: `vite.config.js`
//! - [`emit_manifest`]: `package.json`, with missing `devDependencies` added
//! - [`emit_index_html`]: the HTML entry document in the vite root
//!
//! The HTML emitter reads `root` and `base` from the same configuration the
//! config emitter wrote, so run them in that order. Every emitter creates
//! missing parent directories, replaces existing files and reports failures
//! as an [`EmitError`] naming the file.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod config;
mod error;
mod html;
pub mod js;
mod manifest;

pub use config::{emit_vite_config, render_vite_config};
pub use error::EmitError;
pub use html::{emit_index_html, render_index_html};
pub use manifest::{emit_manifest, merge_manifest};

use camino::Utf8Path;

async fn write_file(path: &Utf8Path, contents: &str) -> Result<(), EmitError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| EmitError::write(path, err))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|err| EmitError::write(path, err))
}
