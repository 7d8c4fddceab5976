//! Conversion pipeline behind the `wtv` binary.
//!
//! [`convert`] copies the project (unless converting in place), extracts it,
//! runs the rule catalog and writes the vite files, returning a
//! [`ConversionSummary`]. The binary adds argument parsing, logging and a
//! progress bar on top.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod copy;
pub mod error;
pub mod pipeline;
pub mod report;

pub use error::ConvertError;
pub use pipeline::convert;
pub use report::{ConversionSummary, PackageManager};
