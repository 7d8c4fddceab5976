//! Non-fatal conversion diagnostics.

use serde::{Deserialize, Serialize};

use super::location::SourceLocation;

/// A construct the converter could not port automatically.
///
/// Warnings never stop a conversion. They are collected from extraction and
/// from the rule catalog and listed in the final summary so the user knows
/// what to port by hand.
///
/// # Examples
///
/// ```
/// use wtv_core::{SourceLocation, UnsupportedConstructWarning};
///
/// let warning = UnsupportedConstructWarning::new("chainWebpack", "webpack-chain calls are not converted")
///     .at(SourceLocation::new(12, 2, 300));
/// assert_eq!(warning.to_string(), "chainWebpack (12:2): webpack-chain calls are not converted");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedConstructWarning {
    /// Name of the construct (plugin, loader or option).
    pub construct: String,
    /// What happened to it.
    pub reason: String,
    /// Where it was declared, when known.
    pub location: Option<SourceLocation>,
}

impl UnsupportedConstructWarning {
    /// Creates a warning without a location.
    #[must_use]
    pub fn new(construct: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            construct: construct.into(),
            reason: reason.into(),
            location: None,
        }
    }

    /// Attaches a source location.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl std::fmt::Display for UnsupportedConstructWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} ({location}): {}", self.construct, self.reason),
            None => write!(f, "{}: {}", self.construct, self.reason),
        }
    }
}
