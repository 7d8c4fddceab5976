//! Error types for the wtv-transform crate.

/// A rule met a value it cannot map onto the vite configuration.
///
/// The run stops at the first failing rule; later rules never see the
/// context and nothing is emitted.
///
/// # Examples
///
/// ```
/// use wtv_transform::RuleError;
///
/// let err = RuleError::new("output", "base", "publicPath is not a string");
/// assert_eq!(err.to_string(), "rule 'output' failed on base: publicPath is not a string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rule '{rule}' failed on {field}: {reason}")]
pub struct RuleError {
    /// Identifier of the failing rule.
    pub rule: &'static str,
    /// Target field being written.
    pub field: String,
    /// What could not be mapped.
    pub reason: String,
}

impl RuleError {
    /// Creates a rule error.
    #[must_use]
    pub fn new(rule: &'static str, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule,
            field: field.into(),
            reason: reason.into(),
        }
    }
}
