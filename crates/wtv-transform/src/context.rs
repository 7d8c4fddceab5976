//! The mutable state of one conversion.

use indexmap::IndexMap;
use wtv_core::{
    AstParsingResult, FrameworkVersion, ImportList, ImportStatement, OutputConfig, TargetConfig,
    UnsupportedConstructWarning,
};

/// What the context needs to know about the project up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectHints {
    /// Framework detected from the manifest.
    pub framework: FrameworkVersion,
    /// Whether any source uses JSX.
    pub uses_jsx: bool,
}

/// State shared by the rules of a single run.
///
/// Created empty, moved into [`Transformer::run`](crate::Transformer::run),
/// and only handed back, as [`Transformed`](crate::Transformed), once every
/// rule has been applied.
///
/// # Examples
///
/// ```
/// use wtv_core::FrameworkVersion;
/// use wtv_transform::{ProjectHints, TransformContext};
///
/// let ctx = TransformContext::new(ProjectHints {
///     framework: FrameworkVersion::Vue3,
///     uses_jsx: false,
/// });
/// assert!(ctx.imports.is_empty());
/// assert!(ctx.dev_dependencies.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TransformContext {
    /// Detected framework.
    pub framework: FrameworkVersion,
    /// Whether any source uses JSX.
    pub uses_jsx: bool,
    /// Version range written for `vite`.
    pub vite_version: String,
    /// The configuration being built.
    pub target: TargetConfig,
    /// Imports of the generated file.
    pub imports: ImportList,
    /// Packages the generated configuration needs, name to version range.
    pub dev_dependencies: IndexMap<String, String>,
    /// Constructs the rules could not port.
    pub warnings: Vec<UnsupportedConstructWarning>,
}

impl TransformContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new(hints: ProjectHints) -> Self {
        Self {
            framework: hints.framework,
            uses_jsx: hints.uses_jsx,
            vite_version: OutputConfig::default().vite_version,
            target: TargetConfig::default(),
            imports: ImportList::new(),
            dev_dependencies: IndexMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Creates an empty context for an extracted project.
    #[must_use]
    pub fn from_parsed(parsed: &AstParsingResult) -> Self {
        Self::new(ProjectHints {
            framework: parsed.manifest.framework,
            uses_jsx: parsed.uses_jsx,
        })
    }

    /// Overrides the `vite` version range.
    #[must_use]
    pub fn with_vite_version(mut self, version: impl Into<String>) -> Self {
        self.vite_version = version.into();
        self
    }

    /// Registers an import; the first registration for a module wins.
    pub fn import(&mut self, statement: ImportStatement) {
        self.imports.register(statement);
    }

    /// Records a package the generated configuration needs. An already
    /// recorded package keeps its version.
    pub fn require(&mut self, package: &str, version: &str) {
        self.dev_dependencies
            .entry(package.to_owned())
            .or_insert_with(|| version.to_owned());
    }

    /// Records a construct that was not ported.
    pub fn warn(&mut self, warning: UnsupportedConstructWarning) {
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtv_core::ProjectType;

    #[test]
    fn test_from_parsed_copies_hints() {
        let mut parsed = AstParsingResult::new("/app", ProjectType::Webpack);
        parsed.manifest.framework = FrameworkVersion::React;
        parsed.uses_jsx = true;

        let ctx = TransformContext::from_parsed(&parsed);
        assert_eq!(ctx.framework, FrameworkVersion::React);
        assert!(ctx.uses_jsx);
        assert_eq!(ctx.target, TargetConfig::default());
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_require_keeps_first_version() {
        let mut ctx = TransformContext::new(ProjectHints::default());
        ctx.require("sass", "^1.57.0");
        ctx.require("vite", "^4.0.0");
        ctx.require("sass", "^1.0.0");

        let deps: Vec<_> = ctx
            .dev_dependencies
            .iter()
            .map(|(k, v)| format!("{k}@{v}"))
            .collect();
        assert_eq!(deps, ["sass@^1.57.0", "vite@^4.0.0"]);
    }

    #[test]
    fn test_with_vite_version() {
        let ctx = TransformContext::new(ProjectHints::default()).with_vite_version("^5.0.0");
        assert_eq!(ctx.vite_version, "^5.0.0");
    }
}
