//! Rule catalog mapping an extracted webpack project onto a vite configuration.
//!
//! The [`Transformer`] applies the [`RULES`] catalog, in order, to a
//! [`TransformContext`]. Each rule reads the extracted project and writes the
//! [`TargetConfig`](wtv_core::TargetConfig), registers imports and records the
//! packages the generated file needs. Rules never produce text; emission is
//! left to `wtv-emit`.
//!
//! # Example
//!
//! ```
//! use wtv_core::{AstParsingResult, ProjectType};
//! use wtv_transform::{ProgressTick, TransformContext, Transformer};
//!
//! let mut parsed = AstParsingResult::new("/app", ProjectType::Webpack);
//! parsed.config.entry.insert("main".into(), "src/main.js".into());
//!
//! let mut ticks = Vec::new();
//! let transformed = Transformer::new()
//!     .run(
//!         &parsed,
//!         TransformContext::from_parsed(&parsed),
//!         &mut |tick: ProgressTick| ticks.push(tick.current),
//!     )
//!     .expect("catalog run");
//!
//! assert_eq!(transformed.config.root_dir(), "src");
//! assert_eq!(ticks.len(), wtv_transform::RULE_COUNT);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod catalog;
pub mod context;
pub mod error;
pub mod progress;
mod rules;

pub use catalog::{Apply, RULE_COUNT, RULES, Rule, rule};
pub use context::{ProjectHints, TransformContext};
pub use error::RuleError;
pub use progress::{NoProgress, Progress, ProgressTick};

use indexmap::IndexMap;
use tracing::{debug, info, instrument};
use wtv_core::{AstParsingResult, ImportList, TargetConfig, UnsupportedConstructWarning};

/// The finished result of a catalog run.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    /// The vite configuration.
    pub config: TargetConfig,
    /// Imports of the generated file.
    pub imports: ImportList,
    /// Packages to add to `devDependencies`.
    pub dependencies: IndexMap<String, String>,
    /// Constructs the rules could not port.
    pub warnings: Vec<UnsupportedConstructWarning>,
}

impl From<TransformContext> for Transformed {
    fn from(ctx: TransformContext) -> Self {
        Self {
            config: ctx.target,
            imports: ctx.imports,
            dependencies: ctx.dev_dependencies,
            warnings: ctx.warnings,
        }
    }
}

/// Applies a rule catalog.
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    rules: &'static [Rule],
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer {
    /// A transformer over the full [`RULES`] catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: &RULES }
    }

    /// A transformer over a custom catalog.
    #[must_use]
    pub const fn with_rules(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// The rules this transformer applies.
    #[must_use]
    pub const fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Applies every rule once, in order, and hands back the result.
    ///
    /// `progress` receives a tick after each rule, with `current` counting
    /// from 1 up to the number of rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`]. Later rules are not applied and the
    /// partially built context is dropped.
    #[instrument(skip_all, fields(root = %parsed.root, rules = self.rules.len()))]
    pub fn run(
        &self,
        parsed: &AstParsingResult,
        mut ctx: TransformContext,
        progress: &mut impl Progress,
    ) -> Result<Transformed, RuleError> {
        let total = self.rules.len();
        for (index, rule) in self.rules.iter().enumerate() {
            debug!(rule = rule.id, writes = ?rule.writes, "Applying rule");
            (rule.apply)(parsed, &mut ctx)?;
            progress.tick(ProgressTick {
                current: index + 1,
                total,
                rule: rule.id,
            });
        }

        info!(
            plugins = ctx.target.plugins.len(),
            aliases = ctx.target.resolve.alias.len(),
            imports = ctx.imports.len(),
            dependencies = ctx.dev_dependencies.len(),
            warnings = ctx.warnings.len(),
            "Rule catalog applied"
        );
        Ok(Transformed::from(ctx))
    }
}
