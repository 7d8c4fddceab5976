//! The ordered rule catalog.
//!
//! Rules run exactly once, first to last. When two rules write the same
//! target field the later one wins: `devtool` refines the source-map default
//! of `mode`, and `env` overrides both `mode` and `define`.

use wtv_core::AstParsingResult;

use crate::context::TransformContext;
use crate::error::RuleError;
use crate::rules::{base, define, framework, loaders, plugins, resolve, server};

/// Signature of a rule body.
pub type Apply = fn(&AstParsingResult, &mut TransformContext) -> Result<(), RuleError>;

/// One step of the catalog.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Stable identifier, used in progress ticks and errors.
    pub id: &'static str,
    /// Target fields (and context parts) the rule writes.
    pub writes: &'static [&'static str],
    /// The rule body.
    pub apply: Apply,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

/// Number of rules in [`RULES`].
pub const RULE_COUNT: usize = 13;

/// Every rule, in application order.
pub static RULES: [Rule; RULE_COUNT] = [
    Rule {
        id: "vite-base",
        writes: &["imports", "dev_dependencies"],
        apply: base::vite_base,
    },
    Rule {
        id: "mode",
        writes: &["mode", "build.sourcemap"],
        apply: base::mode,
    },
    Rule {
        id: "entry",
        writes: &["root", "publicDir", "envDir", "build.rollupOptions.input"],
        apply: base::entry,
    },
    Rule {
        id: "output",
        writes: &["base", "build.outDir", "build.assetsDir"],
        apply: base::output,
    },
    Rule {
        id: "devtool",
        writes: &["build.sourcemap"],
        apply: base::devtool,
    },
    Rule {
        id: "alias",
        writes: &["resolve.alias", "imports"],
        apply: resolve::alias,
    },
    Rule {
        id: "extensions",
        writes: &["resolve.extensions"],
        apply: resolve::extensions,
    },
    Rule {
        id: "dev-server",
        writes: &["server"],
        apply: server::dev_server,
    },
    Rule {
        id: "define",
        writes: &["define"],
        apply: define::define,
    },
    Rule {
        id: "framework",
        writes: &["plugins", "imports", "dev_dependencies"],
        apply: framework::framework,
    },
    Rule {
        id: "plugins",
        writes: &[
            "plugins",
            "build.emptyOutDir",
            "imports",
            "dev_dependencies",
            "warnings",
        ],
        apply: plugins::plugins,
    },
    Rule {
        id: "loaders",
        writes: &[
            "css.preprocessorOptions",
            "pass_through",
            "dev_dependencies",
            "warnings",
        ],
        apply: loaders::loaders,
    },
    Rule {
        id: "env",
        writes: &["mode", "define"],
        apply: define::env,
    },
];

/// Looks up a rule by identifier.
#[must_use]
pub fn rule(id: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.id == id)
}
