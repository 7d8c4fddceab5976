//! Import statements required by the generated configuration.
//!
//! Rules never write import text themselves. They register an
//! [`ImportStatement`] on the run's [`ImportList`], and the config emitter
//! renders the list as the file header.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::hash::FxHashSet;

/// What an import statement binds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportClause {
    /// `import vue from '...'`
    Default(String),

    /// `import { defineConfig } from '...'`
    Named(SmallVec<[String; 2]>),

    /// `import * as path from '...'`
    Namespace(String),

    /// `import '...'`
    SideEffect,
}

/// A single ES module import.
///
/// # Examples
///
/// ```
/// use wtv_core::ImportStatement;
///
/// let import = ImportStatement::named("vite", ["defineConfig"]);
/// assert_eq!(import.to_string(), "import { defineConfig } from 'vite'");
///
/// let import = ImportStatement::default_import("path", "path");
/// assert_eq!(import.to_string(), "import path from 'path'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStatement {
    /// The module specifier.
    pub specifier: String,
    /// The bindings.
    pub clause: ImportClause,
}

impl ImportStatement {
    /// `import <local> from '<specifier>'`.
    #[must_use]
    pub fn default_import(local: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            clause: ImportClause::Default(local.into()),
        }
    }

    /// `import { <names> } from '<specifier>'`.
    #[must_use]
    pub fn named<I, S>(specifier: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            specifier: specifier.into(),
            clause: ImportClause::Named(names.into_iter().map(Into::into).collect()),
        }
    }

    /// `import * as <local> from '<specifier>'`.
    #[must_use]
    pub fn namespace(local: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            clause: ImportClause::Namespace(local.into()),
        }
    }

    /// `import '<specifier>'`.
    #[must_use]
    pub fn side_effect(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            clause: ImportClause::SideEffect,
        }
    }
}

impl std::fmt::Display for ImportStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let specifier = super::value::quote_js_string(&self.specifier);
        match &self.clause {
            ImportClause::Default(local) => write!(f, "import {local} from {specifier}"),
            ImportClause::Named(names) => {
                write!(f, "import {{ {} }} from {specifier}", names.join(", "))
            }
            ImportClause::Namespace(local) => write!(f, "import * as {local} from {specifier}"),
            ImportClause::SideEffect => write!(f, "import {specifier}"),
        }
    }
}

/// Ordered, de-duplicated set of imports.
///
/// Statements are keyed by module specifier: the first registration for a
/// specifier wins and keeps its position; later ones are ignored.
///
/// # Examples
///
/// ```
/// use wtv_core::{ImportList, ImportStatement};
///
/// let mut imports = ImportList::new();
/// assert!(imports.register(ImportStatement::default_import("path", "path")));
/// assert!(imports.register(ImportStatement::named("vite", ["defineConfig"])));
/// assert!(!imports.register(ImportStatement::default_import("path", "path")));
///
/// let specifiers: Vec<_> = imports.iter().map(|i| i.specifier.as_str()).collect();
/// assert_eq!(specifiers, ["path", "vite"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImportList {
    statements: Vec<ImportStatement>,
    seen: FxHashSet<String>,
}

impl ImportList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an import. Returns `false` when the specifier was already present.
    pub fn register(&mut self, statement: ImportStatement) -> bool {
        if self.seen.contains(&statement.specifier) {
            return false;
        }
        self.seen.insert(statement.specifier.clone());
        self.statements.push(statement);
        true
    }

    /// Returns `true` when an import for `specifier` has been registered.
    #[must_use]
    pub fn contains(&self, specifier: &str) -> bool {
        self.seen.contains(specifier)
    }

    /// Iterates over the statements in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ImportStatement> {
        self.statements.iter()
    }

    /// Number of distinct imports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns `true` when nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl PartialEq for ImportList {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements
    }
}

impl<'a> IntoIterator for &'a ImportList {
    type Item = &'a ImportStatement;
    type IntoIter = std::slice::Iter<'a, ImportStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
