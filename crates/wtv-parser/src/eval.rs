//! Restricted structural evaluation of configuration files.
//!
//! Webpack configurations are programs, not data: they branch on
//! `process.env`, merge objects with spreads and `webpack-merge`, and build
//! paths with `path.resolve`. The [`Evaluator`] walks the syntax tree and
//! computes a [`JsValue`] for the subset of JavaScript that configuration
//! files commonly use. Anything outside that subset evaluates to
//! [`JsValue::Opaque`] carrying its source text, so one unsupported
//! expression never aborts the whole evaluation.
//!
//! Supported:
//!
//! - literals, template strings, regexes, object and array literals with
//!   spreads, shorthand properties and computed keys
//! - `const`/`let`/`var` bindings (evaluated lazily, cycles become opaque)
//! - `process.env.X`, `__dirname`, `__filename`
//! - `path.resolve`/`path.join`/`path.dirname`/`path.basename`/`path.extname`
//! - `+ - * / || && ?? === !== == != !`, unary minus, ternaries
//! - user functions with a single evaluable result, including `if`/`else`
//!   on statically known conditions
//! - `webpack-merge` deep merges and `defineConfig(x)`
//! - `array.filter(Boolean)` and `array.concat(...)`
//! - `new X(...)`, which becomes [`JsValue::Construct`]

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use smallvec::SmallVec;
use tree_sitter::Node;
use wtv_core::{Construct, FxHashMap, FxHashSet, JsObject, JsValue, Opaque, path};

use crate::bindings::ModuleBindings;
use crate::node::{first_named, location, named_children, number_value, string_value, text, unescape};
use crate::parser::ParsedSource;

/// Maximum nesting of evaluation before an expression is given up as opaque.
pub const MAX_DEPTH: u32 = 128;

/// What the evaluator knows about the file being evaluated.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// Absolute path of the configuration file (`__filename`).
    pub file: &'a Utf8Path,
    /// Working directory `path.resolve` starts from (the project root).
    pub cwd: &'a Utf8Path,
    /// Environment visible through `process.env`.
    pub env: &'a IndexMap<String, String>,
}

/// Evaluates whatever the file exports.
///
/// Looks for the last `module.exports = ...` or `export default ...`.
/// Exported functions are called with every parameter `undefined`. Returns
/// [`JsValue::Undefined`] when the file exports nothing.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use indexmap::IndexMap;
/// use wtv_core::JsValue;
/// use wtv_parser::{ConfigParser, EvalContext, SourceKind, evaluate_exports};
///
/// let source = "module.exports = { mode: process.env.NODE_ENV || 'development' };";
/// let mut parser = ConfigParser::new(SourceKind::JavaScript)?;
/// let parsed = parser.parse(source)?;
/// let env = IndexMap::new();
/// let ctx = EvalContext {
///     file: Utf8Path::new("/p/webpack.config.js"),
///     cwd: Utf8Path::new("/p"),
///     env: &env,
/// };
///
/// let exported = evaluate_exports(&parsed, source, &ctx);
/// assert_eq!(exported.get("mode"), Some(&JsValue::String("development".into())));
/// # Ok::<(), wtv_parser::ParseError>(())
/// ```
pub fn evaluate_exports(parsed: &ParsedSource, source: &str, ctx: &EvalContext<'_>) -> JsValue {
    let mut evaluator = Evaluator::new(source, &parsed.bindings, ctx);
    evaluator.evaluate_program(parsed.tree.root_node())
}

/// A name in scope.
#[derive(Debug, Clone)]
enum Slot<'t> {
    /// Initializer not evaluated yet.
    Lazy(Node<'t>),
    /// Property of an initializer (`const { a } = obj`).
    Destructured(Node<'t>, String),
    /// Already evaluated.
    Value(JsValue),
    /// A function declaration.
    Function(Node<'t>),
}

type Scope<'t> = FxHashMap<String, Slot<'t>>;

/// Control flow out of a statement.
enum Flow {
    /// Fell through.
    Next,
    /// `return` with a value.
    Return(JsValue),
    /// Depends on something that cannot be known statically.
    Unknown,
}

/// Tree walker computing [`JsValue`]s.
pub struct Evaluator<'t, 'c> {
    source: &'t str,
    bindings: &'c ModuleBindings,
    ctx: &'c EvalContext<'c>,
    scopes: Vec<Scope<'t>>,
    evaluating: FxHashSet<usize>,
    depth: u32,
}

impl<'t, 'c> Evaluator<'t, 'c> {
    /// Creates an evaluator with an empty global scope.
    #[must_use]
    pub fn new(source: &'t str, bindings: &'c ModuleBindings, ctx: &'c EvalContext<'c>) -> Self {
        Self {
            source,
            bindings,
            ctx,
            scopes: vec![Scope::default()],
            evaluating: FxHashSet::default(),
            depth: 0,
        }
    }

    /// Declares the program's top-level bindings and evaluates its export.
    pub fn evaluate_program(&mut self, program: Node<'t>) -> JsValue {
        let statements = named_children(program);
        for statement in &statements {
            self.declare(*statement);
        }

        let mut exported: Option<Node<'t>> = None;
        for statement in &statements {
            match statement.kind() {
                "expression_statement" => {
                    if let Some(right) = first_named(*statement).and_then(|e| self.module_exports_value(e)) {
                        exported = Some(right);
                    }
                }
                "export_statement" => {
                    let is_default = {
                        let mut cursor = statement.walk();
                        statement
                            .children(&mut cursor)
                            .any(|child| child.kind() == "default")
                    };
                    if is_default {
                        exported = statement
                            .child_by_field_name("value")
                            .or_else(|| statement.child_by_field_name("declaration"));
                    }
                }
                _ => {}
            }
        }

        let Some(exported) = exported else {
            return JsValue::Undefined;
        };
        match self.as_function(exported) {
            Some(function) => self.call_function(function, Vec::new(), exported),
            None => self.eval(exported),
        }
    }

    /// For `module.exports = X` returns `X`.
    fn module_exports_value(&self, expr: Node<'t>) -> Option<Node<'t>> {
        if expr.kind() != "assignment_expression" {
            return None;
        }
        let left = expr.child_by_field_name("left")?;
        let right = expr.child_by_field_name("right")?;
        if left.kind() != "member_expression" {
            return None;
        }
        let object = left.child_by_field_name("object")?;
        let property = left.child_by_field_name("property")?;
        if self.text(object) == "module" && self.text(property) == "exports" {
            // module.exports = exports = {...}
            if right.kind() == "assignment_expression" {
                return right.child_by_field_name("right").or(Some(right));
            }
            return Some(right);
        }
        None
    }

    /// Evaluates an expression node.
    pub fn eval(&mut self, node: Node<'t>) -> JsValue {
        if self.depth >= MAX_DEPTH {
            return self.opaque(node);
        }
        self.depth += 1;
        let value = self.eval_inner(node);
        self.depth -= 1;
        value
    }

    fn eval_inner(&mut self, node: Node<'t>) -> JsValue {
        match node.kind() {
            "string" => string_value(node, self.source)
                .map_or_else(|| self.opaque(node), JsValue::String),
            "template_string" => self.eval_template(node),
            "number" => number_value(self.text(node))
                .map_or_else(|| self.opaque(node), JsValue::Number),
            "true" => JsValue::Bool(true),
            "false" => JsValue::Bool(false),
            "null" => JsValue::Null,
            "undefined" => JsValue::Undefined,
            "regex" => JsValue::Regex {
                pattern: node
                    .child_by_field_name("pattern")
                    .map(|p| self.text(p).to_owned())
                    .unwrap_or_default(),
                flags: node
                    .child_by_field_name("flags")
                    .map(|f| self.text(f).to_owned())
                    .unwrap_or_default(),
            },
            "identifier" => self.eval_identifier(node),
            "object" => self.eval_object(node),
            "array" => self.eval_array(node),
            "member_expression" => self.eval_member(node),
            "subscript_expression" => self.eval_subscript(node),
            "call_expression" => self.eval_call(node),
            "new_expression" => self.eval_new(node),
            "binary_expression" => self.eval_binary(node),
            "unary_expression" => self.eval_unary(node),
            "ternary_expression" => self.eval_ternary(node),
            "parenthesized_expression"
            | "as_expression"
            | "satisfies_expression"
            | "non_null_expression"
            | "type_assertion" => match first_named(node) {
                Some(inner) => self.eval(inner),
                None => self.opaque(node),
            },
            _ => self.opaque(node),
        }
    }

    // -------------------------------------------------------------------------
    // Scopes
    // -------------------------------------------------------------------------

    /// Registers the bindings a statement introduces in the innermost scope.
    fn declare(&mut self, statement: Node<'t>) {
        match statement.kind() {
            "lexical_declaration" | "variable_declaration" => {
                for declarator in named_children(statement) {
                    if declarator.kind() == "variable_declarator" {
                        self.declare_variable(declarator);
                    }
                }
            }
            "function_declaration" => {
                if let Some(name) = statement.child_by_field_name("name") {
                    let name = self.text(name).to_owned();
                    self.define(name, Slot::Function(statement));
                }
            }
            "export_statement" => {
                if let Some(declaration) = statement.child_by_field_name("declaration") {
                    self.declare(declaration);
                }
            }
            _ => {}
        }
    }

    fn declare_variable(&mut self, declarator: Node<'t>) {
        let Some(name) = declarator.child_by_field_name("name") else {
            return;
        };
        let value = declarator.child_by_field_name("value");
        if value.is_some_and(|v| self.is_require(v)) {
            // Module bindings are resolved through `ModuleBindings`.
            return;
        }

        match (name.kind(), value) {
            ("identifier", Some(init)) => {
                let name = self.text(name).to_owned();
                self.define(name, Slot::Lazy(init));
            }
            ("identifier", None) => {
                let name = self.text(name).to_owned();
                self.define(name, Slot::Value(JsValue::Undefined));
            }
            ("object_pattern", Some(init)) => {
                for property in named_children(name) {
                    match property.kind() {
                        "shorthand_property_identifier_pattern" => {
                            let local = self.text(property).to_owned();
                            self.define(local.clone(), Slot::Destructured(init, local));
                        }
                        "pair_pattern" => {
                            let key = property.child_by_field_name("key");
                            let local = property.child_by_field_name("value");
                            if let (Some(key), Some(local)) = (key, local) {
                                if local.kind() == "identifier" {
                                    let key = self.property_name(key);
                                    let local = self.text(local).to_owned();
                                    self.define(local, Slot::Destructured(init, key));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn define(&mut self, name: String, slot: Slot<'t>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, slot);
        }
    }

    fn is_shadowed(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains_key(name))
    }

    fn eval_identifier(&mut self, node: Node<'t>) -> JsValue {
        let name = self.text(node);
        let Some(index) = self.scopes.iter().rposition(|scope| scope.contains_key(name)) else {
            return self.eval_global(node);
        };

        let slot = self.scopes[index].get(name).cloned();
        let (init, key) = match slot {
            Some(Slot::Value(value)) => return value,
            Some(Slot::Function(_)) | None => return self.opaque(node),
            Some(Slot::Lazy(init)) => (init, None),
            Some(Slot::Destructured(init, key)) => (init, Some(key)),
        };

        if self.as_function(init).is_some() || !self.evaluating.insert(init.id()) {
            return self.opaque(node);
        }

        // Evaluate in the scope the binding was declared in.
        let hidden = self.scopes.split_off(index + 1);
        let evaluated = self.eval(init);
        self.scopes.extend(hidden);
        self.evaluating.remove(&init.id());

        let value = match key {
            Some(key) => self.member_of(&evaluated, &key, node),
            None => evaluated,
        };
        let name = name.to_owned();
        self.scopes[index].insert(name, Slot::Value(value.clone()));
        value
    }

    fn eval_global(&self, node: Node<'t>) -> JsValue {
        match self.text(node) {
            "__dirname" => JsValue::String(self.dirname().to_string()),
            "__filename" => JsValue::String(self.ctx.file.to_string()),
            "undefined" => JsValue::Undefined,
            "NaN" => JsValue::Number(f64::NAN),
            "Infinity" => JsValue::Number(f64::INFINITY),
            _ => self.opaque(node),
        }
    }

    fn dirname(&self) -> Utf8PathBuf {
        self.ctx
            .file
            .parent()
            .map_or_else(|| self.ctx.cwd.to_owned(), Utf8Path::to_owned)
    }

    // -------------------------------------------------------------------------
    // Literals
    // -------------------------------------------------------------------------

    fn eval_template(&mut self, node: Node<'t>) -> JsValue {
        let start = node.start_byte() + 1;
        let end = node.end_byte().saturating_sub(1).max(start);
        let mut out = String::new();
        let mut pos = start;

        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "template_substitution" => {
                    out.push_str(self.slice(pos, child.start_byte()));
                    let value = match first_named(child) {
                        Some(expr) => self.eval(expr),
                        None => JsValue::Undefined,
                    };
                    match value.to_display_string() {
                        Some(s) => out.push_str(&s),
                        None => return self.opaque(node),
                    }
                    pos = child.end_byte();
                }
                "escape_sequence" => {
                    out.push_str(self.slice(pos, child.start_byte()));
                    out.push_str(&unescape(self.text(child)));
                    pos = child.end_byte();
                }
                _ => {}
            }
        }
        out.push_str(self.slice(pos, end));
        JsValue::String(out)
    }

    fn eval_object(&mut self, node: Node<'t>) -> JsValue {
        let mut map = JsObject::new();
        for member in named_children(node) {
            match member.kind() {
                "pair" => {
                    let (Some(key), Some(value)) = (
                        member.child_by_field_name("key"),
                        member.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    let Some(key) = self.object_key(key) else {
                        continue;
                    };
                    let value = self.eval(value);
                    map.insert(key, value);
                }
                "shorthand_property_identifier" => {
                    let value = self.eval_identifier(member);
                    map.insert(self.text(member).to_owned(), value);
                }
                "spread_element" => {
                    let Some(inner) = first_named(member) else {
                        continue;
                    };
                    if let JsValue::Object(spread) = self.eval(inner) {
                        for (key, value) in spread {
                            map.insert(key, value);
                        }
                    }
                }
                "method_definition" => {
                    if let Some(name) = member.child_by_field_name("name") {
                        let key = self.property_name(name);
                        map.insert(key, self.opaque(member));
                    }
                }
                _ => {}
            }
        }
        JsValue::Object(map)
    }

    /// Evaluates a property key; computed keys must produce a string or number.
    fn object_key(&mut self, key: Node<'t>) -> Option<String> {
        match key.kind() {
            "computed_property_name" => {
                let inner = first_named(key)?;
                match self.eval(inner) {
                    value @ (JsValue::String(_) | JsValue::Number(_)) => value.to_display_string(),
                    _ => None,
                }
            }
            _ => Some(self.property_name(key)),
        }
    }

    /// Name of a static property key (`a`, `'a-b'`, `1`).
    fn property_name(&self, key: Node<'t>) -> String {
        match key.kind() {
            "string" => string_value(key, self.source).unwrap_or_default(),
            "number" => number_value(self.text(key))
                .map_or_else(|| self.text(key).to_owned(), wtv_core::format_number),
            _ => self.text(key).to_owned(),
        }
    }

    fn eval_array(&mut self, node: Node<'t>) -> JsValue {
        let mut items = Vec::new();
        for element in named_children(node) {
            if element.kind() == "spread_element" {
                let Some(inner) = first_named(element) else {
                    continue;
                };
                match self.eval(inner) {
                    JsValue::Array(spread) => items.extend(spread),
                    _ => items.push(self.opaque(element)),
                }
            } else {
                items.push(self.eval(element));
            }
        }
        JsValue::Array(items)
    }

    // -------------------------------------------------------------------------
    // Member access
    // -------------------------------------------------------------------------

    fn eval_member(&mut self, node: Node<'t>) -> JsValue {
        let (Some(object), Some(property)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("property"),
        ) else {
            return self.opaque(node);
        };
        let key = self.text(property).to_owned();

        if self.is_process_env(object) {
            return self.env_lookup(&key);
        }
        if self.module_ref(object).is_some() {
            return self.opaque(node);
        }

        let value = self.eval(object);
        self.member_of(&value, &key, node)
    }

    fn eval_subscript(&mut self, node: Node<'t>) -> JsValue {
        let (Some(object), Some(index)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("index"),
        ) else {
            return self.opaque(node);
        };
        let index = self.eval(index);

        if self.is_process_env(object) {
            return match index.as_str() {
                Some(key) => self.env_lookup(key),
                None => self.opaque(node),
            };
        }

        let value = self.eval(object);
        match (&value, &index) {
            (JsValue::Array(items), JsValue::Number(n)) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let i = *n as usize;
                if n.fract() == 0.0 && *n >= 0.0 {
                    items.get(i).cloned().unwrap_or(JsValue::Undefined)
                } else {
                    JsValue::Undefined
                }
            }
            (_, JsValue::String(_) | JsValue::Number(_)) => match index.to_display_string() {
                Some(key) => self.member_of(&value, &key, node),
                None => self.opaque(node),
            },
            _ => self.opaque(node),
        }
    }

    /// Reads a property off an evaluated value.
    #[allow(clippy::cast_precision_loss)]
    fn member_of(&self, value: &JsValue, key: &str, node: Node<'t>) -> JsValue {
        match value {
            JsValue::Object(map) => map.get(key).cloned().unwrap_or(JsValue::Undefined),
            JsValue::Array(items) if key == "length" => JsValue::Number(items.len() as f64),
            JsValue::String(s) if key == "length" => JsValue::Number(s.chars().count() as f64),
            JsValue::Array(_) | JsValue::String(_) | JsValue::Undefined | JsValue::Null => {
                JsValue::Undefined
            }
            _ => self.opaque(node),
        }
    }

    /// `process.env`, unless `process` is a local name.
    fn is_process_env(&self, node: Node<'t>) -> bool {
        if node.kind() != "member_expression" {
            return false;
        }
        let (Some(object), Some(property)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("property"),
        ) else {
            return false;
        };
        object.kind() == "identifier"
            && self.text(object) == "process"
            && self.text(property) == "env"
            && !self.is_shadowed("process")
    }

    fn env_lookup(&self, key: &str) -> JsValue {
        self.ctx
            .env
            .get(key)
            .map_or(JsValue::Undefined, |value| JsValue::String(value.clone()))
    }

    // -------------------------------------------------------------------------
    // Calls
    // -------------------------------------------------------------------------

    fn eval_call(&mut self, node: Node<'t>) -> JsValue {
        let Some(callee) = node.child_by_field_name("function") else {
            return self.opaque(node);
        };
        let Some(arguments) = node
            .child_by_field_name("arguments")
            .filter(|args| args.kind() == "arguments")
        else {
            return self.opaque(node);
        };

        if callee.kind() == "member_expression" {
            if let Some(value) = self.eval_array_method(node, callee, arguments) {
                return value;
            }
        }

        if let Some((module, member)) = self.module_ref(callee) {
            let args = self.eval_arguments(arguments);
            return self.call_module(&module, member.as_deref(), args, node);
        }

        if let Some(function) = self.as_function(callee) {
            let args = self.eval_arguments(arguments);
            return self.call_function(function, args, node);
        }

        self.opaque(node)
    }

    /// `.filter(Boolean)` and `.concat(...)` on evaluated arrays.
    fn eval_array_method(
        &mut self,
        node: Node<'t>,
        callee: Node<'t>,
        arguments: Node<'t>,
    ) -> Option<JsValue> {
        let object = callee.child_by_field_name("object")?;
        let method = self.text(callee.child_by_field_name("property")?);
        if self.module_ref(object).is_some() {
            return None;
        }

        match method {
            "filter" => {
                let args = named_children(arguments);
                if args.len() != 1 || self.text(args[0]) != "Boolean" || self.is_shadowed("Boolean") {
                    return None;
                }
                match self.eval(object) {
                    JsValue::Array(items) => Some(JsValue::Array(
                        items
                            .into_iter()
                            .filter(|item| item.truthiness() != Some(false))
                            .collect(),
                    )),
                    _ => Some(self.opaque(node)),
                }
            }
            "concat" => match self.eval(object) {
                JsValue::Array(mut items) => {
                    for arg in self.eval_arguments(arguments) {
                        match arg {
                            JsValue::Array(more) => items.extend(more),
                            other => items.push(other),
                        }
                    }
                    Some(JsValue::Array(items))
                }
                _ => Some(self.opaque(node)),
            },
            _ => None,
        }
    }

    fn eval_arguments(&mut self, arguments: Node<'t>) -> Vec<JsValue> {
        let mut args = Vec::new();
        for arg in named_children(arguments) {
            if arg.kind() == "spread_element" {
                match first_named(arg).map(|inner| self.eval(inner)) {
                    Some(JsValue::Array(items)) => args.extend(items),
                    _ => args.push(self.opaque(arg)),
                }
            } else {
                args.push(self.eval(arg));
            }
        }
        args
    }

    /// Calls into a known module (`path`, `webpack-merge`, `@vue/cli-service`).
    fn call_module(
        &self,
        module: &str,
        member: Option<&str>,
        args: Vec<JsValue>,
        node: Node<'t>,
    ) -> JsValue {
        let module = module.strip_prefix("node:").unwrap_or(module);
        match (module, member) {
            ("path", Some(member)) => {
                let member = member.strip_prefix("posix.").unwrap_or(member);
                self.call_path(member, &args)
                    .unwrap_or_else(|| self.opaque(node))
            }
            ("webpack-merge", None | Some("merge" | "default" | "smart" | "merge.smart")) => {
                let mut merged: Option<JsValue> = None;
                for arg in args {
                    if !matches!(arg, JsValue::Object(_)) {
                        return self.opaque(node);
                    }
                    merged = Some(match merged {
                        Some(acc) => deep_merge(acc, arg),
                        None => arg,
                    });
                }
                merged.unwrap_or_else(|| JsValue::Object(JsObject::new()))
            }
            ("@vue/cli-service" | "vite" | "webpack-cli", Some("defineConfig")) => {
                args.into_iter().next().unwrap_or(JsValue::Undefined)
            }
            _ => self.opaque(node),
        }
    }

    fn call_path(&self, member: &str, args: &[JsValue]) -> Option<JsValue> {
        let strings: Option<SmallVec<[&str; 4]>> = args.iter().map(JsValue::as_str).collect();
        let strings = strings?;
        let result = match member {
            "resolve" => path::resolve(self.ctx.cwd, strings.as_slice()).to_string(),
            "join" => path::join(strings.as_slice()).to_string(),
            "dirname" => match Utf8Path::new(strings.first()?).parent() {
                Some(parent) if !parent.as_str().is_empty() => parent.to_string(),
                _ => ".".to_owned(),
            },
            "basename" => {
                let name = Utf8Path::new(strings.first()?).file_name()?.to_owned();
                match strings.get(1) {
                    Some(ext) => name.strip_suffix(*ext).unwrap_or(&name).to_owned(),
                    None => name,
                }
            }
            "extname" => Utf8Path::new(strings.first()?)
                .extension()
                .map_or_else(String::new, |ext| format!(".{ext}")),
            _ => return None,
        };
        Some(JsValue::String(result))
    }

    /// Calls a user function with the given arguments.
    fn call_function(&mut self, function: Node<'t>, args: Vec<JsValue>, call: Node<'t>) -> JsValue {
        if self.depth >= MAX_DEPTH || !self.evaluating.insert(call.id()) {
            return self.opaque(call);
        }
        self.depth += 1;

        let mut scope = Scope::default();
        let mut args = args.into_iter();
        if let Some(parameter) = function.child_by_field_name("parameter") {
            self.bind_pattern(&mut scope, parameter, args.next().unwrap_or(JsValue::Undefined));
        } else if let Some(parameters) = function.child_by_field_name("parameters") {
            for parameter in named_children(parameters) {
                let arg = args.next().unwrap_or(JsValue::Undefined);
                self.bind_pattern(&mut scope, parameter, arg);
            }
        }
        self.scopes.push(scope);

        let result = match function.child_by_field_name("body") {
            Some(body) if body.kind() == "statement_block" => match self.exec_block(body) {
                Flow::Next => JsValue::Undefined,
                Flow::Return(value) => value,
                Flow::Unknown => self.opaque(call),
            },
            Some(body) => self.eval(body),
            None => self.opaque(call),
        };

        self.scopes.pop();
        self.depth -= 1;
        self.evaluating.remove(&call.id());
        result
    }

    /// Binds a parameter (or destructuring pattern) to a value.
    fn bind_pattern(&mut self, scope: &mut Scope<'t>, pattern: Node<'t>, value: JsValue) {
        match pattern.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                scope.insert(self.text(pattern).to_owned(), Slot::Value(value));
            }
            "required_parameter" | "optional_parameter" => {
                let Some(inner) = pattern.child_by_field_name("pattern") else {
                    return;
                };
                let value = match (value, pattern.child_by_field_name("value")) {
                    (JsValue::Undefined, Some(default)) => self.eval(default),
                    (value, _) => value,
                };
                self.bind_pattern(scope, inner, value);
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                let (Some(left), Some(right)) = (
                    pattern.child_by_field_name("left"),
                    pattern.child_by_field_name("right"),
                ) else {
                    return;
                };
                let value = if matches!(value, JsValue::Undefined) {
                    self.eval(right)
                } else {
                    value
                };
                self.bind_pattern(scope, left, value);
            }
            "object_pattern" => {
                for property in named_children(pattern) {
                    match property.kind() {
                        "shorthand_property_identifier_pattern" => {
                            let field = self.member_of(&value, self.text(property), property);
                            self.bind_pattern(scope, property, field);
                        }
                        "object_assignment_pattern" => {
                            let Some(left) = property.child_by_field_name("left") else {
                                continue;
                            };
                            let field = self.member_of(&value, self.text(left), property);
                            self.bind_pattern(scope, property, field);
                        }
                        "pair_pattern" => {
                            let (Some(key), Some(target)) = (
                                property.child_by_field_name("key"),
                                property.child_by_field_name("value"),
                            ) else {
                                continue;
                            };
                            let key = self.property_name(key);
                            let field = self.member_of(&value, &key, property);
                            self.bind_pattern(scope, target, field);
                        }
                        _ => {}
                    }
                }
            }
            "array_pattern" => {
                let items = value.as_array().map(<[JsValue]>::to_vec).unwrap_or_default();
                for (i, element) in named_children(pattern).into_iter().enumerate() {
                    let item = items.get(i).cloned().unwrap_or(JsValue::Undefined);
                    self.bind_pattern(scope, element, item);
                }
            }
            _ => {}
        }
    }

    fn exec_block(&mut self, block: Node<'t>) -> Flow {
        let statements = named_children(block);
        for statement in &statements {
            if statement.kind() == "function_declaration" {
                self.declare(*statement);
            }
        }
        for statement in statements {
            match self.exec_statement(statement) {
                Flow::Next => {}
                flow => return flow,
            }
        }
        Flow::Next
    }

    fn exec_statement(&mut self, statement: Node<'t>) -> Flow {
        match statement.kind() {
            "lexical_declaration" | "variable_declaration" => {
                self.declare(statement);
                Flow::Next
            }
            "return_statement" => Flow::Return(match first_named(statement) {
                Some(expr) => self.eval(expr),
                None => JsValue::Undefined,
            }),
            "if_statement" => {
                let condition = statement
                    .child_by_field_name("condition")
                    .map(|c| self.eval(c))
                    .and_then(|c| c.truthiness());
                match condition {
                    Some(true) => statement
                        .child_by_field_name("consequence")
                        .map_or(Flow::Next, |s| self.exec_statement(s)),
                    Some(false) => statement
                        .child_by_field_name("alternative")
                        .and_then(first_named)
                        .map_or(Flow::Next, |s| self.exec_statement(s)),
                    None => Flow::Unknown,
                }
            }
            "statement_block" => {
                self.scopes.push(Scope::default());
                let flow = self.exec_block(statement);
                self.scopes.pop();
                flow
            }
            _ => Flow::Next,
        }
    }

    // -------------------------------------------------------------------------
    // Operators
    // -------------------------------------------------------------------------

    fn eval_new(&mut self, node: Node<'t>) -> JsValue {
        let Some(constructor) = node.child_by_field_name("constructor") else {
            return self.opaque(node);
        };
        let args = node
            .child_by_field_name("arguments")
            .map(|args| self.eval_arguments(args))
            .unwrap_or_default();
        JsValue::Construct(Box::new(Construct {
            callee: self.text(constructor).to_owned(),
            args: args.into_iter().collect(),
            source_text: self.text(node).to_owned(),
            location: location(node),
        }))
    }

    fn eval_binary(&mut self, node: Node<'t>) -> JsValue {
        let (Some(left), Some(operator), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("operator"),
            node.child_by_field_name("right"),
        ) else {
            return self.opaque(node);
        };
        let operator = operator.kind();

        // Short-circuit operators evaluate the right side lazily.
        match operator {
            "||" => {
                let lhs = self.eval(left);
                return match lhs.truthiness() {
                    Some(true) => lhs,
                    Some(false) => self.eval(right),
                    None => self.opaque(node),
                };
            }
            "&&" => {
                let lhs = self.eval(left);
                return match lhs.truthiness() {
                    Some(false) => lhs,
                    Some(true) => self.eval(right),
                    None => self.opaque(node),
                };
            }
            "??" => {
                let lhs = self.eval(left);
                return match lhs {
                    JsValue::Undefined | JsValue::Null => self.eval(right),
                    JsValue::Opaque(_) => self.opaque(node),
                    other => other,
                };
            }
            _ => {}
        }

        let lhs = self.eval(left);
        let rhs = self.eval(right);
        let result = match operator {
            "===" => lhs.strict_equals(&rhs).map(JsValue::Bool),
            "!==" => lhs.strict_equals(&rhs).map(|eq| JsValue::Bool(!eq)),
            "==" => lhs.loose_equals(&rhs).map(JsValue::Bool),
            "!=" => lhs.loose_equals(&rhs).map(|eq| JsValue::Bool(!eq)),
            "+" => match (&lhs, &rhs) {
                (JsValue::Number(a), JsValue::Number(b)) => Some(JsValue::Number(a + b)),
                (JsValue::String(_), _) | (_, JsValue::String(_)) => lhs
                    .to_display_string()
                    .zip(rhs.to_display_string())
                    .map(|(a, b)| JsValue::String(a + &b)),
                _ => None,
            },
            "-" | "*" | "/" | "%" => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => Some(JsValue::Number(match operator {
                    "-" => a - b,
                    "*" => a * b,
                    "/" => a / b,
                    _ => a % b,
                })),
                _ => None,
            },
            "<" | ">" | "<=" | ">=" => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => Some(JsValue::Bool(match operator {
                    "<" => a < b,
                    ">" => a > b,
                    "<=" => a <= b,
                    _ => a >= b,
                })),
                _ => None,
            },
            _ => None,
        };
        result.unwrap_or_else(|| self.opaque(node))
    }

    fn eval_unary(&mut self, node: Node<'t>) -> JsValue {
        let (Some(operator), Some(argument)) = (
            node.child_by_field_name("operator"),
            node.child_by_field_name("argument"),
        ) else {
            return self.opaque(node);
        };
        let value = self.eval(argument);
        let result = match operator.kind() {
            "!" => value.truthiness().map(|t| JsValue::Bool(!t)),
            "-" => value.as_f64().map(|n| JsValue::Number(-n)),
            "+" => value.as_f64().map(JsValue::Number),
            "void" => Some(JsValue::Undefined),
            _ => None,
        };
        result.unwrap_or_else(|| self.opaque(node))
    }

    fn eval_ternary(&mut self, node: Node<'t>) -> JsValue {
        let (Some(condition), Some(consequence), Some(alternative)) = (
            node.child_by_field_name("condition"),
            node.child_by_field_name("consequence"),
            node.child_by_field_name("alternative"),
        ) else {
            return self.opaque(node);
        };
        match self.eval(condition).truthiness() {
            Some(true) => self.eval(consequence),
            Some(false) => self.eval(alternative),
            None => self.opaque(node),
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Resolves a node to a function definition, following local names.
    fn as_function(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "arrow_function" | "function_expression" | "function" | "function_declaration" => {
                Some(node)
            }
            "parenthesized_expression" => first_named(node).and_then(|inner| self.as_function(inner)),
            "identifier" => {
                let name = self.text(node);
                let scope = self.scopes.iter().rev().find(|scope| scope.contains_key(name))?;
                match scope.get(name)? {
                    Slot::Function(function) => Some(*function),
                    Slot::Lazy(init) if init.id() != node.id() => match init.kind() {
                        "arrow_function" | "function_expression" | "function" => Some(*init),
                        _ => None,
                    },
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Resolves a node to `(module, member path)` when it refers to an
    /// imported module or one of its members.
    fn module_ref(&self, node: Node<'t>) -> Option<(String, Option<String>)> {
        match node.kind() {
            "identifier" => {
                let name = self.text(node);
                if self.is_shadowed(name) {
                    return None;
                }
                let binding = self.bindings.get(name)?;
                Some((binding.module.clone(), binding.member.clone()))
            }
            "call_expression" if self.is_require(node) => {
                let arguments = node.child_by_field_name("arguments")?;
                let module = string_value(first_named(arguments)?, self.source)?;
                Some((module, None))
            }
            "member_expression" => {
                let object = node.child_by_field_name("object")?;
                let property = self.text(node.child_by_field_name("property")?);
                let (module, member) = self.module_ref(object)?;
                let member = match member {
                    Some(parent) => format!("{parent}.{property}"),
                    None => property.to_owned(),
                };
                Some((module, Some(member)))
            }
            _ => None,
        }
    }

    /// `require('m')` or `require('m').member`.
    fn is_require(&self, node: Node<'t>) -> bool {
        match node.kind() {
            "call_expression" => node.child_by_field_name("function").is_some_and(|callee| {
                callee.kind() == "identifier"
                    && self.text(callee) == "require"
                    && !self.is_shadowed("require")
            }),
            "member_expression" => node
                .child_by_field_name("object")
                .is_some_and(|object| self.is_require(object)),
            _ => false,
        }
    }

    fn opaque(&self, node: Node<'t>) -> JsValue {
        JsValue::Opaque(Opaque {
            source_text: self.text(node).to_owned(),
            location: location(node),
        })
    }

    #[inline]
    fn text(&self, node: Node<'t>) -> &'t str {
        text(node, self.source)
    }

    fn slice(&self, start: usize, end: usize) -> &'t str {
        self.source.get(start..end).unwrap_or("")
    }
}

/// Merges two configuration values the way `webpack-merge` does: objects
/// recursively, arrays by concatenation, anything else by replacement.
#[must_use]
pub fn deep_merge(base: JsValue, overlay: JsValue) -> JsValue {
    match (base, overlay) {
        (JsValue::Object(mut base), JsValue::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.get_mut(&key) {
                    Some(existing) => deep_merge(std::mem::replace(existing, JsValue::Undefined), value),
                    None => value,
                };
                base.insert(key, merged);
            }
            JsValue::Object(base)
        }
        (JsValue::Array(mut base), JsValue::Array(overlay)) => {
            base.extend(overlay);
            JsValue::Array(base)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigParser, SourceKind};

    fn eval_with_env(source: &str, env: &[(&str, &str)]) -> JsValue {
        let env: IndexMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut parser = ConfigParser::new(SourceKind::JavaScript).expect("Parser creation failed");
        let parsed = parser.parse(source).expect("Parse failed");
        let ctx = EvalContext {
            file: Utf8Path::new("/project/build/webpack.config.js"),
            cwd: Utf8Path::new("/project"),
            env: &env,
        };
        evaluate_exports(&parsed, source, &ctx)
    }

    fn eval(source: &str) -> JsValue {
        eval_with_env(source, &[])
    }

    fn string(s: &str) -> JsValue {
        JsValue::String(s.to_owned())
    }

    #[test]
    fn test_object_literal_keeps_order() {
        let value = eval("module.exports = { b: 1, a: 'x', 'c-d': true, 3: null };");
        let keys: Vec<_> = value.as_object().expect("object").keys().cloned().collect();
        assert_eq!(keys, ["b", "a", "c-d", "3"]);
    }

    #[test]
    fn test_const_references_and_spread() {
        let value = eval(
            r"
const base = { mode: 'development', devtool: 'eval' };
const extra = { devtool: false };
module.exports = { ...base, ...extra, entry: base.mode };
",
        );
        assert_eq!(value.get("mode"), Some(&string("development")));
        assert_eq!(value.get("devtool"), Some(&JsValue::Bool(false)));
        assert_eq!(value.get("entry"), Some(&string("development")));
    }

    #[test]
    fn test_path_resolve_and_dirname() {
        let value = eval(
            r"
const path = require('path');
module.exports = {
  src: path.resolve(__dirname, '../src'),
  out: path.join(__dirname, 'dist'),
  cwd: path.resolve('public'),
};
",
        );
        assert_eq!(value.get("src"), Some(&string("/project/src")));
        assert_eq!(value.get("out"), Some(&string("/project/build/dist")));
        assert_eq!(value.get("cwd"), Some(&string("/project/public")));
    }

    #[test]
    fn test_destructured_path_helpers_and_helper_function() {
        let value = eval(
            r"
const { resolve, join } = require('path');
function res(dir) {
  return join(__dirname, '..', dir);
}
module.exports = { a: res('src'), b: resolve(__dirname, 'x') };
",
        );
        assert_eq!(value.get("a"), Some(&string("/project/src")));
        assert_eq!(value.get("b"), Some(&string("/project/build/x")));
    }

    #[test]
    fn test_process_env_and_conditionals() {
        let source = r"
const isProd = process.env.NODE_ENV === 'production';
module.exports = {
  mode: isProd ? 'production' : 'development',
  devtool: isProd ? false : 'eval-source-map',
  name: process.env['APP_NAME'] ?? 'app',
};
";
        let dev = eval(source);
        assert_eq!(dev.get("mode"), Some(&string("development")));
        assert_eq!(dev.get("name"), Some(&string("app")));

        let prod = eval_with_env(source, &[("NODE_ENV", "production"), ("APP_NAME", "shop")]);
        assert_eq!(prod.get("mode"), Some(&string("production")));
        assert_eq!(prod.get("devtool"), Some(&JsValue::Bool(false)));
        assert_eq!(prod.get("name"), Some(&string("shop")));
    }

    #[test]
    fn test_exported_function_is_called() {
        let value = eval(
            r"
module.exports = (env, argv) => {
  const mode = argv && argv.mode ? argv.mode : 'production';
  if (mode === 'development') {
    return { mode, devtool: 'eval' };
  }
  return { mode };
};
",
        );
        assert_eq!(value.get("mode"), Some(&string("production")));
        assert_eq!(value.get("devtool"), None);
    }

    #[test]
    fn test_plugins_filter_boolean_and_construct() {
        let value = eval(
            r"
const HtmlWebpackPlugin = require('html-webpack-plugin');
const isProd = false;
module.exports = {
  plugins: [
    new HtmlWebpackPlugin({ template: './public/index.html' }),
    isProd && new CleanPlugin(),
  ].filter(Boolean),
};
",
        );
        let plugins = value.get("plugins").and_then(JsValue::as_array).expect("array");
        assert_eq!(plugins.len(), 1);
        let JsValue::Construct(construct) = &plugins[0] else {
            panic!("expected construct, got {:?}", plugins[0]);
        };
        assert_eq!(construct.callee, "HtmlWebpackPlugin");
        assert_eq!(
            construct.args[0].get("template"),
            Some(&string("./public/index.html"))
        );
    }

    #[test]
    fn test_webpack_merge() {
        let value = eval(
            r"
const { merge } = require('webpack-merge');
const common = { entry: './src/index.js', plugins: [1], resolve: { extensions: ['.js'] } };
module.exports = merge(common, { mode: 'production', plugins: [2], resolve: { alias: {} } });
",
        );
        assert_eq!(value.get("entry"), Some(&string("./src/index.js")));
        assert_eq!(value.get("mode"), Some(&string("production")));
        assert_eq!(
            value.get("plugins"),
            Some(&JsValue::Array(vec![JsValue::Number(1.0), JsValue::Number(2.0)]))
        );
        let resolve = value.get("resolve").expect("resolve");
        assert!(resolve.get("extensions").is_some());
        assert!(resolve.get("alias").is_some());
    }

    #[test]
    fn test_define_config_identity_and_template() {
        let value = eval(
            r"
const { defineConfig } = require('@vue/cli-service');
const name = 'demo';
module.exports = defineConfig({ publicPath: `/${name}/`, transpileDependencies: true });
",
        );
        assert_eq!(value.get("publicPath"), Some(&string("/demo/")));
    }

    #[test]
    fn test_unsupported_expressions_become_opaque() {
        let value = eval(
            r"
module.exports = {
  version: JSON.stringify(require('./package.json').version),
  chainWebpack(config) { config.plugins.delete('prefetch'); },
};
",
        );
        let version = value.get("version").expect("version");
        assert_eq!(
            version.source_text(),
            Some("JSON.stringify(require('./package.json').version)")
        );
        assert!(value.get("chainWebpack").is_some_and(JsValue::is_opaque));
    }

    #[test]
    fn test_self_reference_is_opaque_not_a_hang() {
        let value = eval("const a = { b: a };\nmodule.exports = a;");
        assert!(value.get("b").is_some_and(JsValue::is_opaque));
    }

    #[test]
    fn test_export_default_typescript_style() {
        let value = eval("export default { mode: 'none', port: 8000 + 80 };");
        assert_eq!(value.get("mode"), Some(&string("none")));
        assert_eq!(value.get("port"), Some(&JsValue::Number(8080.0)));
    }

    #[test]
    fn test_no_export() {
        assert_eq!(eval("const x = 1;"), JsValue::Undefined);
    }

    #[test]
    fn test_regex_literal() {
        let value = eval(r"module.exports = { test: /\.s[ac]ss$/i };");
        assert_eq!(
            value.get("test"),
            Some(&JsValue::Regex {
                pattern: r"\.s[ac]ss$".to_owned(),
                flags: "i".to_owned()
            })
        );
    }

    #[test]
    fn test_deep_merge_keeps_base_positions() {
        let mut a = JsObject::new();
        a.insert("x".to_owned(), JsValue::Number(1.0));
        a.insert("y".to_owned(), JsValue::Number(2.0));
        let mut b = JsObject::new();
        b.insert("x".to_owned(), JsValue::Number(3.0));
        b.insert("z".to_owned(), JsValue::Number(4.0));
        let merged = deep_merge(JsValue::Object(a), JsValue::Object(b));
        let keys: Vec<_> = merged.as_object().expect("object").keys().cloned().collect();
        assert_eq!(keys, ["x", "y", "z"]);
        assert_eq!(merged.get("x"), Some(&JsValue::Number(3.0)));
    }
}
