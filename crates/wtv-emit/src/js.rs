//! Pretty-printing of [`Value`] trees as JavaScript source.
//!
//! Literals are written with single-quoted strings and bare identifier keys.
//! Raw expressions are copied byte for byte. Arrays and objects stay on one
//! line while they fit within [`MAX_INLINE_WIDTH`] columns.

use wtv_core::{Literal, PluginSlot, Value, property_key};

/// Indentation unit.
pub const INDENT: &str = "  ";

/// Column limit for single-line arrays and objects.
pub const MAX_INLINE_WIDTH: usize = 80;

/// A node of the output tree: a value, a nested object of nodes, or the
/// plugin array (which may hold comments).
#[derive(Debug)]
pub enum Node<'a> {
    /// A borrowed value.
    Value(&'a Value),
    /// A value assembled by the emitter.
    Owned(Value),
    /// An object whose entries are nodes, always written multi-line.
    Object(Vec<(&'static str, Node<'a>)>),
    /// The `plugins` array.
    Plugins(&'a [PluginSlot]),
}

/// Accumulates JavaScript source text.
#[derive(Debug, Default)]
pub struct Printer {
    out: String,
}

impl Printer {
    /// Creates an empty printer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text written so far.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    /// Appends text as is.
    pub fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Appends a line break.
    pub fn newline(&mut self) {
        self.out.push('\n');
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    /// Writes a node whose first line starts at the current position, with
    /// continuation lines indented to `depth`.
    pub fn node(&mut self, node: &Node<'_>, depth: usize) {
        match node {
            Node::Value(value) => self.value(value, depth),
            Node::Owned(value) => self.value(value, depth),
            Node::Object(entries) => {
                if entries.is_empty() {
                    self.push("{}");
                    return;
                }
                self.push("{");
                self.newline();
                for (key, child) in entries {
                    self.indent(depth + 1);
                    self.push(&property_key(key));
                    self.push(": ");
                    self.node(child, depth + 1);
                    self.push(",");
                    self.newline();
                }
                self.indent(depth);
                self.push("}");
            }
            Node::Plugins(slots) => self.plugins(slots, depth),
        }
    }

    /// Writes a value, breaking arrays and objects across lines when they
    /// do not fit.
    pub fn value(&mut self, value: &Value, depth: usize) {
        let inline = value.to_string();
        let width = depth * INDENT.len() + inline.len();
        let nested = match value {
            Value::Raw(_) => {
                self.push(&inline);
                return;
            }
            Value::Literal(Literal::Array(items)) if !items.is_empty() => Some(Nested::Array(items.as_slice())),
            Value::Literal(Literal::Object(map)) if !map.is_empty() => Some(Nested::Object(map)),
            Value::Literal(_) => None,
        };

        match nested {
            Some(nested) if width > MAX_INLINE_WIDTH || inline.contains('\n') => {
                self.nested(&nested, depth);
            }
            _ => self.push(&inline),
        }
    }

    fn nested(&mut self, nested: &Nested<'_>, depth: usize) {
        match nested {
            Nested::Array(items) => {
                self.push("[");
                self.newline();
                for item in *items {
                    self.indent(depth + 1);
                    self.value(item, depth + 1);
                    self.push(",");
                    self.newline();
                }
                self.indent(depth);
                self.push("]");
            }
            Nested::Object(map) => {
                self.push("{");
                self.newline();
                for (key, item) in *map {
                    self.indent(depth + 1);
                    self.push(&property_key(key));
                    self.push(": ");
                    self.value(item, depth + 1);
                    self.push(",");
                    self.newline();
                }
                self.indent(depth);
                self.push("}");
            }
        }
    }

    fn plugins(&mut self, slots: &[PluginSlot], depth: usize) {
        if slots.is_empty() {
            self.push("[]");
            return;
        }
        self.push("[");
        self.newline();
        for slot in slots {
            match slot {
                PluginSlot::Call { callee, args } => {
                    self.indent(depth + 1);
                    self.push(callee);
                    self.push("(");
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.value(arg, depth + 1);
                    }
                    self.push("),");
                    self.newline();
                }
                PluginSlot::Commented { source_text, note } => {
                    self.indent(depth + 1);
                    self.push("// ");
                    self.push(note);
                    self.push(":");
                    self.newline();
                    for line in source_text.lines() {
                        self.indent(depth + 1);
                        self.push("// ");
                        self.push(line.trim_end());
                        self.newline();
                    }
                }
            }
        }
        self.indent(depth);
        self.push("]");
    }
}

enum Nested<'a> {
    Array(&'a [Value]),
    Object(&'a wtv_core::ObjectMap),
}

/// Renders a value on its own, as the config emitter would at the top level.
///
/// # Examples
///
/// ```
/// use wtv_core::Value;
/// use wtv_emit::js::render;
///
/// assert_eq!(render(&Value::string("it's")), r"'it\'s'");
/// assert_eq!(render(&Value::raw("path.resolve(__dirname, 'src')")), "path.resolve(__dirname, 'src')");
/// ```
#[must_use]
pub fn render(value: &Value) -> String {
    let mut printer = Printer::new();
    printer.value(value, 0);
    printer.finish()
}
