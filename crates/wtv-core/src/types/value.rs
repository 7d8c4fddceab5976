//! The value model of the generated vite configuration.
//!
//! Every field of [`TargetConfig`](super::TargetConfig) holds a [`Value`], which
//! is either plain data ([`Literal`]) or code ([`RawExpression`]). The emitter
//! quotes and escapes literals; raw expressions are written byte for byte.
//! The two are only ever told apart by their tag, never by the shape of a string.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::js::{JsValue, format_number};

/// An ordered object of values, keyed by property name.
pub type ObjectMap = IndexMap<String, Value>;

/// Source text emitted verbatim into the generated configuration.
///
/// # Examples
///
/// ```
/// use wtv_core::RawExpression;
///
/// let raw = RawExpression::new("path.resolve(__dirname, 'src')");
/// assert_eq!(raw.as_str(), "path.resolve(__dirname, 'src')");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawExpression(String);

impl RawExpression {
    /// Wraps source text as a raw expression.
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// Returns the source text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RawExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plain data. Nested values may themselves be raw expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string, quoted on emission.
    String(String),
    /// An array.
    Array(Vec<Value>),
    /// An object with keys in insertion order.
    Object(ObjectMap),
}

/// A configuration value: data or code.
///
/// # Examples
///
/// ```
/// use wtv_core::Value;
///
/// let data = Value::string("src");
/// let code = Value::raw("path.resolve(__dirname, 'src')");
/// assert!(!data.is_raw());
/// assert!(code.is_raw());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Value {
    /// Plain data.
    Literal(Literal),
    /// Verbatim source text.
    Raw(RawExpression),
}

impl Value {
    /// A raw expression.
    #[inline]
    #[must_use]
    pub fn raw(source: impl Into<String>) -> Self {
        Self::Raw(RawExpression::new(source))
    }

    /// A string literal.
    #[inline]
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::Literal(Literal::String(s.into()))
    }

    /// A boolean literal.
    #[inline]
    #[must_use]
    pub const fn bool(b: bool) -> Self {
        Self::Literal(Literal::Bool(b))
    }

    /// A number literal.
    #[inline]
    #[must_use]
    pub const fn number(n: f64) -> Self {
        Self::Literal(Literal::Number(n))
    }

    /// The `null` literal.
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// An array literal.
    #[inline]
    #[must_use]
    pub const fn array(items: Vec<Value>) -> Self {
        Self::Literal(Literal::Array(items))
    }

    /// An object literal.
    #[inline]
    #[must_use]
    pub const fn object(map: ObjectMap) -> Self {
        Self::Literal(Literal::Object(map))
    }

    /// Returns `true` for raw expressions.
    #[inline]
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Returns the raw expression, if this is one.
    #[must_use]
    pub const fn as_raw(&self) -> Option<&RawExpression> {
        match self {
            Self::Raw(raw) => Some(raw),
            Self::Literal(_) => None,
        }
    }

    /// Returns the string if this is a string literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean literal.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Literal(Literal::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Returns the map if this is an object literal.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Literal(Literal::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Returns the elements if this is an array literal.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Literal(Literal::Array(items)) => Some(items),
            _ => None,
        }
    }

    /// Converts an evaluated source value into a target value.
    ///
    /// Plain data stays data. Everything that only exists as code in the
    /// source (regexes, constructor calls, unsupported expressions,
    /// `undefined`) becomes a raw expression carrying that code.
    ///
    /// # Examples
    ///
    /// ```
    /// use wtv_core::{JsValue, Value};
    ///
    /// assert_eq!(Value::from_js(&JsValue::String("x".into())), Value::string("x"));
    /// let regex = JsValue::Regex { pattern: r"\.vue$".into(), flags: String::new() };
    /// assert_eq!(Value::from_js(&regex), Value::raw(r"/\.vue$/"));
    /// ```
    #[must_use]
    pub fn from_js(value: &JsValue) -> Self {
        match value {
            JsValue::Undefined => Self::raw("undefined"),
            JsValue::Null => Self::null(),
            JsValue::Bool(b) => Self::bool(*b),
            JsValue::Number(n) => Self::number(*n),
            JsValue::String(s) => Self::string(s.clone()),
            JsValue::Array(items) => Self::array(items.iter().map(Self::from_js).collect()),
            JsValue::Object(map) => Self::object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from_js(value)))
                    .collect(),
            ),
            JsValue::Regex { pattern, flags } => Self::raw(format!("/{pattern}/{flags}")),
            JsValue::Construct(construct) => Self::raw(construct.source_text.clone()),
            JsValue::Opaque(opaque) => Self::raw(opaque.source_text.clone()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::string(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

impl From<RawExpression> for Value {
    fn from(raw: RawExpression) -> Self {
        Self::Raw(raw)
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => f.write_str(&quote_js_string(s)),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(map) => {
                if map.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", property_key(key))?;
                }
                f.write_str(" }")
            }
        }
    }
}

/// Single-line JavaScript rendering. The config emitter pretty-prints
/// instead; this form is used inside raw expressions and in diagnostics.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Raw(raw) => write!(f, "{raw}"),
        }
    }
}

/// Quotes a string as a single-quoted JavaScript string literal.
///
/// # Examples
///
/// ```
/// use wtv_core::quote_js_string;
///
/// assert_eq!(quote_js_string("src"), "'src'");
/// assert_eq!(quote_js_string("it's"), r"'it\'s'");
/// assert_eq!(quote_js_string("a\\b"), r"'a\\b'");
/// ```
#[must_use]
pub fn quote_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Returns `true` when `key` can be written as an unquoted property name.
#[must_use]
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Renders an object key: bare when it is an identifier, quoted otherwise.
#[must_use]
pub fn property_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_owned()
    } else {
        quote_js_string(key)
    }
}
