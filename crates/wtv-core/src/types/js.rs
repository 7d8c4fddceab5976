//! Values produced by structurally evaluating a JavaScript configuration.
//!
//! The evaluator in `wtv-parser` only understands a restricted subset of
//! JavaScript. Everything outside that subset becomes [`JsValue::Opaque`],
//! which keeps the verbatim source text so later stages can either pass it
//! through as code or report it, instead of aborting extraction.

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::location::SourceLocation;

/// An ordered JavaScript object: keys keep their declaration order.
pub type JsObject = IndexMap<String, JsValue>;

/// A `new Callee(...)` expression found in the configuration.
///
/// Plugins are almost always declared this way (`new HtmlWebpackPlugin({...})`).
#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    /// The constructor as written, e.g. `webpack.DefinePlugin`.
    pub callee: String,
    /// Evaluated constructor arguments.
    pub args: SmallVec<[JsValue; 2]>,
    /// The whole expression as written in the source.
    pub source_text: String,
    /// Where the expression starts.
    pub location: SourceLocation,
}

impl Construct {
    /// Returns the last segment of the callee (`DefinePlugin` for `webpack.DefinePlugin`).
    #[must_use]
    pub fn name(&self) -> &str {
        self.callee.rsplit('.').next().unwrap_or(&self.callee)
    }

    /// Returns the first segment of the callee (`webpack` for `webpack.DefinePlugin`).
    #[must_use]
    pub fn root_identifier(&self) -> &str {
        self.callee.split('.').next().unwrap_or(&self.callee)
    }
}

/// An expression outside the supported subset, kept as source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    /// The expression as written in the source.
    pub source_text: String,
    /// Where the expression starts.
    pub location: SourceLocation,
}

/// The structural value of a JavaScript expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsValue {
    /// `undefined`, or a lookup that found nothing (missing env var, missing key).
    #[default]
    Undefined,
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Any numeric literal.
    Number(f64),
    /// String and template literals (with evaluable substitutions).
    String(String),
    /// Array literal, spreads flattened.
    Array(Vec<JsValue>),
    /// Object literal, spreads merged, keys in declaration order.
    Object(JsObject),
    /// Regular expression literal.
    Regex {
        /// Pattern between the slashes.
        pattern: String,
        /// Flags after the closing slash.
        flags: String,
    },
    /// `new X(...)`.
    Construct(Box<Construct>),
    /// Anything the evaluator does not model.
    Opaque(Opaque),
}

impl JsValue {
    /// Returns the string if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if this is a numeric value.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the object map if this is an object value.
    #[must_use]
    pub const fn as_object(&self) -> Option<&JsObject> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the elements if this is an array value.
    #[must_use]
    pub fn as_array(&self) -> Option<&[JsValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a key on an object value. Non-objects have no keys.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Returns `true` for `undefined` and `null`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Returns `true` for values the evaluator could not model.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// JavaScript truthiness, or `None` when it cannot be known statically.
    ///
    /// Constructed objects are always truthy; opaque expressions are unknown.
    #[must_use]
    pub fn truthiness(&self) -> Option<bool> {
        match self {
            Self::Undefined | Self::Null => Some(false),
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0 && !n.is_nan()),
            Self::String(s) => Some(!s.is_empty()),
            Self::Array(_) | Self::Object(_) | Self::Regex { .. } | Self::Construct(_) => {
                Some(true)
            }
            Self::Opaque(_) => None,
        }
    }

    /// Strict equality (`===`) between primitive values.
    ///
    /// Returns `None` when either side is opaque or a reference type, since
    /// identity cannot be decided structurally.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn strict_equals(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => Some(true),
            (Self::Bool(a), Self::Bool(b)) => Some(a == b),
            (Self::Number(a), Self::Number(b)) => Some(a == b),
            (Self::String(a), Self::String(b)) => Some(a == b),
            (Self::Opaque(_) | Self::Construct(_), _)
            | (_, Self::Opaque(_) | Self::Construct(_))
            | (Self::Array(_) | Self::Object(_) | Self::Regex { .. }, _)
            | (_, Self::Array(_) | Self::Object(_) | Self::Regex { .. }) => None,
            _ => Some(false),
        }
    }

    /// Loose equality (`==`): like [`strict_equals`](Self::strict_equals) but
    /// `null == undefined`.
    #[must_use]
    pub fn loose_equals(&self, other: &Self) -> Option<bool> {
        if self.is_nullish() && other.is_nullish() {
            return Some(true);
        }
        self.strict_equals(other)
    }

    /// Returns the original source text for opaque and constructed values.
    #[must_use]
    pub fn source_text(&self) -> Option<&str> {
        match self {
            Self::Opaque(opaque) => Some(&opaque.source_text),
            Self::Construct(construct) => Some(&construct.source_text),
            _ => None,
        }
    }

    /// Returns a short name for the kind of value, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Regex { .. } => "regex",
            Self::Construct(_) => "constructor call",
            Self::Opaque(_) => "unsupported expression",
        }
    }

    /// Converts a string or number to the text JavaScript would coerce it to.
    #[must_use]
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null => Some("null".to_owned()),
            Self::Undefined => Some("undefined".to_owned()),
            _ => None,
        }
    }
}

/// Formats a number the way JavaScript prints it (`8080`, not `8080.0`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let sign = if n.is_sign_negative() { "-" } else { "" };
        format!("{sign}Infinity")
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.abs() >= 1e21 {
        // JavaScript always signs the exponent.
        format!("{n:e}").replacen('e', "e+", 1)
    } else if n.abs() < 1e-6 {
        format!("{n:e}")
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_truthiness() {
        assert_eq!(JsValue::Undefined.truthiness(), Some(false));
        assert_eq!(JsValue::String(String::new()).truthiness(), Some(false));
        assert_eq!(JsValue::Number(0.0).truthiness(), Some(false));
        assert_eq!(JsValue::Object(JsObject::new()).truthiness(), Some(true));
        let opaque = JsValue::Opaque(Opaque {
            source_text: "fn()".to_owned(),
            location: SourceLocation::default(),
        });
        assert_eq!(opaque.truthiness(), None);
    }

    #[test]
    fn test_strict_equals() {
        let prod = JsValue::String("production".to_owned());
        assert_eq!(prod.strict_equals(&prod.clone()), Some(true));
        assert_eq!(prod.strict_equals(&JsValue::Undefined), Some(false));
        assert_eq!(JsValue::Null.strict_equals(&JsValue::Undefined), Some(false));
        assert_eq!(JsValue::Null.loose_equals(&JsValue::Undefined), Some(true));
    }

    #[test]
    fn test_construct_names() {
        let construct = Construct {
            callee: "webpack.DefinePlugin".to_owned(),
            args: smallvec![],
            source_text: "new webpack.DefinePlugin()".to_owned(),
            location: SourceLocation::default(),
        };
        assert_eq!(construct.name(), "DefinePlugin");
        assert_eq!(construct.root_identifier(), "webpack");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(8080.0), "8080");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_format_number_outside_the_integer_range() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(2.5e-7), "2.5e-7");
    }
}
