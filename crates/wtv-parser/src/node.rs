//! Small helpers over tree-sitter nodes shared by binding extraction and
//! evaluation.

use tree_sitter::Node;
use wtv_core::SourceLocation;

/// Returns the source text of a node, or `""` if the range is not valid UTF-8.
#[inline]
pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Converts a node's start position into a [`SourceLocation`].
#[allow(clippy::cast_possible_truncation)]
pub fn location(node: Node<'_>) -> SourceLocation {
    let point = node.start_position();
    SourceLocation::new(
        (point.row + 1) as u32,
        point.column as u32,
        node.start_byte() as u32,
    )
}

/// Named children without comments.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// First named child that is not a comment.
pub fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    named_children(node).into_iter().next()
}

/// Decodes a `string` node into its value.
///
/// Returns `None` for anything that is not a plain string literal.
pub fn string_value(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut out = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_fragment" => out.push_str(text(child, source)),
            "escape_sequence" => out.push_str(&unescape(text(child, source))),
            _ => {}
        }
    }
    Some(out)
}

/// Decodes a single JavaScript escape sequence (including the backslash).
pub fn unescape(sequence: &str) -> String {
    let body = sequence.strip_prefix('\\').unwrap_or(sequence);
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str();
    match first {
        'n' => "\n".to_owned(),
        'r' => "\r".to_owned(),
        't' => "\t".to_owned(),
        'b' => "\u{8}".to_owned(),
        'f' => "\u{c}".to_owned(),
        'v' => "\u{b}".to_owned(),
        '0' if rest.is_empty() => "\0".to_owned(),
        'x' => u32::from_str_radix(rest, 16)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| sequence.to_owned(), String::from),
        'u' => {
            let hex = rest.trim_start_matches('{').trim_end_matches('}');
            u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| sequence.to_owned(), String::from)
        }
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => String::new(),
        other => {
            let mut out = String::from(other);
            out.push_str(rest);
            out
        }
    }
}

/// Parses a JavaScript numeric literal.
#[allow(clippy::cast_precision_loss)]
pub fn number_value(literal: &str) -> Option<f64> {
    let cleaned: String = literal.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.trim_end_matches('n');
    let lower = cleaned.to_ascii_lowercase();
    let radix = |prefix: &str, radix: u32| {
        lower
            .strip_prefix(prefix)
            .and_then(|digits| u64::from_str_radix(digits, radix).ok())
    };
    if let Some(n) = radix("0x", 16).or_else(|| radix("0o", 8)).or_else(|| radix("0b", 2)) {
        return Some(n as f64);
    }
    lower.parse::<f64>().ok()
}
