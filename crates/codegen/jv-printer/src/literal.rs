//! Literal text

use jv_syntax::{LiteralValue, number_to_string};

/// Source text of a literal value
pub(crate) fn literal_text(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Null => "null".to_string(),
        LiteralValue::Bool(flag) => flag.to_string(),
        LiteralValue::Number(number) => number_to_string(*number),
        LiteralValue::String(text) => quote(text),
        LiteralValue::Regex { pattern, flags } => format!("/{pattern}/{flags}"),
    }
}

/// Single-quoted string literal with escapes
pub(crate) fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        match ch {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{8}' => quoted.push_str("\\b"),
            '\u{c}' => quoted.push_str("\\f"),
            '\u{b}' => quoted.push_str("\\v"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            control if control.is_control() && u32::from(control) <= 0xff => {
                quoted.push_str(&format!("\\x{:02X}", u32::from(control)));
            }
            other => quoted.push(other),
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(quote("a\\b"), "'a\\\\b'");
        assert_eq!(quote("line\nnext"), "'line\\nnext'");
        assert_eq!(quote("\u{0}"), "'\\x00'");
        assert_eq!(quote("\"double\""), "'\"double\"'");
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(literal_text(&LiteralValue::Null), "null");
        assert_eq!(literal_text(&LiteralValue::Bool(true)), "true");
        assert_eq!(literal_text(&LiteralValue::Number(2.0)), "2");
        assert_eq!(literal_text(&LiteralValue::Number(0.5)), "0.5");
        assert_eq!(
            literal_text(&LiteralValue::Regex {
                pattern: "a+".to_string(),
                flags: "g".to_string(),
            }),
            "/a+/g"
        );
    }
}
