//! Decoding of numeric and string literal text

/// Parse the text of a numeric literal
///
/// Handles decimal, exponent, hex, octal (both `0o17` and legacy `017`) and binary
/// forms with `_` separators. Returns `None` for `BigInt` literals and malformed text.
pub fn parse_number(text: &str) -> Option<f64> {
    if text.ends_with('n') {
        return None;
    }
    let digits: String = text.chars().filter(|ch| *ch != '_').collect();
    let lower = digits.to_ascii_lowercase();

    let radix_value = |body: &str, radix: u32| u64::from_str_radix(body, radix).ok().map(|value| value as f64);

    if let Some(body) = lower.strip_prefix("0x") {
        return radix_value(body, 16);
    }
    if let Some(body) = lower.strip_prefix("0o") {
        return radix_value(body, 8);
    }
    if let Some(body) = lower.strip_prefix("0b") {
        return radix_value(body, 2);
    }
    if lower.len() > 1
        && lower.starts_with('0')
        && lower.bytes().all(|byte| (b'0'..=b'7').contains(&byte))
    {
        return radix_value(&lower[1..], 8);
    }
    lower.parse::<f64>().ok()
}

/// Decode a quoted string or template literal, including its delimiters
pub fn unescape_string(raw: &str) -> String {
    let inner = raw
        .char_indices()
        .nth(1)
        .and_then(|(start, _)| raw.get(start..raw.len().saturating_sub(1)))
        .unwrap_or_default();

    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        let Some(escape) = chars.next() else {
            break;
        };
        match escape {
            'n' => decoded.push('\n'),
            'r' => decoded.push('\r'),
            't' => decoded.push('\t'),
            'b' => decoded.push('\u{8}'),
            'f' => decoded.push('\u{c}'),
            'v' => decoded.push('\u{b}'),
            '0' if !chars.peek().is_some_and(char::is_ascii_digit) => decoded.push('\0'),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut decoded, &hex);
            }
            'u' => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|ch| *ch != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut decoded, &hex);
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => decoded.push(other),
        }
    }
    decoded
}

fn push_code_point(decoded: &mut String, hex: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => decoded.push(ch),
        None => decoded.push(char::REPLACEMENT_CHARACTER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_forms() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("1_000"), Some(1000.0));
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("0o17"), Some(15.0));
        assert_eq!(parse_number("017"), Some(15.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("1.5e3"), Some(1500.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number("10n"), None);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(unescape_string("'a\\'b'"), "a'b");
        assert_eq!(unescape_string("\"line\\nbreak\""), "line\nbreak");
        assert_eq!(unescape_string("'\\x41\\u0042\\u{43}'"), "ABC");
        assert_eq!(unescape_string("'\\0'"), "\0");
        assert_eq!(unescape_string("`./lib`"), "./lib");
        assert_eq!(unescape_string("''"), "");
    }
}
