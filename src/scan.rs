//! Relaxed scanner for the decoded entry stream.
//!
//! The decoded text looks like `{"k":v,"k2":v2,...`, object notation
//! with no closing brace (that byte is the terminator and is stripped
//! before scanning). This is a recovery parser, not a validator: a `{`
//! or `,` opens an entry, a quoted key and `:` follow, then a value.
//! Anything that does not fit advances the scan by one character, so a
//! garbled tail never costs the entries before it.

use log::debug;

use crate::value::Value;

/// Characters that may extend a numeric token.
const NUMBER_CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '+', '-', '.', 'e', 'E',
];

/// Scans the decoded text into an ordered entry sequence.
pub fn scan_entries(text: &str) -> Vec<(String, Value)> {
    let chars: Vec<char> = text.chars().collect();
    let mut entries = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{' || chars[i] == ',' {
            if let Some((key, value, next)) = parse_entry(&chars, i + 1) {
                entries.push((key, value));
                i = next;
                continue;
            }
        }
        i += 1;
    }
    entries
}

/// Parses one `"key":value` pair starting at `i`. Returns the entry and
/// the index just past the value, or `None` if the shape does not fit.
fn parse_entry(chars: &[char], i: usize) -> Option<(String, Value, usize)> {
    if chars.get(i) != Some(&'"') {
        return None;
    }
    let (key, i, terminated) = parse_string(chars, i);
    if !terminated {
        return None;
    }
    if chars.get(i) != Some(&':') {
        return None;
    }
    let (value, next) = parse_value(chars, i + 1)?;
    Some((key, value, next))
}

/// Parses a quoted string starting at the opening quote `chars[i]`.
///
/// Returns the unescaped content, the index just past the closing quote
/// and whether the string was terminated. An unterminated string
/// consumes the rest of the input. Unknown escapes keep the escaped
/// character; `\u` escapes combine surrogate pairs, and a lone
/// surrogate becomes U+FFFD.
fn parse_string(chars: &[char], i: usize) -> (String, usize, bool) {
    let mut out = String::new();
    let mut j = i + 1;
    while j < chars.len() {
        match chars[j] {
            '"' => return (out, j + 1, true),
            '\\' if j + 1 < chars.len() => {
                let e = chars[j + 1];
                match e {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'b' => out.push('\u{0008}'),
                    'f' => out.push('\u{000C}'),
                    '"' | '\\' | '/' => out.push(e),
                    'u' => {
                        j = push_unicode_escape(chars, j, &mut out);
                        continue;
                    }
                    other => out.push(other),
                }
                j += 2;
            }
            c => {
                out.push(c);
                j += 1;
            }
        }
    }
    (out, chars.len(), false)
}

/// Handles a `\uXXXX` escape with `chars[j..j+2] == ['\\', 'u']`.
/// Returns the index to resume scanning from.
fn push_unicode_escape(chars: &[char], j: usize, out: &mut String) -> usize {
    let Some(high) = read_hex4(chars, j + 2) else {
        // Not four hex digits: keep the 'u' like any unknown escape.
        out.push('u');
        return j + 2;
    };
    let mut j = j + 6;
    let mut cp = u32::from(high);
    if (0xD800..=0xDBFF).contains(&cp)
        && chars.get(j) == Some(&'\\')
        && chars.get(j + 1) == Some(&'u')
    {
        if let Some(low) = read_hex4(chars, j + 2) {
            if (0xDC00..=0xDFFF).contains(&u32::from(low)) {
                cp = 0x10000 + ((cp - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                j += 6;
            }
        }
    }
    out.push(char::from_u32(cp).unwrap_or('\u{FFFD}'));
    j
}

fn read_hex4(chars: &[char], i: usize) -> Option<u16> {
    let mut v: u16 = 0;
    for k in 0..4 {
        let d = chars.get(i + k)?.to_digit(16)?;
        v = (v << 4) | d as u16;
    }
    Some(v)
}

/// Parses a value starting at `i`. Returns the value and the index just
/// past it.
fn parse_value(chars: &[char], i: usize) -> Option<(Value, usize)> {
    match *chars.get(i)? {
        '"' => {
            // Unterminated strings are accepted and run to the end.
            let (s, j, _) = parse_string(chars, i);
            Some((Value::Str(s), j))
        }
        '{' | '[' => {
            let (fragment, j) = capture_balanced(chars, i);
            match serde_json::from_str::<serde_json::Value>(&fragment) {
                Ok(v) => Some((Value::Other(v), j)),
                Err(err) => {
                    debug!("nested fragment is not JSON ({}), keeping raw text", err);
                    Some((Value::Str(fragment), j))
                }
            }
        }
        c if c == '-' || c.is_ascii_digit() => {
            let mut j = i;
            while j < chars.len() && NUMBER_CHARS.contains(&chars[j]) {
                j += 1;
            }
            let token: String = chars[i..j].iter().collect();
            Some((parse_number(token), j))
        }
        _ => {
            for (literal, value) in [
                ("true", Value::Bool(true)),
                ("false", Value::Bool(false)),
                ("null", Value::Null),
            ] {
                if matches_at(chars, i, literal) {
                    return Some((value, i + literal.len()));
                }
            }
            None
        }
    }
}

fn parse_number(token: String) -> Value {
    if token.contains(&['.', 'e', 'E'][..]) {
        match token.parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::Str(token),
        }
    } else if let Ok(i) = token.parse::<i64>() {
        Value::Int(i)
    } else if let Ok(f) = token.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::Str(token)
    }
}

/// Captures a balanced `{...}`/`[...]` fragment starting at `i`,
/// walking over quoted strings so braces inside them do not count.
/// An unbalanced fragment runs to the end of the input.
fn capture_balanced(chars: &[char], i: usize) -> (String, usize) {
    let mut depth = 0usize;
    let mut j = i;
    while j < chars.len() {
        match chars[j] {
            '"' => {
                let (_, next, _) = parse_string(chars, j);
                j = next;
            }
            '{' | '[' => {
                depth += 1;
                j += 1;
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                j += 1;
                if depth == 0 {
                    return (chars[i..j].iter().collect(), j);
                }
            }
            _ => j += 1,
        }
    }
    (chars[i..].iter().collect(), chars.len())
}

fn matches_at(chars: &[char], i: usize, literal: &str) -> bool {
    literal
        .chars()
        .enumerate()
        .all(|(k, c)| chars.get(i + k) == Some(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: Value) -> (String, Value) {
        (key.to_owned(), value)
    }

    #[test]
    fn test_scan_basic_entries() {
        let got = scan_entries(r#"{"a":"b","n":12,"t":true,"z":null"#);
        assert_eq!(
            got,
            vec![
                entry("a", Value::Str("b".to_owned())),
                entry("n", Value::Int(12)),
                entry("t", Value::Bool(true)),
                entry("z", Value::Null),
            ]
        );
    }

    #[test]
    fn test_scan_numbers() {
        let got = scan_entries(r#"{"i":-42,"f":3.5,"e":1e3"#);
        assert_eq!(
            got,
            vec![
                entry("i", Value::Int(-42)),
                entry("f", Value::Float(3.5)),
                entry("e", Value::Float(1000.0)),
            ]
        );
    }

    #[test]
    fn test_scan_nested_object_reparsed() {
        let got = scan_entries(r#"{"o":{"a":[1,2],"b":"x"},"after":"ok""#);
        assert_eq!(got.len(), 2);
        assert_eq!(
            got[0],
            entry("o", Value::Other(serde_json::json!({"a": [1, 2], "b": "x"})))
        );
        assert_eq!(got[1], entry("after", Value::Str("ok".to_owned())));
    }

    #[test]
    fn test_scan_broken_nested_fragment_kept_raw() {
        let got = scan_entries(r#"{"o":{"a":oops},"after":1"#);
        assert_eq!(got[0], entry("o", Value::Str("{\"a\":oops}".to_owned())));
        assert_eq!(got[1], entry("after", Value::Int(1)));
    }

    #[test]
    fn test_scan_unterminated_string_value() {
        let got = scan_entries(r#"{"k":"runs to the end"#);
        assert_eq!(got, vec![entry("k", Value::Str("runs to the end".to_owned()))]);
    }

    #[test]
    fn test_scan_skips_garbled_tail() {
        let got = scan_entries("{\"k\":\"v\"\u{7F}q8");
        assert_eq!(got, vec![entry("k", Value::Str("v".to_owned()))]);
    }

    #[test]
    fn test_scan_skips_malformed_entry_and_recovers() {
        // First entry has an unquoted key; the second parses fine.
        let got = scan_entries(r#"{broken:1,"good":2"#);
        assert_eq!(got, vec![entry("good", Value::Int(2))]);
    }

    #[test]
    fn test_scan_string_escapes() {
        let got = scan_entries(r#"{"k":"a\"b\\c\n\t""#);
        assert_eq!(got, vec![entry("k", Value::Str("a\"b\\c\n\t".to_owned()))]);
    }

    #[test]
    fn test_scan_unicode_escape_and_surrogate_pair() {
        let got = scan_entries("{\"k\":\"\\u00e9\\ud834\\udd1e\"");
        assert_eq!(got, vec![entry("k", Value::Str("é𝄞".to_owned()))]);
    }

    #[test]
    fn test_scan_lone_surrogate_becomes_replacement() {
        let got = scan_entries(r#"{"k":"\ud834x""#);
        assert_eq!(got, vec![entry("k", Value::Str("\u{FFFD}x".to_owned()))]);
    }

    #[test]
    fn test_scan_empty_and_garbage_only() {
        assert!(scan_entries("").is_empty());
        assert!(scan_entries("}}]]").is_empty());
        assert!(scan_entries("no braces at all").is_empty());
    }

    #[test]
    fn test_number_token_with_trailing_sign_kept_raw() {
        let got = scan_entries(r#"{"k":12+"#);
        assert_eq!(got, vec![entry("k", Value::Str("12+".to_owned()))]);
    }
}
