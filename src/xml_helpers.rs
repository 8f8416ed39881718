//! Shared XML helpers for reading and writing SpreadsheetML parts.
//!
//! Attribute lookups handle entity unescaping and UTF-8 conversion safely;
//! malformed attributes are skipped rather than failing the whole part.

use quick_xml::events::BytesStart;

/// Extract an attribute value by its exact (possibly prefixed) key.
///
/// Returns `None` if the attribute is missing or cannot be unescaped.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return attr.unescape_value().ok().map(|s| s.into_owned());
        }
    }
    None
}

/// Extract an attribute by local name (ignoring namespace prefix).
///
/// Used for `r:id`, whose prefix varies between producers.
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return attr.unescape_value().ok().map(|s| s.into_owned());
        }
    }
    None
}

/// Escape text for use in XML content or a double-quoted attribute.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters other than tab/LF/CR are not legal XML 1.0.
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {
                out.push_str(&format!("_x{:04X}_", u32::from(c)));
            }
            _ => out.push(c),
        }
    }
    out
}

/// Decode the `_xHHHH_` escapes SpreadsheetML uses for characters XML cannot hold.
pub fn decode_ooxml_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);
        let decoded = tail
            .get(2..6)
            .filter(|_| tail.get(6..7) == Some("_"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match (decoded, tail.get(7..)) {
            (Some(c), Some(after)) => {
                out.push(c);
                rest = after;
            }
            _ => {
                out.push_str("_x");
                rest = tail.get(2..).unwrap_or("");
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn make_start(xml: &str) -> BytesStart<'_> {
        // Strip < and > / /> to get just the tag content
        let content = xml
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim_end_matches('/')
            .trim_end();
        BytesStart::from_content(content, content.find(' ').unwrap_or(content.len()))
    }

    #[test]
    fn test_attr_string() {
        let e = make_start(r#"<sheet name="Q1 &amp; Q2" sheetId="1" />"#);
        assert_eq!(attr_string(&e, b"name"), Some("Q1 & Q2".to_string()));
        assert_eq!(attr_string(&e, b"missing"), None);
    }

    #[test]
    fn test_attr_string_local() {
        let e = make_start(r#"<sheet name="S" r:id="rId3" />"#);
        assert_eq!(attr_string_local(&e, b"id"), Some("rId3".to_string()));
        assert_eq!(attr_string(&e, b"id"), None);
        assert_eq!(attr_string(&e, b"r:id"), Some("rId3".to_string()));
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(
            xml_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
        );
        assert_eq!(xml_escape("tab\tline\n"), "tab\tline\n");
        assert_eq!(xml_escape("bell\u{7}"), "bell_x0007_");
    }

    #[test]
    fn test_decode_ooxml_escapes() {
        assert_eq!(decode_ooxml_escapes("line_x000D_\nnext"), "line\r\nnext");
        assert_eq!(decode_ooxml_escapes("bell_x0007_"), "bell\u{7}");
        assert_eq!(decode_ooxml_escapes("my_xvar"), "my_xvar");
        assert_eq!(decode_ooxml_escapes("_x00"), "_x00");
        assert_eq!(decode_ooxml_escapes("plain"), "plain");
    }
}
