//! Message URL-encoding.
//!
//! Matches `encodeURIComponent`: everything except ASCII alphanumerics and
//! `- _ . ! ~ * ( )` is percent-encoded as UTF-8 with uppercase hex. The
//! apostrophe, which `encodeURIComponent` leaves alone, is encoded as `%27`
//! and the double quote as `%22`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped.
const MESSAGE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a message for inclusion in a URL query.
#[must_use]
pub fn encode_message(message: &str) -> String {
    utf8_percent_encode(message, MESSAGE_SET).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Hello, World!", "Hello%2C%20World%21" ; "basic punctuation")]
    #[test_case("it's", "it%27s" ; "apostrophe")]
    #[test_case("say \"hi\"", "say%20%22hi%22" ; "double quotes")]
    #[test_case("a-b_c.d~e*f(g)", "a-b_c.d~e*f(g)" ; "unreserved marks")]
    #[test_case("50% off & more", "50%25%20off%20%26%20more" ; "percent and ampersand")]
    #[test_case("a+b=c/d?e#f", "a%2Bb%3Dc%2Fd%3Fe%23f" ; "reserved characters")]
    #[test_case("line1\nline2", "line1%0Aline2" ; "newline")]
    #[test_case("€5", "%E2%82%AC5" ; "euro sign")]
    #[test_case("日本", "%E6%97%A5%E6%9C%AC" ; "cjk")]
    #[test_case("😀", "%F0%9F%98%80" ; "emoji")]
    fn test_encode_message(input: &str, expected: &str) {
        assert_eq!(encode_message(input), expected);
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode_message(""), "");
    }
}
