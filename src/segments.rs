//! SMS segment estimation.
//!
//! Text made entirely of GSM 03.38 characters goes out in the 7-bit
//! alphabet (160 characters, or 153 per part once concatenated). Anything
//! else forces UCS-2 (70, or 67 per part).
//!
//! The extension table characters (`^ { } \ [ ~ ] | €` and form feed) cost
//! two septets on a real network. They are counted here as ordinary
//! single-cost members.

use serde::Serialize;

/// GSM 03.38 basic character set, minus the escape code.
const GSM7_BASIC: &str = "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?\
¡ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà";

/// GSM 03.38 extension table (reached through the escape code).
const GSM7_EXTENSION: &str = "\u{000C}^{}\\[~]|€";

/// Character set a message would be sent in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// GSM 7-bit default alphabet.
    Gsm7,
    /// UCS-2, used as soon as one character falls outside GSM 7-bit.
    Ucs2,
}

impl Encoding {
    /// Capacity of a message that fits in one segment.
    #[must_use]
    pub const fn single_capacity(self) -> usize {
        match self {
            Self::Gsm7 => 160,
            Self::Ucs2 => 70,
        }
    }

    /// Capacity of each part of a concatenated message (the UDH eats the rest).
    #[must_use]
    pub const fn concatenated_capacity(self) -> usize {
        match self {
            Self::Gsm7 => 153,
            Self::Ucs2 => 67,
        }
    }
}

/// Full breakdown of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentEstimate {
    pub encoding: Encoding,
    /// Length in UTF-16 code units.
    pub length: usize,
    pub segments: u32,
}

/// Whether `ch` belongs to the GSM 7-bit alphabet (basic or extension table).
#[must_use]
pub fn is_gsm7_char(ch: char) -> bool {
    GSM7_BASIC.contains(ch) || GSM7_EXTENSION.contains(ch)
}

/// Classify `text`. Stops at the first character outside GSM 7-bit.
#[must_use]
pub fn classify(text: &str) -> Encoding {
    if text.chars().all(is_gsm7_char) {
        Encoding::Gsm7
    } else {
        Encoding::Ucs2
    }
}

/// Number of segments `text` occupies. Always at least 1.
#[must_use]
pub fn estimate(text: &str) -> u32 {
    analyze(text).segments
}

/// Classify `text` and count its segments.
#[must_use]
pub fn analyze(text: &str) -> SegmentEstimate {
    let encoding = classify(text);
    // Handsets and the browser both count UTF-16 units, so astral
    // characters (emoji) take two positions.
    let length = text.encode_utf16().count();

    let segments = if length <= encoding.single_capacity() {
        1
    } else {
        length.div_ceil(encoding.concatenated_capacity())
    };

    SegmentEstimate {
        encoding,
        length,
        segments: u32::try_from(segments).unwrap_or(u32::MAX),
    }
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
    use test_case::test_case;

    #[test]
    fn test_alphabet_sizes() {
        assert_eq!(GSM7_BASIC.chars().count(), 127);
        assert_eq!(GSM7_EXTENSION.chars().count(), 10);
    }

    #[test]
    fn test_empty_is_one_segment() {
        assert_eq!(estimate(""), 1);
        assert_eq!(classify(""), Encoding::Gsm7);
    }

    #[test]
    fn test_hello_world() {
        let est = analyze("Hello, World!");
        assert_eq!(est.encoding, Encoding::Gsm7);
        assert_eq!(est.length, 13);
        assert_eq!(est.segments, 1);
    }

    #[test_case(1, 1 ; "one char")]
    #[test_case(160, 1 ; "single segment limit")]
    #[test_case(161, 2 ; "just over")]
    #[test_case(200, 2 ; "two hundred")]
    #[test_case(306, 2 ; "two full parts")]
    #[test_case(307, 3 ; "third part")]
    #[test_case(459, 3 ; "three full parts")]
    fn test_gsm7_lengths(len: usize, expected: u32) {
        let text = "a".repeat(len);
        assert_eq!(estimate(&text), expected);
    }

    #[test_case(1, 1 ; "one char")]
    #[test_case(70, 1 ; "single segment limit")]
    #[test_case(71, 2 ; "just over")]
    #[test_case(134, 2 ; "two full parts")]
    #[test_case(135, 3 ; "third part")]
    fn test_ucs2_lengths(len: usize, expected: u32) {
        // One non-GSM character, padded with GSM letters.
        let text = format!("Ж{}", "a".repeat(len - 1));
        assert_eq!(classify(&text), Encoding::Ucs2);
        assert_eq!(estimate(&text), expected);
    }

    #[test]
    fn test_extension_chars_are_gsm7() {
        for ch in "^{}\\[~]|€\u{000C}".chars() {
            assert!(is_gsm7_char(ch), "{ch:?} should be GSM 7-bit");
        }
        // Euro plus 75 compact characters: 76 long, still one segment.
        let text = format!("€{}", "b".repeat(75));
        let est = analyze(&text);
        assert_eq!(est.encoding, Encoding::Gsm7);
        assert_eq!(est.length, 76);
        assert_eq!(est.segments, 1);
    }

    #[test]
    fn test_extension_chars_single_cost() {
        // 160 euro signs would be 320 septets on the wire; counted as 160 here.
        assert_eq!(estimate(&"€".repeat(160)), 1);
    }

    #[test_case('ç' ; "lowercase c cedilla")]
    #[test_case('á' ; "a acute")]
    #[test_case('`' ; "backtick")]
    #[test_case('\t' ; "tab")]
    #[test_case('😀' ; "emoji")]
    fn test_non_gsm_chars(ch: char) {
        assert!(!is_gsm7_char(ch));
        assert_eq!(classify(&format!("abc{ch}")), Encoding::Ucs2);
    }

    #[test]
    fn test_emoji_counts_two_units() {
        let text = "😀".repeat(35);
        let est = analyze(&text);
        assert_eq!(est.length, 70);
        assert_eq!(est.segments, 1);
        let est = analyze(&"😀".repeat(36));
        assert_eq!(est.length, 72);
        assert_eq!(est.segments, 2);
    }

    #[test]
    fn test_classification_order_independent() {
        let a = "Привет, world";
        let b: String = a.chars().rev().collect();
        assert_eq!(classify(a), classify(&b));
        let c = "world, hello";
        let d: String = c.chars().rev().collect();
        assert_eq!(classify(c), classify(&d));
    }

    #[test]
    fn test_no_normalization() {
        // Surrounding whitespace counts toward length.
        let text = format!("  {}  ", "x".repeat(157));
        assert_eq!(analyze(&text).length, 161);
        assert_eq!(estimate(&text), 2);
    }
}
