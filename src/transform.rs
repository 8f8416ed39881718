//! Row transformer: appends the encoded message and its SMS segment count
//! to every data row.
//!
//! Layout of the input sheet:
//! - row 0: banner/title, ignored
//! - row 1: header
//! - rows 2..: data, with the message in the third column

use serde::Serialize;
use tracing::{debug, info};

use crate::document::{CellValue, Document};
use crate::percent::encode_message;
use crate::segments::estimate;

pub const HEADER_ROW: usize = 1;
pub const FIRST_DATA_ROW: usize = 2;
pub const MESSAGE_COLUMN: usize = 2;
pub const ENCODED_COLUMN: usize = 3;
pub const SEGMENT_COLUMN: usize = 4;

pub const ENCODED_HEADER: &str = "Encoded Message";
pub const SEGMENT_HEADER: &str = "SMS Length (PDU)";

pub const SHEET_PREFIX: &str = "Encoded-";

/// Excel's limit on worksheet name length.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Result of running the transformer over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransformOutcome {
    /// No message cell holds anything. The document was left untouched.
    NoMessageData,
    /// The document was augmented.
    #[serde(rename_all = "camelCase")]
    Transformed {
        /// Rows from `FIRST_DATA_ROW` on.
        data_rows: usize,
        /// Data rows that had a message to encode.
        encoded_rows: usize,
    },
}

/// Whether any message cell is present.
///
/// The scan starts at the header row, so a header with a third cell passes
/// even when no data row has a message.
#[must_use]
pub fn has_message_data(doc: &Document) -> bool {
    doc.rows
        .iter()
        .skip(HEADER_ROW)
        .any(|row| row.get(MESSAGE_COLUMN).is_some_and(CellValue::is_present))
}

/// Augment `doc` in place.
pub fn transform(doc: &mut Document) -> TransformOutcome {
    if !has_message_data(doc) {
        debug!(rows = doc.row_count(), "no message data");
        return TransformOutcome::NoMessageData;
    }

    if let Some(header) = doc.rows.get_mut(HEADER_ROW) {
        // A narrow header still gets its labels above the derived columns.
        if header.len() < ENCODED_COLUMN {
            header.resize_with(ENCODED_COLUMN, CellValue::default);
        }
        header.push(CellValue::from(ENCODED_HEADER));
        header.push(CellValue::from(SEGMENT_HEADER));
    }

    let mut data_rows = 0;
    let mut encoded_rows = 0;
    for row in doc.rows.iter_mut().skip(FIRST_DATA_ROW) {
        data_rows += 1;
        let message = row.get(MESSAGE_COLUMN).and_then(CellValue::as_message);
        let (encoded, segments) = match message {
            Some(text) => {
                encoded_rows += 1;
                (encode_message(&text), estimate(&text))
            }
            None => (String::new(), 1),
        };
        set_in_row(row, ENCODED_COLUMN, CellValue::Text(encoded));
        set_in_row(row, SEGMENT_COLUMN, CellValue::from(segments));
    }

    info!(data_rows, encoded_rows, "document transformed");
    TransformOutcome::Transformed {
        data_rows,
        encoded_rows,
    }
}

fn set_in_row(row: &mut Vec<CellValue>, col: usize, value: CellValue) {
    if row.len() <= col {
        row.resize_with(col + 1, CellValue::default);
    }
    if let Some(cell) = row.get_mut(col) {
        *cell = value;
    }
}

/// Base name of an uploaded file: everything before the last `.`.
///
/// A name without any dot has an empty base.
#[must_use]
pub fn file_base_name(file_name: &str) -> &str {
    file_name.rsplit_once('.').map_or("", |(base, _)| base)
}

/// Name of the output sheet for an uploaded file.
///
/// Characters Excel rejects in sheet names are replaced with `_`, the result
/// is cut to 31 UTF-16 units and trailing apostrophes are dropped.
#[must_use]
pub fn derive_sheet_name(file_name: &str) -> String {
    let raw = format!("{SHEET_PREFIX}{}", file_base_name(file_name));
    let mut name = String::with_capacity(raw.len());
    let mut units = 0;
    for c in raw.chars() {
        units += c.len_utf16();
        if units > MAX_SHEET_NAME_LEN {
            break;
        }
        name.push(match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            _ => c,
        });
    }
    while name.ends_with('\'') {
        name.pop();
    }
    name
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn text(s: &str) -> CellValue {
        CellValue::from(s)
    }

    fn sample() -> Document {
        Document::new(vec![
            vec![text("Campaign export")],
            vec![text("Name"), text("Phone"), text("Message")],
            vec![text("Ann"), text("+100"), text("Hello, World!")],
            vec![text("Bob"), text("+200")],
            vec![text("Cy"), text("+300"), text("'quoted'")],
        ])
    }

    #[test]
    fn test_transform_sample() {
        let mut doc = sample();
        let outcome = transform(&mut doc);
        assert_eq!(
            outcome,
            TransformOutcome::Transformed {
                data_rows: 3,
                encoded_rows: 2
            }
        );

        assert_eq!(doc.rows[0], vec![text("Campaign export")]);
        assert_eq!(
            doc.rows[1],
            vec![
                text("Name"),
                text("Phone"),
                text("Message"),
                text(ENCODED_HEADER),
                text(SEGMENT_HEADER)
            ]
        );
        assert_eq!(doc.rows[2][3], text("Hello%2C%20World%21"));
        assert_eq!(doc.rows[2][4], CellValue::Number(1.0));

        // Short row is padded out to the derived columns.
        assert_eq!(doc.rows[3].len(), 5);
        assert_eq!(doc.rows[3][2], CellValue::Empty);
        assert_eq!(doc.rows[3][3], text(""));
        assert_eq!(doc.rows[3][4], CellValue::Number(1.0));

        assert_eq!(doc.rows[4][3], text("%27quoted%27"));
    }

    #[test]
    fn test_header_widens_by_two() {
        let mut doc = sample();
        let before = doc.rows[1].len();
        transform(&mut doc);
        assert_eq!(doc.rows[1].len(), before + 2);
        assert_eq!(doc.rows[1].len(), doc.max_width());
    }

    #[test]
    fn test_narrow_header_padded() {
        let mut doc = Document::new(vec![
            vec![text("Banner")],
            vec![text("Name"), text("Phone")],
            vec![text("Ann"), text("+1"), text("hi")],
        ]);
        transform(&mut doc);
        assert_eq!(
            doc.rows[1],
            vec![
                text("Name"),
                text("Phone"),
                CellValue::Empty,
                text(ENCODED_HEADER),
                text(SEGMENT_HEADER)
            ]
        );
        assert_eq!(doc.rows[1].len(), doc.max_width());
        assert_eq!(doc.rows[2][3], text("hi"));
    }

    #[test]
    fn test_long_message_segments() {
        let mut doc = sample();
        doc.rows[2][2] = text(&"x".repeat(200));
        transform(&mut doc);
        assert_eq!(doc.rows[2][4], CellValue::Number(2.0));
    }

    #[test]
    fn test_unicode_message_segments() {
        let mut doc = sample();
        doc.rows[2][2] = text(&format!("Привет {}", "a".repeat(70)));
        transform(&mut doc);
        assert_eq!(doc.rows[2][4], CellValue::Number(2.0));
    }

    #[test]
    fn test_numeric_message_is_stringified() {
        let mut doc = sample();
        doc.rows[2][2] = CellValue::Number(12345.0);
        transform(&mut doc);
        assert_eq!(doc.rows[2][3], text("12345"));
        assert_eq!(doc.rows[2][4], CellValue::Number(1.0));
    }

    #[test]
    fn test_falsy_messages_treated_as_empty() {
        let mut doc = sample();
        doc.rows[2][2] = CellValue::Number(0.0);
        doc.rows[4][2] = CellValue::Bool(false);
        doc.rows[1][2] = text("Message");
        transform(&mut doc);
        assert_eq!(doc.rows[2][3], text(""));
        assert_eq!(doc.rows[4][3], text(""));
        assert_eq!(doc.rows[4][4], CellValue::Number(1.0));
    }

    #[test]
    fn test_no_message_data_leaves_document() {
        let mut doc = Document::new(vec![
            vec![text("Banner")],
            vec![text("Name"), text("Phone")],
            vec![text("Ann"), text("+100"), text("")],
            vec![text("Bob")],
        ]);
        let before = doc.clone();
        assert_eq!(transform(&mut doc), TransformOutcome::NoMessageData);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_banner_row_not_scanned() {
        let mut doc = Document::new(vec![
            vec![text("a"), text("b"), text("banner message")],
            vec![text("Name")],
        ]);
        assert_eq!(transform(&mut doc), TransformOutcome::NoMessageData);
    }

    #[test]
    fn test_header_counts_as_message_data() {
        let mut doc = Document::new(vec![
            vec![text("Banner")],
            vec![text("Name"), text("Phone"), text("Message")],
            vec![text("Ann"), text("+100")],
        ]);
        assert_eq!(
            transform(&mut doc),
            TransformOutcome::Transformed {
                data_rows: 1,
                encoded_rows: 0
            }
        );
        assert_eq!(doc.rows[2][3], text(""));
        assert_eq!(doc.rows[2][4], CellValue::Number(1.0));
    }

    #[test]
    fn test_existing_columns_overwritten() {
        let mut doc = Document::new(vec![
            vec![],
            vec![text("Name"), text("Phone"), text("Message")],
            vec![text("Ann"), text("+1"), text("hi"), text("old"), text("old"), text("keep")],
        ]);
        transform(&mut doc);
        assert_eq!(
            doc.rows[2],
            vec![
                text("Ann"),
                text("+1"),
                text("hi"),
                text("hi"),
                CellValue::Number(1.0),
                text("keep")
            ]
        );
    }

    #[test_case("contacts.xlsx", "contacts" ; "simple")]
    #[test_case("march.final.xlsx", "march.final" ; "inner dots kept")]
    #[test_case("noext", "" ; "no extension")]
    #[test_case(".xlsx", "" ; "only extension")]
    fn test_file_base_name(name: &str, expected: &str) {
        assert_eq!(file_base_name(name), expected);
    }

    #[test_case("contacts.xlsx", "Encoded-contacts" ; "simple")]
    #[test_case("a[1]:b?.xlsx", "Encoded-a_1__b_" ; "illegal characters")]
    #[test_case("noext", "Encoded-" ; "no extension")]
    #[test_case(
        "a very long campaign file name.xlsx",
        "Encoded-a very long campaign fi" ;
        "truncated"
    )]
    #[test_case("it's'.xlsx", "Encoded-it's" ; "trailing apostrophe")]
    #[test_case("''.csv", "Encoded-" ; "only apostrophes")]
    #[test_case(
        "twenty two characters!😀.xlsx",
        "Encoded-twenty two characters!" ;
        "utf16 limit drops a split emoji"
    )]
    #[test_case("Отчёт за март.xlsx", "Encoded-Отчёт за март" ; "cyrillic fits")]
    fn test_derive_sheet_name(name: &str, expected: &str) {
        assert_eq!(derive_sheet_name(name), expected);
    }
}
