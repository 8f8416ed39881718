//! CSV reading and writing for documents.
//!
//! Fields that print back identically as numbers become numbers (so `+1555`
//! and `007` stay text), `TRUE`/`FALSE` become booleans, empty fields are
//! empty cells. Blank lines are empty rows.

use crate::document::{CellValue, Document};
use crate::error::{Result, XlencodeError};

/// Parse CSV bytes into a document. Rows may have different widths.
///
/// Blank lines are kept as empty rows so row positions match the file.
/// Fields must be valid UTF-8.
pub(crate) fn parse_csv(data: &[u8]) -> Result<Document> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let start = record
            .position()
            .and_then(|p| usize::try_from(p.byte()).ok())
            .unwrap_or(0);
        for _ in 0..blank_lines_before(data, start) {
            rows.push(Vec::new());
        }

        let mut row = record
            .iter()
            .map(|field| std::str::from_utf8(field).map(detect_value))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        while row.last() == Some(&CellValue::Empty) {
            row.pop();
        }
        rows.push(row);
    }

    Ok(Document::new(rows))
}

/// Line breaks between `start` and the next record, which the reader skips.
fn blank_lines_before(data: &[u8], start: usize) -> usize {
    let mut rest = data.get(start..).unwrap_or_default();
    // The reader stops after the `\r` of a CRLF; its `\n` still ends the previous record.
    if start > 0 && data.get(start - 1) == Some(&b'\r') {
        if let Some(tail) = rest.strip_prefix(b"\n") {
            rest = tail;
        }
    }

    let mut count = 0;
    loop {
        let tail = rest
            .strip_prefix(b"\r\n")
            .or_else(|| rest.strip_prefix(b"\n"))
            .or_else(|| rest.strip_prefix(b"\r"));
        let Some(tail) = tail else {
            break;
        };
        rest = tail;
        count += 1;
    }
    count
}

fn detect_value(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    if field.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    match field.parse::<f64>() {
        Ok(n) if n.is_finite() && CellValue::Number(n).to_text() == field => {
            CellValue::Number(n)
        }
        _ => CellValue::Text(field.to_string()),
    }
}

/// Write a document as CSV. Every row is padded to the widest row.
pub(crate) fn write_csv(document: &Document) -> Result<Vec<u8>> {
    let width = document.max_width();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for row in &document.rows {
        let mut fields: Vec<String> = row.iter().map(CellValue::to_text).collect();
        fields.resize(width.max(1), String::new());
        writer.write_record(&fields)?;
    }

    writer
        .into_inner()
        .map_err(|e| XlencodeError::Io(e.into_error()))
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

    #[test]
    fn test_parse_csv_basic() {
        let data = b"Banner\nName,Phone,Message\nAlice,+1555,\"Hello, World\"\nBob,30,";
        let doc = parse_csv(data).unwrap();
        assert_eq!(doc.row_count(), 4);
        assert_eq!(doc.rows[0], vec![CellValue::from("Banner")]);
        assert_eq!(doc.rows[2][1], CellValue::from("+1555"));
        assert_eq!(doc.rows[2][2], CellValue::from("Hello, World"));
        assert_eq!(doc.rows[3], vec![CellValue::from("Bob"), CellValue::Number(30.0)]);
    }

    #[test]
    fn test_detect_value() {
        assert_eq!(detect_value("42"), CellValue::Number(42.0));
        assert_eq!(detect_value("-1.5"), CellValue::Number(-1.5));
        assert_eq!(detect_value("007"), CellValue::from("007"));
        assert_eq!(detect_value("1e3"), CellValue::from("1e3"));
        assert_eq!(detect_value("NaN"), CellValue::from("NaN"));
        assert_eq!(detect_value("TRUE"), CellValue::Bool(true));
        assert_eq!(detect_value("false"), CellValue::Bool(false));
        assert_eq!(detect_value(" 5"), CellValue::from(" 5"));
    }

    #[test]
    fn test_quoted_fields() {
        let data = b"\"She said \"\"hi\"\"\",0";
        let doc = parse_csv(data).unwrap();
        assert_eq!(doc.rows[0][0], CellValue::from("She said \"hi\""));
        assert_eq!(doc.rows[0][1], CellValue::Number(0.0));
    }

    #[test]
    fn test_blank_lines_kept() {
        let data = b"\nName,Phone,Message\n\nAnn,+1,Hi there\n";
        let doc = parse_csv(data).unwrap();
        assert_eq!(doc.row_count(), 4);
        assert!(doc.rows[0].is_empty());
        assert_eq!(doc.rows[1][2], CellValue::from("Message"));
        assert!(doc.rows[2].is_empty());
        assert_eq!(doc.rows[3][2], CellValue::from("Hi there"));
    }

    #[test]
    fn test_blank_lines_crlf() {
        let data = b"\r\nName,Phone,Message\r\n\r\n\r\nAnn,+1,Hi\r\nBob,+2,Yo\r\n";
        let doc = parse_csv(data).unwrap();
        assert_eq!(doc.row_count(), 6);
        assert!(doc.rows[0].is_empty());
        assert_eq!(doc.rows[1][0], CellValue::from("Name"));
        assert!(doc.rows[2].is_empty());
        assert!(doc.rows[3].is_empty());
        assert_eq!(doc.rows[4][2], CellValue::from("Hi"));
        assert_eq!(doc.rows[5][2], CellValue::from("Yo"));
    }

    #[test]
    fn test_quoted_newline_is_not_a_blank_line() {
        let data = b"Banner\n\"two\n\nlines\",x\nnext\n";
        let doc = parse_csv(data).unwrap();
        assert_eq!(doc.row_count(), 3);
        assert_eq!(doc.rows[1][0], CellValue::from("two\n\nlines"));
        assert_eq!(doc.rows[2][0], CellValue::from("next"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = parse_csv(b"Name,Caf\xe9\n").unwrap_err();
        assert!(matches!(err, XlencodeError::Utf8(_)));
    }

    #[test]
    fn test_write_csv() {
        let doc = Document::new(vec![
            vec![CellValue::from("Banner")],
            vec![
                CellValue::from("a,b"),
                CellValue::Number(2.0),
                CellValue::Bool(true),
            ],
        ]);
        let out = String::from_utf8(write_csv(&doc).unwrap()).unwrap();
        assert_eq!(out, "Banner,,\n\"a,b\",2,true\n");
    }

    #[test]
    fn test_write_then_parse() {
        let doc = Document::new(vec![
            vec![CellValue::from("x")],
            vec![CellValue::from("line\nbreak"), CellValue::Number(7.0)],
        ]);
        let bytes = write_csv(&doc).unwrap();
        let back = parse_csv(&bytes).unwrap();
        assert_eq!(back, doc);
    }
}
