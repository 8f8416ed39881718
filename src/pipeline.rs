//! End-to-end processing of an uploaded file.
//!
//! Bytes and the original file name go in; either a "no message data"
//! outcome or the encoded file comes out. No I/O happens here: the browser
//! adapter and the CLI do the reading and the delivering.

use serde::Serialize;
use tracing::info;

use crate::delimited::{parse_csv, write_csv};
use crate::document::Document;
use crate::error::{Result, XlencodeError};
use crate::export::write_xlsx;
use crate::parser;
use crate::transform::{derive_sheet_name, transform, TransformOutcome};

/// Local file header signature every ZIP (and so every XLSX) starts with.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE compound document signature of legacy `.xls` workbooks.
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Container format of the input, reused for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Xlsx,
    Csv,
}

impl Container {
    /// Sniff the container from the leading bytes.
    #[must_use]
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(ZIP_MAGIC) {
            Self::Xlsx
        } else {
            Self::Csv
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Xlsx => "application/octet-stream",
            Self::Csv => "text/csv",
        }
    }
}

/// The downloadable result of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedFile {
    /// Suggested download name, `<sheet name>.<extension>`.
    pub file_name: String,
    pub sheet_name: String,
    pub container: Container,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub data_rows: usize,
    pub encoded_rows: usize,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The message column is empty everywhere. Nothing to download.
    NoMessageData,
    Processed(EncodedFile),
}

/// Read a document in either container format.
///
/// Legacy binary workbooks are rejected rather than read as text.
pub fn read_document(data: &[u8]) -> Result<(Container, Document)> {
    if data.starts_with(OLE_MAGIC) {
        return Err(XlencodeError::UnsupportedFormat(
            "legacy .xls workbook, save it as .xlsx",
        ));
    }
    let container = Container::detect(data);
    let document = match container {
        Container::Xlsx => parser::parse(data)?.document,
        Container::Csv => parse_csv(data)?,
    };
    Ok((container, document))
}

/// Serialize a document in the given container format.
pub fn write_document(
    document: &Document,
    container: Container,
    sheet_name: &str,
) -> Result<Vec<u8>> {
    match container {
        Container::Xlsx => write_xlsx(document, sheet_name),
        Container::Csv => write_csv(document),
    }
}

/// Read, transform and re-serialize an uploaded file.
pub fn process(data: &[u8], file_name: &str) -> Result<Outcome> {
    let (container, mut document) = read_document(data)?;

    let TransformOutcome::Transformed {
        data_rows,
        encoded_rows,
    } = transform(&mut document)
    else {
        info!(file = file_name, "no message data to encode");
        return Ok(Outcome::NoMessageData);
    };

    let sheet_name = derive_sheet_name(file_name);
    let bytes = write_document(&document, container, &sheet_name)?;
    let output_name = format!("{sheet_name}.{}", container.extension());
    info!(
        file = file_name,
        output = %output_name,
        data_rows,
        encoded_rows,
        "file processed"
    );

    Ok(Outcome::Processed(EncodedFile {
        file_name: output_name,
        sheet_name,
        container,
        bytes,
        data_rows,
        encoded_rows,
    }))
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
    use crate::document::CellValue;

    #[test]
    fn test_detect() {
        assert_eq!(Container::detect(b"PK\x03\x04rest"), Container::Xlsx);
        assert_eq!(Container::detect(b"a,b,c"), Container::Csv);
        assert_eq!(Container::detect(b""), Container::Csv);
    }

    #[test]
    fn test_process_csv() {
        let data = b"Banner\nName,Phone,Message\nAnn,+1,Hi there\n";
        let Outcome::Processed(file) = process(data, "list.csv").unwrap() else {
            panic!("expected processed outcome");
        };
        assert_eq!(file.file_name, "Encoded-list.csv");
        assert_eq!(file.container, Container::Csv);
        assert_eq!(file.data_rows, 1);
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(
            text,
            "Banner,,,,\nName,Phone,Message,Encoded Message,SMS Length (PDU)\nAnn,+1,Hi there,Hi%20there,1\n"
        );
    }

    #[test]
    fn test_process_no_data() {
        let data = b"Banner\nName,Phone\nAnn,+1\n";
        assert!(matches!(
            process(data, "list.csv").unwrap(),
            Outcome::NoMessageData
        ));
    }

    #[test]
    fn test_process_xlsx_roundtrip() {
        let doc = Document::new(vec![
            vec![CellValue::from("Banner")],
            vec![
                CellValue::from("Name"),
                CellValue::from("Phone"),
                CellValue::from("Message"),
            ],
            vec![
                CellValue::from("Ann"),
                CellValue::from("+1"),
                CellValue::from("Hello, World!"),
            ],
        ]);
        let input = write_xlsx(&doc, "Sheet1").unwrap();
        let Outcome::Processed(file) = process(&input, "contacts.xlsx").unwrap() else {
            panic!("expected processed outcome");
        };
        assert_eq!(file.file_name, "Encoded-contacts.xlsx");
        assert_eq!(file.sheet_name, "Encoded-contacts");

        let parsed = parser::parse(&file.bytes).unwrap();
        assert_eq!(parsed.name, "Encoded-contacts");
        assert_eq!(
            parsed.document.rows[2][3],
            CellValue::from("Hello%2C%20World%21")
        );
        assert_eq!(parsed.document.rows[2][4], CellValue::Number(1.0));
    }

    #[test]
    fn test_legacy_xls_rejected() {
        let mut data = OLE_MAGIC.to_vec();
        data.extend_from_slice(b"Message,text\n\x00\x00");
        let err = process(&data, "old.xls").unwrap_err();
        assert!(matches!(err, XlencodeError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_csv_blank_banner_line() {
        let data = b"\nName,Phone,Message\nAnn,+1,Hi there\n";
        let Outcome::Processed(file) = process(data, "l.csv").unwrap() else {
            panic!("expected processed outcome");
        };
        assert_eq!(file.encoded_rows, 1);
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(
            text,
            ",,,,\nName,Phone,Message,Encoded Message,SMS Length (PDU)\nAnn,+1,Hi there,Hi%20there,1\n"
        );
    }

    #[test]
    fn test_process_bad_zip() {
        assert!(process(b"PK\x03\x04garbage", "x.xlsx").is_err());
    }
}
