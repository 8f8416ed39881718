//! Structured error types for xlencode.

/// All errors that can occur while reading, transforming or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum XlencodeError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// CSV reading or writing error.
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required package part is missing (e.g. `xl/workbook.xml`).
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// The upload is a spreadsheet format that cannot be read (e.g. legacy `.xls`).
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(&'static str),

    /// The workbook declares no worksheets.
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// Text that is not valid UTF-8.
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlencodeError>;

impl From<String> for XlencodeError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for XlencodeError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<XlencodeError> for wasm_bindgen::JsValue {
    fn from(e: XlencodeError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
