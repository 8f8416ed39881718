//! XLSX export pipeline.
//!
//! Builds a brand-new single-sheet workbook from a [`Document`]. Nothing from
//! the uploaded file (styles, other sheets, formulas) is carried over.

pub(crate) mod package;
pub(crate) mod sheet_writer;

use tracing::debug;

use crate::document::Document;
use crate::error::Result;

/// Save a document as XLSX bytes under `sheet_name`.
pub fn write_xlsx(document: &Document, sheet_name: &str) -> Result<Vec<u8>> {
    let bytes = package::write_package(document, sheet_name)?;
    debug!(sheet = sheet_name, bytes = bytes.len(), "xlsx written");
    Ok(bytes)
}
