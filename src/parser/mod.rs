//! XLSX reader
//!
//! Opens the ZIP package and reads the first worksheet into a [`Document`].
//! Styles, themes, drawings and every sheet after the first are ignored.

mod relationships;
mod worksheet;

use std::io::Cursor;
use tracing::debug;
use zip::ZipArchive;

use crate::document::Document;
use crate::error::{Result, XlencodeError};

use relationships::{get_sheet_info, parse_shared_strings, parse_workbook_relationships};
use worksheet::parse_sheet;

/// First sheet of a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    /// Sheet name as declared in xl/workbook.xml.
    pub name: String,
    pub document: Document,
}

/// Parse an XLSX file from bytes, keeping only its first sheet.
pub fn parse(data: &[u8]) -> Result<ParsedSheet> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)?;

    let relationships = parse_workbook_relationships(&mut archive);
    let info = get_sheet_info(&mut archive, &relationships.worksheets)?
        .into_iter()
        .next()
        .ok_or(XlencodeError::NoSheets)?;
    debug!(sheet = %info.name, path = %info.path, "reading first sheet");

    let shared_strings =
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref())?;
    let document = parse_sheet(&mut archive, &info, &shared_strings)?;

    Ok(ParsedSheet {
        name: info.name,
        document,
    })
}
