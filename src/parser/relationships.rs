//! Package-level parts: workbook relationships, sheet list, shared strings.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, XlencodeError};
use crate::xml_helpers::{attr_string, attr_string_local, decode_ooxml_escapes};

use super::worksheet::SheetInfo;

const WORKBOOK_PATH: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";
const DEFAULT_SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// Workbook relationships parsed from xl/_rels/workbook.xml.rels
///
/// Paths are resolved relative to the xl/ directory and stored as full paths.
#[derive(Default, Debug)]
pub(super) struct WorkbookRelationships {
    /// Map of rId -> full path for worksheet relationships
    /// e.g., "rId1" -> "xl/worksheets/sheet1.xml"
    pub worksheets: HashMap<String, String>,
    /// Path to shared strings file (e.g., "xl/sharedStrings.xml")
    pub shared_strings: Option<String>,
}

/// Resolve a relationship target against the xl/ directory.
fn resolve_target(target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else {
        format!("xl/{target}")
    }
}

/// Parse workbook relationships from xl/_rels/workbook.xml.rels
pub(super) fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> WorkbookRelationships {
    let mut rels = WorkbookRelationships::default();

    let Ok(file) = archive.by_name(WORKBOOK_RELS_PATH) else {
        debug!("no workbook relationships part");
        return rels; // Relationships file is optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let id = attr_string(e, b"Id").unwrap_or_default();
                    let target = attr_string(e, b"Target").unwrap_or_default();
                    let rel_type = attr_string(e, b"Type").unwrap_or_default();

                    if !target.is_empty() {
                        let full_path = resolve_target(&target);
                        if rel_type.ends_with("/worksheet") && !id.is_empty() {
                            rels.worksheets.insert(id, full_path);
                        } else if rel_type.ends_with("/sharedStrings") {
                            rels.shared_strings = Some(full_path);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "malformed workbook relationships, using what was read");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    rels
}

/// Sheet names and paths from xl/workbook.xml, in workbook order.
pub(super) fn get_sheet_info<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<Vec<SheetInfo>> {
    let file = archive.by_name(WORKBOOK_PATH).map_err(|e| match e {
        ZipError::FileNotFound => XlencodeError::MissingPart(WORKBOOK_PATH.to_string()),
        other => XlencodeError::Zip(other),
    })?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut sheets = Vec::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) => {
                if e.local_name().as_ref() == b"sheet" {
                    let name = attr_string(e, b"name").unwrap_or_default();
                    let r_id = attr_string_local(e, b"id").unwrap_or_default();

                    if !name.is_empty() {
                        // Fall back to the conventional path when the rId is unknown
                        let path = relationships.get(&r_id).cloned().unwrap_or_else(|| {
                            let idx = sheets.len() + 1;
                            format!("xl/worksheets/sheet{idx}.xml")
                        });
                        sheets.push(SheetInfo { name, path });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(count = sheets.len(), "workbook sheets");
    Ok(sheets)
}

/// Parse the shared string table. Rich text runs are concatenated and
/// phonetic guides (`<rPh>`) are skipped.
pub(super) fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<Vec<String>> {
    let sst_path = path.unwrap_or(DEFAULT_SHARED_STRINGS_PATH);
    let Ok(file) = archive.by_name(sst_path) else {
        return Ok(Vec::new()); // SharedStrings is optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current_string = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_rph = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current_string.clear();
                }
                b"rPh" => in_rph = true,
                b"t" if in_si && !in_rph => in_t = true,
                _ => {}
            },
            Event::Empty(ref e) => {
                // <si/> and <si><t/></si> are empty strings
                if e.local_name().as_ref() == b"si" {
                    strings.push(String::new());
                }
            }
            Event::Text(ref e) if in_t => {
                current_string.push_str(&e.unescape()?);
            }
            Event::CData(ref e) if in_t => {
                current_string.push_str(std::str::from_utf8(e)?);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(decode_ooxml_escapes(&current_string));
                    in_si = false;
                }
                b"rPh" => in_rph = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(count = strings.len(), "shared strings");
    Ok(strings)
}
