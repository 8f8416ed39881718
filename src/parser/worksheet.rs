//! Worksheet parsing - reads one sheet's `<sheetData>` into a [`Document`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::cell_ref::{parse_cell_ref_bytes, parse_range_start};
use crate::document::{CellValue, Document};
use crate::error::{Result, XlencodeError};
use crate::xml_helpers::{attr_string, decode_ooxml_escapes};

/// Sheet metadata from workbook.xml
#[derive(Debug, Clone)]
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Date,
    Number,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        b"d" => CellTypeTag::Date,
        _ => CellTypeTag::Number,
    }
}

pub(super) fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    if seen {
        Some(num)
    } else {
        None
    }
}

/// The `<c>` currently being read.
struct PendingCell {
    row: u32,
    col: u32,
    tag: CellTypeTag,
    value: Option<String>,
    inline: Option<String>,
}

/// Turn a raw `<v>`/`<is>` payload into a cell value.
fn resolve_cell_value(
    tag: CellTypeTag,
    value: Option<&str>,
    inline: Option<&str>,
    shared_strings: &[String],
) -> CellValue {
    if tag == CellTypeTag::Inline {
        return inline.map_or(CellValue::Empty, |s| CellValue::Text(s.to_string()));
    }
    let Some(raw) = value else {
        return CellValue::Empty;
    };

    match tag {
        CellTypeTag::Shared => {
            let idx = raw.trim().parse::<usize>().ok();
            match idx.and_then(|i| shared_strings.get(i)) {
                Some(s) => CellValue::Text(s.clone()),
                None => {
                    warn!(index = raw, "shared string index out of range");
                    CellValue::Empty
                }
            }
        }
        CellTypeTag::Bool => CellValue::Bool(matches!(raw.trim(), "1" | "true" | "TRUE")),
        CellTypeTag::Number => match raw.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => {
                warn!(value = raw, "non-numeric value in number cell");
                CellValue::Text(raw.to_string())
            }
        },
        CellTypeTag::Str | CellTypeTag::Error | CellTypeTag::Date | CellTypeTag::Inline => {
            CellValue::Text(raw.to_string())
        }
    }
}

fn open_cell(e: &BytesStart, current_row: u32, next_col: u32) -> PendingCell {
    let mut row = current_row;
    let mut col = next_col;
    let mut tag = CellTypeTag::Number;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some((c, r)) = parse_cell_ref_bytes(&attr.value) {
                    col = c;
                    row = r;
                }
            }
            b"t" => tag = parse_cell_type_tag(&attr.value),
            _ => {}
        }
    }

    PendingCell {
        row,
        col,
        tag,
        value: None,
        inline: None,
    }
}

/// Parse a single worksheet into a document.
///
/// The document's (0, 0) is the start of `<dimension ref>`, or the top-left
/// used cell when the sheet has no dimension. Each row is as wide as its
/// last non-empty cell; blank rows are kept as empty rows.
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    shared_strings: &[String],
) -> Result<Document> {
    let file = archive.by_name(&info.path).map_err(|e| match e {
        ZipError::FileNotFound => XlencodeError::MissingPart(info.path.clone()),
        other => XlencodeError::Zip(other),
    })?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut buf = Vec::new();
    let mut cells: Vec<(u32, u32, CellValue)> = Vec::new();
    let mut origin: Option<(u32, u32)> = None;

    let mut current_row: u32 = 0;
    let mut next_row: u32 = 0;
    let mut next_col: u32 = 0;
    let mut pending: Option<PendingCell> = None;
    let mut in_v = false;
    let mut in_is = false;
    let mut in_is_t = false;
    let mut in_rph = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            ref event @ (Event::Start(_) | Event::Empty(_)) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"dimension" => {
                        origin = attr_string(e, b"ref").and_then(|r| parse_range_start(&r));
                    }
                    b"row" => {
                        current_row = attr_string(e, b"r")
                            .and_then(|r| parse_u32_bytes(r.as_bytes()))
                            .map_or(next_row, |r| r.saturating_sub(1));
                        next_row = current_row.saturating_add(1);
                        next_col = 0;
                    }
                    b"c" => {
                        let cell = open_cell(e, current_row, next_col);
                        next_col = cell.col.saturating_add(1);
                        if is_start {
                            pending = Some(cell);
                        }
                    }
                    b"v" if is_start && pending.is_some() => in_v = true,
                    b"is" if is_start && pending.is_some() => in_is = true,
                    b"rPh" if is_start && in_is => in_rph = true,
                    b"t" if is_start && in_is && !in_rph => in_is_t = true,
                    _ => {}
                }
            }
            Event::Text(ref text) if in_v || in_is_t => {
                let s = text.unescape()?;
                push_text(pending.as_mut(), in_v, &s);
            }
            Event::CData(ref data) if in_v || in_is_t => {
                let s = std::str::from_utf8(data)?;
                push_text(pending.as_mut(), in_v, s);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" => in_v = false,
                b"t" => in_is_t = false,
                b"rPh" => in_rph = false,
                b"is" => in_is = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        let inline = cell.inline.as_deref().map(decode_ooxml_escapes);
                        let value = resolve_cell_value(
                            cell.tag,
                            cell.value.as_deref(),
                            inline.as_deref(),
                            shared_strings,
                        );
                        if value != CellValue::Empty {
                            cells.push((cell.row, cell.col, value));
                        }
                    }
                    in_v = false;
                    in_is = false;
                    in_is_t = false;
                }
                b"sheetData" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let (origin_col, origin_row) = origin.unwrap_or_else(|| {
        let min_row = cells.iter().map(|(r, _, _)| *r).min().unwrap_or(0);
        let min_col = cells.iter().map(|(_, c, _)| *c).min().unwrap_or(0);
        (min_col, min_row)
    });

    let mut document = Document::default();
    for (row, col, value) in cells {
        if row < origin_row || col < origin_col {
            continue;
        }
        let (Ok(r), Ok(c)) = (
            usize::try_from(row - origin_row),
            usize::try_from(col - origin_col),
        ) else {
            continue;
        };
        document.set_cell(r, c, value);
    }

    debug!(
        sheet = %info.name,
        rows = document.row_count(),
        cols = document.max_width(),
        "worksheet parsed"
    );
    Ok(document)
}

fn push_text(pending: Option<&mut PendingCell>, in_v: bool, s: &str) {
    let Some(cell) = pending else {
        return;
    };
    let slot = if in_v {
        &mut cell.value
    } else {
        &mut cell.inline
    };
    slot.get_or_insert_with(String::new).push_str(s);
}
