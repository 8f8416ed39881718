//! Generates worksheet XML from a [`Document`].
//!
//! Text is written as inline strings (`t="inlineStr"`) so the package needs
//! no shared string table.

use crate::cell_ref::{cell_ref, col_to_letter};
use crate::document::{CellValue, Document};
use crate::error::Result;
use crate::xml_helpers::xml_escape;

/// Write a complete worksheet XML string from a document.
pub(crate) fn write_sheet_xml(document: &Document) -> Result<String> {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    );
    out.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    out.push('\n');

    // <dimension>
    let max_row = u32::try_from(document.row_count()).map_err(|_| "too many rows")?;
    let max_col = u32::try_from(document.max_width()).map_err(|_| "too many columns")?;
    if max_row > 0 && max_col > 0 {
        out.push_str(&format!(
            "<dimension ref=\"A1:{}{}\"/>\n",
            col_to_letter(max_col - 1),
            max_row
        ));
    } else {
        out.push_str("<dimension ref=\"A1\"/>\n");
    }

    out.push_str("<sheetData>\n");
    write_sheet_data(&mut out, document)?;
    out.push_str("</sheetData>\n");

    out.push_str("</worksheet>");
    Ok(out)
}

/// Write all rows into `<sheetData>`. Rows with no values are omitted.
fn write_sheet_data(out: &mut String, document: &Document) -> Result<()> {
    for (row_idx, row) in document.rows.iter().enumerate() {
        if row.iter().all(|v| *v == CellValue::Empty) {
            continue;
        }
        let r = u32::try_from(row_idx).map_err(|_| "too many rows")?;
        out.push_str(&format!("<row r=\"{}\">", u64::from(r) + 1));
        for (col_idx, value) in row.iter().enumerate() {
            let c = u32::try_from(col_idx).map_err(|_| "too many columns")?;
            write_cell(out, r, c, value);
        }
        out.push_str("</row>\n");
    }
    Ok(())
}

/// Write a single `<c>` element. Empty cells produce nothing.
fn write_cell(out: &mut String, row: u32, col: u32, value: &CellValue) {
    match value {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            out.push_str(&format!("<c r=\"{}\" t=\"inlineStr\"><is>", cell_ref(row, col)));
            if needs_space_preserve(s) {
                out.push_str("<t xml:space=\"preserve\">");
            } else {
                out.push_str("<t>");
            }
            out.push_str(&xml_escape(s));
            out.push_str("</t></is></c>");
        }
        CellValue::Number(n) => {
            if n.is_finite() {
                out.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", cell_ref(row, col), n));
            } else {
                // Excel has no literal for NaN/Infinity
                out.push_str(&format!(
                    "<c r=\"{}\" t=\"e\"><v>#NUM!</v></c>",
                    cell_ref(row, col)
                ));
            }
        }
        CellValue::Bool(b) => {
            out.push_str(&format!(
                "<c r=\"{}\" t=\"b\"><v>{}</v></c>",
                cell_ref(row, col),
                u8::from(*b)
            ));
        }
    }
}

fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) || s.contains('\n')
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sheet_xml() {
        let doc = Document::new(vec![
            vec![CellValue::from("Title")],
            vec![],
            vec![
                CellValue::from("a & b"),
                CellValue::Empty,
                CellValue::Number(3.0),
                CellValue::Bool(true),
                CellValue::from(" padded "),
            ],
        ]);
        let xml = write_sheet_xml(&doc).unwrap();
        assert!(xml.contains(r#"<dimension ref="A1:E3"/>"#));
        assert!(xml.contains(r#"<c r="A1" t="inlineStr"><is><t>Title</t></is></c>"#));
        assert!(!xml.contains(r#"<row r="2">"#));
        assert!(xml.contains(r#"<c r="A3" t="inlineStr"><is><t>a &amp; b</t></is></c>"#));
        assert!(!xml.contains(r#"r="B3""#));
        assert!(xml.contains(r#"<c r="C3"><v>3</v></c>"#));
        assert!(xml.contains(r#"<c r="D3" t="b"><v>1</v></c>"#));
        assert!(xml.contains(r#"<t xml:space="preserve"> padded </t>"#));
    }

    #[test]
    fn test_empty_document() {
        let xml = write_sheet_xml(&Document::default()).unwrap();
        assert!(xml.contains(r#"<dimension ref="A1"/>"#));
        assert!(xml.contains("<sheetData>\n</sheetData>"));
    }

    #[test]
    fn test_non_finite_number() {
        let doc = Document::new(vec![vec![CellValue::Number(f64::NAN)]]);
        let xml = write_sheet_xml(&doc).unwrap();
        assert!(xml.contains(r#"<c r="A1" t="e"><v>#NUM!</v></c>"#));
    }
}
