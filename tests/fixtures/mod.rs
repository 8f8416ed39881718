//! Test fixtures for generating XLSX files in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! let xlsx = XlsxBuilder::new()
//!     .add_sheet("Contacts")
//!     .add_cell("A1", "Banner")
//!     .add_cell("C3", "Hello")
//!     .build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Value for a fixture cell.
#[derive(Debug, Clone)]
pub enum FixtureValue {
    /// Stored in the shared string table (`t="s"`).
    Shared(String),
    /// Stored inline (`t="inlineStr"`).
    Inline(String),
    Number(f64),
    Bool(bool),
    /// Raw `<c>` element, written as-is.
    Raw(String),
}

impl From<&str> for FixtureValue {
    fn from(s: &str) -> Self {
        Self::Shared(s.to_string())
    }
}

impl From<f64> for FixtureValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FixtureValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[derive(Debug, Default)]
struct FixtureSheet {
    name: String,
    dimension: Option<String>,
    cells: Vec<(String, FixtureValue)>,
}

/// Builder for small workbooks. Cells must be added in row-major order.
#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<FixtureSheet>,
    /// Write the sheets in reverse ZIP part order (sheet1.xml is the last sheet).
    reverse_parts: bool,
    omit_workbook: bool,
}

impl XlsxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(mut self, name: &str) -> Self {
        self.sheets.push(FixtureSheet {
            name: name.to_string(),
            ..FixtureSheet::default()
        });
        self
    }

    pub fn dimension(mut self, range: &str) -> Self {
        self.current().dimension = Some(range.to_string());
        self
    }

    pub fn add_cell(mut self, cell_ref: &str, value: impl Into<FixtureValue>) -> Self {
        self.current().cells.push((cell_ref.to_string(), value.into()));
        self
    }

    pub fn add_inline(mut self, cell_ref: &str, text: &str) -> Self {
        self.current()
            .cells
            .push((cell_ref.to_string(), FixtureValue::Inline(text.to_string())));
        self
    }

    pub fn add_raw(mut self, cell_ref: &str, element: &str) -> Self {
        self.current()
            .cells
            .push((cell_ref.to_string(), FixtureValue::Raw(element.to_string())));
        self
    }

    pub fn reverse_parts(mut self) -> Self {
        self.reverse_parts = true;
        self
    }

    pub fn omit_workbook(mut self) -> Self {
        self.omit_workbook = true;
        self
    }

    fn current(&mut self) -> &mut FixtureSheet {
        if self.sheets.is_empty() {
            self.sheets.push(FixtureSheet {
                name: "Sheet1".to_string(),
                ..FixtureSheet::default()
            });
        }
        self.sheets.last_mut().unwrap()
    }

    pub fn build(mut self) -> Vec<u8> {
        self.current();
        let mut shared: Vec<String> = Vec::new();
        let sheet_xmls: Vec<String> = self
            .sheets
            .iter()
            .map(|s| sheet_xml(s, &mut shared))
            .collect();

        let count = self.sheets.len();
        let part_for = |idx: usize| {
            if self.reverse_parts {
                count - idx
            } else {
                idx + 1
            }
        };

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            let mut content_types = String::from(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
"#,
            );
            for idx in 0..count {
                content_types.push_str(&format!(
                    "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\n",
                    part_for(idx)
                ));
            }
            content_types.push_str("</Types>");
            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(content_types.as_bytes()).unwrap();

            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(
                br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
            )
            .unwrap();

            if !self.omit_workbook {
                let mut workbook = String::from(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
"#,
                );
                for (idx, sheet) in self.sheets.iter().enumerate() {
                    workbook.push_str(&format!(
                        "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>\n",
                        sheet.name,
                        idx + 1,
                        idx + 10
                    ));
                }
                workbook.push_str("</sheets>\n</workbook>");
                zip.start_file("xl/workbook.xml", options).unwrap();
                zip.write_all(workbook.as_bytes()).unwrap();
            }

            let mut rels = String::from(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
            );
            for idx in 0..count {
                rels.push_str(&format!(
                    "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{}.xml\"/>\n",
                    idx + 10,
                    part_for(idx)
                ));
            }
            rels.push_str("<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings\" Target=\"sharedStrings.xml\"/>\n");
            rels.push_str("</Relationships>");
            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(rels.as_bytes()).unwrap();

            let mut sst = format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<sst xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" count=\"{0}\" uniqueCount=\"{0}\">",
                shared.len()
            );
            for s in &shared {
                sst.push_str(&format!("<si><t xml:space=\"preserve\">{}</t></si>", escape(s)));
            }
            sst.push_str("</sst>");
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(sst.as_bytes()).unwrap();

            for (idx, xml) in sheet_xmls.iter().enumerate() {
                zip.start_file(format!("xl/worksheets/sheet{}.xml", part_for(idx)), options)
                    .unwrap();
                zip.write_all(xml.as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buffer.into_inner()
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn row_number(cell_ref: &str) -> u32 {
    cell_ref
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap()
}

fn sheet_xml(sheet: &FixtureSheet, shared: &mut Vec<String>) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
"#,
    );
    if let Some(ref dim) = sheet.dimension {
        out.push_str(&format!("<dimension ref=\"{dim}\"/>\n"));
    }
    out.push_str("<sheetData>\n");

    let mut current_row: Option<u32> = None;
    for (cell_ref, value) in &sheet.cells {
        let row = row_number(cell_ref);
        if current_row != Some(row) {
            if current_row.is_some() {
                out.push_str("</row>\n");
            }
            out.push_str(&format!("<row r=\"{row}\">"));
            current_row = Some(row);
        }
        match value {
            FixtureValue::Shared(s) => {
                let idx = shared.iter().position(|x| x == s).unwrap_or_else(|| {
                    shared.push(s.clone());
                    shared.len() - 1
                });
                out.push_str(&format!("<c r=\"{cell_ref}\" t=\"s\"><v>{idx}</v></c>"));
            }
            FixtureValue::Inline(s) => {
                out.push_str(&format!(
                    "<c r=\"{cell_ref}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                    escape(s)
                ));
            }
            FixtureValue::Number(n) => {
                out.push_str(&format!("<c r=\"{cell_ref}\"><v>{n}</v></c>"));
            }
            FixtureValue::Bool(b) => {
                out.push_str(&format!(
                    "<c r=\"{cell_ref}\" t=\"b\"><v>{}</v></c>",
                    u8::from(*b)
                ));
            }
            FixtureValue::Raw(element) => out.push_str(element),
        }
    }
    if current_row.is_some() {
        out.push_str("</row>\n");
    }
    out.push_str("</sheetData>\n</worksheet>");
    out
}
