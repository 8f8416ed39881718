//! In-memory tabular document: one sheet as rows of cell values.

use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Whether the cell holds something usable as a message.
    ///
    /// Empty text, zero, NaN and `false` count as absent, like a falsy value
    /// coming out of a spreadsheet-to-array conversion.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
        }
    }

    /// Text form of the value. Whole numbers print without a fraction.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// The value as message text, or `None` when absent.
    #[must_use]
    pub fn as_message(&self) -> Option<String> {
        if self.is_present() {
            Some(self.to_text())
        } else {
            None
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Format a number the way JavaScript's `String(n)` does.
///
/// Magnitudes in `[1e-6, 1e21)` print in plain decimal; anything else uses
/// exponent notation with an explicit sign (`1e+21`, `1.5e-7`).
fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        // Display gives the shortest round-trip digits without an exponent.
        return n.to_string();
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

/// One sheet of cells. Row 0 is a banner, row 1 the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub rows: Vec<Vec<CellValue>>,
}

impl Document {
    #[must_use]
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Cell at `(row, col)`; `None` past the end of the row or sheet.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Set a cell, growing the sheet and the row with empties as needed.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        if let Some(r) = self.rows.get_mut(row) {
            if r.len() <= col {
                r.resize_with(col + 1, CellValue::default);
            }
            if let Some(cell) = r.get_mut(col) {
                *cell = value;
            }
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    #[must_use]
    pub fn max_width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
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

    #[test_case(CellValue::Empty, false ; "empty")]
    #[test_case(CellValue::Text(String::new()), false ; "empty text")]
    #[test_case(CellValue::Text(" ".into()), true ; "whitespace text")]
    #[test_case(CellValue::Text("0".into()), true ; "zero as text")]
    #[test_case(CellValue::Number(0.0), false ; "zero")]
    #[test_case(CellValue::Number(f64::NAN), false ; "nan")]
    #[test_case(CellValue::Number(-1.5), true ; "negative")]
    #[test_case(CellValue::Bool(false), false ; "false")]
    #[test_case(CellValue::Bool(true), true ; "true")]
    fn test_is_present(value: CellValue, expected: bool) {
        assert_eq!(value.is_present(), expected);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Number(42.0).to_text(), "42");
        assert_eq!(CellValue::Number(3.25).to_text(), "3.25");
        assert_eq!(CellValue::Bool(true).to_text(), "true");
        assert_eq!(CellValue::Empty.to_text(), "");
        assert_eq!(CellValue::Number(f64::INFINITY).to_text(), "Infinity");
        assert_eq!(CellValue::Number(-0.0).to_text(), "0");
    }

    #[test_case(1e21, "1e+21" ; "exponent threshold")]
    #[test_case(-2.5e22, "-2.5e+22" ; "negative large")]
    #[test_case(1e20, "100000000000000000000" ; "below threshold")]
    #[test_case(1e-7, "1e-7" ; "small")]
    #[test_case(1.5e-7, "1.5e-7" ; "small fraction")]
    #[test_case(0.000_001, "0.000001" ; "small threshold")]
    #[test_case(0.1 + 0.2, "0.30000000000000004" ; "shortest digits")]
    fn test_number_text_matches_javascript(n: f64, expected: &str) {
        assert_eq!(CellValue::Number(n).to_text(), expected);
    }

    #[test]
    fn test_set_cell_grows() {
        let mut doc = Document::default();
        doc.set_cell(2, 3, "x".into());
        assert_eq!(doc.row_count(), 3);
        assert!(doc.rows[0].is_empty());
        assert_eq!(doc.rows[2].len(), 4);
        assert_eq!(doc.cell(2, 3), Some(&CellValue::from("x")));
        assert_eq!(doc.cell(2, 0), Some(&CellValue::Empty));
        assert_eq!(doc.cell(2, 4), None);
        assert_eq!(doc.max_width(), 4);
    }

    #[test]
    fn test_set_cell_overwrites() {
        let mut doc = Document::new(vec![vec!["a".into(), "b".into()]]);
        doc.set_cell(0, 1, 7.0.into());
        assert_eq!(doc.rows[0], vec![CellValue::from("a"), CellValue::Number(7.0)]);
    }
}
