//! Utilities for Excel-style cell references ("A1", "$B$7", "C3:F9").

/// Parse a cell reference from raw bytes (ASCII) into (col, row), both 0-indexed.
///
/// `$` anchors are ignored. Returns `None` unless both a column and a row
/// part are present.
pub fn parse_cell_ref_bytes(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in ref_bytes {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            let upper = b.to_ascii_uppercase();
            col = col
                .saturating_mul(26)
                .saturating_add(u32::from(upper - b'A') + 1);
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.saturating_mul(10).saturating_add(u32::from(b - b'0'));
            saw_row = true;
        }
    }

    if !saw_col || !saw_row {
        return None;
    }

    Some((col.saturating_sub(1), row.saturating_sub(1)))
}

/// Parse a cell reference like "A1" into (col, row), both 0-indexed.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    parse_cell_ref_bytes(cell_ref.trim().as_bytes())
}

/// Top-left corner of a range like "B2:D9" (or a single cell "B2") as (col, row).
pub fn parse_range_start(range: &str) -> Option<(u32, u32)> {
    let start = range.split_once(':').map_or(range, |(start, _)| start);
    parse_cell_ref(start)
}

/// Column letters for a 0-indexed column (0 -> "A", 26 -> "AA").
pub fn col_to_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(col) + 1;
    while n > 0 {
        n -= 1;
        let offset = u8::try_from(n % 26).unwrap_or(0);
        letters.push(char::from(b'A' + offset));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Reference for a 0-indexed (row, col), e.g. (0, 0) -> "A1".
pub fn cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), u64::from(row) + 1)
}
