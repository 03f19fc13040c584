//! A1-style cell and range addressing.

use crate::errors::{BackendResult, DomainError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Excel's grid limits.
pub const MAX_COLUMN: u32 = 16_384;
pub const MAX_ROW: u32 = 1_048_576;

static CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]{1,7})$").expect("cell regex compiles")
});

/// One-based (column, row) pair, the same order umya uses for coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddr {
    pub col: u32,
    pub row: u32,
}

impl CellAddr {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    pub fn coords(self) -> (u32, u32) {
        (self.col, self.row)
    }
}

impl fmt::Display for CellAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

/// Inclusive rectangle with normalized corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    pub start: CellAddr,
    pub end: CellAddr,
}

impl RangeBounds {
    pub fn new(a: CellAddr, b: CellAddr) -> Self {
        Self {
            start: CellAddr::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellAddr::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }

    pub fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    pub fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    pub fn intersects(&self, other: &RangeBounds) -> bool {
        self.start.col <= other.end.col
            && other.start.col <= self.end.col
            && self.start.row <= other.end.row
            && other.start.row <= self.end.row
    }

    pub fn contains(&self, other: &RangeBounds) -> bool {
        self.start.col <= other.start.col
            && self.start.row <= other.start.row
            && self.end.col >= other.end.col
            && self.end.row >= other.end.row
    }

    /// Row-major cell walk.
    pub fn cells(&self) -> impl Iterator<Item = CellAddr> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| CellAddr::new(col, row)))
    }
}

impl fmt::Display for RangeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

pub fn parse_cell(raw: &str) -> BackendResult<CellAddr> {
    let invalid = || DomainError::validation(format!("Invalid cell reference: {raw}"));
    let caps = CELL_RE.captures(raw.trim()).ok_or_else(invalid)?;
    let col = column_index(&caps[1]).ok_or_else(invalid)?;
    let row: u32 = caps[2].parse().map_err(|_| invalid())?;
    if row == 0 || row > MAX_ROW || col > MAX_COLUMN {
        return Err(invalid());
    }
    Ok(CellAddr::new(col, row))
}

/// Parses `A1` or `A1:B2`. A sheet prefix must already be split off.
pub fn parse_range(raw: &str) -> BackendResult<RangeBounds> {
    let trimmed = raw.trim();
    match trimmed.split_once(':') {
        Some((start, end)) => Ok(RangeBounds::new(parse_cell(start)?, parse_cell(end)?)),
        None => {
            let cell = parse_cell(trimmed)?;
            Ok(RangeBounds::new(cell, cell))
        }
    }
}

/// Splits `Sheet!A1:B2` / `'My Sheet'!A1` into (sheet, range).
pub fn split_sheet_prefix(raw: &str) -> (Option<String>, &str) {
    match raw.rsplit_once('!') {
        Some((sheet, range)) => {
            let sheet = sheet.trim();
            let sheet = sheet
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .map(|s| s.replace("''", "'"))
                .unwrap_or_else(|| sheet.to_string());
            (Some(sheet), range)
        }
        None => (None, raw),
    }
}

/// Sheet name as it must appear inside a formula or series reference.
pub fn quote_sheet_name(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

pub fn column_index(letters: &str) -> Option<u32> {
    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    (col > 0).then_some(col)
}

pub fn column_name(mut col: u32) -> String {
    let mut out = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        out.push((b'A' + rem) as char);
        col = (col - 1) / 26;
    }
    out.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_cells_case_insensitively() {
        assert_eq!(parse_cell("b3").unwrap(), CellAddr::new(2, 3));
        assert_eq!(parse_cell("$AA$10").unwrap(), CellAddr::new(27, 10));
    }

    #[test]
    fn rejects_bad_cells() {
        for raw in ["", "A0", "1A", "A", "ZZZZ1", "A1B"] {
            assert_matches!(parse_cell(raw), Err(DomainError::Validation(msg)) if msg.contains("Invalid cell reference"));
        }
    }

    #[test]
    fn ranges_normalize_corners() {
        let range = parse_range("C5:A1").unwrap();
        assert_eq!(range.to_string(), "A1:C5");
        assert_eq!(range.width(), 3);
        assert_eq!(range.height(), 5);
        assert_eq!(parse_range("B2").unwrap().to_string(), "B2");
    }

    #[test]
    fn column_names_round_trip() {
        for col in [1, 26, 27, 52, 702, 703, MAX_COLUMN] {
            assert_eq!(column_index(&column_name(col)), Some(col));
        }
        assert_eq!(column_name(28), "AB");
    }

    #[test]
    fn sheet_prefixes() {
        assert_eq!(split_sheet_prefix("Data!A1:B2"), (Some("Data".to_string()), "A1:B2"));
        assert_eq!(
            split_sheet_prefix("'Q1 Sales'!A1"),
            (Some("Q1 Sales".to_string()), "A1")
        );
        assert_eq!(split_sheet_prefix("A1"), (None, "A1"));
        assert_eq!(quote_sheet_name("Q1 Sales"), "'Q1 Sales'");
        assert_eq!(quote_sheet_name("Data"), "Data");
    }

    #[test]
    fn intersection() {
        let a = parse_range("A1:B2").unwrap();
        assert!(a.intersects(&parse_range("B2:C3").unwrap()));
        assert!(!a.intersects(&parse_range("C1:D2").unwrap()));
        assert!(a.contains(&parse_range("A2").unwrap()));
    }
}
